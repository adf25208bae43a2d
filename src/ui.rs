use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Sender};
use crate::typeset;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, optional feedback bar, input, footer
    if app.pending_feedback.is_some() {
        let [header_area, chat_area, feedback_area, input_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        render_header(frame, header_area);
        render_chat(app, frame, chat_area);
        render_feedback_bar(frame, feedback_area);
        render_input(app, frame, input_area);
        render_footer(app, frame, footer_area);
    } else {
        let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        render_header(frame, header_area);
        render_chat(app, frame, chat_area);
        render_input(app, frame, input_area);
        render_footer(app, frame, footer_area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Math Professor ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    // Record dimensions for scroll-to-bottom math
    app.chat_width = inner_width;
    app.chat_height = inner_height;

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        match msg.sender {
            Sender::User => lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).bold(),
            ))),
            Sender::Bot => lines.push(Line::from(Span::styled(
                "Professor:",
                Style::default().fg(Color::Green).bold(),
            ))),
        }
        lines.extend(typeset::typeset(&msg.content));
        if let Some(source) = &msg.source {
            lines.push(Line::from(Span::styled(
                format!("(Source: {})", source),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::default());
    }

    // Placeholder while a question is in flight; never part of the history
    if app.busy {
        lines.push(Line::from(Span::styled(
            "Professor:",
            Style::default().fg(Color::Green).bold(),
        )));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Conversation "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_feedback_bar(frame: &mut Frame, area: Rect) {
    let bar = Line::from(vec![
        Span::styled(" Was this answer correct? ", Style::default().fg(Color::White)),
        Span::styled(" y ", Style::default().bg(Color::Green).fg(Color::Black)),
        Span::raw(" yes  "),
        Span::styled(" n ", Style::default().bg(Color::Red).fg(Color::White)),
        Span::raw(" no"),
    ]);
    frame.render_widget(Paragraph::new(bar), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if app.busy {
        (Color::DarkGray, " Question (waiting for answer) ")
    } else if app.input_mode == InputMode::Editing {
        (Color::Yellow, " Question ")
    } else {
        (Color::DarkGray, " Question ")
    };

    let text = if app.input.is_empty() && app.input_mode == InputMode::Normal && !app.busy {
        Span::styled(
            "Ask a math question...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.input.as_str())
    };

    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.busy {
        // Cursor sits at the char position inside the bordered box
        frame.set_cursor_position((area.x + 1 + app.cursor as u16, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " CHAT ",
        InputMode::Editing => " TYPE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" i ", key_style),
                Span::styled(" ask ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
            ];
            if app.pending_feedback.is_some() {
                hints.extend(vec![
                    Span::styled(" y/n ", key_style),
                    Span::styled(" feedback ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
