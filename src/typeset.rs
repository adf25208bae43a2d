//! Turns answer text (markdown with `$...$` / `$$...$$` math) into styled
//! terminal lines. The terminal stands in for a browser typesetter: math
//! segments get a distinct style instead of rendered glyphs.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

fn math_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::ITALIC)
}

/// Typeset a whole message body, one styled line per text line.
pub fn typeset(text: &str) -> Vec<Line<'static>> {
    text.lines().map(typeset_line).collect()
}

/// Parse a line of text and convert **bold** markdown and `$...$` math
/// segments to styled spans. Unterminated markers are kept as literal text.
pub fn typeset_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                // Consume the second *
                chars.next();

                // Find closing **
                let mut bold_text = String::new();
                let mut found_close = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            }
            '$' => {
                // $$...$$ is display math, $...$ inline math
                let display = chars.peek() == Some(&'$');
                if display {
                    chars.next();
                }

                let mut math_text = String::new();
                let mut found_close = false;
                while let Some(c) = chars.next() {
                    if c == '$' {
                        if !display {
                            found_close = true;
                            break;
                        }
                        if chars.peek() == Some(&'$') {
                            chars.next();
                            found_close = true;
                            break;
                        }
                        // Lone $ inside a $$ block stays literal
                    }
                    math_text.push(c);
                }

                if found_close && !math_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    let style = if display {
                        math_style().add_modifier(Modifier::BOLD)
                    } else {
                        math_style()
                    };
                    spans.push(Span::styled(math_text, style));
                } else {
                    current_text.push_str(if display { "$$" } else { "$" });
                    current_text.push_str(&math_text);
                }
            }
            _ => current_text.push(c),
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn plain_text_is_a_single_raw_span() {
        let line = typeset_line("just words");
        assert_eq!(span_texts(&line), vec!["just words"]);
        assert_eq!(line.spans[0].style, Style::default());
    }

    #[test]
    fn bold_marker_produces_bold_span() {
        let line = typeset_line("the **only** root");
        assert_eq!(span_texts(&line), vec!["the ", "only", " root"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn inline_math_is_styled() {
        let line = typeset_line("so $x = 2$ holds");
        assert_eq!(span_texts(&line), vec!["so ", "x = 2", " holds"]);
        assert_eq!(line.spans[1].style, math_style());
    }

    #[test]
    fn display_math_is_styled_bold() {
        let line = typeset_line("$$\\int_0^1 x\\,dx$$");
        assert_eq!(span_texts(&line), vec!["\\int_0^1 x\\,dx"]);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn unterminated_math_stays_literal() {
        let line = typeset_line("costs $5 total");
        assert_eq!(span_texts(&line), vec!["costs $5 total"]);
    }

    #[test]
    fn unterminated_bold_stays_literal() {
        let line = typeset_line("a **b");
        assert_eq!(span_texts(&line), vec!["a **b"]);
    }

    #[test]
    fn multiline_answer_maps_to_one_line_each() {
        let lines = typeset("first\n\n$x=2$");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].spans.is_empty());
        assert_eq!(span_texts(&lines[2]), vec!["x=2"]);
    }
}
