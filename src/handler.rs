use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit, works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Enter the question input (not while a request is outstanding)
        KeyCode::Char('i') | KeyCode::Char('/') => {
            if !app.busy {
                app.input_mode = InputMode::Editing;
                app.cursor = app.input.chars().count();
            }
        }

        // Verdict on the most recent answer; no-op when nothing is pending
        KeyCode::Char('y') => submit_feedback(app, true),
        KeyCode::Char('n') => submit_feedback(app, false),

        // Conversation scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('g') => app.scroll_chat_to_top(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_question(app);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Dispatch the drafted question as a background request. Exactly one
/// attempt, no retry; the busy gate in `begin_submission` keeps at most one
/// request outstanding.
fn submit_question(app: &mut App) {
    if let Some(question) = app.begin_submission() {
        app.input_mode = InputMode::Normal;
        let backend = app.backend.clone();
        app.ask_task = Some(tokio::spawn(
            async move { backend.ask(&question).await },
        ));
    }
}

/// Fire-and-forget: the verdict task is never joined or cancelled, and its
/// failure is only logged. The feedback controls disappear immediately.
fn submit_feedback(app: &mut App, is_correct: bool) {
    if let Some(payload) = app.take_feedback(is_correct) {
        let backend = app.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend
                .feedback(&payload.question, &payload.solution, payload.is_correct)
                .await
            {
                tracing::warn!("failed to send feedback: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendClient;

    fn test_app() -> App {
        App::new(BackendClient::new("http://localhost:8000"))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::from(code));
    }

    #[tokio::test]
    async fn typing_edits_the_draft_at_the_cursor() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('='));
        assert_eq!(app.input, "x=2");
        assert_eq!(app.cursor, 2);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "x2");
        assert_eq!(app.cursor, 1);
    }

    #[tokio::test]
    async fn cursor_movement_is_utf8_safe() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        app.input = "π≈3".to_string();
        app.cursor = 3;

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "≈3");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "≈");
    }

    #[tokio::test]
    async fn enter_on_blank_draft_submits_nothing() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        app.input = "   ".to_string();

        press(&mut app, KeyCode::Enter);
        assert!(app.messages.is_empty());
        assert!(app.ask_task.is_none());
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn enter_dispatches_the_question_and_leaves_editing() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        app.input = "solve x+1=3".to_string();

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.messages.len(), 1);
        assert!(app.busy);
        assert!(app.ask_task.is_some());
        assert_eq!(app.input_mode, InputMode::Normal);

        if let Some(task) = app.ask_task.take() {
            task.abort();
        }
    }

    #[tokio::test]
    async fn editing_is_blocked_while_busy() {
        let mut app = test_app();
        app.input = "first".to_string();
        app.begin_submission().unwrap();
        app.input_mode = InputMode::Normal;

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn verdict_keys_are_no_ops_without_a_pending_answer() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.messages.is_empty());
        assert!(app.pending_feedback.is_none());
    }

    #[tokio::test]
    async fn verdict_key_clears_the_pending_answer() {
        let mut app = test_app();
        app.input = "q".to_string();
        app.begin_submission().unwrap();
        app.finish_submission(Ok(crate::backend::Answer::Solution {
            solution: "a".to_string(),
            source: None,
        }));
        assert!(app.pending_feedback.is_some());
        let history_len = app.messages.len();

        press(&mut app, KeyCode::Char('y'));
        assert!(app.pending_feedback.is_none());
        assert_eq!(app.messages.len(), history_len);
    }

    #[tokio::test]
    async fn quit_keys_set_the_quit_flag() {
        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
