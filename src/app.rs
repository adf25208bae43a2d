use anyhow::Result;
use tokio::task::JoinHandle;

use crate::backend::{Answer, BackendClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One conversation entry. Immutable once pushed to the history.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub source: Option<String>,
}

/// The single most recent successful answer, eligible for a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeedback {
    pub question: String,
    pub solution: String,
}

/// Feedback ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPayload {
    pub question: String,
    pub solution: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state (append-only, display order)
    pub messages: Vec<ChatMessage>,
    pub pending_feedback: Option<PendingFeedback>,

    // Question input
    pub input: String,
    pub cursor: usize, // char position in input

    // Submission lifecycle: busy is true strictly between dispatch and
    // settlement, and gates any further submission.
    pub busy: bool,
    in_flight_question: Option<String>,
    pub ask_task: Option<JoinHandle<Result<Answer>>>,

    // Chat viewport (dimensions recorded during render)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub backend: BackendClient,
}

impl App {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            messages: Vec::new(),
            pending_feedback: None,

            input: String::new(),
            cursor: 0,

            busy: false,
            in_flight_question: None,
            ask_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            backend,
        }
    }

    /// Begin a question submission. No-op (returns `None`) while a request is
    /// outstanding or when the input is blank. Otherwise clears any pending
    /// feedback target, appends the user message, marks the app busy, and
    /// returns the question to dispatch.
    pub fn begin_submission(&mut self) -> Option<String> {
        if self.busy || self.input.trim().is_empty() {
            return None;
        }

        // A resubmission withdraws the previous answer's feedback controls
        // before the new request is sent.
        self.pending_feedback = None;

        let question = self.input.clone();
        self.messages.push(ChatMessage {
            sender: Sender::User,
            content: question.clone(),
            source: None,
        });

        self.busy = true;
        self.in_flight_question = Some(question.clone());
        self.scroll_chat_to_bottom();

        Some(question)
    }

    /// Settle the outstanding submission: append exactly one bot message,
    /// arm the feedback controls on success, clear the draft, and lift the
    /// busy gate.
    pub fn finish_submission(&mut self, outcome: Result<Answer>) {
        let question = self.in_flight_question.take();

        match outcome {
            Ok(Answer::Solution { solution, source }) => {
                if let Some(question) = question {
                    self.pending_feedback = Some(PendingFeedback {
                        question,
                        solution: solution.clone(),
                    });
                }
                self.messages.push(ChatMessage {
                    sender: Sender::Bot,
                    content: solution,
                    source,
                });
            }
            Ok(Answer::Error(error)) => {
                self.messages.push(ChatMessage {
                    sender: Sender::Bot,
                    content: format!("Error: {}", error),
                    source: None,
                });
            }
            Err(error) => {
                self.messages.push(ChatMessage {
                    sender: Sender::Bot,
                    content: format!("Failed to connect to backend: {}", error),
                    source: None,
                });
            }
        }

        self.input.clear();
        self.cursor = 0;
        self.busy = false;
        self.scroll_chat_to_bottom();
    }

    /// Take the stored feedback target for submission. The target is cleared
    /// immediately, whether or not the request ultimately succeeds. No-op
    /// when nothing is pending.
    pub fn take_feedback(&mut self, is_correct: bool) -> Option<FeedbackPayload> {
        let pending = self.pending_feedback.take()?;
        Some(FeedbackPayload {
            question: pending.question,
            solution: pending.solution,
            is_correct,
        })
    }

    /// Settle the ask task if it has finished. Called from the event loop on
    /// every iteration; the tick timer guarantees this runs promptly.
    pub async fn poll_ask_task(&mut self) {
        let finished = self
            .ask_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.ask_task.take() {
            let outcome = match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("ask task did not complete: {}", e);
                    Err(anyhow::anyhow!("request task aborted: {}", e))
                }
            };
            self.finish_submission(outcome);
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll the chat so the newest message (or "Thinking...") is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // Role line ("You:" or "Professor:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            if msg.source.is_some() {
                total_lines += 1; // Source annotation line
            }
            total_lines += 1; // Blank line after message
        }

        if self.busy {
            total_lines += 2; // "Professor:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}
