//! Application state definitions

use crate::quiz::QuizSession;

/// Which view the main area shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Tutor,
    Quiz,
}

impl View {
    /// Views in sidebar order
    pub const ALL: [View; 3] = [View::Dashboard, View::Tutor, View::Quiz];

    /// Sidebar label
    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Tutor => "AI Tutor",
            View::Quiz => "Quiz Practice",
        }
    }

    /// Position in the sidebar
    pub fn index(self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Tutor => 1,
            View::Quiz => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    /// Input buffer
    pub text: String,
    /// Cursor position (character index)
    pub cursor: usize,
}

impl PromptInput {
    /// Convert character index to byte index
    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.text.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.text.len())
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.text.remove(byte_idx);
        }
    }

    /// Delete character at cursor
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.text.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the input, leaving it empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// State for the AI tutor view
#[derive(Debug, Clone, Default)]
pub struct TutorState {
    /// Prompt being typed
    pub input: PromptInput,
    /// Prompt of the current or last exchange
    pub last_prompt: Option<String>,
    /// Answer text (grows while streaming)
    pub response: String,
    /// Whether a reply is still arriving
    pub streaming: bool,
    /// Scroll position in the answer
    pub scroll: u16,
}

impl TutorState {
    /// Reset the answer area for a new prompt
    pub fn begin(&mut self, prompt: String) {
        self.last_prompt = Some(prompt);
        self.response.clear();
        self.streaming = true;
        self.scroll = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Scroll down (clamped when drawn)
    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }
}

/// State for the quiz view
#[derive(Debug, Clone, Default)]
pub struct QuizViewState {
    /// Highlighted option index
    pub cursor: usize,
    /// Topic questions are drawn from (`None` for all topics)
    pub topic: Option<String>,
}

impl QuizViewState {
    /// Step the topic filter: all topics, then each topic in turn
    pub fn cycle_topic(&mut self, topics: &[&str]) {
        let next = match &self.topic {
            None => topics.first(),
            Some(current) => {
                topics.iter().position(|t| t == current).and_then(|i| topics.get(i + 1))
            }
        };
        self.topic = next.map(|t| t.to_string());
    }

    /// Label for the active topic filter
    pub fn topic_label(&self) -> &str {
        self.topic.as_deref().unwrap_or("All topics")
    }

    pub fn move_down(&mut self, option_count: usize) {
        if option_count > 0 {
            self.cursor = (self.cursor + 1).min(option_count - 1);
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

/// Message shown on the bottom line
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    /// Status/error message to display
    pub message: Option<String>,
    /// Whether message is an error
    pub is_error: bool,
}

impl StatusLine {
    /// Set a status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}

/// Full application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view
    pub view: View,

    /// Last persisted state of the quiz session
    pub session: QuizSession,

    /// Quiz view state
    pub quiz: QuizViewState,

    /// Tutor view state
    pub tutor: TutorState,

    /// Bottom status line
    pub status: StatusLine,

    /// Whether the tutor endpoint is usable
    pub tutor_available: bool,
}
