//! Application state and event handling

pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::RuntimeFlavor;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::quiz::{FileSessionStore, QuestionBank, QuizError, QuizSession, SessionStore};
use crate::theme::Theme;
use crate::tutor::{StreamEvent, TutorError, TutorGateway, explain_question_prompt};
use crate::ui;
use input::Action;
use state::{AppState, View};

/// The main application
pub struct App {
    /// Loaded question bank
    bank: QuestionBank,

    /// Where quiz sessions live
    store: FileSessionStore,

    /// Session this run reads and writes
    session_id: String,

    /// Tutor access shared with streaming tasks
    gateway: Arc<TutorGateway>,

    /// Active colour theme
    theme: Theme,

    /// Current application state
    state: AppState,

    /// Incoming tutor stream, while one is running
    stream_rx: Option<mpsc::Receiver<StreamEvent>>,

    /// Cancels the running tutor stream
    cancel_token: Option<CancellationToken>,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(
        bank: QuestionBank,
        store: FileSessionStore,
        session_id: String,
        gateway: TutorGateway,
        theme: Theme,
    ) -> Result<Self> {
        let session = store.snapshot(&session_id)?;
        let state = AppState {
            session,
            tutor_available: gateway.is_available(),
            ..AppState::default()
        };
        let terminal = Self::setup_terminal()?;

        Ok(Self {
            bank,
            store,
            session_id,
            gateway: Arc::new(gateway),
            theme,
            state,
            stream_rx: None,
            cancel_token: None,
            terminal,
        })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        loop {
            self.drain_stream();

            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &self.bank, &self.theme);
            })?;

            if event::poll(std::time::Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = input::key_to_action(self.state.view, key.code, key.modifiers);
                        if let Some(action) = action {
                            if self.handle_action(action) {
                                break;
                            }
                        }
                    }
                }
            }
        }

        self.cancel_stream();
        self.restore_terminal()?;
        Ok(())
    }

    /// Handle an action, returns true if should exit
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextView => self.state.view = self.state.view.next(),
            Action::PrevView => self.state.view = self.state.view.prev(),
            Action::ShowView(view) => self.state.view = view,

            Action::Up => self.state.quiz.move_up(),
            Action::Down => {
                let count =
                    self.state.session.active_question.as_ref().map_or(0, |q| q.options.len());
                self.state.quiz.move_down(count);
            }
            Action::Select => self.select_highlighted(),
            Action::Submit => self.submit(),
            Action::NextQuestion => self.next_question(),
            Action::Explain => self.explain_current(),
            Action::CycleTopic => {
                self.state.quiz.cycle_topic(&self.bank.topics());
                let label = self.state.quiz.topic_label().to_string();
                self.state.status.set_message(format!("Drawing from: {}", label));
            }

            Action::Send => {
                let prompt = self.state.tutor.input.take();
                if prompt.trim().is_empty() {
                    self.state.status.set_error("Type a question for the tutor first.");
                } else {
                    self.start_tutor(prompt);
                }
            }
            Action::Cancel => {
                if self.state.tutor.streaming {
                    self.cancel_stream();
                    self.state.status.set_message("Tutor request cancelled");
                }
            }
            Action::ScrollUp => self.state.tutor.scroll_up(),
            Action::ScrollDown => self.state.tutor.scroll_down(),
            Action::InsertChar(c) => self.state.tutor.input.insert_char(c),
            Action::DeleteChar => self.state.tutor.input.delete_char(),
            Action::DeleteForward => self.state.tutor.input.delete_char_forward(),
            Action::CursorLeft => self.state.tutor.input.move_left(),
            Action::CursorRight => self.state.tutor.input.move_right(),
            Action::CursorStart => self.state.tutor.input.move_start(),
            Action::CursorEnd => self.state.tutor.input.move_end(),
        }
        false
    }

    /// Run one quiz operation against the store and refresh the snapshot
    ///
    /// The UI does not redraw while another process holds the session lock,
    /// for at most the store's lock timeout.
    fn quiz_op<T>(
        &mut self,
        op: impl FnOnce(&mut QuizSession, &QuestionBank) -> Result<T, QuizError>,
    ) -> Option<T> {
        let bank = &self.bank;
        let result =
            blocking(|| self.store.with_session(&self.session_id, |session| op(session, bank)));

        let value = match result {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::debug!("Quiz action rejected: {}", e);
                self.state.status.set_error(format!("{}. {}", e, e.hint()));
                None
            }
            Err(e) => {
                tracing::error!("Session store failed: {:#}", e);
                self.state.status.set_error(format!("Could not save progress: {}", e));
                None
            }
        };

        match blocking(|| self.store.snapshot(&self.session_id)) {
            Ok(session) => self.state.session = session,
            Err(e) => tracing::error!("Failed to reload session: {:#}", e),
        }
        value
    }

    fn next_question(&mut self) {
        if self.bank.is_empty() {
            self.state.status.set_error(QuizError::EmptyBank.hint());
            return;
        }
        let pool = self.bank.in_topics(self.state.quiz.topic.as_slice());
        if pool.is_empty() {
            let label = self.state.quiz.topic_label().to_string();
            self.state.status.set_error(format!("No questions for the selected topic: {}", label));
            return;
        }
        let drawn = self.quiz_op(|session, _| session.draw_question(&pool).map(|_| ()));
        if drawn.is_some() {
            self.state.quiz.cursor = 0;
            self.state.status.clear();
        }
    }

    fn select_highlighted(&mut self) {
        let option = self
            .state
            .session
            .active_question
            .as_ref()
            .and_then(|q| q.options.get(self.state.quiz.cursor).cloned());

        match option {
            Some(option) => {
                if self.quiz_op(|session, _| session.select_option(&option)).is_some() {
                    self.state.status.set_message(format!("Selected {}", option));
                }
            }
            None => self.state.status.set_error(QuizError::NoActiveQuestion.hint()),
        }
    }

    fn submit(&mut self) {
        if let Some(outcome) = self.quiz_op(|session, _| session.submit_answer()) {
            let session = &self.state.session;
            let summary = format!(
                "Score {}/{} ({}%)",
                session.score,
                session.attempts,
                session.accuracy_percent()
            );
            if outcome.is_correct {
                self.state.status.set_message(format!("Correct! {}", summary));
            } else {
                self.state.status.set_error(format!(
                    "Incorrect. The answer is {}. {}",
                    outcome.correct_label, summary
                ));
            }
        }
    }

    fn explain_current(&mut self) {
        let session = &self.state.session;
        let Some(question) = &session.active_question else {
            self.state.status.set_error(QuizError::NoActiveQuestion.hint());
            return;
        };

        let prompt = explain_question_prompt(question, session.selected_option.as_deref());
        self.start_tutor(prompt);
    }

    /// Start streaming a tutor answer into the tutor view
    fn start_tutor(&mut self, prompt: String) {
        self.cancel_stream();
        self.state.tutor.begin(prompt.clone());
        self.state.view = View::Tutor;
        self.state.status.clear();

        let (tx, rx) = mpsc::channel(64);
        let cancel_token = CancellationToken::new();
        let gateway = Arc::clone(&self.gateway);
        let token = cancel_token.clone();

        tokio::spawn(async move {
            if let Err(e) = gateway.stream(&prompt, tx, token).await {
                tracing::debug!("Tutor stream ended with error: {}", e);
            }
        });

        self.stream_rx = Some(rx);
        self.cancel_token = Some(cancel_token);
    }

    fn cancel_stream(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.stream_rx = None;
        self.state.tutor.streaming = false;
    }

    /// Move any streamed tutor output into the view state
    fn drain_stream(&mut self) {
        let Some(rx) = self.stream_rx.as_mut() else {
            return;
        };

        let tutor = &mut self.state.tutor;
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(StreamEvent::Delta { text }) => tutor.response.push_str(&text),
                Ok(StreamEvent::Done) | Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
                Ok(StreamEvent::Error { message }) => {
                    if !tutor.response.is_empty() {
                        tutor.response.push_str("\n\n");
                    }
                    tutor.response.push_str(&message);
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if finished {
            if tutor.response.trim().is_empty() {
                tutor.response = TutorError::EmptyResponse.placeholder();
            }
            tutor.streaming = false;
            self.stream_rx = None;
            self.cancel_token = None;
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Run blocking store I/O without starving other tasks on this worker
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
