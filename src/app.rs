use crate::config::Config;
use crate::history::{load_history, record_result, History, HistoryStore};
use crate::session::{CharStatus, TypingSession};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::debug;

/// Typed input is cut off at this multiple of the target length
const MAX_INPUT_FACTOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

/// Glue between terminal input, the typing session and the stored history
pub struct App {
    pub session: TypingSession,
    pub history: History,
    pub config: Config,
    pub should_quit: bool,
    typed: String,
    prompt: Option<String>,
    store: Box<dyn HistoryStore>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("history", &self.history)
            .field("config", &self.config)
            .field("should_quit", &self.should_quit)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl App {
    /// `prompt` replaces the random sentence for every test of this app
    pub fn new(config: Config, store: Box<dyn HistoryStore>, prompt: Option<String>) -> Self {
        let history = load_history(&store);
        let mut app = Self {
            session: TypingSession::with_target(""),
            history,
            config,
            should_quit: false,
            typed: String::new(),
            prompt,
            store,
        };
        app.session = app.fresh_session();
        app
    }

    fn fresh_session(&self) -> TypingSession {
        match &self.prompt {
            Some(prompt) => TypingSession::with_target(prompt.clone()),
            None => {
                let sentences: Vec<&str> = self
                    .config
                    .sentences
                    .iter()
                    .map(String::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                TypingSession::start(&sentences)
            }
        }
    }

    pub fn state(&self) -> AppState {
        if self.session.has_finished() {
            AppState::Results
        } else {
            AppState::Typing
        }
    }

    /// Start over. `same_sentence` keeps the current target.
    pub fn restart(&mut self, same_sentence: bool) {
        self.session = if same_sentence {
            TypingSession::with_target(self.session.target().to_string())
        } else {
            self.fresh_session()
        };
        self.typed.clear();
        debug!(same_sentence, "restart");
    }

    /// Whether the timer display needs refreshing
    pub fn is_ticking(&self) -> bool {
        self.session.has_started() && !self.session.has_finished()
    }

    pub fn char_statuses(&self) -> Vec<CharStatus> {
        self.session.char_statuses()
    }

    pub fn caret(&self) -> usize {
        self.session.caret()
    }

    pub fn elapsed_display(&self, now: Instant) -> String {
        format!("{:.1}s", self.session.elapsed_seconds(now))
    }

    /// Message for the latest result, if the test is over
    pub fn verdict(&self) -> Option<&str> {
        self.session.result().map(|r| self.config.verdict(r.wpm))
    }

    pub fn type_char(&mut self, c: char, now: Instant) {
        if self.session.has_finished() {
            return;
        }
        let limit = self.session.target().chars().count() * MAX_INPUT_FACTOR;
        if self.typed.chars().count() >= limit.max(1) {
            return;
        }
        self.typed.push(c);
        self.feed(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.session.has_finished() {
            return;
        }
        if self.typed.pop().is_some() {
            self.feed(now);
        }
    }

    fn feed(&mut self, now: Instant) {
        let outcome = self.session.on_keystroke(&self.typed, now);
        if let Some(result) = outcome.completed {
            self.history = record_result(&self.store, result);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.restart(true),
            KeyCode::Tab => self.restart(false),
            KeyCode::Backspace => self.backspace(now),
            KeyCode::Char(c) => match self.state() {
                AppState::Typing => {
                    if !ctrl {
                        self.type_char(c, now);
                    }
                }
                AppState::Results => match c {
                    'r' => self.restart(true),
                    'n' => self.restart(false),
                    _ => {}
                },
            },
            _ => {}
        }
    }
}
