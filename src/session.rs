use crate::scoring::{compute_result, TestResult};
use crate::sentences::pick_random;
use chrono::Utc;
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

/// How a single position of the target compares to what was typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CharStatus {
    Unset,
    Correct,
    Incorrect,
}

/// Lifecycle of a test
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Running {
        started_at: Instant,
    },
    Finished {
        started_at: Instant,
        finished_at: Instant,
        result: TestResult,
    },
}

/// What the display needs after a keystroke
#[derive(Debug, Clone, PartialEq)]
pub struct KeystrokeOutcome {
    pub statuses: Vec<CharStatus>,
    pub caret: usize,
    /// Set only on the keystroke that completed the test
    pub completed: Option<TestResult>,
}

/// One typing test over a single target sentence
#[derive(Debug, Clone)]
pub struct TypingSession {
    target: String,
    typed: String,
    phase: Phase,
}

impl TypingSession {
    /// Fresh idle session over a sentence picked at random from `sentences`
    pub fn start(sentences: &[&str]) -> Self {
        Self::start_with_rng(sentences, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(sentences: &[&str], rng: &mut R) -> Self {
        Self::with_target(pick_random(sentences, rng))
    }

    pub fn with_target(target: impl Into<String>) -> Self {
        let target = target.into();
        debug!(sentence = %target, "new session");
        Self {
            target,
            typed: String::new(),
            phase: Phase::Idle,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn has_started(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn has_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Idle => None,
            Phase::Running { started_at } | Phase::Finished { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        match &self.phase {
            Phase::Finished { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Feed the whole text typed so far.
    ///
    /// Ignored once finished. The first non-empty input starts the clock at `now`,
    /// and input equal to the target finishes the test.
    pub fn on_keystroke(&mut self, typed: &str, now: Instant) -> KeystrokeOutcome {
        if self.has_finished() {
            return self.outcome(None);
        }

        self.typed.clear();
        self.typed.push_str(typed);

        if matches!(self.phase, Phase::Idle) && !typed.is_empty() {
            info!("session started");
            self.phase = Phase::Running { started_at: now };
        }

        let mut completed = None;
        if let Phase::Running { started_at } = self.phase {
            if self.typed == self.target {
                let elapsed = now.saturating_duration_since(started_at).as_secs_f64();
                let result = compute_result(&self.target, &self.typed, elapsed, Utc::now());
                info!(
                    wpm = result.wpm,
                    accuracy = result.accuracy,
                    secs = result.elapsed_seconds,
                    "session finished"
                );
                completed = Some(result.clone());
                self.phase = Phase::Finished {
                    started_at,
                    finished_at: now,
                    result,
                };
            }
        }

        self.outcome(completed)
    }

    fn outcome(&self, completed: Option<TestResult>) -> KeystrokeOutcome {
        KeystrokeOutcome {
            statuses: self.char_statuses(),
            caret: self.caret(),
            completed,
        }
    }

    /// Status of every position in `max(len(typed), len(target))`
    pub fn char_statuses(&self) -> Vec<CharStatus> {
        let mut expected = self.target.chars();
        let mut actual = self.typed.chars();
        let mut statuses = Vec::new();

        loop {
            let status = match (expected.next(), actual.next()) {
                (None, None) => break,
                (_, None) => CharStatus::Unset,
                (Some(e), Some(a)) if e == a => CharStatus::Correct,
                _ => CharStatus::Incorrect,
            };
            statuses.push(status);
        }

        statuses
    }

    /// Index of the next char to type, clamped to the last char of the target
    pub fn caret(&self) -> usize {
        let target_len = self.target.chars().count();
        self.typed
            .chars()
            .count()
            .min(target_len.saturating_sub(1))
    }

    /// Seconds on the clock: zero before the first keystroke, frozen once finished
    pub fn elapsed_seconds(&self, now: Instant) -> f64 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Running { started_at } => {
                now.saturating_duration_since(started_at).as_secs_f64()
            }
            Phase::Finished {
                started_at,
                finished_at,
                ..
            } => finished_at
                .saturating_duration_since(started_at)
                .as_secs_f64(),
        }
    }
}
