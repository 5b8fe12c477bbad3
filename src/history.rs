use crate::app_dirs::AppDirs;
use crate::scoring::TestResult;
use chrono::SecondsFormat;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Most results kept in the history
pub const HISTORY_LIMIT: usize = 5;

/// Failures of the underlying history storage
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("history data is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recent results, newest first, never more than [`HISTORY_LIMIT`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<TestResult>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `result` in front and drop whatever falls past the limit
    pub fn push_newest(&mut self, result: TestResult) {
        self.0.insert(0, result);
        self.0.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[TestResult] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&TestResult> {
        self.0.first()
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No results yet.");
        }
        let lines = self
            .0
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "{:>2}. {:>6.1} wpm  {:>5.1}% acc  {:>6.1}s  {}",
                    i + 1,
                    r.wpm,
                    r.accuracy,
                    r.elapsed_seconds,
                    r.recorded_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                )
            })
            .join("\n");
        write!(f, "{lines}")
    }
}

impl From<Vec<TestResult>> for History {
    fn from(mut results: Vec<TestResult>) -> Self {
        results.truncate(HISTORY_LIMIT);
        Self(results)
    }
}

/// Durable storage for the history
pub trait HistoryStore {
    /// Read stored results. A store with nothing saved yet returns an empty list.
    fn load(&self) -> Result<Vec<TestResult>, HistoryError>;
    fn save(&self, results: &[TestResult]) -> Result<(), HistoryError>;
}

/// JSON array in a single file
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<TestResult>, HistoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, results: &[TestResult]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(results)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Keeps the history in memory only
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    results: RefCell<Vec<TestResult>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<TestResult>, HistoryError> {
        Ok(self.results.borrow().clone())
    }

    fn save(&self, results: &[TestResult]) -> Result<(), HistoryError> {
        *self.results.borrow_mut() = results.to_vec();
        Ok(())
    }
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load(&self) -> Result<Vec<TestResult>, HistoryError> {
        (**self).load()
    }

    fn save(&self, results: &[TestResult]) -> Result<(), HistoryError> {
        (**self).save(results)
    }
}

/// Read the stored history. Missing or unreadable data yields an empty history.
pub fn load_history<S: HistoryStore + ?Sized>(store: &S) -> History {
    match store.load() {
        Ok(results) => History::from(results),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable history");
            History::new()
        }
    }
}

/// Prepend `result` to the stored history and persist it.
///
/// Saving is best effort: a failed write is logged and the updated history
/// is returned anyway. Stored data that cannot be read is left untouched and
/// the result is kept in memory only.
pub fn record_result<S: HistoryStore + ?Sized>(store: &S, result: TestResult) -> History {
    let mut history = match store.load() {
        Ok(results) => History::from(results),
        Err(e) => {
            warn!(error = %e, "history unreadable, result not saved");
            let mut history = History::new();
            history.push_newest(result);
            return history;
        }
    };
    history.push_newest(result);

    match store.save(history.entries()) {
        Ok(()) => debug!(entries = history.len(), "history saved"),
        Err(e) => warn!(error = %e, "could not save history"),
    }

    history
}

/// Remove every stored result
pub fn clear_history<S: HistoryStore + ?Sized>(store: &S) -> Result<(), HistoryError> {
    store.save(&[])
}
