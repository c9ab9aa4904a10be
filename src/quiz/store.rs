//! Keyed quiz session persistence
//!
//! Every quiz interaction is load → apply → persist against a store keyed by
//! session id, so a session survives across separate process invocations.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use super::error::QuizError;
use super::session::QuizSession;
use crate::config::Config;

/// Storage for quiz sessions addressed by session id
pub trait SessionStore {
    /// Current state of a session (empty if the id is unknown)
    fn snapshot(&self, id: &str) -> Result<QuizSession>;

    /// Apply `op` to the session as one atomic step
    ///
    /// The updated session is persisted only when `op` succeeds. The outer
    /// result reports storage failures, the inner one quiz rejections.
    fn with_session<T, F>(&self, id: &str, op: F) -> Result<Result<T, QuizError>>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, QuizError>;

    /// Forget a session entirely, returns whether it existed
    fn reset(&self, id: &str) -> Result<bool>;
}

/// On-disk layout: every session in one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    /// Sessions per id
    sessions: HashMap<String, QuizSession>,
}

/// JSON file store guarded by a lock file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl FileSessionStore {
    /// How long a lock may be held before it is considered abandoned
    const STALE_LOCK: Duration = Duration::from_secs(30);
    /// Pause between lock attempts
    const LOCK_RETRY: Duration = Duration::from_millis(25);

    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock_timeout: Duration::from_secs(5) }
    }

    /// Store in the default data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::data_dir()?.join("sessions.json")))
    }

    /// Set how long to wait for a competing writer
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the session document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling_path(".lock")
    }

    /// Guards the removal of an abandoned lock file
    fn breaker_path(&self) -> PathBuf {
        self.sibling_path(".lock.break")
    }

    /// Take the store lock, waiting up to the lock timeout
    ///
    /// This blocks the calling thread between attempts.
    fn lock(&self) -> Result<LockGuard> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let started = Instant::now();
        loop {
            match try_create(&lock_path) {
                Ok(Some(guard)) => return Ok(guard),
                Ok(None) => {
                    if lock_is_stale(&lock_path, Self::STALE_LOCK) && self.break_stale_lock()? {
                        continue;
                    }
                    if started.elapsed() >= self.lock_timeout {
                        bail!("Timed out waiting for session lock {:?}", lock_path);
                    }
                    std::thread::sleep(Self::LOCK_RETRY);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create lock file {:?}", lock_path));
                }
            }
        }
    }

    /// Remove an abandoned lock file, returns whether it was removed
    ///
    /// Only the holder of the breaker file may delete a lock it does not own,
    /// and it re-checks staleness while holding it. A contender that saw the
    /// old lock can therefore never delete the fresh lock of the process that
    /// broke it first.
    fn break_stale_lock(&self) -> Result<bool> {
        let lock_path = self.lock_path();
        let breaker_path = self.breaker_path();

        let Some(_breaker) = try_create(&breaker_path)
            .with_context(|| format!("Failed to create lock file {:?}", breaker_path))?
        else {
            // Left behind by a crashed process
            if lock_is_stale(&breaker_path, Self::STALE_LOCK) {
                tracing::warn!("Removing abandoned lock breaker {:?}", breaker_path);
                let _ = std::fs::remove_file(&breaker_path);
            }
            return Ok(false);
        };

        if !lock_is_stale(&lock_path, Self::STALE_LOCK) {
            return Ok(false);
        }
        tracing::warn!("Breaking stale session lock {:?}", lock_path);
        match std::fs::remove_file(&lock_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove stale lock {:?}", lock_path))
            }
        }
    }

    fn read(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read sessions from {:?}", self.path))?;
        serde_json::from_str(&contents).with_context(|| "Failed to parse sessions.json")
    }

    fn write(&self, file: &SessionFile) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let contents =
            serde_json::to_string_pretty(file).with_context(|| "Failed to serialize sessions")?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
        tmp.write_all(contents.as_bytes()).with_context(|| "Failed to write sessions")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write sessions to {:?}", self.path))?;

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn snapshot(&self, id: &str) -> Result<QuizSession> {
        Ok(self.read()?.sessions.remove(id).unwrap_or_default())
    }

    fn with_session<T, F>(&self, id: &str, op: F) -> Result<Result<T, QuizError>>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, QuizError>,
    {
        let _guard = self.lock()?;
        let mut file = self.read()?;
        let mut session = file.sessions.get(id).cloned().unwrap_or_default();

        let result = op(&mut session);
        match &result {
            Ok(_) => {
                file.sessions.insert(id.to_string(), session);
                self.write(&file)?;
                tracing::debug!("Persisted quiz session '{}'", id);
            }
            Err(e) => tracing::debug!("Quiz operation rejected for '{}': {}", id, e),
        }

        Ok(result)
    }

    fn reset(&self, id: &str) -> Result<bool> {
        let _guard = self.lock()?;
        let mut file = self.read()?;

        if file.sessions.remove(id).is_none() {
            return Ok(false);
        }
        self.write(&file)?;
        tracing::info!("Reset quiz session '{}'", id);
        Ok(true)
    }
}

/// Removes the lock file when dropped
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Create `path` exclusively, `None` if someone else holds it
fn try_create(path: &Path) -> std::io::Result<Option<LockGuard>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            let _ = write!(file, "{}", std::process::id());
            Ok(Some(LockGuard { path: path.to_path_buf() }))
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

fn lock_is_stale(path: &Path, max_age: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > max_age)
}

/// In-process store, mainly for tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, QuizSession>>,
}

impl MemorySessionStore {
    fn sessions(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, QuizSession>>> {
        self.sessions.lock().map_err(|_| anyhow!("Session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self, id: &str) -> Result<QuizSession> {
        Ok(self.sessions()?.get(id).cloned().unwrap_or_default())
    }

    fn with_session<T, F>(&self, id: &str, op: F) -> Result<Result<T, QuizError>>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, QuizError>,
    {
        let mut sessions = self.sessions()?;
        let mut session = sessions.get(id).cloned().unwrap_or_default();

        let result = op(&mut session);
        if result.is_ok() {
            sessions.insert(id.to_string(), session);
        }
        Ok(result)
    }

    fn reset(&self, id: &str) -> Result<bool> {
        Ok(self.sessions()?.remove(id).is_some())
    }
}
