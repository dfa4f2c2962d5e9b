//! Auction state store
//!
//! Owns the persisted per-week records and their load/initialize/save
//! lifecycle. Each week lives in its own JSON file named by the week's
//! Monday (`auction_2026-04-06.json`), wrapped with a SHA-256 integrity
//! hash that is verified on load.
//!
//! # Concurrency
//!
//! Every mutating auction operation is a read-validate-mutate-persist
//! cycle, and two of them racing on the same week could both validate
//! against a stale snapshot and silently lose one append. The store
//! therefore keeps one mutex per week (registered in a concurrent map) and
//! runs the whole cycle inside [`WeekStore::with_week`] under that mutex.
//! Different weeks never contend. Failing to acquire a week's lock within
//! the configured bound is a fatal [`StoreError::LockTimeout`], never a
//! silent retry.

use crate::models::week::AuctionWeek;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised by the state store
///
/// All of these are fatal, operator-facing conditions; user-facing
/// validation failures never originate here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("week record for {week_start} failed its integrity check")]
    Corrupted { week_start: NaiveDate },

    #[error("timed out after {waited:?} acquiring the lock for week {week_start}")]
    LockTimeout {
        week_start: NaiveDate,
        waited: Duration,
    },

    #[error("lock for week {week_start} was poisoned by a panicked writer")]
    LockPoisoned { week_start: NaiveDate },
}

/// Whether `with_week` should persist the record after the closure runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The closure mutated the record; write it back
    Persist,

    /// The record is unchanged (read or rejected write); skip the write
    Discard,
}

/// On-disk envelope for one week record
#[derive(Debug, Serialize, Deserialize)]
struct WeekFile {
    record: AuctionWeek,
    integrity_hash: String,
}

/// Keyed store of per-week auction records
///
/// # Example
/// ```
/// use chrono::{NaiveDate, Utc};
/// use prospect_auction_core_rs::store::{Commit, WeekStore};
/// use prospect_auction_core_rs::{AuctionWeek, Phase, SeasonSchedule};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = WeekStore::new(dir.path());
/// let monday = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
/// let schedule = SeasonSchedule::new(
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 13).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
/// );
///
/// let bid_count = store
///     .with_week(
///         monday,
///         || AuctionWeek::new(monday, Phase::OffWeek, vec![], schedule.clone(), Utc::now()),
///         |week| (week.bids().len(), Commit::Discard),
///     )
///     .unwrap();
/// assert_eq!(bid_count, 0);
/// ```
pub struct WeekStore {
    data_dir: PathBuf,
    cells: DashMap<NaiveDate, Arc<Mutex<Option<AuctionWeek>>>>,
    lock_timeout: Duration,
}

impl WeekStore {
    /// Default bound on acquiring a week's lock
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

    /// Create a store rooted at `data_dir`
    ///
    /// The directory is created on first persist, not here.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cells: DashMap::new(),
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override the lock-acquisition bound
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the week's JSON file
    pub fn week_path(&self, week_start: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("auction_{week_start}.json"))
    }

    /// Run `f` against the week's record under that week's lock
    ///
    /// The record is loaded from disk on the week's first touch in this
    /// process; if no file exists yet, `init` builds a fresh record which
    /// is persisted immediately (lazy initialization). `f` returns its
    /// result paired with a [`Commit`] deciding whether the (possibly
    /// mutated) record is written back.
    pub fn with_week<T>(
        &self,
        week_start: NaiveDate,
        init: impl FnOnce() -> AuctionWeek,
        f: impl FnOnce(&mut AuctionWeek) -> (T, Commit),
    ) -> Result<T, StoreError> {
        let cell = self
            .cells
            .entry(week_start)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let mut guard = self.lock_cell(&cell, week_start)?;

        if guard.is_none() {
            let record = match self.load(week_start)? {
                Some(record) => record,
                None => {
                    let record = init();
                    self.persist(&record)?;
                    tracing::info!(week_start = %week_start, "initialized auction week record");
                    record
                }
            };
            *guard = Some(record);
        }
        // Populated just above; the lock is still held.
        let record = guard.as_mut().unwrap();

        let (value, commit) = f(record);
        if commit == Commit::Persist {
            self.persist(record)?;
        }
        Ok(value)
    }

    /// Write one record to its week file
    ///
    /// Public so the resolver can checkpoint per-team progress while it
    /// still holds the week's lock inside [`WeekStore::with_week`].
    pub fn persist(&self, record: &AuctionWeek) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let file = WeekFile {
            integrity_hash: integrity_hash(record)?,
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(self.week_path(record.week_start()), json)?;
        Ok(())
    }

    fn load(&self, week_start: NaiveDate) -> Result<Option<AuctionWeek>, StoreError> {
        let path = self.week_path(week_start);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: WeekFile = serde_json::from_str(&raw)?;
        if integrity_hash(&file.record)? != file.integrity_hash {
            tracing::warn!(path = %path.display(), "week record failed its integrity check");
            return Err(StoreError::Corrupted { week_start });
        }
        Ok(Some(file.record))
    }

    fn lock_cell<'a>(
        &self,
        cell: &'a Mutex<Option<AuctionWeek>>,
        week_start: NaiveDate,
    ) -> Result<std::sync::MutexGuard<'a, Option<AuctionWeek>>, StoreError> {
        let started = Instant::now();
        loop {
            match cell.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(StoreError::LockPoisoned { week_start });
                }
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        return Err(StoreError::LockTimeout { week_start, waited });
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }

    /// Root directory of the store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// SHA-256 of the record's canonical JSON, hex-encoded
fn integrity_hash(record: &AuctionWeek) -> Result<String, StoreError> {
    let json = serde_json::to_string(record)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
