//! Daily data-volume quota tracking.
//!
//! One ledger instance tracks one persisted usage record; the pipeline runs
//! two (download and upload) so their quotas are enforced independently.
//! Records roll over lazily: any record whose date is not today is replaced
//! with a fresh zeroed record on first access of the new day.

mod store;

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub use store::{InMemoryStore, JsonFileStore, UsageStore};

/// Transfer direction a quota applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Download,
    Upload,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Download => f.write_str("download"),
            Direction::Upload => f.write_str("upload"),
        }
    }
}

/// One calendar day's cumulative transfer volumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Calendar day this record covers; always today when read back.
    pub date: NaiveDate,
    /// Megabytes downloaded on this day.
    pub downloaded_mb: f64,
    /// Megabytes uploaded on this day.
    pub uploaded_mb: f64,
    /// Number of files uploaded on this day.
    pub file_count: u64,
}

impl UsageRecord {
    /// Creates a zeroed record dated today.
    pub fn zeroed_today() -> Self {
        Self {
            date: Local::now().date_naive(),
            downloaded_mb: 0.0,
            uploaded_mb: 0.0,
            file_count: 0,
        }
    }

    /// Returns the counter for the given direction.
    pub fn used_mb(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Download => self.downloaded_mb,
            Direction::Upload => self.uploaded_mb,
        }
    }
}

/// Errors that can occur while persisting or loading usage records.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt usage record at {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Capacity reserved against a quota, to be released if the transfer it
/// covers subsequently fails.
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    pub direction: Direction,
    pub amount_mb: f64,
}

/// Per-day quota ledger with lazy date rollover.
///
/// All mutations are serialized behind an internal lock and persisted
/// through the backing [`UsageStore`] before the lock is dropped, so
/// concurrent transfers can never lose updates. `try_reserve` performs the
/// limit check and the commit under one lock acquisition, closing the
/// check-then-commit window that would otherwise let two concurrent
/// transfers both pass the check.
#[derive(Debug)]
pub struct UsageLedger {
    store: Box<dyn UsageStore>,
    record: Mutex<UsageRecord>,
}

impl UsageLedger {
    /// Opens a ledger over the given store.
    ///
    /// A missing or corrupt persisted record reinitializes to a zeroed
    /// record for today rather than failing startup; corruption is logged.
    pub fn open(store: Box<dyn UsageStore>) -> Self {
        let record = match store.load() {
            Ok(Some(record)) => record,
            Ok(None) => UsageRecord::zeroed_today(),
            Err(e) => {
                tracing::warn!("Reinitializing usage record: {e}");
                UsageRecord::zeroed_today()
            }
        };

        Self {
            store,
            record: Mutex::new(record),
        }
    }

    /// Returns today's record, rolling a stale date over to a fresh zeroed
    /// record first.
    pub fn current_record(&self) -> UsageRecord {
        let mut guard = self.record.lock();
        self.roll_over_if_stale(&mut guard);
        guard.clone()
    }

    /// Returns true when a transfer of `delta_mb` would push usage past the
    /// limit. An unset limit never exceeds.
    pub fn would_exceed(&self, direction: Direction, delta_mb: f64, limit_mb: Option<f64>) -> bool {
        let Some(limit) = limit_mb else {
            return false;
        };

        let mut guard = self.record.lock();
        self.roll_over_if_stale(&mut guard);
        guard.used_mb(direction) + delta_mb > limit
    }

    /// Adds `delta_mb` to the direction's counter and persists.
    ///
    /// Upload commits also increment the file count. Persist failures are
    /// logged rather than propagated; the transfer they account for has
    /// already happened.
    pub fn commit(&self, direction: Direction, delta_mb: f64) {
        let mut guard = self.record.lock();
        self.roll_over_if_stale(&mut guard);
        self.apply(&mut guard, direction, delta_mb);
    }

    /// Atomically checks the limit and commits the delta under one lock.
    ///
    /// Returns a [`Reservation`] to hand back to [`Self::release`] if the
    /// transfer the capacity was reserved for fails.
    ///
    /// # Errors
    /// - `QuotaExceeded` is signalled by returning `Err` with the would-be
    ///   usage figures; nothing is committed in that case.
    pub fn try_reserve(
        &self,
        direction: Direction,
        delta_mb: f64,
        limit_mb: Option<f64>,
    ) -> Result<Reservation, QuotaExceeded> {
        let mut guard = self.record.lock();
        self.roll_over_if_stale(&mut guard);

        if let Some(limit) = limit_mb {
            let used = guard.used_mb(direction);
            if used + delta_mb > limit {
                return Err(QuotaExceeded {
                    direction,
                    requested_mb: delta_mb,
                    used_mb: used,
                    limit_mb: limit,
                });
            }
        }

        self.apply(&mut guard, direction, delta_mb);
        Ok(Reservation {
            direction,
            amount_mb: delta_mb,
        })
    }

    /// Returns reserved capacity that was never consumed.
    ///
    /// Counters are clamped at zero in case the day rolled over between the
    /// reservation and its release.
    pub fn release(&self, reservation: Reservation) {
        let mut guard = self.record.lock();
        self.roll_over_if_stale(&mut guard);

        match reservation.direction {
            Direction::Download => {
                guard.downloaded_mb = (guard.downloaded_mb - reservation.amount_mb).max(0.0);
            }
            Direction::Upload => {
                guard.uploaded_mb = (guard.uploaded_mb - reservation.amount_mb).max(0.0);
                guard.file_count = guard.file_count.saturating_sub(1);
            }
        }

        self.persist(&guard);
    }

    fn apply(&self, record: &mut UsageRecord, direction: Direction, delta_mb: f64) {
        match direction {
            Direction::Download => record.downloaded_mb += delta_mb,
            Direction::Upload => {
                record.uploaded_mb += delta_mb;
                record.file_count += 1;
            }
        }
        self.persist(record);
    }

    fn roll_over_if_stale(&self, record: &mut UsageRecord) {
        let today = Local::now().date_naive();
        if record.date != today {
            tracing::info!(
                stale_date = %record.date,
                "Usage record rolled over to {today}"
            );
            *record = UsageRecord::zeroed_today();
            self.persist(record);
        }
    }

    fn persist(&self, record: &UsageRecord) {
        if let Err(e) = self.store.save(record) {
            tracing::error!("Failed to persist usage record: {e}");
        }
    }
}

/// A reservation was refused because it would push usage past the limit.
#[derive(Debug, Clone, Copy)]
pub struct QuotaExceeded {
    pub direction: Direction,
    pub requested_mb: f64,
    pub used_mb: f64,
    pub limit_mb: f64,
}

impl std::fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {:.1} MB would exceed daily limit of {:.1} MB ({:.1} MB used)",
            self.direction, self.requested_mb, self.limit_mb, self.used_mb
        )
    }
}

impl std::error::Error for QuotaExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_ledger() -> UsageLedger {
        UsageLedger::open(Box::new(InMemoryStore::new()))
    }

    #[test]
    fn test_commit_accumulates_and_persists() {
        let ledger = fresh_ledger();

        ledger.commit(Direction::Download, 50.0);
        assert_eq!(ledger.current_record().downloaded_mb, 50.0);

        ledger.commit(Direction::Download, 25.0);
        assert_eq!(ledger.current_record().downloaded_mb, 75.0);
        assert_eq!(ledger.current_record().file_count, 0);
    }

    #[test]
    fn test_upload_commit_increments_file_count() {
        let ledger = fresh_ledger();

        ledger.commit(Direction::Upload, 10.0);
        ledger.commit(Direction::Upload, 5.0);

        let record = ledger.current_record();
        assert_eq!(record.uploaded_mb, 15.0);
        assert_eq!(record.file_count, 2);
        assert_eq!(record.downloaded_mb, 0.0);
    }

    #[test]
    fn test_would_exceed_boundaries() {
        let ledger = fresh_ledger();
        ledger.commit(Direction::Download, 80.0);

        assert!(ledger.would_exceed(Direction::Download, 30.0, Some(100.0)));
        assert!(!ledger.would_exceed(Direction::Download, 20.0, Some(100.0)));
        // Unset limit is unlimited
        assert!(!ledger.would_exceed(Direction::Download, 1_000_000.0, None));
    }

    #[test]
    fn test_try_reserve_commits_on_success() {
        let ledger = fresh_ledger();

        let reservation = ledger
            .try_reserve(Direction::Download, 60.0, Some(100.0))
            .unwrap();
        assert_eq!(reservation.amount_mb, 60.0);
        assert_eq!(ledger.current_record().downloaded_mb, 60.0);

        // A second reservation past the limit is refused and commits nothing
        let err = ledger
            .try_reserve(Direction::Download, 60.0, Some(100.0))
            .unwrap_err();
        assert_eq!(err.used_mb, 60.0);
        assert_eq!(ledger.current_record().downloaded_mb, 60.0);
    }

    #[test]
    fn test_release_returns_reserved_capacity() {
        let ledger = fresh_ledger();

        let reservation = ledger
            .try_reserve(Direction::Upload, 40.0, Some(100.0))
            .unwrap();
        assert_eq!(ledger.current_record().uploaded_mb, 40.0);
        assert_eq!(ledger.current_record().file_count, 1);

        ledger.release(reservation);
        assert_eq!(ledger.current_record().uploaded_mb, 0.0);
        assert_eq!(ledger.current_record().file_count, 0);
    }

    #[test]
    fn test_stale_record_rolls_over_once() {
        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let stale = UsageRecord {
            date: yesterday,
            downloaded_mb: 500.0,
            uploaded_mb: 100.0,
            file_count: 7,
        };
        let ledger = UsageLedger::open(Box::new(InMemoryStore::seeded(stale)));

        let record = ledger.current_record();
        assert_eq!(record.downloaded_mb, 0.0);
        assert_eq!(record.uploaded_mb, 0.0);
        assert_eq!(record.file_count, 0);
        assert_eq!(record.date, Local::now().date_naive());

        // Same-day reads do not reset again
        ledger.commit(Direction::Download, 10.0);
        assert_eq!(ledger.current_record().downloaded_mb, 10.0);
    }

    #[test]
    fn test_persisted_record_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download-usage.json");

        {
            let ledger = UsageLedger::open(Box::new(JsonFileStore::new(&path)));
            ledger.commit(Direction::Download, 50.0);
        }

        let reopened = UsageLedger::open(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reopened.current_record().downloaded_mb, 50.0);
    }

    #[test]
    fn test_corrupt_store_reinitializes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, "garbage").unwrap();

        let ledger = UsageLedger::open(Box::new(JsonFileStore::new(&path)));
        assert_eq!(ledger.current_record().downloaded_mb, 0.0);
    }
}
