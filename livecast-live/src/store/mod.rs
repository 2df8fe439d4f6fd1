use chrono::{DateTime, Utc};

use livecast_shared::errors::AppResult;

use crate::models::{LiveSession, NewLiveSession, SessionStatus, UpdateSessionMeta};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgSessionStore;

/// Persistence seam for live sessions.
///
/// Absence of a row is a normal outcome (`Ok(None)` / `Ok(false)`), never an
/// error; errors are reserved for storage failures.
pub trait SessionStore: Send + Sync {
    fn count(&self) -> AppResult<i64>;

    /// One page of sessions ordered by id descending (newest first).
    fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<LiveSession>>;

    fn find(&self, id: i32) -> AppResult<Option<LiveSession>>;

    /// Inserts and returns the stored row with its assigned id.
    fn insert(&self, session: NewLiveSession) -> AppResult<LiveSession>;

    /// Overwrites the metadata fields and refreshes `updated_at`.
    fn update_metadata(
        &self,
        id: i32,
        changes: UpdateSessionMeta,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>>;

    /// Unconditional status overwrite (administrative path). Does not touch
    /// the actual start/end timestamps.
    fn set_status(
        &self,
        id: i32,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>>;

    /// Guarded transition as a single conditional update: the row is written
    /// only if its current status equals `from`, so concurrent callers get at
    /// most one winner. Entering Live records `actual_start_time`; entering
    /// Ended records `actual_end_time`. Returns whether this call won the row.
    fn transition(
        &self,
        id: i32,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    fn delete(&self, id: i32) -> AppResult<bool>;
}
