use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use livecast_shared::errors::{AppError, AppResult};

use crate::models::{LiveSession, NewLiveSession, SessionStatus, UpdateSessionMeta};
use crate::schema::live_sessions;
use crate::store::SessionStore;
use crate::DbPool;

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PgPooled> {
        self.pool
            .get()
            .map_err(|e| AppError::internal(format!("db pool error: {e}")))
    }
}

impl SessionStore for PgSessionStore {
    fn count(&self) -> AppResult<i64> {
        let mut conn = self.conn()?;
        let total = live_sessions::table.count().get_result(&mut conn)?;
        Ok(total)
    }

    fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<LiveSession>> {
        let mut conn = self.conn()?;
        let items = live_sessions::table
            .order(live_sessions::id.desc())
            .offset(offset)
            .limit(limit)
            .load::<LiveSession>(&mut conn)?;
        Ok(items)
    }

    fn find(&self, id: i32) -> AppResult<Option<LiveSession>> {
        let mut conn = self.conn()?;
        let session = live_sessions::table
            .find(id)
            .first::<LiveSession>(&mut conn)
            .optional()?;
        Ok(session)
    }

    fn insert(&self, session: NewLiveSession) -> AppResult<LiveSession> {
        let mut conn = self.conn()?;
        let stored = diesel::insert_into(live_sessions::table)
            .values(&session)
            .get_result::<LiveSession>(&mut conn)?;
        Ok(stored)
    }

    fn update_metadata(
        &self,
        id: i32,
        changes: UpdateSessionMeta,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>> {
        let mut conn = self.conn()?;
        let updated = diesel::update(live_sessions::table.find(id))
            .set((&changes, live_sessions::updated_at.eq(now)))
            .get_result::<LiveSession>(&mut conn)
            .optional()?;
        Ok(updated)
    }

    fn set_status(
        &self,
        id: i32,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>> {
        let mut conn = self.conn()?;
        let updated = diesel::update(live_sessions::table.find(id))
            .set((
                live_sessions::status.eq(status),
                live_sessions::updated_at.eq(now),
            ))
            .get_result::<LiveSession>(&mut conn)
            .optional()?;
        Ok(updated)
    }

    fn transition(
        &self,
        id: i32,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut conn = self.conn()?;

        // Single conditional UPDATE: the status guard is part of the WHERE
        // clause, so concurrent callers race on the row itself and at most
        // one of them matches.
        let affected = match to {
            SessionStatus::Live => diesel::update(
                live_sessions::table
                    .find(id)
                    .filter(live_sessions::status.eq(from)),
            )
            .set((
                live_sessions::status.eq(to),
                live_sessions::actual_start_time.eq(now),
                live_sessions::updated_at.eq(now),
            ))
            .execute(&mut conn)?,
            SessionStatus::Ended => diesel::update(
                live_sessions::table
                    .find(id)
                    .filter(live_sessions::status.eq(from)),
            )
            .set((
                live_sessions::status.eq(to),
                live_sessions::actual_end_time.eq(now),
                live_sessions::updated_at.eq(now),
            ))
            .execute(&mut conn)?,
            SessionStatus::Scheduled => diesel::update(
                live_sessions::table
                    .find(id)
                    .filter(live_sessions::status.eq(from)),
            )
            .set((
                live_sessions::status.eq(to),
                live_sessions::updated_at.eq(now),
            ))
            .execute(&mut conn)?,
        };

        Ok(affected > 0)
    }

    fn delete(&self, id: i32) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(live_sessions::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
