//! In-memory `SessionStore` used by the service tests. Mirrors the postgres
//! store's semantics, including the conditional transition: the guard check
//! and the write happen under one lock acquisition.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use livecast_shared::errors::AppResult;

use crate::models::{LiveSession, NewLiveSession, SessionStatus, UpdateSessionMeta};
use crate::store::SessionStore;

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i32, LiveSession>,
    next_id: i32,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn count(&self) -> AppResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.len() as i64)
    }

    fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<LiveSession>> {
        let inner = self.inner.lock().unwrap();
        let items = inner
            .rows
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(items)
    }

    fn find(&self, id: i32) -> AppResult<Option<LiveSession>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.get(&id).cloned())
    }

    fn insert(&self, session: NewLiveSession) -> AppResult<LiveSession> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        let stored = LiveSession {
            id,
            title: session.title,
            description: session.description,
            cover_image: session.cover_image,
            planned_start_time: session.planned_start_time,
            actual_start_time: None,
            actual_end_time: None,
            status: session.status,
            stream_key: session.stream_key,
            rtmp_url: session.rtmp_url,
            flv_url: session.flv_url,
            hls_url: session.hls_url,
            webrtc_url: session.webrtc_url,
            viewer_count: 0,
            peak_viewer_count: 0,
            created_at: session.created_at,
            updated_at: session.updated_at,
        };
        inner.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn update_metadata(
        &self,
        id: i32,
        changes: UpdateSessionMeta,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.title = changes.title;
        row.description = changes.description;
        row.cover_image = changes.cover_image;
        row.planned_start_time = changes.planned_start_time;
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    fn set_status(
        &self,
        id: i32,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LiveSession>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.status = status;
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    fn transition(
        &self,
        id: i32,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(false);
        };
        if row.status != from {
            return Ok(false);
        }
        row.status = to;
        match to {
            SessionStatus::Live => row.actual_start_time = Some(now),
            SessionStatus::Ended => row.actual_end_time = Some(now),
            SessionStatus::Scheduled => {}
        }
        row.updated_at = now;
        Ok(true)
    }

    fn delete(&self, id: i32) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.rows.remove(&id).is_some())
    }
}
