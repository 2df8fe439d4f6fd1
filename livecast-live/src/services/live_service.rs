use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use livecast_shared::errors::{AppError, AppResult, ErrorCode};
use livecast_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{LiveSession, NewLiveSession, SessionStatus, UpdateSessionMeta};
use crate::store::SessionStore;

const PLANNED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The two host strings a session's stream URLs are templated from.
/// Read once at service construction; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StreamEndpoints {
    /// RTMP ingest host the broadcaster pushes to, e.g. `rtmp://media.example.com`.
    pub rtmp_host: String,
    /// Public HTTP host viewers pull playback from, e.g. `https://play.example.com`.
    pub http_host: String,
}

/// Owns the session lifecycle state machine and stream URL provisioning.
/// Stateless between calls; all durable state lives behind [`SessionStore`].
pub struct LiveSessionService {
    store: Arc<dyn SessionStore>,
    endpoints: StreamEndpoints,
}

impl LiveSessionService {
    pub fn new(store: Arc<dyn SessionStore>, endpoints: StreamEndpoints) -> Self {
        Self { store, endpoints }
    }

    /// One page of sessions, newest first, plus the total row count.
    ///
    /// Count and fetch are two separate reads; under concurrent writes the
    /// total may briefly disagree with the page contents. That is accepted
    /// rather than paid for with a transaction.
    pub fn paginate(&self, params: &PaginationParams) -> AppResult<Paginated<LiveSession>> {
        let total = self.store.count()?;
        if total == 0 {
            return Ok(Paginated::new(vec![], 0, params));
        }

        let items = self
            .store
            .list_page(params.offset() as i64, params.limit() as i64)?;
        Ok(Paginated::new(items, total as u64, params))
    }

    pub fn create(
        &self,
        title: &str,
        description: &str,
        cover_image: Option<String>,
        planned_start_time: &str,
    ) -> AppResult<LiveSession> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if description.trim().is_empty() {
            return Err(AppError::Validation("description must not be empty".into()));
        }
        let planned_start_time = parse_planned_time(planned_start_time)?;

        let stream_key = generate_stream_key();
        let now = Utc::now();

        let session = self.store.insert(NewLiveSession {
            title: title.to_owned(),
            description: description.to_owned(),
            cover_image,
            planned_start_time,
            status: SessionStatus::Scheduled,
            rtmp_url: format!("{}/live/{}", self.endpoints.rtmp_host, stream_key),
            flv_url: format!("{}/live/{}.flv", self.endpoints.http_host, stream_key),
            hls_url: format!("{}/live/{}.m3u8", self.endpoints.http_host, stream_key),
            webrtc_url: format!("webrtc://{}/live/{}", self.endpoints.http_host, stream_key),
            stream_key,
            created_at: now,
            updated_at: now,
        })?;

        tracing::info!(
            session_id = session.id,
            title = %session.title,
            "live session created"
        );

        Ok(session)
    }

    pub fn get(&self, id: i32) -> AppResult<LiveSession> {
        self.store.find(id)?.ok_or_else(|| not_found(id))
    }

    /// Overwrites the metadata fields unconditionally. Never touches the
    /// stream key, the derived URLs, or the lifecycle status; status
    /// corrections go through [`Self::force_status`].
    pub fn update(
        &self,
        id: i32,
        title: &str,
        description: &str,
        cover_image: Option<String>,
        planned_start_time: &str,
    ) -> AppResult<LiveSession> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if description.trim().is_empty() {
            return Err(AppError::Validation("description must not be empty".into()));
        }
        let planned_start_time = parse_planned_time(planned_start_time)?;

        let changes = UpdateSessionMeta {
            title: title.to_owned(),
            description: description.to_owned(),
            cover_image,
            planned_start_time,
        };

        self.store
            .update_metadata(id, changes, Utc::now())?
            .ok_or_else(|| not_found(id))
    }

    /// Administrative status override. Bypasses the guarded transitions and
    /// can therefore leave the actual start/end timestamps inconsistent with
    /// the status it writes; it exists as a correction path, not as part of
    /// the normal lifecycle.
    pub fn force_status(&self, id: i32, status: SessionStatus) -> AppResult<LiveSession> {
        let session = self
            .store
            .set_status(id, status, Utc::now())?
            .ok_or_else(|| not_found(id))?;

        tracing::warn!(
            session_id = id,
            status = %status,
            "session status force-set, bypassing lifecycle guards"
        );

        Ok(session)
    }

    /// Hard delete. Any still-active stream on the media server is the
    /// media server's problem; no cleanup call is made from here.
    pub fn destroy(&self, id: i32) -> AppResult<()> {
        if !self.store.delete(id)? {
            return Err(not_found(id));
        }
        tracing::info!(session_id = id, "live session deleted");
        Ok(())
    }

    /// Scheduled -> Live. Records the actual start time.
    pub fn start(&self, id: i32) -> AppResult<LiveSession> {
        let now = Utc::now();
        if self
            .store
            .transition(id, SessionStatus::Scheduled, SessionStatus::Live, now)?
        {
            let session = self.store.find(id)?.ok_or_else(|| not_found(id))?;
            tracing::info!(session_id = id, "live session started");
            return Ok(session);
        }

        match self.store.find(id)? {
            None => Err(not_found(id)),
            Some(session) => Err(invalid_transition(id, "start", session.status, "scheduled")),
        }
    }

    /// Live -> Ended. Records the actual end time. Ended is terminal.
    pub fn end(&self, id: i32) -> AppResult<LiveSession> {
        let now = Utc::now();
        if self
            .store
            .transition(id, SessionStatus::Live, SessionStatus::Ended, now)?
        {
            let session = self.store.find(id)?.ok_or_else(|| not_found(id))?;
            tracing::info!(session_id = id, "live session ended");
            return Ok(session);
        }

        match self.store.find(id)? {
            None => Err(not_found(id)),
            Some(session) => Err(invalid_transition(id, "end", session.status, "live")),
        }
    }
}

fn parse_planned_time(text: &str) -> AppResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, PLANNED_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            AppError::Validation(format!(
                "invalid planned_start_time {text:?}, expected YYYY-MM-DD HH:MM:SS"
            ))
        })
}

/// 128 random bits rendered as 32 hex characters, no separators. Collisions
/// are cryptographically negligible; the column's unique constraint backstops.
fn generate_stream_key() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(id: i32) -> AppError {
    AppError::new(ErrorCode::SessionNotFound, format!("live session {id} not found"))
}

fn invalid_transition(id: i32, action: &str, current: SessionStatus, expected: &str) -> AppError {
    AppError::new(
        ErrorCode::InvalidStateTransition,
        format!("cannot {action} session {id}: status is {current}, expected {expected}"),
    )
}
