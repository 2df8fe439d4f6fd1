use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::live_sessions;

// --- Status ---

/// Lifecycle state of a broadcast session.
///
/// Only ever advances Scheduled -> Live -> Ended; Ended is terminal.
/// Stored and serialized as its integer discriminant (0/1/2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Integer)]
#[serde(try_from = "i32", into = "i32")]
pub enum SessionStatus {
    Scheduled = 0,
    Live = 1,
    Ended = 2,
}

impl From<SessionStatus> for i32 {
    fn from(status: SessionStatus) -> i32 {
        status as i32
    }
}

impl TryFrom<i32> for SessionStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Scheduled),
            1 => Ok(Self::Live),
            2 => Ok(Self::Ended),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

impl ToSql<Integer, Pg> for SessionStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match self {
            Self::Scheduled => <i32 as ToSql<Integer, Pg>>::to_sql(&0, out),
            Self::Live => <i32 as ToSql<Integer, Pg>>::to_sql(&1, out),
            Self::Ended => <i32 as ToSql<Integer, Pg>>::to_sql(&2, out),
        }
    }
}

impl FromSql<Integer, Pg> for SessionStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = <i32 as FromSql<Integer, Pg>>::from_sql(bytes)?;
        Self::try_from(value).map_err(Into::into)
    }
}

// --- LiveSession ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = live_sessions)]
pub struct LiveSession {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub planned_start_time: DateTime<Utc>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub stream_key: String,
    pub rtmp_url: String,
    pub flv_url: String,
    pub hls_url: String,
    pub webrtc_url: String,
    pub viewer_count: i32,
    pub peak_viewer_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = live_sessions)]
pub struct NewLiveSession {
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub planned_start_time: DateTime<Utc>,
    pub status: SessionStatus,
    pub stream_key: String,
    pub rtmp_url: String,
    pub flv_url: String,
    pub hls_url: String,
    pub webrtc_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata overwrite applied by the generic update operation.
///
/// Deliberately has no status, stream-key, or URL fields: those are owned by
/// the lifecycle transitions and the creation path respectively.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = live_sessions, treat_none_as_null = true)]
pub struct UpdateSessionMeta {
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub planned_start_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_i32() {
        for status in [SessionStatus::Scheduled, SessionStatus::Live, SessionStatus::Ended] {
            let raw: i32 = status.into();
            assert_eq!(SessionStatus::try_from(raw).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(SessionStatus::try_from(3).is_err());
        assert!(SessionStatus::try_from(-1).is_err());
    }

    #[test]
    fn status_serializes_as_integer() {
        let json = serde_json::to_string(&SessionStatus::Live).unwrap();
        assert_eq!(json, "1");

        let parsed: SessionStatus = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, SessionStatus::Ended);
    }

    #[test]
    fn status_display_names() {
        assert_eq!(SessionStatus::Scheduled.to_string(), "scheduled");
        assert_eq!(SessionStatus::Live.to_string(), "live");
        assert_eq!(SessionStatus::Ended.to_string(), "ended");
    }
}
