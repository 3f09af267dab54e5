use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One collaborative-recording invitation, bound to exactly one scene
#[derive(Debug, Clone, FromRow)]
pub struct ShareSession {
    pub id: Uuid,
    pub title: String,
    pub status: SessionStatus,
    pub scene_id: Uuid,
    pub user_id: Uuid,
    /// Legacy cached line arrays written by old mobile clients. Layout is
    /// always re-derived from canonical lines; these only contribute
    /// per-session audio overrides.
    pub actor_lines: Option<Json<Vec<CachedSessionLine>>>,
    pub reader_lines: Option<Json<Vec<CachedSessionLine>>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "completed")]
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Shape of the legacy cached session lines. Only the audio URL is read;
/// text and ordering in this cache are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSessionLine {
    pub line_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}
