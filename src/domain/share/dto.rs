use super::model::SessionStatus;
use crate::domain::scene::{ActorLine, ReaderLine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Request for POST /api/sessions
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub scene_id: Uuid,
    #[serde(default = "default_session_title")]
    pub title: String,
}

fn default_session_title() -> String {
    "Shared Scene".to_string()
}

/// Response for POST /api/sessions
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub share_url: String,
}

/// Session hydrated from canonical scene content
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub title: String,
    pub status: SessionStatus,
    pub scene_id: Uuid,
    pub actor_lines: Vec<ActorLine>,
    pub reader_lines: Vec<ReaderLine>,
    pub created_at: DateTime<Utc>,
}

/// Response for GET /api/sessions/:id.
///
/// `line_updated_at` and `scene_updated_at` are the markers a client must
/// echo back to the commit endpoint; this response is their only legitimate
/// source.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateSessionResponse {
    pub session: SessionView,
    pub scene_version: String,
    pub line_updated_at: HashMap<Uuid, DateTime<Utc>>,
    pub scene_updated_at: Option<DateTime<Utc>>,
    pub scene_sharable: bool,
}

/// Request for POST /api/sessions/:id/commit
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    /// Scene-level marker observed at hydration time, if the client has one
    #[serde(default)]
    pub scene_updated_at: Option<DateTime<Utc>>,
    /// Full per-line marker set observed at hydration time
    pub line_timestamps: HashMap<Uuid, DateTime<Utc>>,
    pub updates: Vec<LineUpdate>,
}

/// One recording to migrate into the canonical scene
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineUpdate {
    pub line_id: Uuid,
    /// Where the reader's recording currently lives (transient storage)
    pub audio_url: String,
}

/// Bare acknowledgement for commit / done endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}
