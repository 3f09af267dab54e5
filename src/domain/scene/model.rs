use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One canonical line of a script. Owned by the authoring surface; this
/// service only reads lines, except for the guarded audio updates made by
/// the commit protocol.
#[derive(Debug, Clone, FromRow)]
pub struct ScriptLine {
    pub id: Uuid,
    pub script_id: Uuid,
    pub raw_text: String,
    pub order_index: Option<i32>,
    pub is_stage_direction: bool,
    pub is_cue_line: bool,
    pub audio_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sharing state of a script: owner, whether reader submissions are still
/// accepted, and the aggregate modification marker.
#[derive(Debug, Clone, FromRow)]
pub struct ScriptShareState {
    pub user_id: Uuid,
    pub sharable: bool,
    pub updated_at: Option<DateTime<Utc>>,
}
