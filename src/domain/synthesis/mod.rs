pub mod error;
pub mod job_store;
pub mod model;
pub mod service;
pub mod voice;

pub use error::SynthesisServiceError;
pub use job_store::JobStore;
pub use model::{Job, JobLineAudio, JobStatus};
pub use service::{SynthesisService, SynthesisServiceApi};
pub use voice::VoicePreference;

use serde::{Deserialize, Serialize};

/// Request for POST /api/reader-audio/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSynthesisRequest {
    pub scene_id: String,
    pub scene_title: String,
    pub lines: Vec<SynthesisLine>,
}

/// One line to synthesize
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisLine {
    pub line_id: String,
    pub role: LineRole,
    pub text: String,
    pub voice: VoicePreference,
}

/// Only reader lines are synthesized; cue lines carry the actor's own audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Reader,
}

/// Response for POST /api/reader-audio/generate
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSynthesisResponse {
    pub job_id: String,
}

/// Response for GET /api/reader-audio/status
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    /// `(lineId, url)` pairs, best available URL per line
    pub audio: Vec<(String, String)>,
    pub error: Option<String>,
}
