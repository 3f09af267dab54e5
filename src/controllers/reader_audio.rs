use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::synthesis::{
        JobStatus, JobStatusResponse, StartSynthesisRequest, StartSynthesisResponse,
        SynthesisService, SynthesisServiceApi,
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusParams {
    pub job_id: Option<String>,
}

pub struct ReaderAudioController {
    synthesis_service: Arc<SynthesisService>,
}

impl ReaderAudioController {
    pub fn new(synthesis_service: Arc<SynthesisService>) -> Self {
        Self { synthesis_service }
    }

    /// POST /api/reader-audio/generate - Start a reader audio job
    pub async fn generate(
        State(controller): State<Arc<ReaderAudioController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<StartSynthesisRequest>,
    ) -> AppResult<Json<StartSynthesisResponse>> {
        tracing::info!(
            user_id = %auth_user.user_id,
            scene_id = %request.scene_id,
            total_lines = request.lines.len(),
            "Reader audio generation requested"
        );

        let job_id = controller
            .synthesis_service
            .start_batch(request)
            .await
            .map_err(AppError::from)?;

        Ok(Json(StartSynthesisResponse { job_id }))
    }

    /// GET /api/reader-audio/status?jobId=... - Poll a job.
    ///
    /// Always 200 for known and unknown jobs alike; pollers branch on the
    /// `status` field, not on HTTP status codes.
    pub async fn status(
        State(controller): State<Arc<ReaderAudioController>>,
        Query(params): Query<JobStatusParams>,
    ) -> (StatusCode, Json<JobStatusResponse>) {
        match params.job_id {
            Some(job_id) => (
                StatusCode::OK,
                Json(controller.synthesis_service.job_status(&job_id)),
            ),
            None => (
                StatusCode::BAD_REQUEST,
                Json(JobStatusResponse {
                    status: JobStatus::Error,
                    audio: vec![],
                    error: Some("Missing jobId parameter.".to_string()),
                }),
            ),
        }
    }
}
