use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::share::{
        AckResponse, CommitRequest, CreateSessionRequest, CreateSessionResponse,
        HydrateSessionResponse, ShareService, ShareServiceApi,
    },
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct SessionController {
    share_service: Arc<ShareService>,
}

impl SessionController {
    pub fn new(share_service: Arc<ShareService>) -> Self {
        Self { share_service }
    }

    /// POST /api/sessions - Create (or reuse) the share session for a scene
    pub async fn create(
        State(controller): State<Arc<SessionController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<CreateSessionRequest>,
    ) -> AppResult<Json<CreateSessionResponse>> {
        let response = controller
            .share_service
            .create_session(auth_user.user_id, request)
            .await?;
        Ok(Json(response))
    }

    /// GET /api/sessions/{sessionId} - Hydrate a session for the reader
    pub async fn hydrate(
        State(controller): State<Arc<SessionController>>,
        Path(session_id): Path<Uuid>,
    ) -> AppResult<Json<HydrateSessionResponse>> {
        let response = controller.share_service.hydrate_session(session_id).await?;
        Ok(Json(response))
    }

    /// POST /api/sessions/{sessionId}/commit - Submit recordings atomically
    pub async fn commit(
        State(controller): State<Arc<SessionController>>,
        Path(session_id): Path<Uuid>,
        Json(request): Json<CommitRequest>,
    ) -> AppResult<Json<AckResponse>> {
        controller
            .share_service
            .commit_recordings(session_id, request)
            .await?;
        Ok(Json(AckResponse { ok: true }))
    }

    /// POST /api/sessions/{sessionId}/done - Mark the session completed
    pub async fn done(
        State(controller): State<Arc<SessionController>>,
        Path(session_id): Path<Uuid>,
    ) -> AppResult<Json<AckResponse>> {
        controller.share_service.mark_session_done(session_id).await?;
        Ok(Json(AckResponse { ok: true }))
    }
}
