use super::dto::{
    CommitRequest, CreateSessionRequest, CreateSessionResponse, HydrateSessionResponse,
    LineUpdate, SessionView,
};
use super::error::ShareServiceError;
use super::model::{CachedSessionLine, ShareSession};
use crate::domain::scene::{build_snapshot, ScriptShareState};
use crate::infrastructure::repositories::{
    parse_object_url, LineRepository, ScriptRepository, ShareSessionRepository, StorageRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Budget for one recording's download + re-upload during commit
const MIGRATION_TIMEOUT: Duration = Duration::from_secs(30);

const RELOAD_MSG: &str =
    "The scene was edited after you opened this link. Please reload the page before submitting.";
const RACE_MSG: &str =
    "The scene was edited while you were submitting. Please reload the page before submitting again.";

pub struct ShareService {
    session_repo: Arc<ShareSessionRepository>,
    script_repo: Arc<ScriptRepository>,
    line_repo: Arc<LineRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    recordings_bucket: String,
    lines_bucket: String,
    public_base_url: String,
}

impl ShareService {
    pub fn new(
        session_repo: Arc<ShareSessionRepository>,
        script_repo: Arc<ScriptRepository>,
        line_repo: Arc<LineRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        recordings_bucket: String,
        lines_bucket: String,
        public_base_url: String,
    ) -> Self {
        Self {
            session_repo,
            script_repo,
            line_repo,
            storage_repo,
            recordings_bucket,
            lines_bucket,
            public_base_url,
        }
    }
}

#[async_trait]
pub trait ShareServiceApi: Send + Sync {
    /// Create a share session for a scene the caller owns. Idempotent per
    /// scene: an existing session is returned instead of inserting a second.
    async fn create_session(
        &self,
        user_id: Uuid,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ShareServiceError>;

    /// Load a session together with the scene snapshot the reader records
    /// against. The markers in the response are what the client echoes back
    /// to `commit_recordings`.
    async fn hydrate_session(
        &self,
        session_id: Uuid,
    ) -> Result<HydrateSessionResponse, ShareServiceError>;

    /// Apply a batch of reader recordings if and only if nothing in the
    /// scene changed since the client's snapshot. All-or-nothing: any
    /// precondition or guarded-write failure rejects the whole batch.
    async fn commit_recordings(
        &self,
        session_id: Uuid,
        request: CommitRequest,
    ) -> Result<(), ShareServiceError>;

    /// Transition a session to completed once the reader is finished
    async fn mark_session_done(&self, session_id: Uuid) -> Result<(), ShareServiceError>;
}

#[async_trait]
impl ShareServiceApi for ShareService {
    async fn create_session(
        &self,
        user_id: Uuid,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ShareServiceError> {
        let script = self
            .script_repo
            .find_share_state(request.scene_id)
            .await
            .map_err(dependency)?
            .ok_or_else(|| ShareServiceError::NotFound("Scene not found".to_string()))?;

        if script.user_id != user_id {
            return Err(ShareServiceError::NotFound("Scene not found".to_string()));
        }

        // One share link per scene; reuse the existing session so the same
        // URL keeps working instead of multiplying invitations.
        if let Some(existing) = self
            .session_repo
            .find_latest_by_scene(request.scene_id)
            .await
            .map_err(dependency)?
        {
            tracing::info!(
                session_id = %existing.id,
                scene_id = %request.scene_id,
                "Reusing existing share session"
            );
            return Ok(CreateSessionResponse {
                session_id: existing.id,
                share_url: self.share_url(existing.id),
            });
        }

        let lines = self
            .line_repo
            .find_by_script(request.scene_id)
            .await
            .map_err(dependency)?;
        if lines.is_empty() {
            return Err(ShareServiceError::NotFound(
                "No lines found for the provided sceneId".to_string(),
            ));
        }

        let session_id = Uuid::new_v4();
        self.session_repo
            .create(session_id, &request.title, request.scene_id, user_id)
            .await
            .map_err(dependency)?;

        tracing::info!(
            session_id = %session_id,
            scene_id = %request.scene_id,
            "Share session created"
        );

        Ok(CreateSessionResponse {
            session_id,
            share_url: self.share_url(session_id),
        })
    }

    async fn hydrate_session(
        &self,
        session_id: Uuid,
    ) -> Result<HydrateSessionResponse, ShareServiceError> {
        let session = self.find_session(session_id).await?;
        let script = self.find_script(session.scene_id).await?;

        if !script.sharable {
            return Err(ShareServiceError::NotSharable);
        }

        // Scene structure always comes from canonical lines. Failing to load
        // them is a hard error, never a fallback to the session's cache.
        let lines = self
            .line_repo
            .find_by_script(session.scene_id)
            .await
            .map_err(dependency)?;
        if lines.is_empty() {
            return Err(ShareServiceError::Dependency(
                "Failed to load scene lines from backend".to_string(),
            ));
        }

        let snapshot = build_snapshot(lines);

        // Layer per-session recording overrides (audio only) on top
        let actor_overrides = audio_overrides(&session.actor_lines);
        let reader_overrides = audio_overrides(&session.reader_lines);

        let mut actor_lines = snapshot.actor_lines;
        for line in &mut actor_lines {
            if let Some(url) = actor_overrides.get(&line.line_id) {
                line.audio_url = url.clone();
            }
        }

        let mut reader_lines = snapshot.reader_lines;
        for line in &mut reader_lines {
            if let Some(url) = reader_overrides.get(&line.line_id) {
                line.audio_url = Some(url.clone());
            }
        }

        Ok(HydrateSessionResponse {
            session: SessionView {
                id: session.id,
                title: session.title,
                status: session.status,
                scene_id: session.scene_id,
                actor_lines,
                reader_lines,
                created_at: session.created_at,
            },
            scene_version: snapshot.fingerprint,
            line_updated_at: snapshot.line_markers,
            scene_updated_at: script.updated_at,
            scene_sharable: script.sharable,
        })
    }

    async fn commit_recordings(
        &self,
        session_id: Uuid,
        request: CommitRequest,
    ) -> Result<(), ShareServiceError> {
        if request.updates.is_empty() {
            return Err(ShareServiceError::Invalid(
                "At least one update is required".to_string(),
            ));
        }

        // 1) Resolve the session to its scene
        let session = self.find_session(session_id).await?;
        let scene_id = session.scene_id;

        // 2) The owner may have stopped sharing since the reader loaded
        let script = self.find_script(scene_id).await?;
        if !script.sharable {
            return Err(ShareServiceError::NotSharable);
        }

        // 3) Cheap whole-scene check when the client supplied its marker
        if let (Some(observed), Some(current)) = (request.scene_updated_at, script.updated_at) {
            if observed != current {
                return Err(ShareServiceError::Conflict(RELOAD_MSG.to_string()));
            }
        }

        // 4) Full per-line marker comparison. Added, removed, or edited
        // lines all surface here as a conflict.
        let lines = self
            .line_repo
            .find_by_script(scene_id)
            .await
            .map_err(dependency)?;
        if lines.is_empty() {
            return Err(ShareServiceError::Dependency(
                "Failed to load scene lines from backend".to_string(),
            ));
        }

        let current_markers: HashMap<Uuid, DateTime<Utc>> = lines
            .iter()
            .filter_map(|line| line.updated_at.map(|at| (line.id, at)))
            .collect();

        if !markers_match(&request.line_timestamps, &current_markers) {
            return Err(ShareServiceError::Conflict(RELOAD_MSG.to_string()));
        }

        for update in &request.updates {
            if !request.line_timestamps.contains_key(&update.line_id) {
                return Err(ShareServiceError::Invalid(format!(
                    "Missing last-known updated_at for line {}",
                    update.line_id
                )));
            }
        }

        // 5) Apply. One shared marker value for the whole batch; each line
        // write is guarded against the marker observed above, which closes
        // the race between the bulk check and the write.
        let submitted_at = Utc::now();

        for update in &request.updates {
            let expected = request.line_timestamps[&update.line_id];
            let durable_url = self.migrate_recording(&script, scene_id, update).await?;

            let updated = self
                .line_repo
                .update_audio_guarded(update.line_id, &durable_url, submitted_at, expected)
                .await
                .map_err(dependency)?;

            if !updated {
                tracing::error!(
                    session_id = %session_id,
                    line_id = %update.line_id,
                    "Conflict while updating line audio"
                );
                return Err(ShareServiceError::Conflict(RACE_MSG.to_string()));
            }
        }

        // 6) One-shot submission: bump the scene marker, close sharing, and
        // queue the recordings for post-processing
        self.script_repo
            .finalize_submission(scene_id, submitted_at)
            .await
            .map_err(dependency)?;

        tracing::info!(
            session_id = %session_id,
            scene_id = %scene_id,
            updates = request.updates.len(),
            "Reader recordings committed"
        );

        Ok(())
    }

    async fn mark_session_done(&self, session_id: Uuid) -> Result<(), ShareServiceError> {
        let session = self.find_session(session_id).await?;

        let updated = self
            .session_repo
            .mark_completed(session_id)
            .await
            .map_err(dependency)?;
        if !updated {
            return Err(ShareServiceError::Dependency(
                "Failed to mark session as completed".to_string(),
            ));
        }

        // Owner notification is delivered by an external channel; the log
        // line is the trigger point.
        tracing::info!(
            session_id = %session_id,
            scene_id = %session.scene_id,
            title = %session.title,
            "Share session completed"
        );

        Ok(())
    }
}

impl ShareService {
    fn share_url(&self, session_id: Uuid) -> String {
        format!("{}/share/{}", self.public_base_url, session_id)
    }

    async fn find_session(&self, session_id: Uuid) -> Result<ShareSession, ShareServiceError> {
        self.session_repo
            .find_by_id(session_id)
            .await
            .map_err(dependency)?
            .ok_or_else(|| ShareServiceError::NotFound("Session not found".to_string()))
    }

    async fn find_script(&self, scene_id: Uuid) -> Result<ScriptShareState, ShareServiceError> {
        self.script_repo
            .find_share_state(scene_id)
            .await
            .map_err(dependency)?
            .ok_or_else(|| {
                ShareServiceError::Dependency("Failed to load scene from backend".to_string())
            })
    }

    /// Move one recording from transient to durable storage and return its
    /// durable URL. The blob may be orphaned if a later line conflicts;
    /// canonical records are only touched through the guarded write.
    async fn migrate_recording(
        &self,
        script: &ScriptShareState,
        scene_id: Uuid,
        update: &LineUpdate,
    ) -> Result<String, ShareServiceError> {
        let (bucket, source_key) = parse_object_url(&update.audio_url)
            .ok_or_else(|| ShareServiceError::Invalid("Invalid audio URL format".to_string()))?;

        if bucket != self.recordings_bucket {
            return Err(ShareServiceError::Invalid(
                "Invalid audio URL format".to_string(),
            ));
        }

        let dest_key = format!("{}/{}/{}.wav", script.user_id, scene_id, update.line_id);

        let migrate = async {
            let bytes = self
                .storage_repo
                .download(&bucket, &source_key)
                .await
                .map_err(|e| {
                    ShareServiceError::Dependency(format!("Failed to download recording: {}", e))
                })?;

            self.storage_repo
                .upload(&self.lines_bucket, &dest_key, bytes, "audio/wav")
                .await
                .map_err(|e| {
                    ShareServiceError::Dependency(format!("Failed to upload recording: {}", e))
                })
        };

        tokio::time::timeout(MIGRATION_TIMEOUT, migrate)
            .await
            .map_err(|_| {
                ShareServiceError::Dependency("Timed out migrating recording".to_string())
            })??;

        Ok(self.storage_repo.public_url(&self.lines_bucket, &dest_key))
    }
}

fn dependency(err: crate::error::AppError) -> ShareServiceError {
    ShareServiceError::Dependency(err.to_string())
}

/// Set equality over marker maps: same line ids, same marker values. Any
/// added, removed, or modified line makes the sets differ.
fn markers_match(
    observed: &HashMap<Uuid, DateTime<Utc>>,
    current: &HashMap<Uuid, DateTime<Utc>>,
) -> bool {
    observed.len() == current.len()
        && observed
            .iter()
            .all(|(line_id, marker)| current.get(line_id) == Some(marker))
}

fn audio_overrides(cached: &Option<Json<Vec<CachedSessionLine>>>) -> HashMap<Uuid, String> {
    let mut overrides = HashMap::new();
    if let Some(Json(lines)) = cached {
        for line in lines {
            if let Some(url) = &line.audio_url {
                overrides.insert(line.line_id, url.clone());
            }
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn marker(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn map(entries: &[(u128, &str)]) -> HashMap<Uuid, DateTime<Utc>> {
        entries
            .iter()
            .map(|(id, at)| (Uuid::from_u128(*id), marker(at)))
            .collect()
    }

    #[test]
    fn test_identical_marker_sets_match() {
        let observed = map(&[(1, "2026-01-01T00:00:00Z"), (2, "2026-01-01T00:00:00Z")]);
        let current = map(&[(2, "2026-01-01T00:00:00Z"), (1, "2026-01-01T00:00:00Z")]);
        assert!(markers_match(&observed, &current));
    }

    #[test]
    fn test_modified_line_is_a_conflict() {
        // l2 was edited after the reader loaded: its marker moved from t0 to t1
        let observed = map(&[(1, "2026-01-01T00:00:00Z"), (2, "2026-01-01T00:00:00Z")]);
        let current = map(&[(1, "2026-01-01T00:00:00Z"), (2, "2026-01-02T00:00:00Z")]);
        assert!(!markers_match(&observed, &current));
    }

    #[test]
    fn test_added_line_is_a_conflict() {
        let observed = map(&[(1, "2026-01-01T00:00:00Z")]);
        let current = map(&[(1, "2026-01-01T00:00:00Z"), (2, "2026-01-01T00:00:00Z")]);
        assert!(!markers_match(&observed, &current));
    }

    #[test]
    fn test_removed_line_is_a_conflict() {
        let observed = map(&[(1, "2026-01-01T00:00:00Z"), (2, "2026-01-01T00:00:00Z")]);
        let current = map(&[(1, "2026-01-01T00:00:00Z")]);
        assert!(!markers_match(&observed, &current));
    }

    #[test]
    fn test_empty_sets_match() {
        assert!(markers_match(&HashMap::new(), &HashMap::new()));
    }

    #[test]
    fn test_audio_overrides_keep_only_lines_with_audio() {
        let cached = Some(Json(vec![
            CachedSessionLine {
                line_id: Uuid::from_u128(1),
                audio_url: Some("https://cdn.test/r/1.wav".to_string()),
            },
            CachedSessionLine {
                line_id: Uuid::from_u128(2),
                audio_url: None,
            },
        ]));

        let overrides = audio_overrides(&cached);
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides.get(&Uuid::from_u128(1)).map(String::as_str),
            Some("https://cdn.test/r/1.wav")
        );

        assert!(audio_overrides(&None).is_empty());
    }
}
