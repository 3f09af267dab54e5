use crate::domain::share::ShareSession;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct ShareSessionRepository {
    pool: Arc<DbPool>,
}

impl ShareSessionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get a share session by ID
    pub async fn find_by_id(&self, session_id: Uuid) -> AppResult<Option<ShareSession>> {
        let pool = self.pool.as_ref();
        let session = sqlx::query_as::<_, ShareSession>(
            r#"
            SELECT id, title, status, scene_id, user_id, actor_lines, reader_lines, created_at
            FROM share_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Get the most recent share session for a scene, if any.
    /// One share link per scene is reused instead of creating duplicates.
    pub async fn find_latest_by_scene(&self, scene_id: Uuid) -> AppResult<Option<ShareSession>> {
        let pool = self.pool.as_ref();
        let session = sqlx::query_as::<_, ShareSession>(
            r#"
            SELECT id, title, status, scene_id, user_id, actor_lines, reader_lines, created_at
            FROM share_sessions
            WHERE scene_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(scene_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Create a new pending share session
    pub async fn create(
        &self,
        id: Uuid,
        title: &str,
        scene_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO share_sessions (id, title, status, scene_id, user_id, created_at)
            VALUES ($1, $2, 'pending', $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(scene_id)
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Transition a session to completed
    pub async fn mark_completed(&self, session_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE share_sessions
            SET status = 'completed'
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
