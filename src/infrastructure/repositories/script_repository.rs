use crate::domain::scene::ScriptShareState;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct ScriptRepository {
    pool: Arc<DbPool>,
}

impl ScriptRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get the sharing state of a script (owner, shareable flag, modification marker)
    pub async fn find_share_state(&self, script_id: Uuid) -> AppResult<Option<ScriptShareState>> {
        let pool = self.pool.as_ref();
        let state = sqlx::query_as::<_, ScriptShareState>(
            r#"
            SELECT user_id, COALESCE(sharable, false) AS sharable, updated_at
            FROM scripts
            WHERE id = $1
            "#,
        )
        .bind(script_id)
        .fetch_optional(pool)
        .await?;

        Ok(state)
    }

    /// Close out a reader submission: bump the script marker, stop further
    /// sharing, and queue the script for audio post-processing.
    pub async fn finalize_submission(
        &self,
        script_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE scripts
            SET updated_at = $1, sharable = false, need_trim = true
            WHERE id = $2
            "#,
        )
        .bind(submitted_at)
        .bind(script_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
