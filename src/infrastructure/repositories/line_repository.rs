use crate::domain::scene::ScriptLine;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct LineRepository {
    pool: Arc<DbPool>,
}

impl LineRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get all canonical lines for a script, in storage order
    pub async fn find_by_script(&self, script_id: Uuid) -> AppResult<Vec<ScriptLine>> {
        let pool = self.pool.as_ref();
        let lines = sqlx::query_as::<_, ScriptLine>(
            r#"
            SELECT id, script_id, raw_text, order_index,
                   COALESCE(is_stage_direction, false) AS is_stage_direction,
                   COALESCE(is_cue_line, false) AS is_cue_line,
                   audio_url, updated_at
            FROM lines
            WHERE script_id = $1
            "#,
        )
        .bind(script_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }

    /// Conditionally update a line's audio URL and modification marker.
    ///
    /// The write only lands if the row's `updated_at` still equals
    /// `expected_updated_at`; returns whether a row was affected. A `false`
    /// return means another writer got there first.
    pub async fn update_audio_guarded(
        &self,
        line_id: Uuid,
        audio_url: &str,
        new_updated_at: DateTime<Utc>,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE lines
            SET audio_url = $1, updated_at = $2
            WHERE id = $3 AND updated_at = $4
            "#,
        )
        .bind(audio_url)
        .bind(new_updated_at)
        .bind(line_id)
        .bind(expected_updated_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
