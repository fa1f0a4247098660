use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the attempt table, the per-question result table with a cascading
/// foreign key, and the listing index.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_attempts (
                    id INTEGER PRIMARY KEY,
                    timestamp TEXT NOT NULL,
                    correct_answers_count INTEGER NOT NULL CHECK (correct_answers_count >= 0),
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    category TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    CHECK (correct_answers_count <= total_questions)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS question_results (
                    id INTEGER PRIMARY KEY,
                    attempt_id INTEGER NOT NULL,
                    question_text TEXT NOT NULL,
                    all_answers TEXT NOT NULL,
                    correct_answer TEXT NOT NULL,
                    user_answer TEXT NOT NULL,
                    was_correct INTEGER NOT NULL CHECK (was_correct IN (0, 1)),
                    FOREIGN KEY (attempt_id) REFERENCES quiz_attempts(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_attempts_timestamp
                    ON quiz_attempts (timestamp DESC, id DESC);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_question_results_attempt
                    ON question_results (attempt_id, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
