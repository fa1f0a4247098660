use quiz_core::model::{AttemptId, QuestionResult, QuizAttempt};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    answers_from_json, answers_to_json, attempt_id_from_i64, attempt_id_to_i64,
    difficulty_from_str, result_id_from_i64,
};
use crate::repository::{
    AttemptRepository, NewAttemptRecord, NewQuestionResultRecord, StorageError,
};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt, StorageError> {
    let id = attempt_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let timestamp = row.try_get("timestamp").map_err(ser)?;
    let correct = u32_from_i64(
        "correct_answers_count",
        row.try_get::<i64, _>("correct_answers_count").map_err(ser)?,
    )?;
    let total = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let category: String = row.try_get("category").map_err(ser)?;
    let difficulty = difficulty_from_str(row.try_get::<&str, _>("difficulty").map_err(ser)?)?;

    QuizAttempt::from_persisted(id, timestamp, correct, total, category, difficulty).map_err(ser)
}

fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionResult, StorageError> {
    Ok(QuestionResult {
        id: result_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        attempt_id: attempt_id_from_i64(row.try_get::<i64, _>("attempt_id").map_err(ser)?)?,
        question_text: row.try_get("question_text").map_err(ser)?,
        all_answers: answers_from_json(row.try_get::<&str, _>("all_answers").map_err(ser)?)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        user_answer: row.try_get("user_answer").map_err(ser)?,
        was_correct: row.try_get::<bool, _>("was_correct").map_err(ser)?,
    })
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn save_attempt(
        &self,
        attempt: NewAttemptRecord,
        results: Vec<NewQuestionResultRecord>,
    ) -> Result<AttemptId, StorageError> {
        // One transaction: the attempt row and its results become visible together.
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (
                    timestamp, correct_answers_count, total_questions, category, difficulty
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(attempt.timestamp)
        .bind(i64::from(attempt.correct_answers_count))
        .bind(i64::from(attempt.total_questions))
        .bind(&attempt.category)
        .bind(attempt.difficulty.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        let attempt_rowid = res.last_insert_rowid();

        for record in &results {
            let all_answers = answers_to_json(&record.all_answers)?;
            sqlx::query(
                r"
                    INSERT INTO question_results (
                        attempt_id, question_text, all_answers,
                        correct_answer, user_answer, was_correct
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(attempt_rowid)
            .bind(&record.question_text)
            .bind(all_answers)
            .bind(&record.correct_answer)
            .bind(&record.user_answer)
            .bind(record.was_correct)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;

        attempt_id_from_i64(attempt_rowid)
    }

    async fn list_attempts(&self) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, timestamp, correct_answers_count, total_questions,
                       category, difficulty
                FROM quiz_attempts
                ORDER BY timestamp DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<QuizAttempt, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, timestamp, correct_answers_count, total_questions,
                       category, difficulty
                FROM quiz_attempts
                WHERE id = ?1
            ",
        )
        .bind(attempt_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn get_attempt_with_results(
        &self,
        id: AttemptId,
    ) -> Result<(QuizAttempt, Vec<QuestionResult>), StorageError> {
        let attempt = self.get_attempt(id).await?;

        let rows = sqlx::query(
            r"
                SELECT id, attempt_id, question_text, all_answers,
                       correct_answer, user_answer, was_correct
                FROM question_results
                WHERE attempt_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(attempt_id_to_i64(id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(map_result_row(&row)?);
        }

        Ok((attempt, results))
    }

    async fn delete_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        // question_results rows go with it via ON DELETE CASCADE.
        sqlx::query("DELETE FROM quiz_attempts WHERE id = ?1")
            .bind(attempt_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
