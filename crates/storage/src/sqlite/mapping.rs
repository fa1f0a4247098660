use quiz_core::model::{AttemptId, Difficulty, ResultId};

use crate::repository::StorageError;

pub(crate) fn attempt_id_from_i64(v: i64) -> Result<AttemptId, StorageError> {
    u64::try_from(v)
        .map(AttemptId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid attempt id: {v}")))
}

pub(crate) fn attempt_id_to_i64(id: AttemptId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("attempt id overflow".to_string()))
}

pub(crate) fn result_id_from_i64(v: i64) -> Result<ResultId, StorageError> {
    u64::try_from(v)
        .map(ResultId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid result id: {v}")))
}

pub(crate) fn difficulty_from_str(raw: &str) -> Result<Difficulty, StorageError> {
    raw.parse()
        .map_err(|_| StorageError::Serialization(format!("invalid difficulty: {raw}")))
}

/// Answer lists are stored as one JSON text column per row.
pub(crate) fn answers_to_json(answers: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn answers_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_roundtrip_through_json() {
        let answers = vec!["Alpha".to_string(), "B \"quoted\"".to_string()];
        let json = answers_to_json(&answers).unwrap();
        assert_eq!(answers_from_json(&json).unwrap(), answers);
    }

    #[test]
    fn rejects_negative_ids() {
        assert!(matches!(
            attempt_id_from_i64(-1),
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            result_id_from_i64(-5),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn rejects_unknown_difficulty() {
        assert!(matches!(
            difficulty_from_str("nightmare"),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(difficulty_from_str("medium").unwrap(), Difficulty::Medium);
    }
}
