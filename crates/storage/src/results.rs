use std::sync::Arc;

use thiserror::Error;

use portal_core::model::{ResultRecord, ResultRecordError};

use crate::kv::{KeyValueStore, StorageError};

/// Storage key for the append-only result log.
pub const RESULTS_KEY: &str = "quizResults";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    InvalidRecord(#[from] ResultRecordError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("encoding result log failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only log of completed quiz attempts under `quizResults`.
///
/// Records are only ever appended and read through this store; nothing
/// removes or edits them.
#[derive(Clone)]
pub struct ResultsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ResultsStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the full persisted sequence, oldest first.
    ///
    /// An absent key or an unparsable payload reads as an empty log; corrupt
    /// data written by another tab must not take the dashboard down.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only for backend transport failures.
    pub async fn read_all(&self) -> Result<Vec<ResultRecord>, StoreError> {
        let Some(raw) = self.kv.get(RESULTS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                tracing::warn!(key = RESULTS_KEY, error = %err, "unparsable result log, reading as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Validate and append one record, preserving existing entries.
    ///
    /// Read-modify-write of the whole collection; not atomic across writers,
    /// so two sessions appending at once can lose one record (last write
    /// wins). Kept intact from the legacy store contract.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` for a record with zero questions
    /// or an out-of-range score, otherwise backend transport failures.
    pub async fn append(&self, record: &ResultRecord) -> Result<(), StoreError> {
        record.validate()?;
        let mut records = self.read_all().await?;
        records.push(record.clone());
        let encoded = serde_json::to_string(&records)?;
        self.kv.set(RESULTS_KEY, encoded).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryStore;
    use portal_core::model::{QuestionOutcome, QuizId, StudentId};
    use portal_core::time::fixed_now;

    fn store() -> (InMemoryStore, ResultsStore) {
        let kv = InMemoryStore::new();
        let results = ResultsStore::new(Arc::new(kv.clone()));
        (kv, results)
    }

    fn record(score: u8) -> ResultRecord {
        ResultRecord {
            student_id: StudentId::new("1"),
            quiz_id: QuizId::new("1"),
            subject: "English".to_owned(),
            level: "Std 5 - Beginner".to_owned(),
            score,
            correct_answers: 2,
            total_questions: 3,
            timestamp: fixed_now(),
            results: vec![QuestionOutcome {
                question: "Which word is a noun?".to_owned(),
                user_answer: Some("happiness".to_owned()),
                correct_answer: "happiness".to_owned(),
                is_correct: true,
            }],
        }
    }

    #[tokio::test]
    async fn appended_record_is_in_the_next_read() {
        let (_, results) = store();
        let rec = record(67);
        results.append(&rec).await.unwrap();

        let all = results.read_all().await.unwrap();
        assert_eq!(all, vec![rec]);
    }

    #[tokio::test]
    async fn append_preserves_existing_entries() {
        let (_, results) = store();
        results.append(&record(67)).await.unwrap();
        results.append(&record(100)).await.unwrap();

        let all = results.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].score, 67);
        assert_eq!(all[1].score, 100);
    }

    #[tokio::test]
    async fn invalid_record_is_rejected() {
        let (_, results) = store();
        let mut bad = record(67);
        bad.total_questions = 0;
        assert!(matches!(
            results.append(&bad).await,
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(results.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_log_reads_as_empty() {
        let (kv, results) = store();
        kv.set(RESULTS_KEY, "not json {".to_owned()).await.unwrap();
        assert!(results.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_over_corrupt_log_starts_fresh() {
        let (kv, results) = store();
        kv.set(RESULTS_KEY, "not json {".to_owned()).await.unwrap();
        results.append(&record(50)).await.unwrap();

        let all = results.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 50);
    }
}
