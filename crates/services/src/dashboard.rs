use std::sync::Arc;

use serde_json::Value;

use portal_core::model::ResultRecord;
use portal_core::scoring::clamp_percent;
use storage::{KeyValueStore, RESULTS_KEY, ResultsStore, StoreError};

/// Derived student-dashboard numbers over the persisted result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Average per-attempt percentage over scoreable entries, 0 when none.
    pub average_score: u8,
    /// Entries that carried a usable score/total pair.
    pub scoreable_attempts: usize,
}

/// Reads the result log the lenient way the legacy dashboard did.
///
/// Entries written by older revisions may carry `score`/`total` or
/// `correctAnswers`/`totalQuestions`, as numbers or numeric strings; all of
/// them are accepted, and entries with no usable total are skipped.
#[derive(Clone)]
pub struct DashboardService {
    kv: Arc<dyn KeyValueStore>,
    results: ResultsStore,
}

impl DashboardService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            results: ResultsStore::new(Arc::clone(&kv)),
            kv,
        }
    }

    /// Average score across all persisted attempts.
    ///
    /// Never fails on content: an absent or unparsable log, or a log with
    /// no scoreable entries, averages to 0. Each per-entry percentage is
    /// clamped to 0..=100 before it enters the average, so malformed counts
    /// cannot push the result out of range.
    pub async fn summary(&self) -> DashboardSummary {
        let empty = DashboardSummary {
            average_score: 0,
            scoreable_attempts: 0,
        };

        let raw = match self.kv.get(RESULTS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return empty,
            Err(err) => {
                tracing::warn!(key = RESULTS_KEY, error = %err, "storage read failed");
                return empty;
            }
        };
        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(key = RESULTS_KEY, error = %err, "unparsable result log");
                return empty;
            }
        };

        let mut total_percentage = 0.0_f64;
        let mut scoreable = 0_usize;
        for entry in &entries {
            let score = first_nonzero_number(entry, &["score", "correctAnswers"]);
            let total = first_nonzero_number(entry, &["total", "totalQuestions"]);
            if total == 0.0 {
                continue;
            }
            total_percentage += f64::from(clamp_percent(score / total * 100.0));
            scoreable += 1;
        }

        if scoreable == 0 {
            return empty;
        }
        DashboardSummary {
            average_score: clamp_percent(total_percentage / scoreable as f64),
            scoreable_attempts: scoreable,
        }
    }

    /// The latest `limit` well-formed records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only for backend transport failures.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ResultRecord>, StoreError> {
        let mut all = self.results.read_all().await?;
        all.reverse();
        all.truncate(limit);
        Ok(all)
    }
}

/// First of `fields` that coerces to a nonzero number, mirroring the legacy
/// `Number(a) || Number(b) || 0` chain (zero and non-numeric both fall
/// through to the next field).
fn first_nonzero_number(entry: &Value, fields: &[&str]) -> f64 {
    for field in fields {
        if let Some(n) = entry.get(field).and_then(coerce_number) {
            if n != 0.0 {
                return n;
            }
        }
    }
    0.0
}

/// JS-`Number()`-style coercion: numbers pass through, numeric strings
/// parse, everything else is unusable.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryStore;

    fn service() -> (InMemoryStore, DashboardService) {
        let kv = InMemoryStore::new();
        let service = DashboardService::new(Arc::new(kv.clone()));
        (kv, service)
    }

    #[tokio::test]
    async fn empty_log_averages_to_zero() {
        let (_, service) = service();
        let summary = service.summary().await;
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.scoreable_attempts, 0);
    }

    #[tokio::test]
    async fn averages_mixed_legacy_shapes() {
        let (kv, service) = service();
        kv.set(
            RESULTS_KEY,
            r#"[
                {"score": "8", "total": 10},
                {"correctAnswers": 1, "totalQuestions": 2}
            ]"#
            .to_owned(),
        )
        .await
        .unwrap();

        // (80 + 50) / 2 = 65.
        let summary = service.summary().await;
        assert_eq!(summary.average_score, 65);
        assert_eq!(summary.scoreable_attempts, 2);
    }

    #[tokio::test]
    async fn zero_total_entries_are_skipped() {
        let (kv, service) = service();
        kv.set(
            RESULTS_KEY,
            r#"[
                {"score": 5, "total": 0},
                {"score": 3, "total": 4}
            ]"#
            .to_owned(),
        )
        .await
        .unwrap();

        let summary = service.summary().await;
        assert_eq!(summary.average_score, 75);
        assert_eq!(summary.scoreable_attempts, 1);
    }

    #[tokio::test]
    async fn oversized_ratios_are_clamped_per_entry() {
        let (kv, service) = service();
        // A percentage-style score next to a question count: 67/3 would be
        // 2233% without the clamp.
        kv.set(
            RESULTS_KEY,
            r#"[{"score": 67, "totalQuestions": 3}]"#.to_owned(),
        )
        .await
        .unwrap();

        let summary = service.summary().await;
        assert_eq!(summary.average_score, 100);
    }

    #[tokio::test]
    async fn unparsable_log_averages_to_zero() {
        let (kv, service) = service();
        kv.set(RESULTS_KEY, "][".to_owned()).await.unwrap();
        let summary = service.summary().await;
        assert_eq!(summary.average_score, 0);
    }

    #[tokio::test]
    async fn non_numeric_fields_fall_through() {
        let (kv, service) = service();
        kv.set(
            RESULTS_KEY,
            r#"[{"score": "n/a", "correctAnswers": 2, "totalQuestions": 4}]"#.to_owned(),
        )
        .await
        .unwrap();

        let summary = service.summary().await;
        assert_eq!(summary.average_score, 50);
    }
}
