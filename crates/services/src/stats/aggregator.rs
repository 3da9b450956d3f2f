use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use portal_core::Clock;
use portal_core::model::{StatCategory, StatsSnapshot};
use portal_core::scoring::percentage;
use storage::KeyValueStore;

use super::keys::{ATTENDANCE_KEYS, MATERIAL_KEYS, QUIZ_KEYS, STUDENT_KEYS};

/// Loose attendance entry; only the status matters.
#[derive(Debug, Deserialize)]
struct AttendanceEntry {
    #[serde(default)]
    status: Option<String>,
}

/// Loose quiz-catalog entry; an absent `isActive` flag means active.
#[derive(Debug, Deserialize)]
struct CatalogQuiz {
    #[serde(default, rename = "isActive")]
    is_active: Option<bool>,
}

/// Derives dashboard statistics from the four stored collections.
///
/// Every call rebuilds the whole snapshot from storage; nothing is patched
/// incrementally. The input collections are externally mutated and small.
#[derive(Clone)]
pub struct StatsAggregator {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl StatsAggregator {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { kv, clock }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Compute a fresh snapshot.
    ///
    /// Never fails: unreadable or unparsable collections count as absent,
    /// every count defaults to 0, and an empty snapshot is well-formed.
    pub async fn compute(&self) -> StatsSnapshot {
        let mut resolved_keys = HashMap::new();

        let students: Vec<Value> = self
            .resolve(StatCategory::Students, &STUDENT_KEYS, &mut resolved_keys)
            .await;
        let attendance: Vec<AttendanceEntry> = self
            .resolve(StatCategory::Attendance, &ATTENDANCE_KEYS, &mut resolved_keys)
            .await;
        let materials: Vec<Value> = self
            .resolve(StatCategory::Materials, &MATERIAL_KEYS, &mut resolved_keys)
            .await;
        let quizzes: Vec<CatalogQuiz> = self
            .resolve(StatCategory::Quizzes, &QUIZ_KEYS, &mut resolved_keys)
            .await;

        let present = attendance
            .iter()
            .filter(|entry| entry.status.as_deref() == Some("Present"))
            .count();

        let active_quiz_count = quizzes
            .iter()
            .filter(|quiz| quiz.is_active != Some(false))
            .count();

        StatsSnapshot {
            total_students: students.len(),
            average_attendance_percent: percentage(
                u32::try_from(present).unwrap_or(u32::MAX),
                u32::try_from(attendance.len()).unwrap_or(u32::MAX),
            ),
            total_materials: materials.len(),
            active_quiz_count,
            resolved_keys,
            computed_at: self.clock.now(),
        }
    }

    /// Probe `candidates` in order; the first key that exists and parses as
    /// a JSON array wins, even when the array is empty. A
    /// present-but-unparsable payload is logged and skipped in favor of the
    /// next candidate.
    async fn resolve<T: DeserializeOwned>(
        &self,
        category: StatCategory,
        candidates: &[&str],
        resolved_keys: &mut HashMap<StatCategory, String>,
    ) -> Vec<T> {
        for &key in candidates {
            let raw = match self.kv.get(key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(%category, key, error = %err, "storage read failed");
                    continue;
                }
            };
            match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => {
                    resolved_keys.insert(category, key.to_owned());
                    return items;
                }
                Err(err) => {
                    tracing::warn!(%category, key, error = %err, "skipping unparsable collection");
                }
            }
        }
        Vec::new()
    }
}
