use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// The four independently-stored collections the dashboard summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Students,
    Attendance,
    Materials,
    Quizzes,
}

impl StatCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatCategory::Students => "students",
            StatCategory::Attendance => "attendance",
            StatCategory::Materials => "materials",
            StatCategory::Quizzes => "quizzes",
        }
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-recomputed summary of the stored collections.
///
/// Derived, never persisted: every aggregation pass rebuilds the whole
/// snapshot rather than patching a previous one. `resolved_keys` records
/// which storage key supplied each category, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_students: usize,
    pub average_attendance_percent: u8,
    pub total_materials: usize,
    pub active_quiz_count: usize,
    pub resolved_keys: HashMap<StatCategory, String>,
    pub computed_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// An all-zero snapshot; what aggregation yields over empty storage.
    #[must_use]
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            total_students: 0,
            average_attendance_percent: 0,
            total_materials: 0,
            active_quiz_count: 0,
            resolved_keys: HashMap::new(),
            computed_at,
        }
    }
}
