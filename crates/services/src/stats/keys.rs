//! Candidate storage keys per category, in fixed probe order.
//!
//! Different writers over the portal's life stored the same collection under
//! different names. The aggregator probes each list in order and the first
//! key that exists and parses wins; the orders below are part of the
//! contract and must not be reshuffled.

/// Student roster candidates.
pub const STUDENT_KEYS: [&str; 4] = ["students", "users", "studentData", "userData"];

/// Attendance log candidates.
pub const ATTENDANCE_KEYS: [&str; 2] = ["attendance", "attendanceData"];

/// Study material catalog candidates.
pub const MATERIAL_KEYS: [&str; 3] = ["studyMaterials", "materials", "resources"];

/// Quiz catalog candidates.
pub const QUIZ_KEYS: [&str; 2] = ["quizzes", "quizData"];
