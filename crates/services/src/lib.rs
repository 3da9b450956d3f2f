#![forbid(unsafe_code)]

pub mod countdown;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod sessions;
pub mod stats;

pub use portal_core::Clock;

pub use countdown::{Countdown, TickEvent};
pub use dashboard::{DashboardService, DashboardSummary};
pub use error::SessionError;
pub use notify::{ChangeEvent, ChangeNotifier};
pub use sessions::{ActiveQuiz, QuizRunner, QuizSession, SessionPhase, SessionProgress};
pub use stats::{DEFAULT_REFRESH_INTERVAL, StatsAggregator, StatsWatcher};
