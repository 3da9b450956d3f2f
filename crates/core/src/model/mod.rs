mod ids;
mod quiz;
mod result;
mod stats;

pub use ids::{QuestionId, QuizId, StudentId};
pub use quiz::{Question, QuizDefinition, QuizError};
pub use result::{QuestionOutcome, ResultRecord, ResultRecordError};
pub use stats::{StatCategory, StatsSnapshot};
