use thiserror::Error;

use crate::model::{QuizError, ResultRecordError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Record(#[from] ResultRecordError),
}
