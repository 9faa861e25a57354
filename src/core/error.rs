use thiserror::Error;

use super::{JobId, Level, state::JobState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("policy needs at least one quantum")]
    EmptyQuanta,
    #[error("quantum for level {level} must be positive")]
    ZeroQuantum { level: Level },
    #[error("job {0} is unknown or already terminated")]
    UnknownJob(JobId),
    #[error("job {0} was already created")]
    DuplicateJob(JobId),
    #[error("job {job} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        job: JobId,
        from: JobState,
        to: JobState,
    },
    #[error("scheduler invariant violated: {0}")]
    InvariantViolation(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
