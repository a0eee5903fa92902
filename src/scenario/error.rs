use crate::JobId;
use thiserror::Error;

/// Errors raised while validating scenario input.
///
/// All variants are fatal: the model is never built from invalid input.
/// `NoPlanes` corresponds to an empty roster; the remaining variants are
/// malformed rows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("scenario has no aircraft: neither job rows nor plane rows name one")]
    NoPlanes,

    #[error("job {job}: task ordinal {task} is not a non-negative integer")]
    InvalidTask { job: JobId, task: f64 },

    #[error("job {job}: duration {duration} days is not a finite non-negative number")]
    InvalidDuration { job: JobId, duration: f64 },

    #[error("duplicate job id {0}")]
    DuplicateJob(JobId),

    #[error("job {job}: aircraft id is empty")]
    MissingPlane { job: JobId },
}
