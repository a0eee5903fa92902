use thiserror::Error;

/// Internal inconsistencies caught before the model reaches the solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelBuildError {
    #[error("no slots were derived for the scenario")]
    NoSlots,

    #[error("horizon must be positive, got {0} days")]
    NonPositiveHorizon(f64),
}
