use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the solver driver.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The feasible region is empty. Carries the irreducible infeasible
    /// subsystem as constraint names, and the MPS artifact path when one
    /// was written.
    #[error("model is infeasible; irreducible infeasible subsystem has {} constraints", iis.len())]
    Infeasible {
        iis: Vec<String>,
        mps_path: Option<PathBuf>,
    },

    /// Any other engine-side failure.
    #[error("solver engine failure: {0}")]
    Engine(String),

    /// Writing a solver artifact (MPS dump) failed.
    #[error("failed to write solver artifact: {0}")]
    Artifact(#[from] std::io::Error),
}
