//! hangarplan - mixed-integer scheduling of aircraft maintenance across
//! hangar stands.
//!
//! The crate turns flat scenario rows into an exact MIP: slot/position
//! assignment variables coupled to continuous start/finish times through
//! big-M gates, presence tracking separate from work, pairwise position
//! interference, switch counting, and client tardiness, solved with HiGHS.

pub mod layout;
pub mod model;
pub mod params;
pub mod scenario;
pub mod solution;
pub mod solve;

use thiserror::Error;

/// Identifier of a maintenance job.
pub type JobId = String;
/// Identifier (tail number) of an aircraft.
pub type PlaneId = String;
/// Identifier of a client owning aircraft.
pub type ClientId = String;

/// Any failure along the plan pipeline, in propagation order: input
/// validation, model assembly, then the solve itself.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Scenario(#[from] scenario::ScenarioError),
    #[error(transparent)]
    Model(#[from] model::ModelBuildError),
    #[error(transparent)]
    Solve(#[from] solve::SolveError),
}

/// Everything a caller needs after a successful plan: the validated
/// scenario, its index sets and parameter table (for verification and
/// reporting), and the solved outcome.
#[derive(Debug)]
pub struct PlanResult {
    pub scenario: scenario::Scenario,
    pub index: scenario::IndexSets,
    pub params: params::ParameterTable,
    pub outcome: solve::SolveOutcome,
}

/// Runs the whole pipeline: validate rows, derive index sets, populate the
/// parameter table, assemble the model, and solve it.
pub fn plan(
    job_rows: &[scenario::JobRow],
    plane_rows: &[scenario::PlaneRow],
    layout: layout::HangarLayout,
    scenario_options: scenario::ScenarioOptions,
    solve_options: solve::SolveOptions,
) -> Result<PlanResult, PlanError> {
    let scenario =
        scenario::Scenario::build_with_options(job_rows, plane_rows, layout, scenario_options)?;
    let index = scenario::IndexSets::build(&scenario);
    let params = params::ParameterTable::from_scenario(&scenario);
    let model = model::MipModel::assemble(&scenario, &index, &params)?;
    let outcome = solve::SolverDriver::new(solve_options).solve(&scenario, &index, &model)?;
    Ok(PlanResult {
        scenario,
        index,
        params,
        outcome,
    })
}
