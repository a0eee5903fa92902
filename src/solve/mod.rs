//! Solver driver: ships the assembled model to HiGHS, types the outcome,
//! and turns infeasibility into a structured diagnostic.

pub mod error;
mod iis;
#[cfg(test)]
mod tests;

pub use error::SolveError;

use crate::model::{mps, Comparison, LinearExpr, MipModel, VarDomain};
use crate::scenario::{IndexSets, Scenario};
use crate::solution::ScheduleSolution;
use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Tunable solver options.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Wall-clock budget for the solve.
    pub time_limit: Duration,
    /// Relative MIP gap at which the engine may stop.
    pub mip_gap: f64,
    /// Prefer finding incumbents over proving bounds. Advisory: the HiGHS
    /// backend exposes no direct equivalent, so this is recorded and logged.
    pub primal_focus: bool,
    /// Heuristic intensity in `[0, 1]`. Advisory, like `primal_focus`.
    pub heuristic_effort: f64,
    /// Compute an IIS via the deletion filter on infeasible outcomes.
    pub compute_iis: bool,
    /// Directory for solver artifacts (the MPS dump written on
    /// infeasibility). Nothing is written when unset.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(1000),
            mip_gap: 0.10,
            primal_focus: true,
            heuristic_effort: 1.0,
            compute_iis: true,
            artifact_dir: None,
        }
    }
}

/// How the engine terminated with a usable solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// Stopped within the configured relative gap.
    FeasibleWithinGap,
    /// Hit the wall-clock limit; the incumbent is returned as suboptimal.
    TimeLimit,
}

/// A solved schedule plus how it terminated.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub run_id: String,
    pub status: SolveStatus,
    pub objective: f64,
    pub solution: ScheduleSolution,
}

impl SolveOutcome {
    pub fn suboptimal(&self) -> bool {
        self.status == SolveStatus::TimeLimit
    }
}

/// Hands assembled models to the MIP engine.
#[derive(Debug, Clone, Default)]
pub struct SolverDriver {
    options: SolveOptions,
}

impl SolverDriver {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solves the model and reshapes the primal values into the typed
    /// solution. Infeasibility comes back as
    /// [`SolveError::Infeasible`] with the IIS constraint names.
    pub fn solve(
        &self,
        scenario: &Scenario,
        idx: &IndexSets,
        model: &MipModel,
    ) -> Result<SolveOutcome, SolveError> {
        let run_id = Uuid::new_v4().to_string();
        info!(
            "solve {run_id}: {} variables, {} constraints, time limit {:?}, gap {}",
            model.variables.len(),
            model.rows.len(),
            self.options.time_limit,
            self.options.mip_gap
        );
        if self.options.primal_focus || self.options.heuristic_effort > 0.0 {
            debug!(
                "solve {run_id}: primal_focus={} heuristic_effort={} (advisory on this backend)",
                self.options.primal_focus, self.options.heuristic_effort
            );
        }

        let started = Instant::now();
        match solve_values(model, &model.objective, None, Some(&self.options)) {
            Ok(values) => {
                let elapsed = started.elapsed();
                let status = if elapsed >= self.options.time_limit {
                    SolveStatus::TimeLimit
                } else if self.options.mip_gap > 0.0 {
                    SolveStatus::FeasibleWithinGap
                } else {
                    SolveStatus::Optimal
                };
                let objective = model.objective.value(&values);
                info!(
                    "solve {run_id}: {status:?} with objective {objective:.6} after {elapsed:?}"
                );
                Ok(SolveOutcome {
                    run_id,
                    status,
                    objective,
                    solution: ScheduleSolution::from_values(
                        scenario,
                        idx,
                        &model.variables,
                        &values,
                    ),
                })
            }
            Err(ResolutionError::Infeasible) => {
                warn!("solve {run_id}: infeasible");
                let mps_path = self.write_artifact(model, &run_id)?;
                let iis = if self.options.compute_iis {
                    match iis::deletion_filter(model) {
                        Ok(iis) => iis,
                        Err(err) => {
                            warn!("solve {run_id}: IIS computation failed: {err}");
                            Vec::new()
                        }
                    }
                } else {
                    Vec::new()
                };
                Err(SolveError::Infeasible { iis, mps_path })
            }
            Err(other) => Err(SolveError::Engine(other.to_string())),
        }
    }

    fn write_artifact(
        &self,
        model: &MipModel,
        run_id: &str,
    ) -> Result<Option<PathBuf>, SolveError> {
        let Some(dir) = &self.options.artifact_dir else {
            return Ok(None);
        };
        let path = dir.join(format!("{run_id}.mps"));
        let mut out = BufWriter::new(File::create(&path)?);
        mps::write_mps(model, run_id, &mut out)?;
        info!("solve {run_id}: wrote infeasible model to {}", path.display());
        Ok(Some(path))
    }
}

/// Builds the good_lp problem (optionally restricted to the `active` rows)
/// and returns the dense primal value vector.
fn solve_values(
    model: &MipModel,
    objective: &LinearExpr,
    active: Option<&[bool]>,
    options: Option<&SolveOptions>,
) -> Result<Vec<f64>, ResolutionError> {
    let mut vars = variables!();
    let mut handles: Vec<Variable> = Vec::with_capacity(model.variables.len());
    for def in model.variables.defs() {
        let definition = match def.domain {
            VarDomain::Binary => variable().binary().name(def.name.clone()),
            VarDomain::NonNegative => variable().min(0.0).name(def.name.clone()),
        };
        handles.push(vars.add(definition));
    }

    let objective: Expression = objective
        .terms()
        .iter()
        .map(|&(v, c)| handles[v.index()] * c)
        .sum();

    let mut problem = vars.minimise(objective).using(highs);
    problem.set_verbose(false);
    if let Some(options) = options {
        problem = problem
            .set_time_limit(options.time_limit.as_secs_f64())
            .set_mip_rel_gap(options.mip_gap as f32)
            .map_err(|err| ResolutionError::Str(err.to_string()))?;
    }

    for (i, row) in model.rows.iter().enumerate() {
        if let Some(active) = active {
            if !active[i] {
                continue;
            }
        }
        let lhs: Expression = row
            .expr
            .terms()
            .iter()
            .map(|&(v, c)| handles[v.index()] * c)
            .sum();
        let rhs = row.rhs;
        problem = problem.with(match row.cmp {
            Comparison::LessEq => constraint!(lhs <= rhs),
            Comparison::GreaterEq => constraint!(lhs >= rhs),
            Comparison::Equal => constraint!(lhs == rhs),
        });
    }

    let solved = problem.solve()?;
    Ok(handles.iter().map(|&v| solved.value(v)).collect())
}

/// Feasibility probe for the IIS filter: same translation, zero objective,
/// row subset given by `active`.
pub(crate) fn feasible(model: &MipModel, active: &[bool]) -> Result<bool, ResolutionError> {
    match solve_values(model, &LinearExpr::new(), Some(active), None) {
        Ok(_) => Ok(true),
        Err(ResolutionError::Infeasible) => Ok(false),
        Err(other) => Err(other),
    }
}
