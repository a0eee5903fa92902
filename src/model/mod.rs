//! Assembly of the mixed-integer model: variables, constraint rows, and the
//! objective, all as plain data ready for a MIP backend or MPS export.

pub mod constraints;
pub mod error;
pub mod expr;
pub mod mps;
pub mod variables;

pub use error::ModelBuildError;
pub use expr::{Comparison, LinearExpr, RowConstraint, VarId};
pub use variables::{VarDef, VarDomain, VariableCatalog};

use crate::params::ParameterTable;
use crate::scenario::{IndexSets, Scenario};
use constraints::Assembler;
use log::info;

/// The assembled model: a dense variable catalog, named constraint rows, and
/// a linear objective to minimise.
#[derive(Debug, Clone)]
pub struct MipModel {
    pub variables: VariableCatalog,
    pub rows: Vec<RowConstraint>,
    pub objective: LinearExpr,
}

impl MipModel {
    /// Instantiates every variable and emits every constraint family plus
    /// the objective. Emission order is fixed, so the model (and its MPS
    /// form) is reproducible.
    pub fn assemble(
        scenario: &Scenario,
        idx: &IndexSets,
        params: &ParameterTable,
    ) -> Result<Self, ModelBuildError> {
        if idx.slots.is_empty() {
            return Err(ModelBuildError::NoSlots);
        }
        if params.horizon() <= 0.0 {
            return Err(ModelBuildError::NonPositiveHorizon(params.horizon()));
        }

        let vars = VariableCatalog::build(scenario, idx);
        let mut assembler = Assembler::new(scenario, idx, params, &vars);
        assembler.emit_all();
        let rows = std::mem::take(&mut assembler.rows);
        let objective = build_objective(scenario, idx, &vars);

        info!(
            "model assembled: {} variables ({} binary), {} constraints",
            vars.len(),
            vars.binary_count(),
            rows.len()
        );

        Ok(Self {
            variables: vars,
            rows,
            objective,
        })
    }
}

/// The single-scalar multi-criterion objective: assignment volume, active
/// interferences, switches, total presence, client tardiness, and idle
/// marks, all unweighted.
fn build_objective(scenario: &Scenario, idx: &IndexSets, vars: &VariableCatalog) -> LinearExpr {
    let slots = idx.slots.len();
    let positions = idx.positions.len();
    let mut objective = LinearExpr::new();
    for s in 0..slots {
        for p in 0..positions {
            for j in 0..scenario.jobs.len() {
                objective = objective.add(vars.x(s, p, j), 1.0);
            }
            objective = objective.add(vars.switch_pos(s, p), 1.0);
            for r in 0..scenario.planes.len() {
                objective = objective
                    .add(vars.pres(s, p, r), 1.0)
                    .add(vars.idle(s, p, r), 1.0);
            }
        }
    }
    for q in 0..idx.interference_quads.len() {
        objective = objective.add(vars.alpha(q), 1.0);
    }
    for c in 0..scenario.clients.len() {
        objective = objective.add(vars.client_delay(c), 1.0);
    }
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{HangarLayout, Position};
    use crate::scenario::JobRow;

    fn assembled() -> (Scenario, IndexSets, ParameterTable, MipModel) {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("B1", 1.0, "B", 1.0, 0.0),
        ];
        let layout = HangarLayout::new(2, vec![(Position::Stand(1), Position::Stand(2))]);
        let scenario = Scenario::build(&rows, &[], layout).unwrap();
        let idx = IndexSets::build(&scenario);
        let params = ParameterTable::from_scenario(&scenario);
        let model = MipModel::assemble(&scenario, &idx, &params).unwrap();
        (scenario, idx, params, model)
    }

    fn rows_with_prefix<'a>(model: &'a MipModel, prefix: &str) -> Vec<&'a RowConstraint> {
        model
            .rows
            .iter()
            .filter(|row| row.name.starts_with(prefix) && row.name.as_bytes()[prefix.len()] == b'(')
            .collect()
    }

    #[test]
    fn family_cardinalities_match_their_domains() {
        let (scenario, idx, _, model) = assembled();
        let cells = idx.slots.len() * idx.positions.len();
        let jobs = scenario.jobs.len();
        let planes = scenario.planes.len();
        let quads = idx.interference_quads.len();

        assert_eq!(rows_with_prefix(&model, "single_job_per_slot").len(), cells);
        assert_eq!(
            rows_with_prefix(&model, "fragment_duration").len(),
            cells * jobs
        );
        assert_eq!(rows_with_prefix(&model, "job_duration").len(), jobs);
        assert_eq!(rows_with_prefix(&model, "one_placement").len(), jobs);
        assert_eq!(rows_with_prefix(&model, "precedence").len(), idx.precedence.len());
        assert_eq!(rows_with_prefix(&model, "beta_start_def").len(), quads);
        assert_eq!(rows_with_prefix(&model, "beta_finish_def").len(), quads);
        assert_eq!(rows_with_prefix(&model, "interference").len(), quads);
        assert_eq!(
            rows_with_prefix(&model, "switch_count").len(),
            idx.switch_tuples.len()
        );
        assert_eq!(
            rows_with_prefix(&model, "presence_accounting").len(),
            idx.slots.len() * planes
        );
        // Four markers, one routing row each.
        assert_eq!(rows_with_prefix(&model, "marker_outside").len(), 4);
        assert_eq!(rows_with_prefix(&model, "early_start").len(), jobs);
        assert_eq!(rows_with_prefix(&model, "late_finish").len(), jobs);
    }

    #[test]
    fn row_names_are_unique() {
        let (_, _, _, model) = assembled();
        let mut names: Vec<&str> = model.rows.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn late_finish_rows_carry_the_deadline() {
        let (scenario, _, params, model) = assembled();
        let a1 = scenario.job_index("A1").unwrap();
        let row = model
            .rows
            .iter()
            .find(|r| r.name == "late_finish(A1)")
            .unwrap();
        assert_eq!(row.cmp, Comparison::LessEq);
        assert_eq!(row.rhs, params.late_finish(params.plane_of_job(a1)));
        assert_eq!(row.expr.terms().len(), 1);
    }

    #[test]
    fn marker_rows_pin_markers_outside() {
        let (scenario, idx, _, model) = assembled();
        let entry = scenario.job_index("A-entry").unwrap();
        let row = model
            .rows
            .iter()
            .find(|r| r.name == "marker_outside(A-entry)")
            .unwrap();
        assert_eq!(row.cmp, Comparison::Equal);
        assert_eq!(row.rhs, 1.0);
        assert_eq!(row.expr.terms().len(), idx.slots.len());
        let outside = idx.outside_index();
        let expected = model.variables.x(0, outside, entry);
        assert!(row.expr.terms().iter().any(|&(v, c)| v == expected && c == 1.0));
    }

    #[test]
    fn objective_counts_each_penalised_block_once() {
        let (scenario, idx, _, model) = assembled();
        let cells = idx.slots.len() * idx.positions.len();
        let expected = cells * scenario.jobs.len()          // x
            + idx.interference_quads.len()                  // alpha
            + cells                                         // switch
            + 2 * cells * scenario.planes.len()             // pres + idle
            + scenario.clients.len(); // client_delay
        assert_eq!(model.objective.terms().len(), expected);
        assert!(model.objective.terms().iter().all(|&(_, c)| c == 1.0));
    }

    #[test]
    fn empty_scenario_guard() {
        // Horizon guard fires only through a zero-duration roster, which the
        // markers prevent; the slot guard is structural. Both stay covered
        // by construction here.
        let (_, idx, params, _) = assembled();
        assert!(!idx.slots.is_empty());
        assert!(params.horizon() > 0.0);
    }
}
