//! Emission of every constraint family of the assignment model.
//!
//! Each submodule owns one concern; methods on [`Assembler`] append named
//! [`RowConstraint`]s in a fixed order so the emitted model (and its MPS
//! form) is identical run to run.

mod assignment;
mod interference;
mod presence;
mod tardiness;
mod timing;

use super::expr::{Comparison, LinearExpr, RowConstraint};
use super::variables::VariableCatalog;
use crate::params::ParameterTable;
use crate::scenario::{IndexSets, Scenario};

/// Shared state while the constraint families are emitted.
pub(crate) struct Assembler<'a> {
    pub scenario: &'a Scenario,
    pub idx: &'a IndexSets,
    pub params: &'a ParameterTable,
    pub vars: &'a VariableCatalog,
    pub rows: Vec<RowConstraint>,
}

impl<'a> Assembler<'a> {
    pub fn new(
        scenario: &'a Scenario,
        idx: &'a IndexSets,
        params: &'a ParameterTable,
        vars: &'a VariableCatalog,
    ) -> Self {
        Self {
            scenario,
            idx,
            params,
            vars,
            rows: Vec::new(),
        }
    }

    /// Emits every family in specification order.
    pub fn emit_all(&mut self) {
        self.single_job_per_slot();
        self.fragment_duration();
        self.fragment_time_gates();
        self.job_duration();
        self.global_job_times();
        self.start_before_finish();
        self.plane_delay();
        self.client_delay();
        self.slot_times();
        self.slot_order();
        self.precedence();
        self.consecutive_slots();
        self.one_placement_per_job();
        self.assigned_duration();
        self.slot_duration();
        self.plane_in_slot();
        self.presence();
        self.client_in_position();
        self.beta_start();
        self.beta_finish();
        self.interference_activation();
        self.switch_counting();
        self.fragment_order();
        self.markers_outside();
        self.time_windows();
    }

    pub(crate) fn push(
        &mut self,
        name: String,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: f64,
    ) {
        self.rows.push(RowConstraint {
            name,
            expr,
            cmp,
            rhs,
        });
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.idx.slots.len()
    }

    pub(crate) fn position_count(&self) -> usize {
        self.idx.positions.len()
    }

    pub(crate) fn job_count(&self) -> usize {
        self.scenario.jobs.len()
    }

    pub(crate) fn plane_count(&self) -> usize {
        self.scenario.planes.len()
    }

    pub(crate) fn client_count(&self) -> usize {
        self.scenario.clients.len()
    }

    pub(crate) fn slot_name(&self, s: usize) -> String {
        self.idx.slots[s].to_string()
    }

    pub(crate) fn pos_name(&self, p: usize) -> String {
        self.idx.positions[p].to_string()
    }

    pub(crate) fn job_name(&self, j: usize) -> &str {
        &self.scenario.jobs[j].id
    }

    pub(crate) fn plane_name(&self, r: usize) -> &str {
        &self.scenario.planes[r].id
    }

    pub(crate) fn client_name(&self, c: usize) -> &str {
        &self.scenario.clients[c].id
    }

    /// Job indices owned by plane `r`, in task order.
    pub(crate) fn jobs_of_plane(&self, r: usize) -> &[usize] {
        &self.scenario.planes[r].jobs
    }
}
