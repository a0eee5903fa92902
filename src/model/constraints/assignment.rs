//! Assignment structure: one job per cell, exactly one cell per job,
//! consecutive slot usage, fragment durations, and marker routing.

use super::Assembler;
use crate::model::expr::{Comparison, LinearExpr};

impl Assembler<'_> {
    /// Each slot of each position holds at most one job.
    pub(crate) fn single_job_per_slot(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                let expr = LinearExpr::new()
                    .add_sum((0..self.job_count()).map(|j| self.vars.x(s, p, j)), 1.0);
                self.push(
                    format!(
                        "single_job_per_slot({},{})",
                        self.slot_name(s),
                        self.pos_name(p)
                    ),
                    expr,
                    Comparison::LessEq,
                    1.0,
                );
            }
        }
    }

    /// Fragment duration identity: `dur = finish - start` per cell and job.
    pub(crate) fn fragment_duration(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for j in 0..self.job_count() {
                    let expr = LinearExpr::term(self.vars.dur_frag(s, p, j), 1.0)
                        .add(self.vars.finish_frag(s, p, j), -1.0)
                        .add(self.vars.start_frag(s, p, j), 1.0);
                    self.push(
                        format!(
                            "fragment_duration({},{},{})",
                            self.slot_name(s),
                            self.pos_name(p),
                            self.job_name(j)
                        ),
                        expr,
                        Comparison::Equal,
                        0.0,
                    );
                }
            }
        }
    }

    /// Fragment times collapse to zero in cells the job is not assigned to.
    /// M is the horizon constant.
    pub(crate) fn fragment_time_gates(&mut self) {
        let m = self.params.big_m();
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for j in 0..self.job_count() {
                    let x = self.vars.x(s, p, j);
                    let start = LinearExpr::term(self.vars.start_frag(s, p, j), 1.0).add(x, -m);
                    self.push(
                        format!(
                            "fragment_start_gate({},{},{})",
                            self.slot_name(s),
                            self.pos_name(p),
                            self.job_name(j)
                        ),
                        start,
                        Comparison::LessEq,
                        0.0,
                    );
                    let finish = LinearExpr::term(self.vars.finish_frag(s, p, j), 1.0).add(x, -m);
                    self.push(
                        format!(
                            "fragment_finish_gate({},{},{})",
                            self.slot_name(s),
                            self.pos_name(p),
                            self.job_name(j)
                        ),
                        finish,
                        Comparison::LessEq,
                        0.0,
                    );
                }
            }
        }
    }

    /// A job's fragments add up to its demanded duration.
    pub(crate) fn job_duration(&mut self) {
        for j in 0..self.job_count() {
            let mut expr = LinearExpr::new();
            for s in 0..self.slot_count() {
                for p in 0..self.position_count() {
                    expr = expr.add(self.vars.dur_frag(s, p, j), 1.0);
                }
            }
            self.push(
                format!("job_duration({})", self.job_name(j)),
                expr,
                Comparison::Equal,
                self.params.job_duration(j),
            );
        }
    }

    /// A slot is only used when all earlier slots of its position are.
    pub(crate) fn consecutive_slots(&mut self) {
        for &(prev, slot, p) in &self.idx.slot_sequence.clone() {
            let (sp, sc) = (prev.index(), slot.index());
            let expr = LinearExpr::new()
                .add_sum((0..self.job_count()).map(|j| self.vars.x(sc, p, j)), 1.0)
                .add_sum((0..self.job_count()).map(|j| self.vars.x(sp, p, j)), -1.0);
            self.push(
                format!("consecutive_slots({},{})", slot, self.pos_name(p)),
                expr,
                Comparison::LessEq,
                0.0,
            );
        }
    }

    /// Every job lands in exactly one cell.
    pub(crate) fn one_placement_per_job(&mut self) {
        for j in 0..self.job_count() {
            let mut expr = LinearExpr::new();
            for s in 0..self.slot_count() {
                for p in 0..self.position_count() {
                    expr = expr.add(self.vars.x(s, p, j), 1.0);
                }
            }
            self.push(
                format!("one_placement({})", self.job_name(j)),
                expr,
                Comparison::Equal,
                1.0,
            );
        }
    }

    /// The assigned cell carries the full demanded duration; unassigned
    /// cells carry none: `finish - start = duration * x`.
    pub(crate) fn assigned_duration(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for j in 0..self.job_count() {
                    let expr = LinearExpr::term(self.vars.finish_frag(s, p, j), 1.0)
                        .add(self.vars.start_frag(s, p, j), -1.0)
                        .add(self.vars.x(s, p, j), -self.params.job_duration(j));
                    self.push(
                        format!(
                            "assigned_duration({},{},{})",
                            self.slot_name(s),
                            self.pos_name(p),
                            self.job_name(j)
                        ),
                        expr,
                        Comparison::Equal,
                        0.0,
                    );
                }
            }
        }
    }

    /// Slot duration aggregates its fragments.
    pub(crate) fn slot_duration(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                let expr = LinearExpr::term(self.vars.dur_slot(s, p), 1.0)
                    .add_sum((0..self.job_count()).map(|j| self.vars.dur_frag(s, p, j)), -1.0);
                self.push(
                    format!("slot_duration({},{})", self.slot_name(s), self.pos_name(p)),
                    expr,
                    Comparison::Equal,
                    0.0,
                );
            }
        }
    }

    /// Entry/exit markers take place outside the hangar.
    pub(crate) fn markers_outside(&mut self) {
        let outside = self.idx.outside_index();
        for j in 0..self.job_count() {
            if !self.scenario.jobs[j].kind.is_marker() {
                continue;
            }
            let expr = LinearExpr::new().add_sum(
                (0..self.slot_count()).map(|s| self.vars.x(s, outside, j)),
                1.0,
            );
            self.push(
                format!("marker_outside({})", self.job_name(j)),
                expr,
                Comparison::Equal,
                1.0,
            );
        }
    }
}
