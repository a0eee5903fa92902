//! Continuous time structure: global job times, slot times, slot ordering,
//! technological precedence, and per-aircraft time windows.

use super::Assembler;
use crate::model::expr::{Comparison, LinearExpr};

impl Assembler<'_> {
    /// Pins the global job times to the assigned fragment's times via big-M:
    /// `|start_job - start_frag| <= M (1 - x)` and the same for finish.
    /// M is the horizon constant.
    pub(crate) fn global_job_times(&mut self) {
        let m = self.params.big_m();
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for j in 0..self.job_count() {
                    let cell = format!(
                        "{},{},{}",
                        self.slot_name(s),
                        self.pos_name(p),
                        self.job_name(j)
                    );
                    let x = self.vars.x(s, p, j);

                    let ub = LinearExpr::term(self.vars.start_job(j), 1.0)
                        .add(self.vars.start_frag(s, p, j), -1.0)
                        .add(x, m);
                    self.push(format!("start_job_ub({cell})"), ub, Comparison::LessEq, m);

                    let lb = LinearExpr::term(self.vars.start_job(j), 1.0)
                        .add(self.vars.start_frag(s, p, j), -1.0)
                        .add(x, -m);
                    self.push(format!("start_job_lb({cell})"), lb, Comparison::GreaterEq, -m);

                    let lb = LinearExpr::term(self.vars.finish_job(j), 1.0)
                        .add(self.vars.finish_frag(s, p, j), -1.0)
                        .add(x, -m);
                    self.push(
                        format!("finish_job_lb({cell})"),
                        lb,
                        Comparison::GreaterEq,
                        -m,
                    );

                    let ub = LinearExpr::term(self.vars.finish_job(j), 1.0)
                        .add(self.vars.finish_frag(s, p, j), -1.0)
                        .add(x, m);
                    self.push(format!("finish_job_ub({cell})"), ub, Comparison::LessEq, m);
                }
            }
        }
    }

    /// No job runs backwards.
    pub(crate) fn start_before_finish(&mut self) {
        for j in 0..self.job_count() {
            let expr = LinearExpr::term(self.vars.start_job(j), 1.0)
                .add(self.vars.finish_job(j), -1.0);
            self.push(
                format!("start_before_finish({})", self.job_name(j)),
                expr,
                Comparison::LessEq,
                0.0,
            );
        }
    }

    /// Slot times aggregate their fragments. With at most one job per cell
    /// these sums are the occupant's times, and zero for empty cells.
    pub(crate) fn slot_times(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                let start = LinearExpr::term(self.vars.start_slot(s, p), 1.0).add_sum(
                    (0..self.job_count()).map(|j| self.vars.start_frag(s, p, j)),
                    -1.0,
                );
                self.push(
                    format!("slot_start({},{})", self.slot_name(s), self.pos_name(p)),
                    start,
                    Comparison::Equal,
                    0.0,
                );
                let finish = LinearExpr::term(self.vars.finish_slot(s, p), 1.0).add_sum(
                    (0..self.job_count()).map(|j| self.vars.finish_frag(s, p, j)),
                    -1.0,
                );
                self.push(
                    format!("slot_finish({},{})", self.slot_name(s), self.pos_name(p)),
                    finish,
                    Comparison::Equal,
                    0.0,
                );
            }
        }
    }

    /// Occupied slots run forward in time within a position:
    /// `start[s] >= finish[prev] - M (1 - sum_j x[s,p,j])`.
    ///
    /// The M gate (M = horizon) releases empty slots, whose times are pinned
    /// to zero by the fragment gates; the consecutive-use family keeps the
    /// occupied slots a prefix, so the chain binds exactly where it should.
    pub(crate) fn slot_order(&mut self) {
        let m = self.params.big_m();
        let sequence = self.idx.slot_sequence.clone();
        for (prev, slot, p) in sequence {
            let (sp, sc) = (prev.index(), slot.index());
            let expr = LinearExpr::term(self.vars.start_slot(sc, p), 1.0)
                .add(self.vars.finish_slot(sp, p), -1.0)
                .add_sum((0..self.job_count()).map(|j| self.vars.x(sc, p, j)), -m);
            self.push(
                format!("slot_order({},{},{})", prev, slot, self.pos_name(p)),
                expr,
                Comparison::GreaterEq,
                -m,
            );
        }
    }

    /// Technological precedence: a job starts after its predecessor ends.
    pub(crate) fn precedence(&mut self) {
        let pairs = self.idx.precedence.clone();
        for (before, after) in pairs {
            let expr = LinearExpr::term(self.vars.start_job(after), 1.0)
                .add(self.vars.finish_job(before), -1.0);
            self.push(
                format!(
                    "precedence({},{})",
                    self.job_name(before),
                    self.job_name(after)
                ),
                expr,
                Comparison::GreaterEq,
                0.0,
            );
        }
    }

    /// Per-aircraft windows: every job of the plane starts at or after the
    /// early start and finishes by the late-finish deadline.
    pub(crate) fn time_windows(&mut self) {
        for j in 0..self.job_count() {
            let r = self.params.plane_of_job(j);
            self.push(
                format!("early_start({})", self.job_name(j)),
                LinearExpr::term(self.vars.start_job(j), 1.0),
                Comparison::GreaterEq,
                self.params.early_start(r),
            );
            self.push(
                format!("late_finish({})", self.job_name(j)),
                LinearExpr::term(self.vars.finish_job(j), 1.0),
                Comparison::LessEq,
                self.params.late_finish(r),
            );
        }
    }
}
