//! Presence and movement: where each aircraft is in every slot, idle marks,
//! occupancy limits, continuity, presence times, and switch counting.
//!
//! Presence is deliberately wider than work (`y_plane`): an aircraft waiting
//! on a stand between two of its jobs is present without working, and that
//! distinction is what makes the interference and switch families sound.

use super::Assembler;
use crate::model::expr::{Comparison, LinearExpr};

impl Assembler<'_> {
    /// Work indicator per aircraft: `y_plane[s,p,r] = sum of x over r's jobs`.
    pub(crate) fn plane_in_slot(&mut self) {
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for r in 0..self.plane_count() {
                    let jobs = self.jobs_of_plane(r).to_vec();
                    let expr = LinearExpr::term(self.vars.y_plane(s, p, r), 1.0)
                        .add_sum(jobs.iter().map(|&j| self.vars.x(s, p, j)), -1.0);
                    self.push(
                        format!(
                            "plane_in_slot({},{},{})",
                            self.slot_name(s),
                            self.pos_name(p),
                            self.plane_name(r)
                        ),
                        expr,
                        Comparison::Equal,
                        0.0,
                    );
                }
            }
        }
    }

    /// Everything presence-related, emitted per the (slot, position, plane)
    /// grid: position visit flags, present-if-work, presence accounting,
    /// single occupancy, continuity against switches, idle bounds, and the
    /// big-M linkage pinning presence times to slot times. M is the horizon
    /// constant throughout.
    pub(crate) fn presence(&mut self) {
        let m = self.params.big_m();

        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                for r in 0..self.plane_count() {
                    let cell = format!(
                        "{},{},{}",
                        self.slot_name(s),
                        self.pos_name(p),
                        self.plane_name(r)
                    );
                    let y = self.vars.y_plane(s, p, r);
                    let pres = self.vars.pres(s, p, r);
                    let idle = self.vars.idle(s, p, r);

                    // Visiting a position at any slot raises the visit flag.
                    let expr = LinearExpr::term(self.vars.y_pos(r, p), 1.0).add(y, -1.0);
                    self.push(
                        format!("plane_in_position({cell})"),
                        expr,
                        Comparison::GreaterEq,
                        0.0,
                    );

                    // Working somewhere implies being there.
                    let expr = LinearExpr::term(pres, 1.0).add(y, -1.0);
                    self.push(
                        format!("present_if_work({cell})"),
                        expr,
                        Comparison::GreaterEq,
                        0.0,
                    );

                    // Idle is presence without work: pres - y <= idle <= pres.
                    let expr = LinearExpr::term(idle, 1.0).add(pres, -1.0).add(y, 1.0);
                    self.push(
                        format!("idle_floor({cell})"),
                        expr,
                        Comparison::GreaterEq,
                        0.0,
                    );
                    let expr = LinearExpr::term(idle, 1.0).add(pres, -1.0);
                    self.push(format!("idle_cap({cell})"), expr, Comparison::LessEq, 0.0);

                    // Presence times equal the slot times where present and
                    // collapse to zero where absent.
                    let start_pres = self.vars.start_pres(s, p, r);
                    let start_slot = self.vars.start_slot(s, p);
                    let expr = LinearExpr::term(start_pres, 1.0)
                        .add(start_slot, -1.0)
                        .add(pres, m);
                    self.push(
                        format!("presence_start_ub({cell})"),
                        expr,
                        Comparison::LessEq,
                        m,
                    );
                    let expr = LinearExpr::term(start_pres, 1.0)
                        .add(start_slot, -1.0)
                        .add(pres, -m);
                    self.push(
                        format!("presence_start_lb({cell})"),
                        expr,
                        Comparison::GreaterEq,
                        -m,
                    );
                    let expr = LinearExpr::term(start_pres, 1.0).add(pres, -m);
                    self.push(
                        format!("presence_start_gate({cell})"),
                        expr,
                        Comparison::LessEq,
                        0.0,
                    );

                    let finish_pres = self.vars.finish_pres(s, p, r);
                    let finish_slot = self.vars.finish_slot(s, p);
                    let expr = LinearExpr::term(finish_pres, 1.0)
                        .add(finish_slot, -1.0)
                        .add(pres, -m);
                    self.push(
                        format!("presence_finish_lb({cell})"),
                        expr,
                        Comparison::GreaterEq,
                        -m,
                    );
                    let expr = LinearExpr::term(finish_pres, 1.0)
                        .add(finish_slot, -1.0)
                        .add(pres, m);
                    self.push(
                        format!("presence_finish_ub({cell})"),
                        expr,
                        Comparison::LessEq,
                        m,
                    );
                    let expr = LinearExpr::term(finish_pres, 1.0).add(pres, -m);
                    self.push(
                        format!("presence_finish_gate({cell})"),
                        expr,
                        Comparison::LessEq,
                        0.0,
                    );
                }
            }
        }

        // Presence accounting: per slot an aircraft is present exactly as
        // often as it works or idles (at most once, by single occupancy).
        for s in 0..self.slot_count() {
            for r in 0..self.plane_count() {
                let mut expr = LinearExpr::new();
                for p in 0..self.position_count() {
                    expr = expr
                        .add(self.vars.pres(s, p, r), 1.0)
                        .add(self.vars.y_plane(s, p, r), -1.0)
                        .add(self.vars.idle(s, p, r), -1.0);
                }
                self.push(
                    format!(
                        "presence_accounting({},{})",
                        self.slot_name(s),
                        self.plane_name(r)
                    ),
                    expr,
                    Comparison::Equal,
                    0.0,
                );
            }
        }

        // One aircraft per position per slot.
        for s in 0..self.slot_count() {
            for p in 0..self.position_count() {
                let expr = LinearExpr::new()
                    .add_sum((0..self.plane_count()).map(|r| self.vars.pres(s, p, r)), 1.0);
                self.push(
                    format!(
                        "single_plane_per_position({},{})",
                        self.slot_name(s),
                        self.pos_name(p)
                    ),
                    expr,
                    Comparison::LessEq,
                    1.0,
                );
            }
        }

        // No teleportation: appearing at or vanishing from a position across
        // adjacent slots charges a switch to the earlier slot.
        let sequence = self.idx.slot_sequence.clone();
        for (prev, slot, p) in sequence {
            let (sp, sc) = (prev.index(), slot.index());
            for r in 0..self.plane_count() {
                let cell = format!("{},{},{}", prev, self.pos_name(p), self.plane_name(r));
                let switch = self.vars.switch_pos(sp, p);
                let expr = LinearExpr::term(self.vars.pres(sp, p, r), 1.0)
                    .add(self.vars.pres(sc, p, r), -1.0)
                    .add(switch, -1.0);
                self.push(
                    format!("presence_departure({cell})"),
                    expr,
                    Comparison::LessEq,
                    0.0,
                );
                let expr = LinearExpr::term(self.vars.pres(sc, p, r), 1.0)
                    .add(self.vars.pres(sp, p, r), -1.0)
                    .add(switch, -1.0);
                self.push(
                    format!("presence_arrival({cell})"),
                    expr,
                    Comparison::LessEq,
                    0.0,
                );
            }
        }
    }

    /// A position hosting different aircraft on consecutive slots counts a
    /// switch on the earlier slot.
    pub(crate) fn switch_counting(&mut self) {
        let tuples = self.idx.switch_tuples.clone();
        for t in tuples {
            let (s, next) = (t.slot.index(), t.next.index());
            let expr = LinearExpr::term(self.vars.pres(s, t.position, t.plane_a), 1.0)
                .add(self.vars.pres(next, t.position, t.plane_b), 1.0)
                .add(self.vars.switch_pos(s, t.position), -1.0);
            self.push(
                format!(
                    "switch_count({},{},{},{},{})",
                    self.pos_name(t.position),
                    t.slot,
                    t.next,
                    self.plane_name(t.plane_a),
                    self.plane_name(t.plane_b)
                ),
                expr,
                Comparison::LessEq,
                1.0,
            );
        }
    }
}
