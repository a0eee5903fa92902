//! Interference between position pairs, over the sparse quadruple domain:
//! ordering booleans, activation, and fragment anti-overlap.
//!
//! The presence-time sums below stand in for the occupant's times: absent
//! aircraft have their presence times gated to zero, so `sum_r start_pres`
//! is the presence start of whoever occupies the cell (or zero). This is
//! the linear substitute for the bilinear `start_pres * pres` products.

use super::Assembler;
use crate::model::expr::{Comparison, LinearExpr};

impl Assembler<'_> {
    fn quad_name(&self, q: usize) -> String {
        let quad = self.idx.interference_quads[q];
        format!(
            "{},{},{},{}",
            quad.slot_a,
            quad.slot_b,
            self.pos_name(quad.pos_a),
            self.pos_name(quad.pos_b)
        )
    }

    /// `beta_start` turns on when cell (s',p') starts after cell (s,p):
    /// `H * betaS + sum_r start_pres(s,p) >= sum_r start_pres(s',p')`.
    /// H is the horizon constant.
    pub(crate) fn beta_start(&mut self) {
        let h = self.params.big_m();
        for q in 0..self.idx.interference_quads.len() {
            let quad = self.idx.interference_quads[q];
            let (sa, sb) = (quad.slot_a.index(), quad.slot_b.index());
            let expr = LinearExpr::term(self.vars.beta_start(q), h)
                .add_sum(
                    (0..self.plane_count()).map(|r| self.vars.start_pres(sa, quad.pos_a, r)),
                    1.0,
                )
                .add_sum(
                    (0..self.plane_count()).map(|r| self.vars.start_pres(sb, quad.pos_b, r)),
                    -1.0,
                );
            self.push(
                format!("beta_start_def({})", self.quad_name(q)),
                expr,
                Comparison::GreaterEq,
                0.0,
            );
        }
    }

    /// `beta_finish` turns on when cell (s,p) finishes after cell (s',p')
    /// starts: `H * betaF + sum_r start_pres(s',p') >= sum_r finish_pres(s,p)`.
    /// H is the horizon constant.
    pub(crate) fn beta_finish(&mut self) {
        let h = self.params.big_m();
        for q in 0..self.idx.interference_quads.len() {
            let quad = self.idx.interference_quads[q];
            let (sa, sb) = (quad.slot_a.index(), quad.slot_b.index());
            let expr = LinearExpr::term(self.vars.beta_finish(q), h)
                .add_sum(
                    (0..self.plane_count()).map(|r| self.vars.start_pres(sb, quad.pos_b, r)),
                    1.0,
                )
                .add_sum(
                    (0..self.plane_count()).map(|r| self.vars.finish_pres(sa, quad.pos_a, r)),
                    -1.0,
                );
            self.push(
                format!("beta_finish_def({})", self.quad_name(q)),
                expr,
                Comparison::GreaterEq,
                0.0,
            );
        }
    }

    /// Both orderings at once mean the intervals overlap, which activates
    /// the interference mark: `1 + alpha >= betaS + betaF`.
    pub(crate) fn interference_activation(&mut self) {
        for q in 0..self.idx.interference_quads.len() {
            let expr = LinearExpr::term(self.vars.beta_start(q), 1.0)
                .add(self.vars.beta_finish(q), 1.0)
                .add(self.vars.alpha(q), -1.0);
            self.push(
                format!("interference({})", self.quad_name(q)),
                expr,
                Comparison::LessEq,
                1.0,
            );
        }
    }

    /// A job split across two cells of the interference domain must have
    /// its fragments ordered: `1 + betaS + betaF >= x(s,p,j) + x(s',p',j)`.
    pub(crate) fn fragment_order(&mut self) {
        for q in 0..self.idx.interference_quads.len() {
            let quad = self.idx.interference_quads[q];
            let (sa, sb) = (quad.slot_a.index(), quad.slot_b.index());
            if (sa, quad.pos_a) == (sb, quad.pos_b) {
                continue;
            }
            for j in 0..self.job_count() {
                let expr = LinearExpr::term(self.vars.x(sa, quad.pos_a, j), 1.0)
                    .add(self.vars.x(sb, quad.pos_b, j), 1.0)
                    .add(self.vars.beta_start(q), -1.0)
                    .add(self.vars.beta_finish(q), -1.0);
                self.push(
                    format!("fragment_order({},{})", self.quad_name(q), self.job_name(j)),
                    expr,
                    Comparison::LessEq,
                    1.0,
                );
            }
        }
    }
}
