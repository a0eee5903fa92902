//! Tardiness aggregation per aircraft and client, and the client-visits-
//! position coupling.

use super::Assembler;
use crate::model::expr::{Comparison, LinearExpr};

impl Assembler<'_> {
    /// An aircraft's delay is at least its closing job's overrun of the
    /// late-finish deadline: `plane_delay >= finish_job(last) - LF`.
    pub(crate) fn plane_delay(&mut self) {
        for r in 0..self.plane_count() {
            let last = self.params.last_job_of_plane(r);
            let expr = LinearExpr::term(self.vars.plane_delay(r), 1.0)
                .add(self.vars.finish_job(last), -1.0);
            self.push(
                format!("plane_delay_floor({})", self.plane_name(r)),
                expr,
                Comparison::GreaterEq,
                -self.params.late_finish(r),
            );
        }
    }

    /// Client delay is the sum of its aircraft's delays.
    pub(crate) fn client_delay(&mut self) {
        for c in 0..self.client_count() {
            let planes = self.params.planes_of_client(c).to_vec();
            let expr = LinearExpr::term(self.vars.client_delay(c), 1.0)
                .add_sum(planes.iter().map(|&r| self.vars.plane_delay(r)), -1.0);
            self.push(
                format!("client_delay_sum({})", self.client_name(c)),
                expr,
                Comparison::Equal,
                0.0,
            );
        }
    }

    /// A client visits every position one of its aircraft visits.
    pub(crate) fn client_in_position(&mut self) {
        for c in 0..self.client_count() {
            for p in 0..self.position_count() {
                let planes = self.params.planes_of_client(c).to_vec();
                let expr = LinearExpr::term(self.vars.client_pos(c, p), 1.0)
                    .add_sum(planes.iter().map(|&r| self.vars.y_pos(r, p)), -1.0);
                self.push(
                    format!(
                        "client_in_position({},{})",
                        self.client_name(c),
                        self.pos_name(p)
                    ),
                    expr,
                    Comparison::GreaterEq,
                    0.0,
                );
            }
        }
    }
}
