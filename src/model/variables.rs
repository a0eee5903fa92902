//! Typed catalog of every decision variable in the assignment model.
//!
//! Variables live in one dense, deterministically ordered vector; the typed
//! accessors compute flat offsets from (slot, position, job/plane/client)
//! indices. Interference booleans are indexed by quadruple position in the
//! sparse interference domain.

use super::expr::VarId;
use crate::scenario::{IndexSets, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDomain {
    Binary,
    /// Continuous, `>= 0`, unbounded above.
    NonNegative,
}

#[derive(Debug, Clone)]
pub struct VarDef {
    pub name: String,
    pub domain: VarDomain,
}

/// Dimensions of the variable grid.
#[derive(Debug, Clone, Copy)]
struct Dims {
    slots: usize,
    positions: usize,
    jobs: usize,
    planes: usize,
    clients: usize,
    quads: usize,
}

/// Offsets of each variable block in the dense vector.
#[derive(Debug, Clone, Copy, Default)]
struct Offsets {
    x: usize,
    y_plane: usize,
    y_pos: usize,
    pres: usize,
    idle: usize,
    switch_pos: usize,
    client_pos: usize,
    alpha: usize,
    beta_start: usize,
    beta_finish: usize,
    start_slot: usize,
    finish_slot: usize,
    dur_slot: usize,
    start_frag: usize,
    finish_frag: usize,
    dur_frag: usize,
    start_job: usize,
    finish_job: usize,
    start_pres: usize,
    finish_pres: usize,
    dur_pres: usize,
    plane_delay: usize,
    client_delay: usize,
}

#[derive(Debug, Clone)]
pub struct VariableCatalog {
    defs: Vec<VarDef>,
    dims: Dims,
    offsets: Offsets,
}

impl VariableCatalog {
    pub fn build(scenario: &Scenario, idx: &IndexSets) -> Self {
        let dims = Dims {
            slots: idx.slots.len(),
            positions: idx.positions.len(),
            jobs: scenario.jobs.len(),
            planes: scenario.planes.len(),
            clients: scenario.clients.len(),
            quads: idx.interference_quads.len(),
        };

        let slot_names: Vec<String> = idx.slots.iter().map(|s| s.to_string()).collect();
        let pos_names: Vec<String> = idx.positions.iter().map(|p| p.to_string()).collect();
        let job_names: Vec<&str> = scenario.jobs.iter().map(|j| j.id.as_str()).collect();
        let plane_names: Vec<&str> = scenario.planes.iter().map(|r| r.id.as_str()).collect();
        let client_names: Vec<&str> = scenario.clients.iter().map(|c| c.id.as_str()).collect();

        let mut defs: Vec<VarDef> = Vec::new();
        let mut offsets = Offsets::default();

        let spj = |defs: &mut Vec<VarDef>, tag: &str, domain: VarDomain| {
            let offset = defs.len();
            for s in &slot_names {
                for p in &pos_names {
                    for j in &job_names {
                        defs.push(VarDef {
                            name: format!("{tag}({s},{p},{j})"),
                            domain,
                        });
                    }
                }
            }
            offset
        };
        let spr = |defs: &mut Vec<VarDef>, tag: &str, domain: VarDomain| {
            let offset = defs.len();
            for s in &slot_names {
                for p in &pos_names {
                    for r in &plane_names {
                        defs.push(VarDef {
                            name: format!("{tag}({s},{p},{r})"),
                            domain,
                        });
                    }
                }
            }
            offset
        };
        let sp = |defs: &mut Vec<VarDef>, tag: &str, domain: VarDomain| {
            let offset = defs.len();
            for s in &slot_names {
                for p in &pos_names {
                    defs.push(VarDef {
                        name: format!("{tag}({s},{p})"),
                        domain,
                    });
                }
            }
            offset
        };
        let quad_block = |defs: &mut Vec<VarDef>, tag: &str| {
            let offset = defs.len();
            for quad in &idx.interference_quads {
                defs.push(VarDef {
                    name: format!(
                        "{tag}({},{},{},{})",
                        quad.slot_a, quad.slot_b, pos_names[quad.pos_a], pos_names[quad.pos_b]
                    ),
                    domain: VarDomain::Binary,
                });
            }
            offset
        };

        offsets.x = spj(&mut defs, "x", VarDomain::Binary);
        offsets.y_plane = spr(&mut defs, "y_plane", VarDomain::Binary);

        offsets.y_pos = defs.len();
        for r in &plane_names {
            for p in &pos_names {
                defs.push(VarDef {
                    name: format!("y_pos({r},{p})"),
                    domain: VarDomain::Binary,
                });
            }
        }

        offsets.pres = spr(&mut defs, "pres", VarDomain::Binary);
        offsets.idle = spr(&mut defs, "idle", VarDomain::Binary);
        offsets.switch_pos = sp(&mut defs, "switch", VarDomain::Binary);

        offsets.client_pos = defs.len();
        for c in &client_names {
            for p in &pos_names {
                defs.push(VarDef {
                    name: format!("client_pos({c},{p})"),
                    domain: VarDomain::Binary,
                });
            }
        }

        offsets.alpha = quad_block(&mut defs, "alpha");
        offsets.beta_start = quad_block(&mut defs, "beta_start");
        offsets.beta_finish = quad_block(&mut defs, "beta_finish");

        offsets.start_slot = sp(&mut defs, "start_slot", VarDomain::NonNegative);
        offsets.finish_slot = sp(&mut defs, "finish_slot", VarDomain::NonNegative);
        offsets.dur_slot = sp(&mut defs, "dur_slot", VarDomain::NonNegative);

        offsets.start_frag = spj(&mut defs, "start_frag", VarDomain::NonNegative);
        offsets.finish_frag = spj(&mut defs, "finish_frag", VarDomain::NonNegative);
        offsets.dur_frag = spj(&mut defs, "dur_frag", VarDomain::NonNegative);

        offsets.start_job = defs.len();
        for j in &job_names {
            defs.push(VarDef {
                name: format!("start_job({j})"),
                domain: VarDomain::NonNegative,
            });
        }
        offsets.finish_job = defs.len();
        for j in &job_names {
            defs.push(VarDef {
                name: format!("finish_job({j})"),
                domain: VarDomain::NonNegative,
            });
        }

        offsets.start_pres = spr(&mut defs, "start_pres", VarDomain::NonNegative);
        offsets.finish_pres = spr(&mut defs, "finish_pres", VarDomain::NonNegative);
        offsets.dur_pres = spr(&mut defs, "dur_pres", VarDomain::NonNegative);

        offsets.plane_delay = defs.len();
        for r in &plane_names {
            defs.push(VarDef {
                name: format!("plane_delay({r})"),
                domain: VarDomain::NonNegative,
            });
        }
        offsets.client_delay = defs.len();
        for c in &client_names {
            defs.push(VarDef {
                name: format!("client_delay({c})"),
                domain: VarDomain::NonNegative,
            });
        }

        Self {
            defs,
            dims,
            offsets,
        }
    }

    pub fn defs(&self) -> &[VarDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn name(&self, var: VarId) -> &str {
        &self.defs[var.index()].name
    }

    pub fn binary_count(&self) -> usize {
        self.defs
            .iter()
            .filter(|d| d.domain == VarDomain::Binary)
            .count()
    }

    fn spj(&self, base: usize, s: usize, p: usize, j: usize) -> VarId {
        debug_assert!(s < self.dims.slots && p < self.dims.positions && j < self.dims.jobs);
        VarId((base + (s * self.dims.positions + p) * self.dims.jobs + j) as u32)
    }

    fn spr(&self, base: usize, s: usize, p: usize, r: usize) -> VarId {
        debug_assert!(s < self.dims.slots && p < self.dims.positions && r < self.dims.planes);
        VarId((base + (s * self.dims.positions + p) * self.dims.planes + r) as u32)
    }

    fn sp(&self, base: usize, s: usize, p: usize) -> VarId {
        debug_assert!(s < self.dims.slots && p < self.dims.positions);
        VarId((base + s * self.dims.positions + p) as u32)
    }

    /// Job `j` is assigned to slot `s` in position `p`.
    pub fn x(&self, s: usize, p: usize, j: usize) -> VarId {
        self.spj(self.offsets.x, s, p, j)
    }

    /// Plane `r` has a working job in slot `s` at position `p`.
    pub fn y_plane(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.y_plane, s, p, r)
    }

    /// Plane `r` appears in position `p` at some slot.
    pub fn y_pos(&self, r: usize, p: usize) -> VarId {
        debug_assert!(r < self.dims.planes && p < self.dims.positions);
        VarId((self.offsets.y_pos + r * self.dims.positions + p) as u32)
    }

    /// Plane `r` is present (working or idle) in slot `s` at position `p`.
    pub fn pres(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.pres, s, p, r)
    }

    /// Plane `r` is present but not working in slot `s` at position `p`.
    pub fn idle(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.idle, s, p, r)
    }

    /// Position `p` changes occupant between slot `s` and its successor.
    pub fn switch_pos(&self, s: usize, p: usize) -> VarId {
        self.sp(self.offsets.switch_pos, s, p)
    }

    /// Client `c` has at least one aircraft visiting position `p`.
    pub fn client_pos(&self, c: usize, p: usize) -> VarId {
        debug_assert!(c < self.dims.clients && p < self.dims.positions);
        VarId((self.offsets.client_pos + c * self.dims.positions + p) as u32)
    }

    /// Interference active for quadruple `q`.
    pub fn alpha(&self, q: usize) -> VarId {
        debug_assert!(q < self.dims.quads);
        VarId((self.offsets.alpha + q) as u32)
    }

    /// Start-ordering boolean for quadruple `q`.
    pub fn beta_start(&self, q: usize) -> VarId {
        debug_assert!(q < self.dims.quads);
        VarId((self.offsets.beta_start + q) as u32)
    }

    /// Finish-ordering boolean for quadruple `q`.
    pub fn beta_finish(&self, q: usize) -> VarId {
        debug_assert!(q < self.dims.quads);
        VarId((self.offsets.beta_finish + q) as u32)
    }

    pub fn start_slot(&self, s: usize, p: usize) -> VarId {
        self.sp(self.offsets.start_slot, s, p)
    }

    pub fn finish_slot(&self, s: usize, p: usize) -> VarId {
        self.sp(self.offsets.finish_slot, s, p)
    }

    pub fn dur_slot(&self, s: usize, p: usize) -> VarId {
        self.sp(self.offsets.dur_slot, s, p)
    }

    /// Start of job `j`'s fragment inside cell `(s, p)`.
    pub fn start_frag(&self, s: usize, p: usize, j: usize) -> VarId {
        self.spj(self.offsets.start_frag, s, p, j)
    }

    pub fn finish_frag(&self, s: usize, p: usize, j: usize) -> VarId {
        self.spj(self.offsets.finish_frag, s, p, j)
    }

    pub fn dur_frag(&self, s: usize, p: usize, j: usize) -> VarId {
        self.spj(self.offsets.dur_frag, s, p, j)
    }

    pub fn start_job(&self, j: usize) -> VarId {
        debug_assert!(j < self.dims.jobs);
        VarId((self.offsets.start_job + j) as u32)
    }

    pub fn finish_job(&self, j: usize) -> VarId {
        debug_assert!(j < self.dims.jobs);
        VarId((self.offsets.finish_job + j) as u32)
    }

    pub fn start_pres(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.start_pres, s, p, r)
    }

    pub fn finish_pres(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.finish_pres, s, p, r)
    }

    pub fn dur_pres(&self, s: usize, p: usize, r: usize) -> VarId {
        self.spr(self.offsets.dur_pres, s, p, r)
    }

    pub fn plane_delay(&self, r: usize) -> VarId {
        debug_assert!(r < self.dims.planes);
        VarId((self.offsets.plane_delay + r) as u32)
    }

    pub fn client_delay(&self, c: usize) -> VarId {
        debug_assert!(c < self.dims.clients);
        VarId((self.offsets.client_delay + c) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HangarLayout;
    use crate::scenario::JobRow;
    use std::collections::HashSet;

    fn catalog() -> (Scenario, IndexSets, VariableCatalog) {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("B1", 1.0, "B", 1.0, 0.0),
        ];
        let scenario = Scenario::build(
            &rows,
            &[],
            HangarLayout::new(2, vec![(crate::layout::Position::Stand(1), crate::layout::Position::Stand(2))]),
        )
        .unwrap();
        let idx = IndexSets::build(&scenario);
        let catalog = VariableCatalog::build(&scenario, &idx);
        (scenario, idx, catalog)
    }

    #[test]
    fn names_are_unique() {
        let (_, _, catalog) = catalog();
        let names: HashSet<&str> = catalog.defs().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn accessor_names_match_blocks() {
        let (scenario, idx, catalog) = catalog();
        let a1 = scenario.job_index("A1").unwrap();
        let v = catalog.x(0, 1, a1);
        assert_eq!(catalog.name(v), "x(slot0,position2,A1)");
        let v = catalog.start_job(a1);
        assert_eq!(catalog.name(v), "start_job(A1)");
        let v = catalog.pres(2, idx.outside_index(), 1);
        assert_eq!(catalog.name(v), "pres(slot2,outside,B)");
        let v = catalog.switch_pos(0, 0);
        assert_eq!(catalog.name(v), "switch(slot0,position1)");
    }

    #[test]
    fn quad_variables_follow_the_sparse_domain() {
        let (_, idx, catalog) = catalog();
        assert!(!idx.interference_quads.is_empty());
        let q = idx.interference_quads.len() - 1;
        assert_eq!(catalog.alpha(q).index() + 1, catalog.beta_start(0).index());
        let name = catalog.name(catalog.alpha(0));
        assert!(name.starts_with("alpha(slot0,slot0,"));
    }

    #[test]
    fn domains_split_binary_and_continuous() {
        let (_, _, catalog) = catalog();
        assert!(catalog.binary_count() > 0);
        assert!(catalog.binary_count() < catalog.len());
        let first_start = catalog.start_slot(0, 0);
        assert_eq!(
            catalog.defs()[first_start.index()].domain,
            VarDomain::NonNegative
        );
    }
}
