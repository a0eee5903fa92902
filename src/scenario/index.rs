//! Derived index sets: slots, the precedence DAG, interference quadruples,
//! switch tuples, and slot-sequence pairs.
//!
//! Everything here is derived deterministically from the scenario so that
//! model assembly (and the MPS it exports) is reproducible run to run.

use super::Scenario;
use crate::layout::{Position, Slot};
use itertools::iproduct;
use log::{debug, warn};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::{BTreeMap, HashMap};

/// Load factor over `jobs / stands` in the slot-count estimate.
const SLOT_LOAD_FACTOR: f64 = 1.5;
/// Extra slots beyond the load estimate so the model stays feasible.
const SLOT_HEADROOM: usize = 5;

/// One cell pair of the sparse interference domain: slot `slot_a` in
/// position `pos_a` against slot `slot_b` in position `pos_b`. Position
/// fields are indices into [`IndexSets::positions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterferenceQuad {
    pub slot_a: Slot,
    pub slot_b: Slot,
    pub pos_a: usize,
    pub pos_b: usize,
}

/// One row of the switch-counting domain: aircraft `plane_a` in `slot` and
/// a different aircraft `plane_b` in the successor slot, same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTuple {
    pub position: usize,
    pub slot: Slot,
    pub next: Slot,
    pub plane_a: usize,
    pub plane_b: usize,
}

/// All derived index sets for one scenario.
#[derive(Debug, Clone)]
pub struct IndexSets {
    pub slots: Vec<Slot>,
    pub positions: Vec<Position>,
    /// Technological precedence edges `(before, after)` as job indices.
    pub precedence: Vec<(usize, usize)>,
    /// Job indices in topological (per-plane task) order.
    pub topo_jobs: Vec<usize>,
    pub interference_quads: Vec<InterferenceQuad>,
    pub switch_tuples: Vec<SwitchTuple>,
    /// `(prev, slot, position)` for every adjacent slot pair and position.
    pub slot_sequence: Vec<(Slot, Slot, usize)>,
    quad_lookup: BTreeMap<(usize, usize, usize, usize), usize>,
    position_lookup: HashMap<Position, usize>,
}

impl IndexSets {
    pub fn build(scenario: &Scenario) -> Self {
        let positions = scenario.layout.positions();
        let position_lookup: HashMap<Position, usize> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i))
            .collect();

        let slots: Vec<Slot> = (0..slot_count(scenario)).map(Slot::new).collect();

        let (precedence, topo_jobs) = precedence_pairs(scenario);

        // The interference domain is sparse by construction: only slot/slot
        // cells of configured position pairs, both orientations.
        let mut interference_quads = Vec::new();
        let mut quad_lookup = BTreeMap::new();
        for (&sa, &sb, (pa, &pos_a), (pb, &pos_b)) in iproduct!(
            slots.iter(),
            slots.iter(),
            positions.iter().enumerate(),
            positions.iter().enumerate()
        ) {
            if pos_a != pos_b && scenario.layout.interferes(pos_a, pos_b) {
                quad_lookup.insert(
                    (sa.index(), sb.index(), pa, pb),
                    interference_quads.len(),
                );
                interference_quads.push(InterferenceQuad {
                    slot_a: sa,
                    slot_b: sb,
                    pos_a: pa,
                    pos_b: pb,
                });
            }
        }

        let consecutive: Vec<(Slot, Slot)> = slots
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        let mut switch_tuples = Vec::new();
        for (p, &(s, next), ra, rb) in iproduct!(
            0..positions.len(),
            consecutive.iter(),
            0..scenario.planes.len(),
            0..scenario.planes.len()
        ) {
            if ra != rb {
                switch_tuples.push(SwitchTuple {
                    position: p,
                    slot: s,
                    next,
                    plane_a: ra,
                    plane_b: rb,
                });
            }
        }

        let slot_sequence: Vec<(Slot, Slot, usize)> = iproduct!(consecutive.iter(), 0..positions.len())
            .map(|(&(prev, s), p)| (prev, s, p))
            .collect();

        debug!(
            "index sets: {} slots, {} positions, {} precedence pairs, {} interference quads, {} switch tuples",
            slots.len(),
            positions.len(),
            precedence.len(),
            interference_quads.len(),
            switch_tuples.len()
        );

        Self {
            slots,
            positions,
            precedence,
            topo_jobs,
            interference_quads,
            switch_tuples,
            slot_sequence,
            quad_lookup,
            position_lookup,
        }
    }

    pub fn position_index(&self, position: Position) -> Option<usize> {
        self.position_lookup.get(&position).copied()
    }

    /// Index of the outside position (always the last one).
    pub fn outside_index(&self) -> usize {
        self.positions.len() - 1
    }

    /// Index of a quadruple in [`Self::interference_quads`], if it is part
    /// of the sparse interference domain.
    pub fn quad_index(
        &self,
        slot_a: Slot,
        slot_b: Slot,
        pos_a: usize,
        pos_b: usize,
    ) -> Option<usize> {
        self.quad_lookup
            .get(&(slot_a.index(), slot_b.index(), pos_a, pos_b))
            .copied()
    }
}

/// Number of slots: enough for the whole job set spread over the stands,
/// and never fewer than the longest per-plane task chain.
fn slot_count(scenario: &Scenario) -> usize {
    let stands = scenario.layout.stand_count().max(1) as f64;
    let load = (scenario.jobs.len() as f64 * SLOT_LOAD_FACTOR / stands).ceil() as usize;
    let longest_chain = scenario
        .planes
        .iter()
        .map(|plane| {
            let mut tasks: Vec<u32> =
                plane.jobs.iter().map(|&j| scenario.jobs[j].task).collect();
            tasks.dedup();
            tasks.len()
        })
        .max()
        .unwrap_or(0);
    (load + SLOT_HEADROOM).max(longest_chain)
}

/// Builds the technological precedence DAG: per plane, jobs sorted by task
/// ordinal, consecutive strictly-increasing pairs linked. Equal ordinals get
/// a warning and no edge. The toposort doubles as a structural check and as
/// the deterministic job order used by reports.
fn precedence_pairs(scenario: &Scenario) -> (Vec<(usize, usize)>, Vec<usize>) {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(scenario.jobs.len(), 0);
    let nodes: Vec<_> = (0..scenario.jobs.len())
        .map(|j| graph.add_node(j))
        .collect();

    let mut pairs = Vec::new();
    for plane in &scenario.planes {
        for pair in plane.jobs.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            let (t1, t2) = (scenario.jobs[before].task, scenario.jobs[after].task);
            if t1 < t2 {
                graph.add_edge(nodes[before], nodes[after], ());
                pairs.push((before, after));
            } else {
                warn!(
                    "aircraft {}: jobs {} and {} share task ordinal {}; no precedence edge",
                    plane.id, scenario.jobs[before].id, scenario.jobs[after].id, t1
                );
            }
        }
    }

    let topo_jobs = toposort(&graph, None)
        .expect("per-plane task chains cannot cycle")
        .into_iter()
        .map(|n| graph[n])
        .collect();

    (pairs, topo_jobs)
}
