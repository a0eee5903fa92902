//! Typed solution maps exposed to reporters, extraction from raw solver
//! values, and the derived aircraft movement report.

pub mod check;

use crate::layout::{Position, Slot};
use crate::model::VariableCatalog;
use crate::scenario::{IndexSets, JobKind, Scenario};
use crate::{ClientId, JobId, PlaneId};
use std::collections::BTreeMap;

/// Value threshold above which a relaxed binary counts as set.
const BINARY_THRESHOLD: f64 = 0.5;

/// One stand change of an aircraft between two of its work jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub plane: PlaneId,
    pub from: Position,
    pub to: Position,
    /// Start time of the segment the aircraft moved to, in days.
    pub at: f64,
}

/// The primal solution, reshaped into the mappings reporters consume.
///
/// All maps are `BTreeMap`s over the typed slot/position/id keys, so
/// iteration (and any serialised form) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSolution {
    /// Occupied cells only: which job runs in (slot, position).
    pub slot_assignment: BTreeMap<(Slot, Position), JobId>,
    pub start_slot: BTreeMap<(Slot, Position), f64>,
    pub finish_slot: BTreeMap<(Slot, Position), f64>,
    pub duration_slot: BTreeMap<(Slot, Position), f64>,
    pub start_slot_job: BTreeMap<(Slot, Position, JobId), f64>,
    pub finish_slot_job: BTreeMap<(Slot, Position, JobId), f64>,
    pub duration_slot_job: BTreeMap<(Slot, Position, JobId), f64>,
    pub start_job: BTreeMap<JobId, f64>,
    pub finish_job: BTreeMap<JobId, f64>,
    pub plane_delay: BTreeMap<PlaneId, f64>,
    pub client_delay: BTreeMap<ClientId, f64>,
    pub presence: BTreeMap<(Slot, Position, PlaneId), bool>,
    pub idle: BTreeMap<(Slot, Position, PlaneId), bool>,
    pub plane_in_slot: BTreeMap<(Slot, Position, PlaneId), bool>,
    pub start_presence: BTreeMap<(Slot, Position, PlaneId), f64>,
    pub finish_presence: BTreeMap<(Slot, Position, PlaneId), f64>,
    pub switch_planes: BTreeMap<(Slot, Position), bool>,
    /// Interference quadruples whose activation mark is set.
    pub interference: Vec<(Slot, Slot, Position, Position)>,
}

impl ScheduleSolution {
    /// Reshapes a dense solver value vector into the typed maps.
    pub fn from_values(
        scenario: &Scenario,
        idx: &IndexSets,
        vars: &VariableCatalog,
        values: &[f64],
    ) -> Self {
        let set = |v: crate::model::VarId| values[v.index()] > BINARY_THRESHOLD;
        let val = |v: crate::model::VarId| values[v.index()];

        let mut solution = Self::default();

        for (s, &slot) in idx.slots.iter().enumerate() {
            for (p, &position) in idx.positions.iter().enumerate() {
                let cell = (slot, position);
                solution.start_slot.insert(cell, val(vars.start_slot(s, p)));
                solution
                    .finish_slot
                    .insert(cell, val(vars.finish_slot(s, p)));
                solution
                    .duration_slot
                    .insert(cell, val(vars.dur_slot(s, p)));
                solution
                    .switch_planes
                    .insert(cell, set(vars.switch_pos(s, p)));

                for (j, job) in scenario.jobs.iter().enumerate() {
                    let key = (slot, position, job.id.clone());
                    solution
                        .start_slot_job
                        .insert(key.clone(), val(vars.start_frag(s, p, j)));
                    solution
                        .finish_slot_job
                        .insert(key.clone(), val(vars.finish_frag(s, p, j)));
                    solution
                        .duration_slot_job
                        .insert(key, val(vars.dur_frag(s, p, j)));
                    if set(vars.x(s, p, j)) {
                        solution.slot_assignment.insert(cell, job.id.clone());
                    }
                }

                for (r, plane) in scenario.planes.iter().enumerate() {
                    let key = (slot, position, plane.id.clone());
                    solution.presence.insert(key.clone(), set(vars.pres(s, p, r)));
                    solution.idle.insert(key.clone(), set(vars.idle(s, p, r)));
                    solution
                        .plane_in_slot
                        .insert(key.clone(), set(vars.y_plane(s, p, r)));
                    solution
                        .start_presence
                        .insert(key.clone(), val(vars.start_pres(s, p, r)));
                    solution
                        .finish_presence
                        .insert(key, val(vars.finish_pres(s, p, r)));
                }
            }
        }

        for (j, job) in scenario.jobs.iter().enumerate() {
            solution.start_job.insert(job.id.clone(), val(vars.start_job(j)));
            solution
                .finish_job
                .insert(job.id.clone(), val(vars.finish_job(j)));
        }
        for (r, plane) in scenario.planes.iter().enumerate() {
            solution
                .plane_delay
                .insert(plane.id.clone(), val(vars.plane_delay(r)));
        }
        for (c, client) in scenario.clients.iter().enumerate() {
            solution
                .client_delay
                .insert(client.id.clone(), val(vars.client_delay(c)));
        }

        for (q, quad) in idx.interference_quads.iter().enumerate() {
            if set(vars.alpha(q)) {
                solution.interference.push((
                    quad.slot_a,
                    quad.slot_b,
                    idx.positions[quad.pos_a],
                    idx.positions[quad.pos_b],
                ));
            }
        }

        solution
    }

    /// Latest job finish time, in days.
    pub fn makespan(&self) -> f64 {
        self.finish_job.values().fold(0.0_f64, |acc, &t| acc.max(t))
    }

    /// Stand changes between consecutive work jobs of each aircraft,
    /// reconstructed from the occupied cells in start-time order. Marker
    /// jobs are outside by construction and are not counted as moves.
    pub fn movements(&self, scenario: &Scenario) -> Vec<Movement> {
        let mut movements = Vec::new();
        for plane in &scenario.planes {
            let mut segments: Vec<(f64, Position)> = self
                .slot_assignment
                .iter()
                .filter_map(|(&(slot, position), job_id)| {
                    let j = scenario.job_index(job_id)?;
                    let job = &scenario.jobs[j];
                    if scenario.planes[job.plane].id != plane.id || job.kind != JobKind::Work {
                        return None;
                    }
                    let start = *self.start_slot.get(&(slot, position))?;
                    Some((start, position))
                })
                .collect();
            segments.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in segments.windows(2) {
                let (_, from) = pair[0];
                let (at, to) = pair[1];
                if from != to {
                    movements.push(Movement {
                        plane: plane.id.clone(),
                        from,
                        to,
                        at,
                    });
                }
            }
        }
        movements
    }

    /// Number of switch marks on physical stands (outside excluded).
    pub fn stand_switch_count(&self) -> usize {
        self.switch_planes
            .iter()
            .filter(|(&(_, position), &set)| set && !position.is_outside())
            .count()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! Serde support via flat entry records: tuple-keyed maps do not fit
    //! self-describing formats, so the solution round-trips through vectors
    //! of `(key fields, value)` entries.

    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct CellJob {
        slot: Slot,
        position: Position,
        job: JobId,
    }

    #[derive(Serialize, Deserialize)]
    struct CellValue<T> {
        slot: Slot,
        position: Position,
        value: T,
    }

    #[derive(Serialize, Deserialize)]
    struct CellJobValue {
        slot: Slot,
        position: Position,
        job: JobId,
        value: f64,
    }

    #[derive(Serialize, Deserialize)]
    struct CellPlaneValue<T> {
        slot: Slot,
        position: Position,
        plane: PlaneId,
        value: T,
    }

    #[derive(Serialize, Deserialize)]
    struct IdValue {
        id: String,
        value: f64,
    }

    #[derive(Serialize, Deserialize)]
    struct Quad {
        slot_a: Slot,
        slot_b: Slot,
        position_a: Position,
        position_b: Position,
    }

    #[derive(Serialize, Deserialize)]
    struct SolutionRecord {
        slot_assignment: Vec<CellJob>,
        start_slot: Vec<CellValue<f64>>,
        finish_slot: Vec<CellValue<f64>>,
        duration_slot: Vec<CellValue<f64>>,
        start_slot_job: Vec<CellJobValue>,
        finish_slot_job: Vec<CellJobValue>,
        duration_slot_job: Vec<CellJobValue>,
        start_job: Vec<IdValue>,
        finish_job: Vec<IdValue>,
        plane_delay: Vec<IdValue>,
        client_delay: Vec<IdValue>,
        presence: Vec<CellPlaneValue<bool>>,
        idle: Vec<CellPlaneValue<bool>>,
        plane_in_slot: Vec<CellPlaneValue<bool>>,
        start_presence: Vec<CellPlaneValue<f64>>,
        finish_presence: Vec<CellPlaneValue<f64>>,
        switch_planes: Vec<CellValue<bool>>,
        interference: Vec<Quad>,
    }

    fn cells<T: Copy>(map: &BTreeMap<(Slot, Position), T>) -> Vec<CellValue<T>> {
        map.iter()
            .map(|(&(slot, position), &value)| CellValue {
                slot,
                position,
                value,
            })
            .collect()
    }

    fn cell_jobs(map: &BTreeMap<(Slot, Position, JobId), f64>) -> Vec<CellJobValue> {
        map.iter()
            .map(|((slot, position, job), &value)| CellJobValue {
                slot: *slot,
                position: *position,
                job: job.clone(),
                value,
            })
            .collect()
    }

    fn cell_planes<T: Copy>(
        map: &BTreeMap<(Slot, Position, PlaneId), T>,
    ) -> Vec<CellPlaneValue<T>> {
        map.iter()
            .map(|((slot, position, plane), &value)| CellPlaneValue {
                slot: *slot,
                position: *position,
                plane: plane.clone(),
                value,
            })
            .collect()
    }

    fn ids(map: &BTreeMap<String, f64>) -> Vec<IdValue> {
        map.iter()
            .map(|(id, &value)| IdValue {
                id: id.clone(),
                value,
            })
            .collect()
    }

    impl From<&ScheduleSolution> for SolutionRecord {
        fn from(s: &ScheduleSolution) -> Self {
            SolutionRecord {
                slot_assignment: s
                    .slot_assignment
                    .iter()
                    .map(|(&(slot, position), job)| CellJob {
                        slot,
                        position,
                        job: job.clone(),
                    })
                    .collect(),
                start_slot: cells(&s.start_slot),
                finish_slot: cells(&s.finish_slot),
                duration_slot: cells(&s.duration_slot),
                start_slot_job: cell_jobs(&s.start_slot_job),
                finish_slot_job: cell_jobs(&s.finish_slot_job),
                duration_slot_job: cell_jobs(&s.duration_slot_job),
                start_job: ids(&s.start_job),
                finish_job: ids(&s.finish_job),
                plane_delay: ids(&s.plane_delay),
                client_delay: ids(&s.client_delay),
                presence: cell_planes(&s.presence),
                idle: cell_planes(&s.idle),
                plane_in_slot: cell_planes(&s.plane_in_slot),
                start_presence: cell_planes(&s.start_presence),
                finish_presence: cell_planes(&s.finish_presence),
                switch_planes: cells(&s.switch_planes),
                interference: s
                    .interference
                    .iter()
                    .map(|&(slot_a, slot_b, position_a, position_b)| Quad {
                        slot_a,
                        slot_b,
                        position_a,
                        position_b,
                    })
                    .collect(),
            }
        }
    }

    impl From<SolutionRecord> for ScheduleSolution {
        fn from(record: SolutionRecord) -> Self {
            let mut s = ScheduleSolution::default();
            for e in record.slot_assignment {
                s.slot_assignment.insert((e.slot, e.position), e.job);
            }
            for e in record.start_slot {
                s.start_slot.insert((e.slot, e.position), e.value);
            }
            for e in record.finish_slot {
                s.finish_slot.insert((e.slot, e.position), e.value);
            }
            for e in record.duration_slot {
                s.duration_slot.insert((e.slot, e.position), e.value);
            }
            for e in record.start_slot_job {
                s.start_slot_job.insert((e.slot, e.position, e.job), e.value);
            }
            for e in record.finish_slot_job {
                s.finish_slot_job
                    .insert((e.slot, e.position, e.job), e.value);
            }
            for e in record.duration_slot_job {
                s.duration_slot_job
                    .insert((e.slot, e.position, e.job), e.value);
            }
            for e in record.start_job {
                s.start_job.insert(e.id, e.value);
            }
            for e in record.finish_job {
                s.finish_job.insert(e.id, e.value);
            }
            for e in record.plane_delay {
                s.plane_delay.insert(e.id, e.value);
            }
            for e in record.client_delay {
                s.client_delay.insert(e.id, e.value);
            }
            for e in record.presence {
                s.presence.insert((e.slot, e.position, e.plane), e.value);
            }
            for e in record.idle {
                s.idle.insert((e.slot, e.position, e.plane), e.value);
            }
            for e in record.plane_in_slot {
                s.plane_in_slot
                    .insert((e.slot, e.position, e.plane), e.value);
            }
            for e in record.start_presence {
                s.start_presence
                    .insert((e.slot, e.position, e.plane), e.value);
            }
            for e in record.finish_presence {
                s.finish_presence
                    .insert((e.slot, e.position, e.plane), e.value);
            }
            for e in record.switch_planes {
                s.switch_planes.insert((e.slot, e.position), e.value);
            }
            for e in record.interference {
                s.interference
                    .push((e.slot_a, e.slot_b, e.position_a, e.position_b));
            }
            s
        }
    }

    impl Serialize for ScheduleSolution {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            SolutionRecord::from(self).serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for ScheduleSolution {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            SolutionRecord::deserialize(deserializer).map(ScheduleSolution::from)
        }
    }
}
