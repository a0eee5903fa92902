//! Post-solve verification: replays the model's invariants against a
//! returned solution and reports violations instead of raising.
//!
//! A violation in a solution the engine called feasible means an internal
//! bug somewhere between assembly and extraction; production callers treat
//! any failed entry accordingly.

use super::ScheduleSolution;
use crate::layout::{Position, Slot};
use crate::params::ParameterTable;
use crate::scenario::{IndexSets, Scenario};

/// Numeric slack applied to every comparison.
pub const TOLERANCE: f64 = 1e-6;

/// Outcome of one verified property.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckEntry {
    pub name: &'static str,
    pub violations: Vec<String>,
}

impl CheckEntry {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Structured verification report; never panics, never errors.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(CheckEntry::passed)
    }

    pub fn violation_count(&self) -> usize {
        self.entries.iter().map(|e| e.violations.len()).sum()
    }

    /// Every violation message, prefixed with its property name.
    pub fn violations(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| e.violations.iter().map(move |v| format!("{}: {v}", e.name)))
            .collect()
    }
}

/// Verifies the returned solution against every modelled property.
pub fn check_solution(
    scenario: &Scenario,
    idx: &IndexSets,
    params: &ParameterTable,
    solution: &ScheduleSolution,
) -> CheckReport {
    let entries = vec![
        one_placement_per_job(idx, scenario, solution),
        single_job_per_cell(idx, scenario, solution),
        unassigned_fragments_are_zero(idx, scenario, solution),
        durations_add_up(idx, scenario, params, solution),
        precedence_holds(idx, scenario, solution),
        within_horizon(params, solution),
        single_position_per_plane(idx, scenario, solution),
        single_plane_per_cell(idx, scenario, solution),
        interference_respected(idx, scenario, solution),
        markers_outside(scenario, solution),
        windows_or_delay(scenario, params, solution),
        present_when_working(idx, scenario, solution),
        presence_accounting(idx, scenario, solution),
        consecutive_slot_use(idx, solution),
    ];
    CheckReport { entries }
}

fn get(map: &std::collections::BTreeMap<(Slot, Position, String), f64>, key: (Slot, Position, &str)) -> f64 {
    map.get(&(key.0, key.1, key.2.to_string())).copied().unwrap_or(0.0)
}

fn flag(
    map: &std::collections::BTreeMap<(Slot, Position, String), bool>,
    key: (Slot, Position, &str),
) -> bool {
    map.get(&(key.0, key.1, key.2.to_string()))
        .copied()
        .unwrap_or(false)
}

/// Property 1: every job occupies exactly one cell.
fn one_placement_per_job(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    // Topological order keeps reports deterministic and readable.
    for job in idx.topo_jobs.iter().map(|&j| &scenario.jobs[j]) {
        let count = solution
            .slot_assignment
            .values()
            .filter(|assigned| *assigned == &job.id)
            .count();
        if count != 1 {
            violations.push(format!("job {} is assigned to {count} cells", job.id));
        }
    }
    CheckEntry {
        name: "one_placement_per_job",
        violations,
    }
}

/// Property 2: at most one job carries width inside any cell.
fn single_job_per_cell(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &slot in &idx.slots {
        for &position in &idx.positions {
            let wide: Vec<&str> = scenario
                .jobs
                .iter()
                .filter(|job| {
                    let start = get(&solution.start_slot_job, (slot, position, &job.id));
                    let finish = get(&solution.finish_slot_job, (slot, position, &job.id));
                    finish - start > TOLERANCE
                })
                .map(|job| job.id.as_str())
                .collect();
            if wide.len() > 1 {
                violations.push(format!(
                    "cell ({slot},{position}) holds {} jobs: {}",
                    wide.len(),
                    wide.join(", ")
                ));
            }
        }
    }
    CheckEntry {
        name: "single_job_per_cell",
        violations,
    }
}

/// Property 3: unassigned cells carry zero fragment times.
fn unassigned_fragments_are_zero(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &slot in &idx.slots {
        for &position in &idx.positions {
            let assigned = solution.slot_assignment.get(&(slot, position));
            for job in &scenario.jobs {
                if assigned == Some(&job.id) {
                    continue;
                }
                let start = get(&solution.start_slot_job, (slot, position, &job.id));
                let finish = get(&solution.finish_slot_job, (slot, position, &job.id));
                let duration = get(&solution.duration_slot_job, (slot, position, &job.id));
                if start.abs() > TOLERANCE || finish.abs() > TOLERANCE || duration.abs() > TOLERANCE
                {
                    violations.push(format!(
                        "job {} has nonzero times in unassigned cell ({slot},{position})",
                        job.id
                    ));
                }
            }
        }
    }
    CheckEntry {
        name: "unassigned_fragments_are_zero",
        violations,
    }
}

/// Property 4: fragments add up to the demanded duration, and the global
/// window is at least that long.
fn durations_add_up(
    idx: &IndexSets,
    scenario: &Scenario,
    params: &ParameterTable,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for (j, job) in scenario.jobs.iter().enumerate() {
        let total: f64 = idx
            .slots
            .iter()
            .flat_map(|&slot| {
                idx.positions
                    .iter()
                    .map(move |&position| (slot, position))
            })
            .map(|(slot, position)| get(&solution.duration_slot_job, (slot, position, &job.id)))
            .sum();
        let demanded = params.job_duration(j);
        if (total - demanded).abs() > TOLERANCE {
            violations.push(format!(
                "job {}: fragment durations sum to {total:.6}, demanded {demanded:.6}",
                job.id
            ));
        }
        let start = solution.start_job.get(&job.id).copied().unwrap_or(0.0);
        let finish = solution.finish_job.get(&job.id).copied().unwrap_or(0.0);
        if finish - start < demanded - TOLERANCE {
            violations.push(format!(
                "job {}: window {:.6} is shorter than duration {demanded:.6}",
                job.id,
                finish - start
            ));
        }
    }
    CheckEntry {
        name: "durations_add_up",
        violations,
    }
}

/// Property 5: technological precedence between global job times.
fn precedence_holds(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &(before, after) in &idx.precedence {
        let b = &scenario.jobs[before].id;
        let a = &scenario.jobs[after].id;
        let finish = solution.finish_job.get(b).copied().unwrap_or(0.0);
        let start = solution.start_job.get(a).copied().unwrap_or(0.0);
        if finish > start + TOLERANCE {
            violations.push(format!(
                "{b} finishes at {finish:.6} after successor {a} starts at {start:.6}"
            ));
        }
    }
    CheckEntry {
        name: "precedence_holds",
        violations,
    }
}

/// Property 6: all slot finish times stay within the horizon.
fn within_horizon(params: &ParameterTable, solution: &ScheduleSolution) -> CheckEntry {
    let mut violations = Vec::new();
    for (&(slot, position), &finish) in &solution.finish_slot {
        if finish > params.horizon() + TOLERANCE {
            violations.push(format!(
                "cell ({slot},{position}) finishes at {finish:.6} beyond horizon {:.6}",
                params.horizon()
            ));
        }
    }
    CheckEntry {
        name: "within_horizon",
        violations,
    }
}

/// Property 7: an aircraft never works in two positions at overlapping
/// times. Work cells carry real time intervals; pairs in different
/// positions must be disjoint.
fn single_position_per_plane(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for plane in &scenario.planes {
        let mut segments: Vec<(Slot, Position, f64, f64)> = Vec::new();
        for &slot in &idx.slots {
            for &position in &idx.positions {
                if flag(&solution.plane_in_slot, (slot, position, &plane.id)) {
                    segments.push((
                        slot,
                        position,
                        get(&solution.start_presence, (slot, position, &plane.id)),
                        get(&solution.finish_presence, (slot, position, &plane.id)),
                    ));
                }
            }
        }
        for (i, &(slot_a, pos_a, start_a, finish_a)) in segments.iter().enumerate() {
            for &(slot_b, pos_b, start_b, finish_b) in &segments[i + 1..] {
                if pos_a == pos_b {
                    continue;
                }
                if start_a < finish_b - TOLERANCE && start_b < finish_a - TOLERANCE {
                    violations.push(format!(
                        "aircraft {} works in ({slot_a},{pos_a}) [{start_a:.6},{finish_a:.6}] while in ({slot_b},{pos_b}) [{start_b:.6},{finish_b:.6}]",
                        plane.id
                    ));
                }
            }
        }
    }
    CheckEntry {
        name: "single_position_per_plane",
        violations,
    }
}

/// Property 8: at most one aircraft per cell.
fn single_plane_per_cell(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &slot in &idx.slots {
        for &position in &idx.positions {
            let count = scenario
                .planes
                .iter()
                .filter(|plane| flag(&solution.presence, (slot, position, &plane.id)))
                .count();
            if count > 1 {
                violations.push(format!(
                    "cell ({slot},{position}) hosts {count} aircraft"
                ));
            }
        }
    }
    CheckEntry {
        name: "single_plane_per_cell",
        violations,
    }
}

/// Property 9: presence intervals of interfering positions never properly
/// overlap unless the corresponding quadruple carries an activation mark.
fn interference_respected(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for quad in &idx.interference_quads {
        let pos_a = idx.positions[quad.pos_a];
        let pos_b = idx.positions[quad.pos_b];
        // Process each unordered cell pair once.
        if (quad.slot_a, pos_a) >= (quad.slot_b, pos_b) {
            continue;
        }
        for plane_a in &scenario.planes {
            if !flag(&solution.presence, (quad.slot_a, pos_a, &plane_a.id)) {
                continue;
            }
            let start_a = get(&solution.start_presence, (quad.slot_a, pos_a, &plane_a.id));
            let finish_a = get(&solution.finish_presence, (quad.slot_a, pos_a, &plane_a.id));
            for plane_b in &scenario.planes {
                if !flag(&solution.presence, (quad.slot_b, pos_b, &plane_b.id)) {
                    continue;
                }
                let start_b = get(&solution.start_presence, (quad.slot_b, pos_b, &plane_b.id));
                let finish_b =
                    get(&solution.finish_presence, (quad.slot_b, pos_b, &plane_b.id));
                let overlaps =
                    start_a < finish_b - TOLERANCE && start_b < finish_a - TOLERANCE;
                let marked = solution
                    .interference
                    .contains(&(quad.slot_a, quad.slot_b, pos_a, pos_b))
                    || solution
                        .interference
                        .contains(&(quad.slot_b, quad.slot_a, pos_b, pos_a));
                if overlaps && !marked {
                    violations.push(format!(
                        "unmarked overlap: {} in ({},{}) [{start_a:.6},{finish_a:.6}] vs {} in ({},{}) [{start_b:.6},{finish_b:.6}]",
                        plane_a.id, quad.slot_a, pos_a, plane_b.id, quad.slot_b, pos_b
                    ));
                }
            }
        }
    }
    CheckEntry {
        name: "interference_respected",
        violations,
    }
}

/// Property 10: entry/exit markers sit outside the hangar.
fn markers_outside(scenario: &Scenario, solution: &ScheduleSolution) -> CheckEntry {
    let mut violations = Vec::new();
    for (&(_, position), job_id) in &solution.slot_assignment {
        let Some(j) = scenario.job_index(job_id) else {
            violations.push(format!("assignment references unknown job {job_id}"));
            continue;
        };
        if scenario.jobs[j].kind.is_marker() && !position.is_outside() {
            violations.push(format!("marker {job_id} is placed at {position}"));
        }
    }
    CheckEntry {
        name: "markers_outside",
        violations,
    }
}

/// Property 11: every job respects its aircraft's window, with the plane's
/// recorded delay absorbing any late-finish overrun.
fn windows_or_delay(
    scenario: &Scenario,
    params: &ParameterTable,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for (j, job) in scenario.jobs.iter().enumerate() {
        let r = params.plane_of_job(j);
        let start = solution.start_job.get(&job.id).copied().unwrap_or(0.0);
        let finish = solution.finish_job.get(&job.id).copied().unwrap_or(0.0);
        if start < params.early_start(r) - TOLERANCE {
            violations.push(format!(
                "job {} starts at {start:.6} before early start {:.6}",
                job.id,
                params.early_start(r)
            ));
        }
        let delay = solution
            .plane_delay
            .get(&scenario.planes[r].id)
            .copied()
            .unwrap_or(0.0);
        if finish > params.late_finish(r) + delay + TOLERANCE {
            violations.push(format!(
                "job {} finishes at {finish:.6} beyond deadline {:.6} plus recorded delay {delay:.6}",
                job.id,
                params.late_finish(r)
            ));
        }
    }
    CheckEntry {
        name: "windows_or_delay",
        violations,
    }
}

/// Structural: working somewhere implies presence there.
fn present_when_working(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &slot in &idx.slots {
        for &position in &idx.positions {
            for plane in &scenario.planes {
                if flag(&solution.plane_in_slot, (slot, position, &plane.id))
                    && !flag(&solution.presence, (slot, position, &plane.id))
                {
                    violations.push(format!(
                        "aircraft {} works in ({slot},{position}) without presence",
                        plane.id
                    ));
                }
            }
        }
    }
    CheckEntry {
        name: "present_when_working",
        violations,
    }
}

/// Structural: per slot, presence equals work plus idle for each aircraft.
fn presence_accounting(
    idx: &IndexSets,
    scenario: &Scenario,
    solution: &ScheduleSolution,
) -> CheckEntry {
    let mut violations = Vec::new();
    for &slot in &idx.slots {
        for plane in &scenario.planes {
            let mut present = 0i32;
            let mut working = 0i32;
            let mut idling = 0i32;
            for &position in &idx.positions {
                present += flag(&solution.presence, (slot, position, &plane.id)) as i32;
                working += flag(&solution.plane_in_slot, (slot, position, &plane.id)) as i32;
                idling += flag(&solution.idle, (slot, position, &plane.id)) as i32;
            }
            if present != working + idling {
                violations.push(format!(
                    "aircraft {} in {slot}: presence {present} != work {working} + idle {idling}",
                    plane.id
                ));
            }
        }
    }
    CheckEntry {
        name: "presence_accounting",
        violations,
    }
}

/// Structural: occupied slots form a prefix within each position.
fn consecutive_slot_use(idx: &IndexSets, solution: &ScheduleSolution) -> CheckEntry {
    let mut violations = Vec::new();
    for &position in &idx.positions {
        let mut seen_empty_at: Option<Slot> = None;
        for &slot in &idx.slots {
            let occupied = solution.slot_assignment.contains_key(&(slot, position));
            match (occupied, seen_empty_at) {
                (true, Some(empty)) => violations.push(format!(
                    "{position}: {slot} is occupied although {empty} is empty"
                )),
                (false, None) => seen_empty_at = Some(slot),
                _ => {}
            }
        }
    }
    CheckEntry {
        name: "consecutive_slot_use",
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HangarLayout;
    use crate::scenario::JobRow;

    fn fixtures() -> (Scenario, IndexSets, ParameterTable) {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("A2", 2.0, "A", 3.0, 0.0),
        ];
        let scenario = Scenario::build(&rows, &[], HangarLayout::new(2, vec![])).unwrap();
        let idx = IndexSets::build(&scenario);
        let params = ParameterTable::from_scenario(&scenario);
        (scenario, idx, params)
    }

    /// Hand-built consistent solution: everything on stand 1, markers
    /// outside, times chained.
    fn consistent_solution(scenario: &Scenario) -> ScheduleSolution {
        let mut s = ScheduleSolution::default();
        let stand = Position::Stand(1);
        let outside = Position::Outside;
        let placements = [
            (Slot::new(0), outside, "A-entry", 0.0, 0.01),
            (Slot::new(0), stand, "A1", 0.01, 2.01),
            (Slot::new(1), stand, "A2", 2.01, 5.01),
            (Slot::new(1), outside, "A-exit", 5.01, 5.02),
        ];
        for (slot, position, job, start, finish) in placements {
            s.slot_assignment.insert((slot, position), job.to_string());
            s.start_slot.insert((slot, position), start);
            s.finish_slot.insert((slot, position), finish);
            s.duration_slot.insert((slot, position), finish - start);
            s.start_slot_job
                .insert((slot, position, job.to_string()), start);
            s.finish_slot_job
                .insert((slot, position, job.to_string()), finish);
            s.duration_slot_job
                .insert((slot, position, job.to_string()), finish - start);
            s.start_job.insert(job.to_string(), start);
            s.finish_job.insert(job.to_string(), finish);
            s.presence.insert((slot, position, "A".to_string()), true);
            s.plane_in_slot
                .insert((slot, position, "A".to_string()), true);
            s.start_presence
                .insert((slot, position, "A".to_string()), start);
            s.finish_presence
                .insert((slot, position, "A".to_string()), finish);
        }
        s.plane_delay.insert("A".to_string(), 0.0);
        s.client_delay.insert("A".to_string(), 0.0);
        s
    }

    #[test]
    fn consistent_solution_passes() {
        let (scenario, idx, params) = fixtures();
        let solution = consistent_solution(&scenario);
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report.all_passed(), "violations: {:?}", report.violations());
    }

    #[test]
    fn missing_placement_is_reported() {
        let (scenario, idx, params) = fixtures();
        let mut solution = consistent_solution(&scenario);
        solution
            .slot_assignment
            .remove(&(Slot::new(1), Position::Stand(1)));
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(!report.all_passed());
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("one_placement_per_job") && v.contains("A2")));
    }

    #[test]
    fn precedence_violation_is_reported() {
        let (scenario, idx, params) = fixtures();
        let mut solution = consistent_solution(&scenario);
        // A2 now starts before A1 ends.
        solution.start_job.insert("A2".to_string(), 1.0);
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("precedence_holds")));
    }

    #[test]
    fn marker_on_a_stand_is_reported() {
        let (scenario, idx, params) = fixtures();
        let mut solution = consistent_solution(&scenario);
        let entry = solution
            .slot_assignment
            .remove(&(Slot::new(0), Position::Outside))
            .unwrap();
        solution
            .slot_assignment
            .insert((Slot::new(0), Position::Stand(2)), entry);
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("markers_outside") && v.contains("A-entry")));
    }

    #[test]
    fn late_finish_without_delay_is_reported() {
        let rows = vec![JobRow::new("A1", 1.0, "A", 2.0, 0.0)];
        let planes = vec![crate::scenario::PlaneRow::new("A").late_finish(1.0)];
        let scenario =
            Scenario::build(&rows, &planes, HangarLayout::new(2, vec![])).unwrap();
        let idx = IndexSets::build(&scenario);
        let params = ParameterTable::from_scenario(&scenario);
        let mut solution = consistent_solution(&scenario);
        solution.plane_delay.insert("A".to_string(), 0.0);
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("windows_or_delay")));
        // Recording the overrun as delay clears the property.
        solution.plane_delay.insert("A".to_string(), 5.0);
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .entries
            .iter()
            .find(|e| e.name == "windows_or_delay")
            .unwrap()
            .passed());
    }

    #[test]
    fn prefix_gap_is_reported() {
        let (scenario, idx, params) = fixtures();
        let mut solution = consistent_solution(&scenario);
        // Move A2 to slot 2, leaving slot 1 of the stand empty.
        solution
            .slot_assignment
            .insert((Slot::new(2), Position::Stand(1)), "A2".to_string());
        solution
            .slot_assignment
            .remove(&(Slot::new(1), Position::Stand(1)));
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("consecutive_slot_use")));
    }

    #[test]
    fn unmarked_interference_overlap_is_reported() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("B1", 1.0, "B", 2.0, 0.0),
        ];
        let layout = HangarLayout::new(2, vec![(Position::Stand(1), Position::Stand(2))]);
        let scenario = Scenario::build(&rows, &[], layout).unwrap();
        let idx = IndexSets::build(&scenario);
        let params = ParameterTable::from_scenario(&scenario);

        let mut solution = ScheduleSolution::default();
        // Both aircraft work [0, 2] on interfering stands, no alpha mark.
        for (position, plane, job) in [
            (Position::Stand(1), "A", "A1"),
            (Position::Stand(2), "B", "B1"),
        ] {
            let slot = Slot::new(0);
            solution
                .slot_assignment
                .insert((slot, position), job.to_string());
            solution.presence.insert((slot, position, plane.to_string()), true);
            solution
                .start_presence
                .insert((slot, position, plane.to_string()), 0.0);
            solution
                .finish_presence
                .insert((slot, position, plane.to_string()), 2.0);
        }
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.starts_with("interference_respected")));

        // The same overlap with the activation mark recorded is accepted.
        solution.interference.push((
            Slot::new(0),
            Slot::new(0),
            Position::Stand(1),
            Position::Stand(2),
        ));
        let report = check_solution(&scenario, &idx, &params, &solution);
        assert!(report
            .entries
            .iter()
            .find(|e| e.name == "interference_respected")
            .unwrap()
            .passed());
    }
}
