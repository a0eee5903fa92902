//! End-to-end scenario suite: each test assembles a scenario, solves it
//! through HiGHS, and replays the verifier against the returned schedule.

use super::{SolveError, SolveOptions};
use crate::layout::{HangarLayout, Position};
use crate::scenario::{JobRow, PlaneRow, ScenarioOptions};
use crate::solution::check::check_solution;
use crate::{plan, PlanError, PlanResult};
use qtty::Quantity;
use std::collections::HashSet;
use std::time::Duration;

const EPS: f64 = 1e-4;

/// Exact solve: no gap, generous wall clock for CI machines.
fn exact() -> SolveOptions {
    SolveOptions {
        time_limit: Duration::from_secs(600),
        mip_gap: 0.0,
        ..SolveOptions::default()
    }
}

fn with_floor(days: f64) -> ScenarioOptions {
    ScenarioOptions {
        min_horizon: Some(Quantity::new(days)),
    }
}

/// Runs the verifier and the objective cross-check on a solved plan.
fn verify(result: &PlanResult) {
    let report = check_solution(
        &result.scenario,
        &result.index,
        &result.params,
        &result.outcome.solution,
    );
    assert!(
        report.all_passed(),
        "verification failed: {:?}",
        report.violations()
    );

    // The reported objective decomposes into the six penalty sums.
    let s = &result.outcome.solution;
    let assignments = s.slot_assignment.len() as f64;
    let alphas = s.interference.len() as f64;
    let switches = s.switch_planes.values().filter(|&&v| v).count() as f64;
    let presences = s.presence.values().filter(|&&v| v).count() as f64;
    let idles = s.idle.values().filter(|&&v| v).count() as f64;
    let delays: f64 = s.client_delay.values().sum();
    let recomputed = assignments + alphas + switches + presences + idles + delays;
    assert!(
        (recomputed - result.outcome.objective).abs() < 1e-2,
        "objective {} does not decompose into component sum {recomputed}",
        result.outcome.objective
    );
}

/// Stands used by real work jobs.
fn work_stands(result: &PlanResult) -> HashSet<Position> {
    let mut stands = HashSet::new();
    for (&(_, position), job_id) in &result.outcome.solution.slot_assignment {
        let j = result.scenario.job_index(job_id).expect("assigned job exists");
        if !result.scenario.jobs[j].kind.is_marker() && !position.is_outside() {
            stands.insert(position);
        }
    }
    stands
}

#[test]
fn single_aircraft_chains_work_between_markers() {
    let rows = vec![
        JobRow::new("A1", 1.0, "A", 2.0, 0.0),
        JobRow::new("A2", 2.0, "A", 3.0, 0.0),
    ];
    let result = plan(
        &rows,
        &[],
        HangarLayout::new(2, vec![]),
        ScenarioOptions::default(),
        exact(),
    )
    .unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    assert!(sol.plane_delay["A"].abs() < EPS);
    assert!(sol.movements(&result.scenario).is_empty());
    // The chain entry -> A1 -> A2 cannot finish before its total work.
    assert!(sol.finish_job["A2"] >= 5.0 - EPS);
    assert!(sol.start_job["A2"] >= sol.finish_job["A1"] - EPS);
    // Moving costs switches, so at most one stand is ever occupied.
    assert!(work_stands(&result).len() <= 1);
}

#[test]
fn independent_aircraft_run_in_parallel() {
    let rows = vec![
        JobRow::new("A1", 1.0, "A", 2.0, 0.0),
        JobRow::new("A2", 2.0, "A", 2.0, 0.0),
        JobRow::new("B1", 1.0, "B", 3.0, 0.0),
    ];
    let result = plan(
        &rows,
        &[],
        HangarLayout::new(2, vec![]),
        ScenarioOptions::default(),
        exact(),
    )
    .unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    assert!(sol.plane_delay["A"].abs() < EPS);
    assert!(sol.plane_delay["B"].abs() < EPS);
    // Serialising all work in one lane would blow the horizon, so the two
    // aircraft must overlap in time somewhere.
    assert!(sol.makespan() <= result.params.horizon() + EPS);
    assert!(sol.finish_job["A2"] >= 4.0 - EPS);
    assert!(sol.finish_job["B1"] >= 3.0 - EPS);
}

#[test]
fn interfering_stands_serialise_their_occupants() {
    let rows = vec![
        JobRow::new("A1", 1.0, "A", 2.0, 0.0),
        JobRow::new("B1", 1.0, "B", 3.0, 0.0),
    ];
    let layout = HangarLayout::new(2, vec![(Position::Stand(1), Position::Stand(2))]);
    let result = plan(&rows, &[], layout, with_floor(12.0), exact()).unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    // Serialising is free once the horizon allows it, so no interference
    // mark is active and the work intervals are disjoint.
    assert!(sol.interference.is_empty());
    let (s_a, f_a) = (sol.start_job["A1"], sol.finish_job["A1"]);
    let (s_b, f_b) = (sol.start_job["B1"], sol.finish_job["B1"]);
    assert!(
        f_a <= s_b + EPS || f_b <= s_a + EPS,
        "work intervals overlap: A1 [{s_a},{f_a}] vs B1 [{s_b},{f_b}]"
    );
}

#[test]
fn impossible_deadline_reports_an_iis_naming_the_window() {
    let rows = vec![JobRow::new("A1", 1.0, "A", 10.0, 0.0)];
    let planes = vec![PlaneRow::new("A").late_finish(8.0)];
    let err = plan(
        &rows,
        &planes,
        HangarLayout::new(1, vec![]),
        ScenarioOptions::default(),
        exact(),
    )
    .unwrap_err();

    let PlanError::Solve(SolveError::Infeasible { iis, mps_path }) = err else {
        panic!("expected an infeasibility diagnosis, got {err:?}");
    };
    assert!(mps_path.is_none());
    assert!(!iis.is_empty());
    assert!(
        iis.iter().any(|name| name.starts_with("late_finish(")),
        "IIS does not name the late-finish window: {iis:?}"
    );
}

#[test]
fn tight_window_forces_an_interleave_with_switches() {
    // A single lane (apron only): B's window forces its job between A's
    // two jobs, so the lane changes occupant back and forth.
    let rows = vec![
        JobRow::new("A1", 1.0, "A", 2.0, 0.0),
        JobRow::new("A2", 2.0, "A", 2.0, 0.0),
        JobRow::new("B1", 1.0, "B", 2.0, 0.0),
    ];
    let planes = vec![PlaneRow::new("B").early_start(2.0).late_finish(4.5)];
    let result = plan(
        &rows,
        &planes,
        HangarLayout::new(0, vec![]),
        with_floor(12.0),
        exact(),
    )
    .unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    assert!(sol.start_job["B1"] >= 2.0 - EPS);
    assert!(sol.finish_job["B1"] <= 4.5 + EPS);
    // A2 cannot fit before B's window closes, so it runs after B1.
    assert!(sol.start_job["A2"] >= sol.finish_job["B1"] - EPS);
    let switches = sol.switch_planes.values().filter(|&&v| v).count();
    assert!(
        switches >= 2,
        "expected the interleave to cost at least two switches, got {switches}"
    );
}

#[test]
fn aircraft_without_work_visits_only_the_apron() {
    let result = plan(
        &[],
        &[PlaneRow::new("A")],
        HangarLayout::new(1, vec![]),
        ScenarioOptions::default(),
        exact(),
    )
    .unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    assert_eq!(sol.slot_assignment.len(), 2);
    assert!(sol
        .slot_assignment
        .keys()
        .all(|&(_, position)| position.is_outside()));
    let total: f64 = sol.duration_slot_job.values().sum();
    assert!((total - 0.02).abs() < EPS);
    assert!(sol.plane_delay["A"].abs() < EPS);
    assert!(work_stands(&result).is_empty());
}

#[test]
fn single_job_round_trip_through_the_pipeline() {
    let rows = vec![JobRow::new("A1", 1.0, "A", 1.0, 0.0)];
    let result = plan(
        &rows,
        &[],
        HangarLayout::new(1, vec![]),
        ScenarioOptions::default(),
        exact(),
    )
    .unwrap();
    verify(&result);

    let sol = &result.outcome.solution;
    assert_eq!(sol.slot_assignment.len(), 3);
    assert!(sol.finish_job["A-exit"] >= sol.finish_job["A1"] - EPS);
    assert!(sol.start_job["A1"] >= sol.finish_job["A-entry"] - EPS);
}
