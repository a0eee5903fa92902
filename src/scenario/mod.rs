//! Scenario input rows, validation, and the assembled entity tables.
//!
//! A scenario starts as flat job/plane rows (the shape of the tabular input
//! an external loader produces). [`Scenario::build`] validates them, augments
//! every aircraft with entry/exit marker jobs, resolves clients and time
//! windows, and sizes the planning horizon. The derived index sets live in
//! [`index::IndexSets`].

pub mod error;
pub mod index;

pub use error::ScenarioError;
pub use index::IndexSets;

use crate::layout::HangarLayout;
use crate::{ClientId, JobId, PlaneId};
use log::{debug, warn};
use qtty::{Day, Quantity};
use std::collections::HashMap;

/// Duration, in days, of the entry/exit marker jobs bracketing each
/// aircraft's stay. Near-zero so they never distort the schedule.
pub const MARKER_JOB_DAYS: f64 = 0.01;

/// Safety factor applied to the busiest aircraft's total workload when
/// sizing the horizon (and therefore the big-M constant).
pub const HORIZON_MARGIN: f64 = 1.2;

/// One row of the main input sheet.
///
/// `task` is kept as the raw floating-point cell value; validation rejects
/// anything that is not a non-negative integer.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub job: JobId,
    pub task: f64,
    pub plane: PlaneId,
    pub duration: Quantity<Day>,
    /// Days offset of the job's planned date from the scenario's day zero.
    pub date: Quantity<Day>,
    pub client: Option<ClientId>,
}

impl JobRow {
    pub fn new(
        job: impl Into<JobId>,
        task: f64,
        plane: impl Into<PlaneId>,
        duration_days: f64,
        date_days: f64,
    ) -> Self {
        Self {
            job: job.into(),
            task,
            plane: plane.into(),
            duration: Quantity::new(duration_days),
            date: Quantity::new(date_days),
            client: None,
        }
    }

    pub fn with_client(mut self, client: impl Into<ClientId>) -> Self {
        self.client = Some(client.into());
        self
    }
}

/// One row of the `Planes` sheet: optional time window per aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneRow {
    pub plane: PlaneId,
    pub early_start: Option<Quantity<Day>>,
    pub late_finish: Option<Quantity<Day>>,
}

impl PlaneRow {
    pub fn new(plane: impl Into<PlaneId>) -> Self {
        Self {
            plane: plane.into(),
            early_start: None,
            late_finish: None,
        }
    }

    pub fn early_start(mut self, days: f64) -> Self {
        self.early_start = Some(Quantity::new(days));
        self
    }

    pub fn late_finish(mut self, days: f64) -> Self {
        self.late_finish = Some(Quantity::new(days));
        self
    }
}

/// Whether a job is real maintenance work or one of the generated markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Work,
    /// Marks the aircraft's arrival; first task, performed outside.
    Entry,
    /// Marks the aircraft's departure; last task, performed outside.
    Exit,
}

impl JobKind {
    /// True for the entry/exit markers that must be routed outside.
    pub fn is_marker(self) -> bool {
        !matches!(self, JobKind::Work)
    }
}

/// A validated job, markers included. Indices refer into [`Scenario::planes`].
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub task: u32,
    pub plane: usize,
    pub duration: Quantity<Day>,
    pub date: Quantity<Day>,
    pub kind: JobKind,
}

/// A validated aircraft. Indices refer into [`Scenario::jobs`] and
/// [`Scenario::clients`].
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub id: PlaneId,
    pub client: usize,
    /// This plane's jobs, ascending by task ordinal (markers included).
    pub jobs: Vec<usize>,
    /// The job carrying the plane's maximum task ordinal (the exit marker).
    pub last_job: usize,
    pub early_start: Quantity<Day>,
    pub late_finish: Quantity<Day>,
    /// Latest `date + duration` over the plane's jobs.
    pub predicted_finish: Quantity<Day>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub planes: Vec<usize>,
}

/// Knobs for scenario assembly.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOptions {
    /// Floor for the computed horizon. The horizon invariant is a lower
    /// bound, so raising it is always admissible; callers widen the time
    /// axis when work must serialise across interfering positions.
    pub min_horizon: Option<Quantity<Day>>,
}

/// The validated scenario: entity tables plus the horizon that doubles as
/// the big-M constant of every time-gating constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub layout: HangarLayout,
    pub jobs: Vec<Job>,
    pub planes: Vec<Plane>,
    pub clients: Vec<Client>,
    pub horizon: Quantity<Day>,
    job_lookup: HashMap<JobId, usize>,
    plane_lookup: HashMap<PlaneId, usize>,
}

impl Scenario {
    /// Builds a scenario with default options.
    pub fn build(
        job_rows: &[JobRow],
        plane_rows: &[PlaneRow],
        layout: HangarLayout,
    ) -> Result<Self, ScenarioError> {
        Self::build_with_options(job_rows, plane_rows, layout, ScenarioOptions::default())
    }

    /// Validates the rows, augments each aircraft with entry/exit markers,
    /// resolves clients and windows, and sizes the horizon.
    ///
    /// The roster is the union of aircraft named in `job_rows` and
    /// `plane_rows`; an aircraft without work rows still gets its markers.
    pub fn build_with_options(
        job_rows: &[JobRow],
        plane_rows: &[PlaneRow],
        layout: HangarLayout,
        options: ScenarioOptions,
    ) -> Result<Self, ScenarioError> {
        let mut plane_ids: Vec<PlaneId> = Vec::new();
        let mut plane_lookup: HashMap<PlaneId, usize> = HashMap::new();
        let mut push_plane = |id: &PlaneId, ids: &mut Vec<PlaneId>| {
            if !plane_lookup.contains_key(id) {
                plane_lookup.insert(id.clone(), ids.len());
                ids.push(id.clone());
            }
        };
        for row in job_rows {
            if row.plane.is_empty() {
                return Err(ScenarioError::MissingPlane {
                    job: row.job.clone(),
                });
            }
            push_plane(&row.plane, &mut plane_ids);
        }
        for row in plane_rows {
            if !row.plane.is_empty() {
                push_plane(&row.plane, &mut plane_ids);
            }
        }
        if plane_ids.is_empty() {
            return Err(ScenarioError::NoPlanes);
        }

        // Validate and collect the work jobs in input order.
        let mut jobs: Vec<Job> = Vec::with_capacity(job_rows.len() + 2 * plane_ids.len());
        let mut job_lookup: HashMap<JobId, usize> = HashMap::new();
        for row in job_rows {
            let duration = row.duration.value();
            if !duration.is_finite() || duration < 0.0 {
                return Err(ScenarioError::InvalidDuration {
                    job: row.job.clone(),
                    duration,
                });
            }
            if !row.task.is_finite() || row.task < 0.0 || row.task.fract() != 0.0 {
                return Err(ScenarioError::InvalidTask {
                    job: row.job.clone(),
                    task: row.task,
                });
            }
            if job_lookup.contains_key(&row.job) {
                return Err(ScenarioError::DuplicateJob(row.job.clone()));
            }
            job_lookup.insert(row.job.clone(), jobs.len());
            jobs.push(Job {
                id: row.job.clone(),
                task: row.task as u32,
                plane: plane_lookup[&row.plane],
                duration: row.duration,
                date: row.date,
                kind: JobKind::Work,
            });
        }

        // Entry/exit markers bracket every aircraft's stay: task 0 before all
        // work, max task + 1 after it.
        for (r, plane_id) in plane_ids.iter().enumerate() {
            let max_task = jobs
                .iter()
                .filter(|j| j.plane == r)
                .map(|j| j.task)
                .max()
                .unwrap_or(0);
            for (suffix, task, kind) in [
                ("entry", 0, JobKind::Entry),
                ("exit", max_task + 1, JobKind::Exit),
            ] {
                let id = format!("{plane_id}-{suffix}");
                if job_lookup.contains_key(&id) {
                    return Err(ScenarioError::DuplicateJob(id));
                }
                job_lookup.insert(id.clone(), jobs.len());
                jobs.push(Job {
                    id,
                    task,
                    plane: r,
                    duration: Quantity::new(MARKER_JOB_DAYS),
                    date: Quantity::new(0.0),
                    kind,
                });
            }
        }

        // Clients: the first client named for a plane owns it. Without any
        // client column, every plane is its own client.
        let has_clients = job_rows.iter().any(|row| row.client.is_some());
        let mut clients: Vec<Client> = Vec::new();
        let mut client_lookup: HashMap<ClientId, usize> = HashMap::new();
        let mut client_of_plane: Vec<Option<usize>> = vec![None; plane_ids.len()];
        if has_clients {
            for row in job_rows {
                let Some(client_id) = &row.client else {
                    continue;
                };
                let c = *client_lookup.entry(client_id.clone()).or_insert_with(|| {
                    clients.push(Client {
                        id: client_id.clone(),
                        planes: Vec::new(),
                    });
                    clients.len() - 1
                });
                let r = plane_lookup[&row.plane];
                match client_of_plane[r] {
                    None => client_of_plane[r] = Some(c),
                    Some(existing) if existing != c => {
                        warn!(
                            "aircraft {} is claimed by clients {} and {}; keeping {}",
                            plane_ids[r], clients[existing].id, clients[c].id, clients[existing].id
                        );
                    }
                    Some(_) => {}
                }
            }
        }
        for (r, plane_id) in plane_ids.iter().enumerate() {
            let c = match client_of_plane[r] {
                Some(c) => c,
                None => {
                    // Planes without a client (or scenarios without the
                    // client column) act as their own client.
                    *client_lookup.entry(plane_id.clone()).or_insert_with(|| {
                        clients.push(Client {
                            id: plane_id.clone(),
                            planes: Vec::new(),
                        });
                        clients.len() - 1
                    })
                }
            };
            client_of_plane[r] = Some(c);
            clients[c].planes.push(r);
        }

        // Horizon: margin over the busiest aircraft's total workload,
        // markers included. Every big-M in the model is this one constant.
        let busiest = (0..plane_ids.len())
            .map(|r| {
                jobs.iter()
                    .filter(|j| j.plane == r)
                    .map(|j| j.duration.value())
                    .sum::<f64>()
            })
            .fold(0.0_f64, f64::max);
        let mut horizon = HORIZON_MARGIN * busiest;
        if let Some(floor) = options.min_horizon {
            horizon = horizon.max(floor.value());
        }

        let window_rows: HashMap<&str, &PlaneRow> = plane_rows
            .iter()
            .map(|row| (row.plane.as_str(), row))
            .collect();

        let planes: Vec<Plane> = plane_ids
            .iter()
            .enumerate()
            .map(|(r, id)| {
                let mut owned: Vec<usize> = (0..jobs.len()).filter(|&j| jobs[j].plane == r).collect();
                owned.sort_by_key(|&j| (jobs[j].task, j));
                let last_job = *owned
                    .iter()
                    .max_by_key(|&&j| (jobs[j].task, j))
                    .expect("every plane has at least its markers");
                let predicted_finish = owned
                    .iter()
                    .map(|&j| jobs[j].date.value() + jobs[j].duration.value())
                    .fold(0.0_f64, f64::max);
                let window = window_rows.get(id.as_str());
                Plane {
                    id: id.clone(),
                    client: client_of_plane[r].expect("client resolved above"),
                    jobs: owned,
                    last_job,
                    early_start: window
                        .and_then(|w| w.early_start)
                        .unwrap_or(Quantity::new(0.0)),
                    late_finish: window
                        .and_then(|w| w.late_finish)
                        .unwrap_or(Quantity::new(horizon)),
                    predicted_finish: Quantity::new(predicted_finish),
                }
            })
            .collect();

        debug!(
            "scenario assembled: {} jobs ({} markers), {} planes, {} clients, horizon {:.3} days",
            jobs.len(),
            2 * planes.len(),
            planes.len(),
            clients.len(),
            horizon
        );

        Ok(Self {
            layout,
            jobs,
            planes,
            clients,
            horizon: Quantity::new(horizon),
            job_lookup,
            plane_lookup,
        })
    }

    pub fn job_index(&self, id: &str) -> Option<usize> {
        self.job_lookup.get(id).copied()
    }

    pub fn plane_index(&self, id: &str) -> Option<usize> {
        self.plane_lookup.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> HangarLayout {
        HangarLayout::new(2, vec![])
    }

    #[test]
    fn augments_each_plane_with_markers() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("A2", 2.0, "A", 3.0, 0.0),
        ];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        assert_eq!(scenario.jobs.len(), 4);
        let entry = &scenario.jobs[scenario.job_index("A-entry").unwrap()];
        let exit = &scenario.jobs[scenario.job_index("A-exit").unwrap()];
        assert_eq!(entry.task, 0);
        assert_eq!(entry.kind, JobKind::Entry);
        assert_eq!(exit.task, 3);
        assert_eq!(exit.kind, JobKind::Exit);
        assert!((entry.duration.value() - MARKER_JOB_DAYS).abs() < 1e-12);
    }

    #[test]
    fn last_job_is_the_exit_marker() {
        let rows = vec![JobRow::new("A1", 1.0, "A", 2.0, 0.0)];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        let plane = &scenario.planes[0];
        assert_eq!(scenario.jobs[plane.last_job].kind, JobKind::Exit);
        let tasks: Vec<u32> = plane.jobs.iter().map(|&j| scenario.jobs[j].task).collect();
        assert_eq!(tasks, vec![0, 1, 2]);
    }

    #[test]
    fn horizon_covers_the_busiest_plane() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("A2", 2.0, "A", 3.0, 0.0),
            JobRow::new("B1", 1.0, "B", 1.0, 0.0),
        ];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        let expected = HORIZON_MARGIN * (2.0 + 3.0 + 2.0 * MARKER_JOB_DAYS);
        assert!((scenario.horizon.value() - expected).abs() < 1e-9);
    }

    #[test]
    fn min_horizon_raises_but_never_lowers() {
        let rows = vec![JobRow::new("A1", 1.0, "A", 2.0, 0.0)];
        let opts = ScenarioOptions {
            min_horizon: Some(Quantity::new(50.0)),
        };
        let scenario =
            Scenario::build_with_options(&rows, &[], layout(), opts).unwrap();
        assert!((scenario.horizon.value() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn windows_default_to_zero_and_horizon() {
        let rows = vec![JobRow::new("A1", 1.0, "A", 2.0, 0.0)];
        let planes = vec![PlaneRow::new("A").late_finish(4.0)];
        let scenario = Scenario::build(&rows, &planes, layout()).unwrap();
        let plane = &scenario.planes[0];
        assert_eq!(plane.early_start.value(), 0.0);
        assert_eq!(plane.late_finish.value(), 4.0);

        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        let plane = &scenario.planes[0];
        assert_eq!(plane.late_finish.value(), scenario.horizon.value());
    }

    #[test]
    fn plane_without_work_rows_gets_only_markers() {
        let scenario =
            Scenario::build(&[], &[PlaneRow::new("A")], layout()).unwrap();
        assert_eq!(scenario.planes.len(), 1);
        assert_eq!(scenario.jobs.len(), 2);
        assert!(scenario.jobs.iter().all(|j| j.kind.is_marker()));
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert_eq!(
            Scenario::build(&[], &[], layout()),
            Err(ScenarioError::NoPlanes)
        );
    }

    #[test]
    fn fractional_task_is_rejected() {
        let rows = vec![JobRow::new("A1", 1.5, "A", 2.0, 0.0)];
        assert!(matches!(
            Scenario::build(&rows, &[], layout()),
            Err(ScenarioError::InvalidTask { .. })
        ));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let rows = vec![JobRow::new("A1", 1.0, "A", -2.0, 0.0)];
        assert!(matches!(
            Scenario::build(&rows, &[], layout()),
            Err(ScenarioError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn duplicate_job_is_rejected() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("A1", 2.0, "A", 3.0, 0.0),
        ];
        assert_eq!(
            Scenario::build(&rows, &[], layout()),
            Err(ScenarioError::DuplicateJob("A1".to_string()))
        );
    }

    #[test]
    fn planes_without_client_column_own_themselves() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0),
            JobRow::new("B1", 1.0, "B", 1.0, 0.0),
        ];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        assert_eq!(scenario.clients.len(), 2);
        assert_eq!(scenario.clients[0].id, "A");
        assert_eq!(scenario.clients[0].planes, vec![0]);
    }

    #[test]
    fn client_column_groups_planes() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 0.0).with_client("acme"),
            JobRow::new("B1", 1.0, "B", 1.0, 0.0).with_client("acme"),
        ];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        assert_eq!(scenario.clients.len(), 1);
        assert_eq!(scenario.clients[0].planes, vec![0, 1]);
    }

    #[test]
    fn predicted_finish_tracks_latest_job() {
        let rows = vec![
            JobRow::new("A1", 1.0, "A", 2.0, 1.0),
            JobRow::new("A2", 2.0, "A", 3.0, 4.0),
        ];
        let scenario = Scenario::build(&rows, &[], layout()).unwrap();
        assert!((scenario.planes[0].predicted_finish.value() - 7.0).abs() < 1e-9);
    }
}
