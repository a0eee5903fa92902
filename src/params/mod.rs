//! The immutable parameter table: every constant the model assembler needs,
//! keyed by plain indices.
//!
//! Built once from a [`Scenario`](crate::scenario::Scenario) and never
//! mutated; all lookups are O(1). The horizon and the big-M constant are the
//! same number under two names, so every big-M term in the model is tied to
//! the single horizon value.

use crate::scenario::Scenario;

#[derive(Debug, Clone)]
pub struct ParameterTable {
    horizon: f64,
    job_duration: Vec<f64>,
    task_of_job: Vec<u32>,
    plane_of_job: Vec<usize>,
    last_job_of_plane: Vec<usize>,
    client_of_plane: Vec<usize>,
    planes_of_client: Vec<Vec<usize>>,
    early_start: Vec<f64>,
    late_finish: Vec<f64>,
    predicted_finish: Vec<f64>,
}

impl ParameterTable {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            horizon: scenario.horizon.value(),
            job_duration: scenario.jobs.iter().map(|j| j.duration.value()).collect(),
            task_of_job: scenario.jobs.iter().map(|j| j.task).collect(),
            plane_of_job: scenario.jobs.iter().map(|j| j.plane).collect(),
            last_job_of_plane: scenario.planes.iter().map(|r| r.last_job).collect(),
            client_of_plane: scenario.planes.iter().map(|r| r.client).collect(),
            planes_of_client: scenario.clients.iter().map(|c| c.planes.clone()).collect(),
            early_start: scenario.planes.iter().map(|r| r.early_start.value()).collect(),
            late_finish: scenario.planes.iter().map(|r| r.late_finish.value()).collect(),
            predicted_finish: scenario
                .planes
                .iter()
                .map(|r| r.predicted_finish.value())
                .collect(),
        }
    }

    /// Planning horizon in days; no finish time may exceed it.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// The big-M constant of every time-gating constraint; an alias of the
    /// horizon.
    pub fn big_m(&self) -> f64 {
        self.horizon
    }

    pub fn job_duration(&self, job: usize) -> f64 {
        self.job_duration[job]
    }

    pub fn task_of_job(&self, job: usize) -> u32 {
        self.task_of_job[job]
    }

    pub fn plane_of_job(&self, job: usize) -> usize {
        self.plane_of_job[job]
    }

    /// The job closing plane `plane`'s task chain (its exit marker).
    pub fn last_job_of_plane(&self, plane: usize) -> usize {
        self.last_job_of_plane[plane]
    }

    pub fn is_last_job(&self, job: usize, plane: usize) -> bool {
        self.last_job_of_plane[plane] == job
    }

    pub fn client_of_plane(&self, plane: usize) -> usize {
        self.client_of_plane[plane]
    }

    pub fn planes_of_client(&self, client: usize) -> &[usize] {
        &self.planes_of_client[client]
    }

    pub fn early_start(&self, plane: usize) -> f64 {
        self.early_start[plane]
    }

    pub fn late_finish(&self, plane: usize) -> f64 {
        self.late_finish[plane]
    }

    pub fn predicted_finish(&self, plane: usize) -> f64 {
        self.predicted_finish[plane]
    }
}
