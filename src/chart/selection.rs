//! Selected jobs and resources.
//!
//! Job membership is authoritative. A selected resource is a convenience
//! flag recording that its upcoming jobs were selected through its label.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Schedule;

/// Number of jobs, counted from the in-progress (or next) one, that a
/// resource click leaves unselected.
const RESOURCE_SKIP: usize = 2;

/// Plain-data copy of the selection handed to notification sinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub selected_job_ids: Vec<String>,
    pub selected_resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    jobs: BTreeSet<String>,
    resources: BTreeSet<String>,
}

impl SelectionState {
    /// Click on a job. Without the multi-select modifier the result is either
    /// exactly this job or, if it was already selected, nothing.
    pub fn click_job(&mut self, job_id: &str, multi: bool) {
        if multi {
            if !self.jobs.remove(job_id) {
                self.jobs.insert(job_id.to_string());
            }
            return;
        }
        let was_selected = self.jobs.contains(job_id);
        self.clear();
        if !was_selected {
            self.jobs.insert(job_id.to_string());
        }
    }

    /// Toggle a resource. Turning it on adds its upcoming jobs (see
    /// [`upcoming_jobs`]); turning it off removes all of its jobs. When there
    /// is nothing upcoming the selection is left as it was.
    pub fn click_resource(
        &mut self,
        schedule: &Schedule,
        resource_index: usize,
        now: DateTime<Utc>,
    ) {
        let Some(resource_id) = schedule.resource_id(resource_index) else {
            return;
        };

        if self.resources.remove(resource_id) {
            for job in schedule
                .jobs
                .iter()
                .filter(|j| j.resource_index == resource_index)
            {
                self.jobs.remove(&job.id);
            }
            return;
        }

        let upcoming = upcoming_jobs(schedule, resource_index, now);
        if upcoming.is_empty() {
            return;
        }
        self.resources.insert(resource_id.to_string());
        self.jobs.extend(upcoming);
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.resources.clear();
    }

    pub fn select_all(&mut self, schedule: &Schedule) {
        self.jobs.extend(schedule.jobs.iter().map(|j| j.id.clone()));
    }

    pub fn is_job_selected(&self, job_id: &str) -> bool {
        self.jobs.contains(job_id)
    }

    pub fn is_resource_selected(&self, resource_id: &str) -> bool {
        self.resources.contains(resource_id)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.resources.is_empty()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selected_job_ids: self.jobs.iter().cloned().collect(),
            selected_resource_ids: self.resources.iter().cloned().collect(),
        }
    }
}

/// Jobs on a resource that come after the current and the next one.
///
/// The anchor is the job covering `now`, or failing that the first job that
/// starts after `now`. The anchor and the job after it are skipped; all later
/// jobs are returned in start order. No anchor means nothing is returned.
pub fn upcoming_jobs(schedule: &Schedule, resource_index: usize, now: DateTime<Utc>) -> Vec<String> {
    let order = schedule.jobs_on(resource_index);
    let anchor = order
        .iter()
        .position(|&i| schedule.jobs[i].covers(now))
        .or_else(|| order.iter().position(|&i| schedule.jobs[i].start > now));

    match anchor {
        Some(anchor) => order
            .iter()
            .skip(anchor + RESOURCE_SKIP)
            .map(|&i| schedule.jobs[i].id.clone())
            .collect(),
        None => Vec::new(),
    }
}
