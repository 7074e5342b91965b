//! Closing gaps and overlaps among the jobs of one resource.

use chrono::{DateTime, Utc};

use crate::model::Schedule;

/// Make the jobs on `resource_index` contiguous, anchored at the earliest
/// job's current start. No-op for a resource without jobs.
///
/// Returns `false`, leaving the row untouched, when the row would run past
/// the last representable instant.
pub fn resequence(schedule: &mut Schedule, resource_index: usize) -> bool {
    resequence_from(schedule, resource_index, None)
}

/// Make the jobs on `resource_index` contiguous starting at `anchor`, or at
/// the earliest job's start when `anchor` is `None`.
///
/// Jobs keep their relative order by start (ties by position in the job list)
/// and their exact durations; each job starts where the previous one ends.
pub fn resequence_from(
    schedule: &mut Schedule,
    resource_index: usize,
    anchor: Option<DateTime<Utc>>,
) -> bool {
    let order = schedule.jobs_on(resource_index);
    let Some(&first) = order.first() else {
        return true;
    };

    let mut cursor = anchor.unwrap_or(schedule.jobs[first].start);
    let mut placed = Vec::with_capacity(order.len());
    for &index in &order {
        let Some(end) = cursor.checked_add_signed(schedule.jobs[index].duration()) else {
            log::warn!(
                "Resequencing row {} would overflow the time range; left as is",
                resource_index
            );
            return false;
        };
        placed.push((index, cursor, end));
        cursor = end;
    }

    for (index, start, end) in placed {
        let job = &mut schedule.jobs[index];
        job.start = start;
        job.end = end;
    }
    true
}

/// Earliest start among the jobs on `resource_index`.
pub fn anchor_of(schedule: &Schedule, resource_index: usize) -> Option<DateTime<Utc>> {
    schedule
        .jobs
        .iter()
        .filter(|j| j.resource_index == resource_index)
        .map(|j| j.start)
        .min()
}

/// True when the jobs on `resource_index`, sorted by start, have no gaps
/// and no overlaps.
pub fn is_contiguous(schedule: &Schedule, resource_index: usize) -> bool {
    let order = schedule.jobs_on(resource_index);
    order
        .windows(2)
        .all(|pair| schedule.jobs[pair[0]].end == schedule.jobs[pair[1]].start)
}
