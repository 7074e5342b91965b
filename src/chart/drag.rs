//! Drag lifecycle: pick up, live preview, drop or cancel.
//!
//! While a drag is active the schedule itself is never touched. The session
//! carries a preview placement that rendering layers over the committed job;
//! only [`commit_drop`] writes it back.

use chrono::{DateTime, Utc};

use super::layout::ScreenRect;
use super::resequence::{anchor_of, resequence, resequence_from};
use crate::error::{ChartError, Result};
use crate::model::{CoordinateMapper, Job, Schedule};

/// Where a job sits: its row and interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub resource_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Placement {
    pub fn of(job: &Job) -> Self {
        Self {
            resource_index: job.resource_index,
            start: job.start,
            end: job.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub job_id: String,
    /// Committed placement at pick-up.
    pub original: Placement,
    /// Pointer position minus the bar's top-left corner at pick-up.
    pub anchor_offset: (f32, f32),
    pub pointer_origin: (f32, f32),
    pub pointer: (f32, f32),
    pub preview: Placement,
    /// Set once the pointer travelled beyond the click slop.
    pub moved: bool,
}

impl DragSession {
    /// Top-left corner of the bar under the pointer, for drawing the ghost
    /// without millisecond rounding.
    pub fn ghost_origin(&self) -> (f32, f32) {
        (
            self.pointer.0 - self.anchor_offset.0,
            self.pointer.1 - self.anchor_offset.1,
        )
    }
}

/// Owns the single active drag session, if any.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging `job`, grabbed at `pointer` on its bar `rect`.
    /// Returns false (and changes nothing) when a drag is already active.
    pub fn begin(&mut self, job: &Job, rect: ScreenRect, pointer: (f32, f32)) -> bool {
        if self.session.is_some() {
            return false;
        }
        let original = Placement::of(job);
        log::debug!("Drag start: {} at {:?}", job.id, pointer);
        self.session = Some(DragSession {
            job_id: job.id.clone(),
            original,
            anchor_offset: (pointer.0 - rect.x, pointer.1 - rect.y),
            pointer_origin: pointer,
            pointer,
            preview: original,
            moved: false,
        });
        true
    }

    /// Move the preview with the pointer: time shifts by the horizontal
    /// travel (duration kept exactly), the row follows the pointer's y.
    pub fn update(
        &mut self,
        pointer: (f32, f32),
        mapper: &CoordinateMapper,
        click_slop: f32,
    ) -> Option<Placement> {
        let session = self.session.as_mut()?;
        let dx = pointer.0 - session.pointer_origin.0;
        let dy = pointer.1 - session.pointer_origin.1;
        if dx.hypot(dy) > click_slop {
            session.moved = true;
        }
        session.pointer = pointer;

        let shift = mapper.pixels_to_duration(dx);
        if let (Some(start), Some(end)) = (
            session.original.start.checked_add_signed(shift),
            session.original.end.checked_add_signed(shift),
        ) {
            session.preview = Placement {
                resource_index: mapper.y_to_resource_index(pointer.1),
                start,
                end,
            };
        }
        Some(session.preview)
    }

    /// End the session on pointer release.
    pub fn finish(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    /// Abandon the session. The committed job was never modified, so this
    /// restores the original placement by construction. Safe to call when
    /// idle.
    pub fn cancel(&mut self) -> Option<DragSession> {
        let session = self.session.take();
        if let Some(session) = &session {
            log::debug!("Drag cancelled: {}", session.job_id);
        }
        session
    }
}

/// What a committed drop changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    pub job_id: String,
    pub source_resource_index: usize,
    pub target_resource_index: usize,
    /// Final placement after resequencing.
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

/// Write the session's preview into the schedule and restore contiguity.
///
/// The destination row keeps the earliest start it had before the drop (or
/// the dropped job's own start if it was empty); the source row, when
/// different, is resequenced from its remaining earliest job. If either row
/// cannot be resequenced within the representable time range, the schedule
/// is left exactly as it was.
pub fn commit_drop(schedule: &mut Schedule, session: &DragSession) -> Result<DropOutcome> {
    let index = schedule.job_index(&session.job_id).ok_or_else(|| {
        ChartError::DropRejected(format!("job '{}' no longer exists", session.job_id))
    })?;
    let last_row = schedule
        .resource_count()
        .checked_sub(1)
        .ok_or_else(|| ChartError::DropRejected("schedule has no resources".to_string()))?;
    let source = schedule.jobs[index].resource_index;
    let target = session.preview.resource_index.min(last_row);

    let target_anchor = anchor_of(schedule, target);
    let committed = schedule.jobs.clone();

    let job = &mut schedule.jobs[index];
    job.resource_index = target;
    job.start = session.preview.start;
    job.end = session.preview.end;

    let resequenced = resequence_from(schedule, target, target_anchor)
        && (source == target || resequence(schedule, source));
    if !resequenced {
        schedule.jobs = committed;
        return Err(ChartError::DropRejected(format!(
            "moving '{}' would push its row past the end of time",
            session.job_id
        )));
    }

    let job = &schedule.jobs[index];
    Ok(DropOutcome {
        job_id: job.id.clone(),
        source_resource_index: source,
        target_resource_index: target,
        new_start: job.start,
        new_end: job.end,
    })
}
