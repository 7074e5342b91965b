//! The interactive chart core, independent of any drawing toolkit.
//!
//! [`ScheduleChart`] owns the schedule, view, selection and drag state.
//! Hosts feed it pointer events in chart-local pixels and inbound commands;
//! it answers with [`FrameGeometry`] for a [`RenderSurface`] and
//! [`ChartEvent`]s for a [`NotificationSink`].

pub mod drag;
pub mod layout;
pub mod notify;
pub mod resequence;
pub mod selection;

use chrono::{DateTime, Utc};

pub use drag::{DragController, DragSession, DropOutcome, Placement};
pub use hit_test::HitTester;
pub use layout::{FrameGeometry, RenderSurface, ScreenRect};
pub use notify::{
    ChannelSink, ChartEvent, DropEvent, FanoutSink, JsonLinesSink, LogSink, NotificationSink,
};
pub use selection::{SelectionSnapshot, SelectionState};

use crate::config::ChartConfig;
use crate::error::Result;
use crate::model::{CoordinateMapper, Job, LoadWarning, Schedule, ScheduleData, ViewWindow, ZoomPreset};

/// Source of "now" for presets, the now marker and resource selection.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Modifier keys held during a pointer press.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl (Cmd on macOS): toggle instead of replace.
    pub multi: bool,
}

pub struct ScheduleChart {
    config: ChartConfig,
    schedule: Schedule,
    mapper: CoordinateMapper,
    hits: HitTester,
    /// Set when geometry changed since the hit cache was built.
    hits_stale: bool,
    selection: SelectionState,
    drag: DragController,
    /// Last pointer x of an active pan.
    pan_from: Option<f32>,
    press_modifiers: Modifiers,
    sink: Option<Box<dyn NotificationSink>>,
    clock: Box<dyn Clock>,
    destroyed: bool,
}

impl ScheduleChart {
    /// Create an empty chart on a `width` x `height` surface.
    pub fn new(config: ChartConfig, width: f32, height: f32) -> Result<Self> {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let mapper = CoordinateMapper::new(ViewWindow::around(clock.now()), width, height, &config)?;
        Ok(Self {
            config,
            schedule: Schedule::default(),
            mapper,
            hits: HitTester::default(),
            hits_stale: true,
            selection: SelectionState::default(),
            drag: DragController::default(),
            pan_from: None,
            press_modifiers: Modifiers::default(),
            sink: None,
            clock,
            destroyed: false,
        })
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: Option<Box<dyn NotificationSink>>) {
        self.sink = sink;
    }

    /// Replace the clock and re-center the empty view on its "now".
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        if self.schedule.jobs.is_empty() {
            self.mapper.set_window(ViewWindow::around(self.clock.now()));
            self.hits_stale = true;
        }
        self
    }

    // ---- Inbound commands ----

    /// Replace all data. Any active drag is cancelled and the selection is
    /// reset; the view comes from the document or is fitted to the jobs.
    pub fn set_data(&mut self, data: ScheduleData) -> Vec<LoadWarning> {
        if self.destroyed {
            return Vec::new();
        }
        let loaded = Schedule::load(data);
        self.replace(loaded.schedule, loaded.view);
        loaded.warnings
    }

    /// Replace all data with an already validated schedule, fitting the view.
    pub fn set_schedule(&mut self, schedule: Schedule) {
        if self.destroyed {
            return;
        }
        self.replace(schedule, None);
    }

    fn replace(&mut self, schedule: Schedule, view: Option<ViewWindow>) {
        self.cancel_drag();
        self.pan_from = None;

        let now = self.clock.now();
        let window = view.unwrap_or_else(|| ZoomPreset::All.window(now, schedule.extent()));
        log::info!(
            "Loaded {} job(s) on {} resource(s)",
            schedule.jobs.len(),
            schedule.resource_count()
        );
        self.mapper.set_resource_count(schedule.resource_count());
        self.mapper.set_window(window);
        self.schedule = schedule;
        self.hits.clear();
        self.hits_stale = true;

        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection();
        }
    }

    pub fn set_zoom(&mut self, preset: ZoomPreset) {
        if self.destroyed {
            return;
        }
        let window = preset.window(self.clock.now(), self.schedule.extent());
        log::debug!("Zoom preset {} -> [{}, {}]", preset.label(), window.start(), window.end());
        self.mapper.set_window(window);
        self.hits_stale = true;
    }

    /// Zoom by `factor` (> 1 zooms in) around the pointer at `anchor_x`.
    pub fn zoom(&mut self, factor: f64, anchor_x: f32) {
        if self.destroyed {
            return;
        }
        self.mapper.zoom(factor, anchor_x);
        self.hits_stale = true;
    }

    pub fn pan(&mut self, delta_x: f32) {
        if self.destroyed {
            return;
        }
        self.mapper.pan(delta_x);
        self.hits_stale = true;
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        if width == self.mapper.width() && height == self.mapper.height() {
            return Ok(());
        }
        self.mapper.resize(width, height)?;
        self.hits_stale = true;
        Ok(())
    }

    pub fn set_editing(&mut self, editing: bool) {
        if self.destroyed {
            return;
        }
        if !editing {
            self.cancel_drag();
        }
        self.config.editing = editing;
    }

    pub fn clear_selection(&mut self) {
        if self.destroyed {
            return;
        }
        self.selection.clear();
        self.emit_selection();
    }

    pub fn select_all(&mut self) {
        if self.destroyed {
            return;
        }
        self.selection.select_all(&self.schedule);
        self.emit_selection();
    }

    /// Detach the sink and stop reacting to input and commands. Calling it
    /// again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_drag();
        self.pan_from = None;
        self.sink = None;
        self.hits.clear();
        self.destroyed = true;
        log::debug!("Chart destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ---- Rendering ----

    /// Lay out the current frame and refresh the hit cache from it.
    pub fn layout(&mut self) -> FrameGeometry {
        let preview = self
            .drag
            .session()
            .map(|session| (session.job_id.as_str(), session.preview));
        let frame = layout::layout_frame(
            &self.schedule,
            &self.mapper,
            &self.config,
            &self.selection,
            preview,
            self.clock.now(),
        );
        self.hits.rebuild(&frame);
        self.hits_stale = false;
        frame
    }

    pub fn render(&mut self, surface: &mut dyn RenderSurface) {
        if self.destroyed {
            return;
        }
        let frame = self.layout();
        surface.draw_frame(&self.schedule, &frame);
    }

    fn refresh_hits(&mut self) {
        if self.hits_stale {
            self.layout();
        }
    }

    // ---- Pointer input (chart-local pixels) ----

    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        if self.destroyed || self.drag.is_dragging() {
            return;
        }
        self.refresh_hits();

        if let Some(resource_id) = self.hits.resource_at(x, y) {
            if let Some(index) = self.schedule.resource_index(resource_id) {
                let now = self.clock.now();
                self.selection.click_resource(&self.schedule, index, now);
                self.hits_stale = true;
                self.emit_selection();
            }
            return;
        }

        if let Some(job_id) = self.hits.job_at(x, y).map(str::to_string) {
            if self.config.editing {
                let rect = self.hits.job_rect(&job_id);
                if let (Some(job), Some(rect)) = (self.schedule.job(&job_id), rect) {
                    self.drag.begin(job, rect, (x, y));
                    self.press_modifiers = modifiers;
                    self.hits_stale = true;
                }
            } else {
                self.selection.click_job(&job_id, modifiers.multi);
                self.hits_stale = true;
                self.emit_selection();
            }
            return;
        }

        if !modifiers.multi {
            self.selection.clear();
            self.hits_stale = true;
            self.emit_selection();
        }
        self.pan_from = Some(x);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.destroyed {
            return;
        }
        if self.drag.is_dragging() {
            self.drag.update((x, y), &self.mapper, self.config.click_slop);
            self.hits_stale = true;
        } else if let Some(last_x) = self.pan_from {
            self.mapper.pan(x - last_x);
            self.pan_from = Some(x);
            self.hits_stale = true;
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        if self.destroyed {
            return;
        }
        self.pan_from = None;
        self.drag.update((x, y), &self.mapper, self.config.click_slop);
        let Some(session) = self.drag.finish() else {
            return;
        };
        self.hits_stale = true;

        if !session.moved {
            self.selection
                .click_job(&session.job_id, self.press_modifiers.multi);
            self.emit_selection();
            return;
        }

        let outcome = match drag::commit_drop(&mut self.schedule, &session) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("{}", err);
                self.emit(ChartEvent::DragCancelled {
                    job_id: session.job_id,
                });
                return;
            }
        };
        let resource_id = |index: usize| {
            self.schedule
                .resource_id(index)
                .unwrap_or_default()
                .to_string()
        };
        let event = DropEvent {
            job_id: outcome.job_id.clone(),
            source_resource_id: resource_id(outcome.source_resource_index),
            target_resource_id: resource_id(outcome.target_resource_index),
            new_start: outcome.new_start,
            new_end: outcome.new_end,
        };
        log::info!(
            "Dropped {} from {} to {} at {}",
            event.job_id,
            event.source_resource_id,
            event.target_resource_id,
            event.new_start
        );
        self.emit(ChartEvent::JobDropped(event));
    }

    /// The pointer left the surface: abandon any drag or pan.
    pub fn pointer_leave(&mut self) {
        self.pan_from = None;
        self.cancel_drag();
    }

    /// Abandon the active drag, if any. The committed schedule was never
    /// touched, so nothing needs restoring.
    pub fn cancel_drag(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(session) = self.drag.cancel() {
            self.hits_stale = true;
            self.emit(ChartEvent::DragCancelled {
                job_id: session.job_id,
            });
        }
    }

    // ---- Queries ----

    /// Job under the pointer according to the last layout.
    pub fn job_at(&self, x: f32, y: f32) -> Option<&Job> {
        self.hits.job_at(x, y).and_then(|id| self.schedule.job(id))
    }

    pub fn resource_at(&self, x: f32, y: f32) -> Option<&str> {
        self.hits.resource_at(x, y)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn is_panning(&self) -> bool {
        self.pan_from.is_some()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn emit_selection(&mut self) {
        self.emit(ChartEvent::SelectionChanged(self.selection.snapshot()));
    }

    /// Deliver an event. Sink failures are logged and otherwise ignored.
    fn emit(&mut self, event: ChartEvent) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.notify(&event) {
                log::warn!("Notification sink failed: {}", err);
            }
        }
    }
}
