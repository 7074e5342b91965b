//! Frame geometry: where every bar, row label and grid tick goes.
//!
//! A render pass turns the schedule into a [`FrameGeometry`] of plain
//! rectangles. Render surfaces draw it; the hit tester caches it.

use chrono::{DateTime, Utc};

use super::drag::Placement;
use super::selection::SelectionState;
use crate::config::ChartConfig;
use crate::model::{CoordinateMapper, GridInterval, Schedule, ViewWindow};

/// Axis-aligned rectangle in chart-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Point-in-rectangle test, edges inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub job_index: usize,
    pub job_id: String,
    pub rect: ScreenRect,
    pub selected: bool,
    /// Drawn from the live drag preview rather than committed state.
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub resource_index: usize,
    pub resource_id: String,
    /// Full-width band of the row.
    pub row_rect: ScreenRect,
    /// The part of the row inside the label column.
    pub label_rect: ScreenRect,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridTick {
    pub x: f32,
    pub label: String,
}

/// Everything a surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub window: ViewWindow,
    pub rows: Vec<RowGeometry>,
    /// In draw order; the dragged bar, if any, comes last.
    pub bars: Vec<BarGeometry>,
    pub ticks: Vec<GridTick>,
    /// Position of the "now" marker when it is inside the window.
    pub now_x: Option<f32>,
}

/// A drawing backend. It receives finished geometry and never mutates the
/// chart; the same rectangles back hit testing.
pub trait RenderSurface {
    fn draw_frame(&mut self, schedule: &Schedule, frame: &FrameGeometry);
}

/// Rectangle of a bar placed at `placement`, or `None` when it is narrower
/// than a pixel or lies entirely outside the time axis.
pub fn bar_rect(
    mapper: &CoordinateMapper,
    config: &ChartConfig,
    placement: &Placement,
) -> Option<ScreenRect> {
    let x = mapper.time_to_x(placement.start);
    let end_x = mapper.time_to_x(placement.end);
    let width = end_x - x;
    if width < 1.0 || x > mapper.width() || end_x < mapper.left_margin() {
        return None;
    }
    let y = mapper.resource_index_to_y(placement.resource_index) + config.bar_padding;
    Some(ScreenRect::new(x, y, width, config.bar_height()))
}

pub fn layout_frame(
    schedule: &Schedule,
    mapper: &CoordinateMapper,
    config: &ChartConfig,
    selection: &SelectionState,
    preview: Option<(&str, Placement)>,
    now: DateTime<Utc>,
) -> FrameGeometry {
    let rows = schedule
        .resources
        .iter()
        .enumerate()
        .map(|(index, resource)| {
            let y = mapper.resource_index_to_y(index);
            RowGeometry {
                resource_index: index,
                resource_id: resource.id.clone(),
                row_rect: ScreenRect::new(0.0, y, mapper.width(), mapper.row_height()),
                label_rect: ScreenRect::new(0.0, y, mapper.left_margin(), mapper.row_height()),
                selected: selection.is_resource_selected(&resource.id),
            }
        })
        .collect();

    let mut bars = Vec::with_capacity(schedule.jobs.len());
    let mut dragged = None;
    for (index, job) in schedule.jobs.iter().enumerate() {
        if let Some((id, placement)) = preview {
            if id == job.id {
                dragged = bar_rect(mapper, config, &placement).map(|rect| BarGeometry {
                    job_index: index,
                    job_id: job.id.clone(),
                    rect,
                    selected: selection.is_job_selected(&job.id),
                    dragging: true,
                });
                continue;
            }
        }
        if let Some(rect) = bar_rect(mapper, config, &Placement::of(job)) {
            bars.push(BarGeometry {
                job_index: index,
                job_id: job.id.clone(),
                rect,
                selected: selection.is_job_selected(&job.id),
                dragging: false,
            });
        }
    }
    bars.extend(dragged);

    let window = mapper.window();
    let interval = GridInterval::for_window(&window);
    let ticks = interval
        .ticks(&window)
        .into_iter()
        .map(|instant| GridTick {
            x: mapper.time_to_x(instant),
            label: interval.label(instant),
        })
        .collect();

    FrameGeometry {
        width: mapper.width(),
        height: mapper.height(),
        left_margin: mapper.left_margin(),
        top_margin: mapper.top_margin(),
        window,
        rows,
        bars,
        ticks,
        now_x: window.contains(now).then(|| mapper.time_to_x(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Job, Resource};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn setup() -> (Schedule, CoordinateMapper, ChartConfig) {
        let config = ChartConfig::default();
        let window = ViewWindow::new(t0(), t0() + Duration::days(10));
        let mut mapper = CoordinateMapper::new(window, 1120.0, 400.0, &config).unwrap();
        mapper.set_resource_count(2);
        let schedule = Schedule::new(
            vec![Resource::new("R1"), Resource::new("R2")],
            vec![
                Job::new("A", 0, t0(), t0() + Duration::days(1)),
                Job::new("B", 1, t0() + Duration::days(2), t0() + Duration::days(4)),
                Job::new("gone", 0, t0() - Duration::days(9), t0() - Duration::days(8)),
            ],
        );
        (schedule, mapper, config)
    }

    #[test]
    fn test_bars_follow_mapper() {
        let (schedule, mapper, config) = setup();
        let frame = layout_frame(
            &schedule,
            &mapper,
            &config,
            &SelectionState::default(),
            None,
            t0() + Duration::days(1),
        );
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.bars.len(), 2, "off-screen job is not laid out");
        let b = &frame.bars[1];
        assert_eq!(b.job_id, "B");
        assert!((b.rect.x - 320.0).abs() < 1e-3);
        assert!((b.rect.width - 200.0).abs() < 1e-3);
        assert_eq!(b.rect.y, 60.0 + 40.0 + 6.0);
        assert_eq!(b.rect.height, 28.0);
        assert!((frame.now_x.unwrap() - 220.0).abs() < 1e-3);
    }

    #[test]
    fn test_preview_is_drawn_last() {
        let (schedule, mapper, config) = setup();
        let preview = Placement {
            resource_index: 1,
            start: t0() + Duration::days(5),
            end: t0() + Duration::days(6),
        };
        let frame = layout_frame(
            &schedule,
            &mapper,
            &config,
            &SelectionState::default(),
            Some(("A", preview)),
            t0(),
        );
        let last = frame.bars.last().unwrap();
        assert_eq!(last.job_id, "A");
        assert!(last.dragging);
        assert_eq!(last.rect.y, 106.0);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = ScreenRect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(10.0, 15.0));
        assert!(!r.contains(15.1, 12.0));
    }
}
