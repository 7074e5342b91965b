use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use gantt_scheduler::chart::resequence::is_contiguous;
use gantt_scheduler::chart::{ChartEvent, FrameGeometry, Modifiers, RenderSurface, ScheduleChart};
use gantt_scheduler::config::ChartConfig;
use gantt_scheduler::error::{ChartError, Result};
use gantt_scheduler::model::{LoadWarning, Schedule, ScheduleData, ViewWindow, ZoomPreset};

// Surface is 1120 px wide with a 120 px label column, so the time axis is
// 1000 px. Rows are 40 px tall below a 60 px header: R1 spans y 60..100,
// R2 100..140, R3 140..180.

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap()
}

fn h(hours: i64) -> DateTime<Utc> {
    t0() + Duration::hours(hours)
}

fn ts(hours: i64) -> String {
    h(hours).to_rfc3339()
}

type Events = Rc<RefCell<Vec<ChartEvent>>>;

fn chart_at(now: DateTime<Utc>) -> (ScheduleChart, Events) {
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&events);
    let chart = ScheduleChart::new(ChartConfig::default(), 1120.0, 400.0)
        .unwrap()
        .with_clock(move || now)
        .with_sink(move |event: &ChartEvent| -> Result<()> {
            recorded.borrow_mut().push(event.clone());
            Ok(())
        });
    (chart, events)
}

fn data(value: serde_json::Value) -> ScheduleData {
    serde_json::from_value(value).unwrap()
}

/// R1 has A(0h..10h) and B(10h..20h); R2 is empty. The view spans `hours`.
fn two_job_data(hours: i64) -> ScheduleData {
    data(json!({
        "resources": ["R1", "R2"],
        "jobs": [
            {"id": "A", "resource": "R1", "start": ts(0), "end": ts(10)},
            {"id": "B", "resource": "R1", "start": ts(10), "end": ts(20)},
        ],
        "viewStart": ts(0),
        "viewEnd": ts(hours),
    }))
}

fn span(schedule: &Schedule, id: &str) -> (DateTime<Utc>, DateTime<Utc>) {
    let job = schedule.job(id).unwrap();
    (job.start, job.end)
}

fn drag(chart: &mut ScheduleChart, from: (f32, f32), to: (f32, f32)) {
    chart.pointer_down(from.0, from.1, Modifiers::default());
    chart.pointer_move((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
    chart.pointer_move(to.0, to.1);
    chart.pointer_up(to.0, to.1);
}

#[test]
fn test_drop_within_resource_keeps_anchor() {
    let (mut chart, events) = chart_at(h(-24));
    assert!(chart.set_data(two_job_data(100)).is_empty());

    // 10 px per hour: move A five hours later on the same row.
    drag(&mut chart, (140.0, 80.0), (190.0, 80.0));

    let schedule = chart.schedule();
    assert_eq!(span(schedule, "A"), (h(0), h(10)));
    assert_eq!(span(schedule, "B"), (h(10), h(20)));

    let events = events.borrow();
    let Some(ChartEvent::JobDropped(drop)) = events.last() else {
        panic!("expected a drop event, got {:?}", events.last());
    };
    assert_eq!(drop.job_id, "A");
    assert_eq!(drop.source_resource_id, "R1");
    assert_eq!(drop.target_resource_id, "R1");
    assert_eq!((drop.new_start, drop.new_end), (h(0), h(10)));
}

#[test]
fn test_drop_onto_empty_resource() {
    let (mut chart, events) = chart_at(h(-24));
    chart.set_data(two_job_data(200));

    // 5 px per hour: B sits at x 170..220. Move it 90 hours later into R2.
    drag(&mut chart, (200.0, 80.0), (650.0, 120.0));

    let schedule = chart.schedule();
    assert_eq!(span(schedule, "A"), (h(0), h(10)));
    assert_eq!(span(schedule, "B"), (h(100), h(110)));
    assert_eq!(schedule.job("B").unwrap().resource_index, 1);

    let events = events.borrow();
    let Some(ChartEvent::JobDropped(drop)) = events.last() else {
        panic!("expected a drop event");
    };
    assert_eq!(drop.source_resource_id, "R1");
    assert_eq!(drop.target_resource_id, "R2");
    assert_eq!(drop.new_start, h(100));
}

#[test]
fn test_drop_below_last_row_is_clamped() {
    let (mut chart, _) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    drag(&mut chart, (140.0, 80.0), (140.0, 390.0));
    assert_eq!(chart.schedule().job("A").unwrap().resource_index, 1);
}

#[test]
fn test_drops_keep_rows_contiguous_and_durations_exact() {
    let (mut chart, _) = chart_at(h(-24));
    chart.set_data(data(json!({
        "resources": ["R1", "R2", "R3"],
        "jobs": [
            {"id": "a1", "resource": "R1", "start": ts(0), "end": ts(7)},
            {"id": "a2", "resource": "R1", "start": ts(7), "end": ts(19)},
            {"id": "a3", "resource": "R1", "start": ts(19), "end": ts(23)},
            {"id": "b1", "resource": "R2", "start": ts(3), "end": ts(11)},
            {"id": "b2", "resource": "R2", "start": ts(11), "end": ts(30)},
            {"id": "c1", "resource": "R3", "start": ts(40), "end": ts(41)},
        ],
        "viewStart": ts(0),
        "viewEnd": ts(100),
    })));
    let durations: Vec<(String, Duration)> = chart
        .schedule()
        .jobs
        .iter()
        .map(|j| (j.id.clone(), j.duration()))
        .collect();

    // Odd pixel distances so shifts are not whole hours.
    drag(&mut chart, (200.0, 80.0), (333.3, 121.7)); // a2 -> R2
    drag(&mut chart, (160.0, 125.0), (517.9, 161.0)); // b1 -> R3
    drag(&mut chart, (605.0, 160.0), (131.1, 77.7)); // c1 -> R1

    let schedule = chart.schedule();
    for row in 0..schedule.resource_count() {
        assert!(is_contiguous(schedule, row), "row {} has gaps or overlaps", row);
    }
    for (id, duration) in durations {
        assert_eq!(schedule.job(&id).unwrap().duration(), duration, "{}", id);
    }
}

#[test]
fn test_cancel_restores_and_is_idempotent() {
    let (mut chart, events) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    let before = chart.schedule().clone();

    chart.cancel_drag();
    assert!(events.borrow().is_empty());

    chart.pointer_down(140.0, 80.0, Modifiers::default());
    chart.pointer_move(400.0, 130.0);
    assert!(chart.drag_session().is_some());
    // Committed state is untouched while the preview moves.
    assert_eq!(chart.schedule(), &before);

    chart.pointer_leave();
    chart.pointer_leave();
    chart.cancel_drag();
    chart.pointer_up(400.0, 130.0);

    assert_eq!(chart.schedule(), &before);
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        ChartEvent::DragCancelled {
            job_id: "A".to_string()
        }
    );
}

#[test]
fn test_plain_click_selects_exactly_one() {
    let (mut chart, events) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    chart.pointer_down(140.0, 80.0, Modifiers { multi: true });
    chart.pointer_up(140.0, 80.0);
    assert_eq!(chart.selection().job_count(), 1);

    chart.pointer_down(250.0, 80.0, Modifiers::default());
    chart.pointer_up(250.0, 80.0);

    let snapshot = chart.selection().snapshot();
    assert_eq!(snapshot.selected_job_ids, vec!["B"]);
    assert!(matches!(
        events.borrow().last(),
        Some(ChartEvent::SelectionChanged(s)) if s.selected_job_ids == vec!["B".to_string()]
    ));
}

#[test]
fn test_modifier_click_toggles() {
    let (mut chart, _) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    let multi = Modifiers { multi: true };
    for x in [140.0, 250.0, 140.0] {
        chart.pointer_down(x, 80.0, multi);
        chart.pointer_up(x, 80.0);
    }
    assert_eq!(chart.selection().snapshot().selected_job_ids, vec!["B"]);
}

#[test]
fn test_week_zoom_is_relative_to_now() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 13, 45, 12).unwrap();
    let (mut chart, _) = chart_at(now);
    chart.set_data(two_job_data(100));
    chart.set_zoom(ZoomPreset::Week);
    assert_eq!(
        chart.mapper().window(),
        ViewWindow::new(now, now + Duration::days(7))
    );
}

#[test]
fn test_all_zoom_fits_jobs_with_padding() {
    let (mut chart, _) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    chart.set_zoom(ZoomPreset::All);
    let window = chart.mapper().window();
    assert_eq!(window.start(), h(-2));
    assert_eq!(window.end(), h(22));
}

#[test]
fn test_resource_with_only_past_jobs_selects_nothing() {
    let (mut chart, events) = chart_at(h(1000));
    chart.set_data(two_job_data(100));

    chart.pointer_down(50.0, 80.0, Modifiers::default());
    chart.pointer_up(50.0, 80.0);

    assert!(chart.selection().is_empty());
    assert!(!chart.selection().is_resource_selected("R1"));
    assert!(matches!(
        events.borrow().last(),
        Some(ChartEvent::SelectionChanged(s)) if s.selected_job_ids.is_empty()
    ));
}

#[test]
fn test_resource_click_skips_current_and_next() {
    let (mut chart, _) = chart_at(h(2));
    chart.set_data(data(json!({
        "resources": ["R1"],
        "jobs": [
            {"id": "j1", "resource": "R1", "start": ts(0), "end": ts(4)},
            {"id": "j2", "resource": "R1", "start": ts(4), "end": ts(8)},
            {"id": "j3", "resource": "R1", "start": ts(8), "end": ts(12)},
            {"id": "j4", "resource": "R1", "start": ts(12), "end": ts(16)},
        ],
    })));

    chart.pointer_down(50.0, 80.0, Modifiers::default());
    let snapshot = chart.selection().snapshot();
    assert_eq!(snapshot.selected_job_ids, vec!["j3", "j4"]);
    assert_eq!(snapshot.selected_resource_ids, vec!["R1"]);
}

#[test]
fn test_failing_sink_does_not_corrupt_state() {
    let mut chart = ScheduleChart::new(ChartConfig::default(), 1120.0, 400.0)
        .unwrap()
        .with_clock(|| h(-24))
        .with_sink(|_: &ChartEvent| -> Result<()> {
            Err(ChartError::Notify("host went away".into()))
        });
    chart.set_data(two_job_data(200));

    drag(&mut chart, (200.0, 80.0), (650.0, 120.0));

    assert_eq!(span(chart.schedule(), "B"), (h(100), h(110)));
    assert!(chart.drag_session().is_none());
    chart.select_all();
    assert_eq!(chart.selection().job_count(), 2);
}

#[test]
fn test_new_data_cancels_drag_and_clears_selection() {
    let (mut chart, events) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    chart.select_all();
    chart.pointer_down(140.0, 80.0, Modifiers::default());
    chart.pointer_move(300.0, 80.0);

    chart.set_data(two_job_data(100));

    assert!(chart.drag_session().is_none());
    assert!(chart.selection().is_empty());
    let events = events.borrow();
    let n = events.len();
    assert!(matches!(events[n - 2], ChartEvent::DragCancelled { .. }));
    assert!(matches!(&events[n - 1], ChartEvent::SelectionChanged(s) if s.selected_job_ids.is_empty()));
}

#[test]
fn test_malformed_jobs_are_skipped() {
    let (mut chart, _) = chart_at(h(-24));
    let warnings = chart.set_data(data(json!({
        "resources": ["R1"],
        "jobs": [
            {"id": "ok", "resource": "R1", "start": ts(0), "end": ts(10)},
            {"resource": "R1", "start": ts(10), "end": ts(20)},
            {"id": "backwards", "resource": "R1", "start": ts(20), "end": ts(15)},
            {"id": "nowhere", "resource": "R9", "start": ts(20), "end": ts(25)},
        ],
        "viewStart": ts(0),
        "viewEnd": ts(100),
    })));

    assert_eq!(warnings.len(), 3);
    assert!(warnings.contains(&LoadWarning::MissingId { position: 1 }));
    assert_eq!(chart.schedule().jobs.len(), 1);
    chart.layout();
    assert_eq!(chart.job_at(150.0, 80.0).map(|j| j.id.as_str()), Some("ok"));
}

#[derive(Default)]
struct RecordingSurface {
    frames: Vec<FrameGeometry>,
}

impl RenderSurface for RecordingSurface {
    fn draw_frame(&mut self, _schedule: &Schedule, frame: &FrameGeometry) {
        self.frames.push(frame.clone());
    }
}

#[test]
fn test_dragged_bar_is_drawn_last_at_preview() {
    let (mut chart, _) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    chart.pointer_down(140.0, 80.0, Modifiers::default());
    chart.pointer_move(440.0, 120.0);

    let mut surface = RecordingSurface::default();
    chart.render(&mut surface);

    let frame = &surface.frames[0];
    let last = frame.bars.last().unwrap();
    assert_eq!(last.job_id, "A");
    assert!(last.dragging);
    assert!((last.rect.x - 420.0).abs() < 1e-3);
    assert_eq!(last.rect.y, 106.0);
    // B is still drawn at its committed place.
    assert!((frame.bars[0].rect.x - 220.0).abs() < 1e-3);
    // The preview is what the pointer now hits.
    assert_eq!(chart.job_at(450.0, 120.0).map(|j| j.id.as_str()), Some("A"));
}

#[test]
fn test_destroyed_chart_ignores_input() {
    let (mut chart, events) = chart_at(h(-24));
    chart.set_data(two_job_data(100));
    chart.destroy();
    chart.pointer_down(140.0, 80.0, Modifiers::default());
    chart.pointer_up(400.0, 80.0);
    assert!(chart.is_destroyed());
    assert!(chart.drag_session().is_none());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_jobs_at_the_end_of_time_load_and_render() {
    let max = DateTime::<Utc>::MAX_UTC;
    let (mut chart, _) = chart_at(h(0));
    let warnings = chart.set_data(data(json!({
        "resources": ["R1"],
        "jobs": [{
            "id": "last",
            "resource": "R1",
            "start": (max - Duration::days(20)).timestamp_millis(),
            "end": (max - Duration::days(1)).timestamp_millis(),
        }],
    })));

    assert!(warnings.is_empty());
    assert_eq!(chart.mapper().window().end(), max);
    let mut surface = RecordingSurface::default();
    chart.render(&mut surface);
    assert_eq!(surface.frames[0].bars.len(), 1);
    chart.set_zoom(ZoomPreset::All);
    chart.zoom(0.5, 600.0);
}

#[test]
fn test_wrongly_typed_job_is_skipped_on_load() {
    let (mut chart, _) = chart_at(h(-24));
    let warnings = chart.set_data(data(json!({
        "resources": ["R1"],
        "jobs": [
            {"id": "ok", "resource": "R1", "start": ts(0), "end": ts(10)},
            {"id": "typo", "resource": "R1", "start": ts(10), "end": ts(20), "y": "0"},
            {"id": 42, "resource": "R1", "start": ts(20), "end": ts(30)},
        ],
    })));

    assert!(matches!(
        warnings.as_slice(),
        [LoadWarning::MalformedJob { position: 1, .. }]
    ));
    let ids: Vec<&str> = chart.schedule().jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["ok", "42"]);
}
