use egui::{Align2, Color32, CursorIcon, Event, Key, Painter, PointerButton, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::chart::layout::BarGeometry;
use crate::chart::{FrameGeometry, Modifiers, RenderSurface, ScheduleChart, ScreenRect};
use crate::model::{Job, Schedule};
use crate::ui::theme;

/// Approximate scroll distance of one mouse wheel notch, in points.
const WHEEL_NOTCH: f32 = 50.0;

/// Drops pointer moves arriving faster than the configured rate.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    interval_secs: f64,
    last: Option<f64>,
}

impl MoveThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_secs: interval_ms as f64 / 1000.0,
            last: None,
        }
    }

    /// True when a move at time `now` (seconds) should be handled.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.interval_secs => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Draws chart frames with an egui painter at a screen offset.
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn rect(&self, r: ScreenRect) -> Rect {
        Rect::from_min_size(self.origin + Vec2::new(r.x, r.y), Vec2::new(r.width, r.height))
    }
}

impl RenderSurface for EguiSurface<'_> {
    fn draw_frame(&mut self, schedule: &Schedule, frame: &FrameGeometry) {
        let painter = self.painter;
        let full = Rect::from_min_size(self.origin, Vec2::new(frame.width, frame.height));
        painter.rect_filled(full, 0.0, theme::BG_DARK);

        // Row bands
        for row in &frame.rows {
            let rect = self.rect(row.row_rect);
            if row.resource_index % 2 == 0 {
                painter.rect_filled(rect, 0.0, theme::BG_ROW_EVEN);
            }
            painter.line_segment(
                [rect.left_bottom(), rect.right_bottom()],
                Stroke::new(0.5, theme::BORDER_SUBTLE),
            );
        }

        // Header and grid
        let header = Rect::from_min_size(self.origin, Vec2::new(frame.width, frame.top_margin));
        painter.rect_filled(header, 0.0, theme::BG_HEADER);
        painter.line_segment(
            [header.left_bottom(), header.right_bottom()],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        painter.text(
            Pos2::new(self.origin.x + frame.left_margin + 6.0, header.top() + 14.0),
            Align2::LEFT_CENTER,
            format!(
                "{} – {}",
                frame.window.start().format("%d %b %Y"),
                frame.window.end().format("%d %b %Y")
            ),
            theme::font_small(),
            theme::TEXT_DIM,
        );
        for tick in &frame.ticks {
            if tick.x < frame.left_margin || tick.x > frame.width {
                continue;
            }
            let x = self.origin.x + tick.x;
            painter.line_segment(
                [Pos2::new(x, header.bottom()), Pos2::new(x, full.bottom())],
                Stroke::new(0.5, theme::GRID_LINE),
            );
            painter.text(
                Pos2::new(x + 3.0, header.bottom() - 14.0),
                Align2::LEFT_CENTER,
                &tick.label,
                theme::font_header(),
                theme::TEXT_SECONDARY,
            );
        }

        // Bars, clipped to the time axis
        let chart_area = Rect::from_min_max(
            self.origin + Vec2::new(frame.left_margin, frame.top_margin),
            full.max,
        );
        let clipped = painter.with_clip_rect(chart_area);
        for bar in &frame.bars {
            if let Some(job) = schedule.jobs.get(bar.job_index) {
                draw_bar(&clipped, job, self.rect(bar.rect), bar);
            }
        }

        if let Some(now_x) = frame.now_x {
            draw_now_line(painter, self.origin.x + now_x, header.bottom(), full.bottom());
        }

        // Resource label column
        let labels = Rect::from_min_max(
            Pos2::new(self.origin.x, header.bottom()),
            Pos2::new(self.origin.x + frame.left_margin, full.bottom()),
        );
        painter.rect_filled(labels, 0.0, theme::BG_PANEL);
        for row in &frame.rows {
            let rect = self.rect(row.label_rect);
            if row.selected {
                painter.rect_filled(rect, 0.0, theme::BG_SELECTED);
            }
            let name = schedule
                .resources
                .get(row.resource_index)
                .map(|r| r.name.as_str())
                .unwrap_or(row.resource_id.as_str());
            let color = if row.selected {
                theme::TEXT_PRIMARY
            } else {
                theme::TEXT_SECONDARY
            };
            painter.with_clip_rect(rect).text(
                Pos2::new(rect.left() + theme::LABEL_PADDING, rect.center().y),
                Align2::LEFT_CENTER,
                name,
                theme::font_header(),
                color,
            );
        }
        painter.line_segment(
            [labels.right_top(), labels.right_bottom()],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_bar(painter: &Painter, job: &Job, rect: Rect, bar: &BarGeometry) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    if bar.dragging {
        painter.rect_filled(rect.translate(Vec2::new(2.0, 3.0)), rounding, theme::DRAG_SHADOW);
    } else {
        painter.rect_filled(
            rect.translate(Vec2::new(1.0, 2.0)),
            rounding,
            Color32::from_black_alpha(35),
        );
    }

    let fill = if bar.dragging {
        job.color.gamma_multiply(0.85)
    } else {
        job.color
    };
    painter.rect_filled(rect, rounding, fill);
    let highlight = Rect::from_min_size(
        rect.min,
        Vec2::new(rect.width(), (rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if bar.selected {
        painter.rect_stroke(
            rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(theme::SELECTED_STROKE, theme::SELECTED_OUTLINE),
        );
    }

    if rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(job.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(rect)
            .galley(Pos2::new(rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

fn draw_now_line(painter: &Painter, x: f32, top: f32, bottom: f32) {
    painter.line_segment(
        [Pos2::new(x, top), Pos2::new(x, bottom)],
        Stroke::new(1.5, theme::NOW_LINE),
    );

    let badge_w = 36.0;
    let badge = Rect::from_min_size(Pos2::new(x - badge_w / 2.0, top - 1.0), Vec2::new(badge_w, 14.0));
    painter.rect_filled(badge, Rounding::same(3.0), theme::NOW_LINE);
    painter.text(
        badge.center(),
        Align2::CENTER_CENTER,
        "Now",
        theme::font_small(),
        Color32::WHITE,
    );
}

/// Render the chart into the remaining space of `ui` and feed it this
/// frame's pointer and keyboard input.
pub fn show_gantt_chart(chart: &mut ScheduleChart, throttle: &mut MoveThrottle, ui: &mut Ui) {
    let size = ui.available_size();
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let area = response.rect;
    let origin = area.min;

    if let Err(err) = chart.resize(area.width(), area.height()) {
        log::debug!("Skipping chart frame: {}", err);
        painter.text(
            area.center(),
            Align2::CENTER_CENTER,
            "Window too small for the chart",
            theme::font_header(),
            theme::TEXT_DIM,
        );
        return;
    }

    let (events, time) = ui.input(|i| (i.events.clone(), i.time));
    for event in events {
        match event {
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                modifiers,
            } => {
                let local = pos - origin;
                if pressed {
                    if area.contains(pos) {
                        throttle.reset();
                        let mods = Modifiers {
                            multi: modifiers.command,
                        };
                        chart.pointer_down(local.x, local.y, mods);
                    }
                } else {
                    chart.pointer_up(local.x, local.y);
                }
            }
            Event::PointerMoved(pos) => {
                if area.contains(pos) {
                    if throttle.ready(time) {
                        let local = pos - origin;
                        chart.pointer_move(local.x, local.y);
                    }
                } else if chart.drag_session().is_some() || chart.is_panning() {
                    chart.pointer_leave();
                }
            }
            Event::PointerGone => chart.pointer_leave(),
            Event::Key {
                key: Key::Escape,
                pressed: true,
                ..
            } => chart.cancel_drag(),
            Event::Key {
                key: Key::A,
                pressed: true,
                modifiers,
                ..
            } if modifiers.command => chart.select_all(),
            _ => {}
        }
    }

    if let Some(hover) = response.hover_pos() {
        let scroll = ui.input(|i| i.raw_scroll_delta);
        if scroll.y != 0.0 {
            let notches = (scroll.y / WHEEL_NOTCH).clamp(-3.0, 3.0);
            let factor = chart.config().wheel_zoom_step.powf(notches as f64);
            chart.zoom(factor, hover.x - origin.x);
        }
        if scroll.x != 0.0 {
            chart.pan(scroll.x);
        }
    }

    chart.render(&mut EguiSurface::new(&painter, origin));

    // Cursor and tooltip
    if chart.drag_session().is_some() || chart.is_panning() {
        ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        return;
    }
    let Some(hover) = response.hover_pos() else {
        return;
    };
    let local = hover - origin;
    if chart.resource_at(local.x, local.y).is_some() {
        ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
    } else if let Some(job) = chart.job_at(local.x, local.y) {
        let cursor = if chart.config().editing {
            CursorIcon::Grab
        } else {
            CursorIcon::PointingHand
        };
        ui.ctx().set_cursor_icon(cursor);
        let resource = chart
            .schedule()
            .resources
            .get(job.resource_index)
            .map(|r| r.name.as_str())
            .unwrap_or("?");
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new(("job-tip", &job.id)),
            |ui| {
                ui.strong(&job.name);
                ui.label(format!("{} on {}", job.id, resource));
                ui.label(format!(
                    "{} → {}",
                    job.start.format("%d/%m/%Y %H:%M"),
                    job.end.format("%d/%m/%Y %H:%M"),
                ));
                for (key, value) in &job.fields {
                    ui.label(format!("{}: {}", key, value));
                }
            },
        );
    }
}
