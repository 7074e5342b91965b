use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

use crate::config::ChartConfig;
use crate::error::{ChartError, Result};

/// Narrowest span the view window may shrink to.
pub const MIN_SPAN_MS: i64 = 24 * 60 * 60 * 1000;
/// Widest span the view window may grow to (about a century).
pub const MAX_SPAN_MS: i64 = 100 * 365 * MIN_SPAN_MS;

/// Visible `[start, end]` time range. `end > start` and the span is at least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// `instant + delta`, clamped to the representable range instead of
/// overflowing.
pub fn saturating_add(instant: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    instant.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

impl ViewWindow {
    /// Build a window, re-centring to the minimum span when the range is
    /// inverted or narrower than one day. Near the ends of the representable
    /// range the window is pushed inward rather than shrunk.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let span = (end - start).num_milliseconds();
        if span >= MIN_SPAN_MS {
            return Self { start, end };
        }
        let min_span = Duration::milliseconds(MIN_SPAN_MS);
        let mid = saturating_add(start, Duration::milliseconds(span / 2));
        let end = saturating_add(mid, min_span / 2);
        let start = saturating_add(end, -min_span);
        Self {
            start,
            end: saturating_add(start, min_span),
        }
    }

    /// Window spanning `[start, end]` widened by 10% of the span on each side.
    pub fn padded(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let pad = Duration::milliseconds((end - start).num_milliseconds() / 10);
        Self::new(saturating_add(start, -pad), saturating_add(end, pad))
    }

    /// Fallback window for an empty schedule: three months either side of `now`.
    pub fn around(now: DateTime<Utc>) -> Self {
        Self::new(
            saturating_add(now, -Duration::days(90)),
            saturating_add(now, Duration::days(90)),
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn span_ms(&self) -> i64 {
        self.span().num_milliseconds()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Named zoom levels offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPreset {
    Week,
    Month,
    Quarter,
    All,
}

impl ZoomPreset {
    pub const ALL: [ZoomPreset; 4] = [
        ZoomPreset::Week,
        ZoomPreset::Month,
        ZoomPreset::Quarter,
        ZoomPreset::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ZoomPreset::Week => "1w",
            ZoomPreset::Month => "1m",
            ZoomPreset::Quarter => "3m",
            ZoomPreset::All => "all",
        }
    }

    /// The window this preset shows. Fixed presets start at `now`; `All`
    /// fits the job extent with 10% padding.
    pub fn window(
        self,
        now: DateTime<Utc>,
        extent: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> ViewWindow {
        match self {
            ZoomPreset::Week => ViewWindow::new(now, saturating_add(now, Duration::days(7))),
            ZoomPreset::Month => ViewWindow::new(now, saturating_add(now, Duration::days(30))),
            ZoomPreset::Quarter => ViewWindow::new(now, saturating_add(now, Duration::days(90))),
            ZoomPreset::All => match extent {
                Some((start, end)) => ViewWindow::padded(start, end),
                None => ViewWindow::around(now),
            },
        }
    }
}

impl std::str::FromStr for ZoomPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1w" => Ok(ZoomPreset::Week),
            "1m" => Ok(ZoomPreset::Month),
            "3m" => Ok(ZoomPreset::Quarter),
            "all" => Ok(ZoomPreset::All),
            other => Err(format!("Unknown zoom level '{}'", other)),
        }
    }
}

/// Unit of the time-axis grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridUnit {
    Day,
    Week,
    Month,
}

/// Spacing of grid lines and header labels for a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridInterval {
    pub unit: GridUnit,
    pub count: u32,
}

impl GridInterval {
    pub fn for_window(window: &ViewWindow) -> Self {
        let days = window.span_ms() as f64 / MIN_SPAN_MS as f64;
        let (unit, count) = if days <= 7.0 {
            (GridUnit::Day, 1)
        } else if days <= 31.0 {
            (GridUnit::Day, 7)
        } else if days <= 90.0 {
            (GridUnit::Week, 1)
        } else if days <= 180.0 {
            (GridUnit::Week, 2)
        } else if days <= 365.0 {
            (GridUnit::Month, 1)
        } else {
            (GridUnit::Month, 3)
        };
        Self { unit, count }
    }

    /// Tick instants inside `window`, aligned to midnight, Monday, or the
    /// first of the month depending on the unit.
    pub fn ticks(&self, window: &ViewWindow) -> Vec<DateTime<Utc>> {
        let first = window.start().date_naive();
        let mut date = match self.unit {
            GridUnit::Day => first,
            GridUnit::Week => {
                let back = Duration::days(first.weekday().num_days_from_monday() as i64);
                first.checked_sub_signed(back).unwrap_or(first)
            }
            GridUnit::Month => NaiveDate::from_ymd_opt(first.year(), first.month(), 1)
                .unwrap_or(first),
        };

        let mut ticks = Vec::new();
        loop {
            let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
                break;
            };
            let instant = Utc.from_utc_datetime(&midnight);
            if instant > window.end() {
                break;
            }
            if instant >= window.start() {
                ticks.push(instant);
            }
            let next = match self.unit {
                GridUnit::Day => date.checked_add_signed(Duration::days(self.count as i64)),
                GridUnit::Week => {
                    date.checked_add_signed(Duration::days(7 * self.count as i64))
                }
                GridUnit::Month => date.checked_add_months(Months::new(self.count)),
            };
            match next {
                Some(next) => date = next,
                None => break,
            }
        }
        ticks
    }

    pub fn label(&self, instant: DateTime<Utc>) -> String {
        match self.unit {
            GridUnit::Day | GridUnit::Week => instant.format("%b %d").to_string(),
            GridUnit::Month => instant.format("%b %Y").to_string(),
        }
    }
}

/// Bidirectional mapping between chart pixels and (resource row, instant).
///
/// Pixel coordinates are relative to the chart surface's top-left corner.
/// Owns the visible window and the zoom/pan state; callers redraw after
/// mutating it.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    window: ViewWindow,
    width: f32,
    height: f32,
    left_margin: f32,
    top_margin: f32,
    row_height: f32,
    resource_count: usize,
}

impl CoordinateMapper {
    pub fn new(window: ViewWindow, width: f32, height: f32, config: &ChartConfig) -> Result<Self> {
        if !(config.row_height.is_finite() && config.row_height > 0.0) {
            return Err(ChartError::InvalidSurface(format!(
                "row height must be positive, got {}",
                config.row_height
            )));
        }
        let mut mapper = Self {
            window,
            width: 0.0,
            height: 0.0,
            left_margin: config.left_margin.max(0.0),
            top_margin: config.top_margin.max(0.0),
            row_height: config.row_height,
            resource_count: 0,
        };
        mapper.resize(width, height)?;
        Ok(mapper)
    }

    /// Update the surface size. The time axis must keep at least one pixel.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width.is_finite() && height.is_finite()) || height <= 0.0 {
            return Err(ChartError::InvalidSurface(format!(
                "surface size {}x{} is not drawable",
                width, height
            )));
        }
        if width - self.left_margin < 1.0 {
            return Err(ChartError::InvalidSurface(format!(
                "surface width {} leaves no room after the {} px label column",
                width, self.left_margin
            )));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn set_window(&mut self, window: ViewWindow) {
        self.window = window;
    }

    pub fn set_resource_count(&mut self, count: usize) {
        self.resource_count = count;
    }

    pub fn resource_count(&self) -> usize {
        self.resource_count
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left_margin(&self) -> f32 {
        self.left_margin
    }

    pub fn top_margin(&self) -> f32 {
        self.top_margin
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Width of the time axis (surface width minus the label column).
    pub fn chart_width(&self) -> f32 {
        self.width - self.left_margin
    }

    pub fn ms_per_pixel(&self) -> f64 {
        self.window.span_ms() as f64 / self.chart_width() as f64
    }

    pub fn time_to_x(&self, instant: DateTime<Utc>) -> f32 {
        let offset = (instant - self.window.start()).num_milliseconds() as f64;
        self.left_margin + (offset / self.ms_per_pixel()) as f32
    }

    /// Exact inverse of [`Self::time_to_x`], rounded to the millisecond.
    pub fn x_to_time(&self, x: f32) -> DateTime<Utc> {
        let offset = ((x - self.left_margin) as f64 * self.ms_per_pixel()).round() as i64;
        saturating_add(self.window.start(), Duration::milliseconds(offset))
    }

    /// Convert a horizontal pixel distance into a time distance.
    pub fn pixels_to_duration(&self, delta_x: f32) -> Duration {
        Duration::milliseconds((delta_x as f64 * self.ms_per_pixel()).round() as i64)
    }

    pub fn resource_index_to_y(&self, index: usize) -> f32 {
        self.top_margin + index as f32 * self.row_height
    }

    /// Row under `y`, clamped to `[0, resource_count - 1]`.
    pub fn y_to_resource_index(&self, y: f32) -> usize {
        let row = ((y - self.top_margin) / self.row_height).floor();
        let last = self.resource_count.saturating_sub(1);
        if row.is_nan() || row < 0.0 {
            0
        } else {
            (row as usize).min(last)
        }
    }

    /// Row under `y` without clamping; `None` outside the rows.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        let row = ((y - self.top_margin) / self.row_height).floor();
        if row >= 0.0 && (row as usize) < self.resource_count {
            Some(row as usize)
        } else {
            None
        }
    }

    /// Rescale the window by `factor` (> 1 zooms in) keeping the instant
    /// under `anchor_x` at the same pixel.
    pub fn zoom(&mut self, factor: f64, anchor_x: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("Ignoring zoom by invalid factor {}", factor);
            return;
        }
        let anchor = self.x_to_time(anchor_x);
        let fraction = ((anchor_x - self.left_margin) / self.chart_width()) as f64;
        let span = (self.window.span_ms() as f64 / factor).min(MAX_SPAN_MS as f64);
        let lead = Duration::milliseconds((span * fraction).round() as i64);
        let start = saturating_add(anchor, -lead);
        let end = saturating_add(start, Duration::milliseconds(span.round() as i64));
        self.window = ViewWindow::new(start, end);
        log::debug!(
            "Zoomed x{:.3} at {} -> [{}, {}]",
            factor,
            anchor,
            self.window.start(),
            self.window.end()
        );
    }

    /// Shift the window so content follows the pointer: moving right by
    /// `delta_x` reveals earlier time.
    pub fn pan(&mut self, delta_x: f32) {
        let shift = self.pixels_to_duration(delta_x);
        let start = self.window.start().checked_sub_signed(shift);
        let end = self.window.end().checked_sub_signed(shift);
        if let (Some(start), Some(end)) = (start, end) {
            self.window = ViewWindow { start, end };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn mapper() -> CoordinateMapper {
        let window = ViewWindow::new(t0(), t0() + Duration::days(10));
        let mut mapper =
            CoordinateMapper::new(window, 1120.0, 600.0, &ChartConfig::default()).unwrap();
        mapper.set_resource_count(4);
        mapper
    }

    #[test]
    fn test_window_enforces_minimum_span() {
        let w = ViewWindow::new(t0(), t0() + Duration::hours(2));
        assert_eq!(w.span_ms(), MIN_SPAN_MS);
        assert_eq!(w.start(), t0() + Duration::hours(1) - Duration::hours(12));

        let inverted = ViewWindow::new(t0(), t0() - Duration::days(3));
        assert!(inverted.end() > inverted.start());
    }

    #[test]
    fn test_windows_near_the_end_of_time_do_not_overflow() {
        let max = DateTime::<Utc>::MAX_UTC;
        let padded = ViewWindow::padded(max - Duration::days(20), max - Duration::days(1));
        assert_eq!(padded.end(), max);
        assert!(padded.start() < max - Duration::days(20));

        let squeezed = ViewWindow::new(max - Duration::hours(1), max);
        assert_eq!(squeezed.end(), max);
        assert_eq!(squeezed.span_ms(), MIN_SPAN_MS);

        let min = DateTime::<Utc>::MIN_UTC;
        assert_eq!(ViewWindow::around(min).start(), min);
        assert_eq!(ZoomPreset::Week.window(max, None).end(), max);

        let mut m =
            CoordinateMapper::new(padded, 1120.0, 600.0, &ChartConfig::default()).unwrap();
        m.zoom(0.001, 1100.0);
        m.pan(-5000.0);
        assert!(m.window().end() <= max);
        assert_eq!(m.x_to_time(1_000_000.0), max);
    }

    #[test]
    fn test_time_to_x_is_linear() {
        let m = mapper();
        // 1000 px of chart for 10 days.
        assert_eq!(m.time_to_x(t0()), 120.0);
        assert!((m.time_to_x(t0() + Duration::days(5)) - 620.0).abs() < 1e-3);
        assert_eq!(m.x_to_time(1120.0), t0() + Duration::days(10));
    }

    #[test]
    fn test_pixel_round_trip() {
        let m = mapper();
        let mut x = 120.0_f32;
        while x <= 1120.0 {
            assert!((m.time_to_x(m.x_to_time(x)) - x).abs() < 0.01, "x = {}", x);
            x += 37.5;
        }
    }

    #[test]
    fn test_time_round_trip() {
        let m = mapper();
        let tolerance = (m.ms_per_pixel() * 1e-3).ceil() as i64;
        for hours in (0..240).step_by(7) {
            let t = t0() + Duration::hours(hours) + Duration::milliseconds(123);
            let back = m.x_to_time(m.time_to_x(t));
            assert!((back - t).num_milliseconds().abs() <= tolerance);
        }
    }

    #[test]
    fn test_row_mapping_clamps() {
        let m = mapper();
        assert_eq!(m.resource_index_to_y(2), 140.0);
        assert_eq!(m.y_to_resource_index(140.0), 2);
        assert_eq!(m.y_to_resource_index(179.9), 2);
        assert_eq!(m.y_to_resource_index(-50.0), 0);
        assert_eq!(m.y_to_resource_index(10_000.0), 3);
        assert_eq!(m.row_at(10_000.0), None);
        assert_eq!(m.row_at(30.0), None);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut m = mapper();
        let anchor_x = 370.0;
        let anchor = m.x_to_time(anchor_x);
        m.zoom(2.0, anchor_x);
        assert_eq!(m.window().span(), Duration::days(5));
        assert!((m.time_to_x(anchor) - anchor_x).abs() < 0.01);
    }

    #[test]
    fn test_zoom_recenters_at_minimum_span() {
        let mut m = mapper();
        m.zoom(1000.0, 120.0);
        assert_eq!(m.window().span_ms(), MIN_SPAN_MS);
        m.zoom(-1.0, 500.0);
        assert_eq!(m.window().span_ms(), MIN_SPAN_MS);
    }

    #[test]
    fn test_pan_follows_pointer() {
        let mut m = mapper();
        let t = t0() + Duration::days(3);
        let before = m.time_to_x(t);
        m.pan(100.0);
        assert!((m.time_to_x(t) - (before + 100.0)).abs() < 0.01);
        assert_eq!(m.window().span(), Duration::days(10));
    }

    #[test]
    fn test_invalid_surface_rejected() {
        let window = ViewWindow::new(t0(), t0() + Duration::days(1));
        let config = ChartConfig::default();
        assert!(CoordinateMapper::new(window, 0.0, 400.0, &config).is_err());
        assert!(CoordinateMapper::new(window, 100.0, 400.0, &config).is_err());
        assert!(CoordinateMapper::new(window, f32::NAN, 400.0, &config).is_err());
    }

    #[test]
    fn test_zoom_presets() {
        let now = t0();
        assert_eq!(
            ZoomPreset::Week.window(now, None),
            ViewWindow::new(now, now + Duration::days(7))
        );
        assert_eq!("3m".parse::<ZoomPreset>(), Ok(ZoomPreset::Quarter));
        assert!("2y".parse::<ZoomPreset>().is_err());

        let extent = (now, now + Duration::days(20));
        let all = ZoomPreset::All.window(now + Duration::days(400), Some(extent));
        assert_eq!(all.start(), now - Duration::days(2));
        assert_eq!(all.end(), now + Duration::days(22));
    }

    #[test]
    fn test_grid_ticks_align_to_unit() {
        let window = ViewWindow::new(t0() + Duration::hours(5), t0() + Duration::days(60));
        let interval = GridInterval::for_window(&window);
        assert_eq!(interval.unit, GridUnit::Week);
        let ticks = interval.ticks(&window);
        assert!(!ticks.is_empty());
        for tick in &ticks {
            assert_eq!(tick.weekday(), chrono::Weekday::Mon);
            assert!(window.contains(*tick));
        }
    }
}
