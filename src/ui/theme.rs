use egui::style::WidgetVisuals;
use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Board palette ────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(18, 22, 27);
pub const BG_PANEL: Color32 = Color32::from_rgb(26, 31, 38);
pub const BG_HEADER: Color32 = Color32::from_rgb(31, 38, 46);
pub const BG_STATUS: Color32 = Color32::from_rgb(15, 18, 22);
/// Alternate resource rows get a faint band.
pub const BG_ROW_EVEN: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 5);
/// Label-column fill of a selected resource.
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(38, 150, 140, 50);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(46, 55, 66);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(226, 232, 236);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(148, 160, 170);
pub const TEXT_DIM: Color32 = Color32::from_rgb(96, 108, 118);
pub const TEXT_ON_BAR: Color32 = Color32::WHITE;

pub const ACCENT: Color32 = Color32::from_rgb(38, 166, 154);
pub const NOW_LINE: Color32 = Color32::from_rgb(235, 72, 60);
pub const GRID_LINE: Color32 = Color32::from_rgb(38, 46, 55);
pub const SELECTED_OUTLINE: Color32 = Color32::from_rgb(255, 202, 40);
pub const DRAG_SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 110);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const BAR_ROUNDING: f32 = 3.0;
pub const SELECTED_STROKE: f32 = 2.0;
pub const LABEL_PADDING: f32 = 10.0;
pub const STATUS_BAR_HEIGHT: f32 = 24.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_status() -> FontId {
    FontId::proportional(11.0)
}

/// Resource names and header tick labels.
pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

/// Job names printed inside bars.
pub fn font_bar() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Job colors ───────────────────────────────────────────────────────────────

/// Fallback bar colors for jobs without an explicit `color`, picked to stay
/// distinct from the accent, the selection outline and the now marker.
pub const JOB_COLORS: &[Color32] = &[
    Color32::from_rgb(90, 138, 163),
    Color32::from_rgb(67, 160, 71),
    Color32::from_rgb(126, 87, 194),
    Color32::from_rgb(239, 124, 0),
    Color32::from_rgb(30, 136, 229),
    Color32::from_rgb(141, 110, 99),
    Color32::from_rgb(0, 151, 167),
    Color32::from_rgb(192, 202, 51),
];

/// Palette color for the `slot`-th job without an explicit color.
pub fn job_color(slot: usize) -> Color32 {
    JOB_COLORS[slot % JOB_COLORS.len()]
}

// ── egui visuals ─────────────────────────────────────────────────────────────

fn tone(widget: &mut WidgetVisuals, fill: Color32, border: Color32, text: Stroke) {
    widget.bg_fill = fill;
    widget.weak_bg_fill = fill;
    widget.bg_stroke = Stroke::new(1.0, border);
    widget.fg_stroke = text;
    widget.rounding = Rounding::same(3.0);
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_DARK;
    visuals.window_rounding = Rounding::same(6.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    let widgets = &mut visuals.widgets;
    tone(
        &mut widgets.noninteractive,
        BG_PANEL,
        BORDER_SUBTLE,
        Stroke::new(1.0, TEXT_SECONDARY),
    );
    tone(
        &mut widgets.inactive,
        BG_HEADER,
        BORDER_SUBTLE,
        Stroke::new(1.0, TEXT_PRIMARY),
    );
    tone(
        &mut widgets.hovered,
        Color32::from_rgb(40, 50, 60),
        ACCENT,
        Stroke::new(1.0, TEXT_PRIMARY),
    );
    tone(
        &mut widgets.active,
        Color32::from_rgb(30, 84, 80),
        ACCENT,
        Stroke::new(1.5, Color32::WHITE),
    );
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 4.0);
        style.spacing.button_padding = egui::vec2(8.0, 3.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_color_cycles() {
        assert_eq!(job_color(0), job_color(JOB_COLORS.len()));
        assert_ne!(job_color(0), job_color(1));
    }

    #[test]
    fn test_fallback_colors_avoid_markers() {
        for color in JOB_COLORS {
            assert_ne!(*color, NOW_LINE);
            assert_ne!(*color, SELECTED_OUTLINE);
            assert_ne!(*color, ACCENT);
        }
    }
}
