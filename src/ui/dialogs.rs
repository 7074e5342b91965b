use crate::app::SchedulerApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut SchedulerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 200.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Scheduler").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag jobs between resources to reschedule.");
                ui.label("Click a resource to select its upcoming jobs.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the list of jobs that were skipped while loading.
pub fn show_warnings_dialog(app: &mut SchedulerApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("Load Warnings").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([480.0, 320.0])
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!(
                    "{} entr{} could not be used. The rest of the schedule was loaded.",
                    app.warnings.len(),
                    if app.warnings.len() == 1 { "y" } else { "ies" }
                ))
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(6.0);
            egui::ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui| {
                    for warning in &app.warnings {
                        ui.label(RichText::new(format!("• {}", warning)).small());
                    }
                });
            ui.add_space(6.0);
            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                should_close = true;
            }
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_warnings = false;
    }
}
