use crate::app::SchedulerApp;
use crate::model::ZoomPreset;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icon;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut SchedulerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui
                .button(format!("{}  Open...        Ctrl+O", icon::FOLDER_OPEN))
                .clicked()
            {
                app.open_file();
                ui.close_menu();
            }
            let can_reload = app.file_path.is_some();
            if ui
                .add_enabled(
                    can_reload,
                    egui::Button::new(format!("{}  Reload", icon::ARROW_CLOCKWISE)),
                )
                .clicked()
            {
                app.reload();
                ui.close_menu();
            }
            if ui.button(format!("{}  Load Demo", icon::SPARKLE)).clicked() {
                app.load_demo();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(format!("{}  Open Config Folder", icon::GEAR))
                .clicked()
            {
                app.open_config_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Edit  ").font(theme::font_menu()), |ui| {
            if ui
                .button(format!("{}  Select All     Ctrl+A", icon::CHECK_SQUARE))
                .clicked()
            {
                app.chart.select_all();
                ui.close_menu();
            }
            if ui
                .button(format!("{}  Clear Selection", icon::SQUARE))
                .clicked()
            {
                app.chart.clear_selection();
                ui.close_menu();
            }
            ui.separator();
            let mut editing = app.chart.config().editing;
            if ui.checkbox(&mut editing, "Allow dragging jobs").changed() {
                app.set_editing(editing);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Zoom to").small().weak());
            for preset in ZoomPreset::ALL {
                let label = match preset {
                    ZoomPreset::Week => "  1 week",
                    ZoomPreset::Month => "  1 month",
                    ZoomPreset::Quarter => "  3 months",
                    ZoomPreset::All => "  All jobs",
                };
                if ui.button(label).clicked() {
                    app.set_zoom(preset);
                    ui.close_menu();
                }
            }
            ui.separator();
            let step = app.chart.config().wheel_zoom_step.powi(3);
            if ui
                .button(format!("{}  Zoom In         Scroll ↑", icon::MAGNIFYING_GLASS_PLUS))
                .clicked()
            {
                app.zoom_centered(step);
                ui.close_menu();
            }
            if ui
                .button(format!("{}  Zoom Out       Scroll ↓", icon::MAGNIFYING_GLASS_MINUS))
                .clicked()
            {
                app.zoom_centered(1.0 / step);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            let label = format!("{}  Load Warnings ({})", icon::WARNING, app.warnings.len());
            if ui
                .add_enabled(!app.warnings.is_empty(), egui::Button::new(label))
                .clicked()
            {
                app.show_warnings = true;
                ui.close_menu();
            }
            if ui.button(format!("{}  About", icon::INFO)).clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned file name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let name = app
                .file_path
                .as_ref()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or("Demo schedule");
            ui.label(RichText::new(name).size(11.0).weak());
        });
    });
}
