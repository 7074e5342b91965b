use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use crate::chart::{ChannelSink, ChartEvent, FanoutSink, JsonLinesSink, LogSink, ScheduleChart};
use crate::config::{self, AppSettings};
use crate::error::Result;
use crate::model::sample::sample_schedule;
use crate::model::{LoadWarning, ZoomPreset};
use crate::ui;
use crate::ui::gantt_chart::MoveThrottle;

/// Size the chart starts with before the first frame reports the real one.
const INITIAL_CHART_SIZE: (f32, f32) = (1280.0, 720.0);

/// Main application state.
pub struct SchedulerApp {
    pub chart: ScheduleChart,
    events: Receiver<ChartEvent>,
    pub settings: AppSettings,
    settings_path: PathBuf,
    pub file_path: Option<PathBuf>,
    pub warnings: Vec<LoadWarning>,

    // Dialog state
    pub show_about: bool,
    pub show_warnings: bool,

    // Status message
    pub status_message: String,

    throttle: MoveThrottle,
}

impl SchedulerApp {
    /// Build the app. `path` is loaded instead of the last file or the demo;
    /// `mirror_events` also writes every chart event to stdout as JSON lines.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        path: Option<PathBuf>,
        mirror_events: bool,
    ) -> Result<Self> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings_path = config::settings_path();
        let settings = AppSettings::load(&settings_path);

        let (sender, events) = mpsc::channel();
        let mut sink = FanoutSink::new().with(ChannelSink::new(sender)).with(LogSink);
        if mirror_events {
            sink = sink.with(JsonLinesSink::new(std::io::stdout()));
        }

        let (width, height) = INITIAL_CHART_SIZE;
        let chart = ScheduleChart::new(settings.chart.clone(), width, height)?.with_sink(sink);
        let throttle = MoveThrottle::new(settings.chart.move_throttle_ms);

        let startup_file = path.or_else(|| settings.last_file.clone().filter(|p| p.exists()));

        let mut app = Self {
            chart,
            events,
            settings,
            settings_path,
            file_path: None,
            warnings: Vec::new(),
            show_about: false,
            show_warnings: false,
            status_message: "Ready".to_string(),
            throttle,
        };

        match startup_file {
            Some(path) => app.load_path(&path),
            None => app.load_demo(),
        }
        Ok(app)
    }

    // --- File operations ---

    pub fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Schedule", &["json", "csv", "tsv", "txt"])
            .pick_file()
        {
            self.load_path(&path);
        }
    }

    pub fn reload(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.load_path(&path);
        }
    }

    pub fn load_path(&mut self, path: &Path) {
        match crate::io::load_schedule(path) {
            Ok(data) => {
                self.warnings = self.chart.set_data(data);
                self.file_path = Some(path.to_path_buf());
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("schedule");
                let count = self.chart.schedule().jobs.len();
                if self.warnings.is_empty() {
                    self.status_message = format!("Loaded {} jobs from {}", count, name);
                } else {
                    self.status_message = format!(
                        "Loaded {} jobs from {} ({} skipped)",
                        count,
                        name,
                        self.warnings.len()
                    );
                    self.show_warnings = true;
                }
                self.remember_file(Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load {:?}: {}", path, e);
                self.status_message = format!("Error loading: {}", e);
            }
        }
    }

    pub fn load_demo(&mut self) {
        let schedule = sample_schedule(self.chart.now());
        self.chart.set_schedule(schedule);
        self.file_path = None;
        self.warnings.clear();
        self.status_message = "Demo schedule".to_string();
    }

    pub fn open_config_folder(&mut self) {
        let dir = config::config_dir();
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
            log::warn!("Could not open config folder {:?}: {}", dir, e);
            self.status_message = format!("Could not open {}: {}", dir.display(), e);
        }
    }

    pub fn set_zoom(&mut self, preset: ZoomPreset) {
        self.chart.set_zoom(preset);
        self.status_message = format!("Zoom: {}", preset.label());
    }

    /// Zoom around the middle of the time axis.
    pub fn zoom_centered(&mut self, factor: f64) {
        let mapper = self.chart.mapper();
        let center = mapper.left_margin() + mapper.chart_width() / 2.0;
        self.chart.zoom(factor, center);
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.chart.set_editing(editing);
        self.settings.chart.editing = editing;
        self.save_settings();
    }

    fn remember_file(&mut self, path: Option<PathBuf>) {
        if self.settings.last_file != path {
            self.settings.last_file = path;
            self.save_settings();
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::warn!("Could not save settings to {:?}: {}", self.settings_path, e);
        }
    }

    /// Drain chart events into the status bar.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.status_message = match event {
                ChartEvent::SelectionChanged(snapshot) => match snapshot.selected_job_ids.len() {
                    0 => "Selection cleared".to_string(),
                    1 => format!("Selected {}", snapshot.selected_job_ids[0]),
                    n => format!("{} jobs selected", n),
                },
                ChartEvent::JobDropped(drop) => format!(
                    "Moved {} to {} starting {}",
                    drop.job_id,
                    drop.target_resource_id,
                    drop.new_start.format("%d/%m/%Y %H:%M")
                ),
                ChartEvent::DragCancelled { job_id } => format!("Move of {} cancelled", job_id),
            };
        }
    }
}

impl eframe::App for SchedulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let should_open = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::O));
        if should_open {
            self.open_file();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let schedule = self.chart.schedule();
                        ui.label(
                            egui::RichText::new(format!(
                                "Jobs: {} · Resources: {} · Selected: {}",
                                schedule.jobs.len(),
                                schedule.resource_count(),
                                self.chart.selection().job_count()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: the chart
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_DARK))
            .show(ctx, |ui| {
                ui::gantt_chart::show_gantt_chart(&mut self.chart, &mut self.throttle, ui);
            });

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_warnings {
            ui::dialogs::show_warnings_dialog(self, ctx);
        }

        self.drain_events();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.chart.destroy();
    }
}
