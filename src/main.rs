#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use gantt_scheduler::app::SchedulerApp;

/// Interactive resource schedule board.
#[derive(Parser, Debug)]
#[command(name = "gantt-scheduler", version, about)]
struct Args {
    /// Schedule to open (.json or .csv). Defaults to the last file, or a demo.
    path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Mirror every chart event to stdout as one JSON object per line
    #[arg(long)]
    events: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("egui", log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    log::info!("Gantt Scheduler {} starting", env!("CARGO_PKG_VERSION"));
    log::debug!("Command-line args: {:?}", args);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Scheduler"),
        ..Default::default()
    };

    let Args { path, events, .. } = args;
    eframe::run_native(
        "Gantt Scheduler",
        options,
        Box::new(move |cc| Ok(Box::new(SchedulerApp::new(cc, path, events)?))),
    )
}
