//! `revolve-sim` – run one robot controller headless.
//!
//! ```text
//! revolve-sim [settings.toml] [robot_config.json]
//! ```
//!
//! 1. Reads the driver settings (defaults when the file is absent) and the
//!    robot configuration document they point at.
//! 2. Builds a kinematic stub model exposing the configured joints and
//!    sensors, and attaches a `RobotController` to it.
//! 3. Steps simulated time, querying the battery level over the event bus
//!    at a fixed interval.
//! 4. Stops at the configured duration or on Ctrl-C and prints a summary.

mod config;
mod runner;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use revolve_types::RevolveError;
use tracing::{error, info, warn};

use crate::config::SimSettings;
use crate::runner::RunSummary;

const DEFAULT_SETTINGS: &str = "revolve-sim.toml";

fn main() -> ExitCode {
    let _guard = revolve_runtime::init_tracing("revolve-sim");

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "Ctrl-C received – stopping after this tick".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!("could not install Ctrl-C handler: {e}");
    }

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map_or_else(|| PathBuf::from(DEFAULT_SETTINGS), PathBuf::from);
    let robot_override = args.next().map(PathBuf::from);

    match run(&settings_path, robot_override, &shutdown) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "revolve-sim failed");
            println!("{}: {e}", "Error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(
    settings_path: &Path,
    robot_override: Option<PathBuf>,
    shutdown: &AtomicBool,
) -> Result<RunSummary, RevolveError> {
    let mut settings = match config::load_from(settings_path)? {
        Some(settings) => {
            info!(path = %settings_path.display(), "settings loaded");
            settings
        }
        None => {
            let mut settings = SimSettings::default();
            config::apply_env_overrides(&mut settings);
            info!(path = %settings_path.display(), "settings file not found; using defaults");
            settings
        }
    };
    if let Some(path) = robot_override {
        settings.robot_config = path;
    }

    let plugin = revolve_config::load_from(&settings.robot_config)?;
    info!(
        robot_config = %settings.robot_config.display(),
        model = %settings.model_name,
        step_size = settings.step_size,
        duration = settings.duration,
        "starting run"
    );
    runner::run_plugin(&plugin, &settings, shutdown)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "revolve-sim summary".bold().cyan());
    println!("  simulated time   {:.3} s", summary.simulated_time);
    println!("  host ticks       {}", summary.ticks);
    println!("  executed ticks   {}", summary.executed_ticks);
    println!("  brain updates    {}", summary.brain_updates);
    println!(
        "  battery          {} queries, {} responses, last level {}",
        summary.battery_queries,
        summary.battery_responses,
        summary.last_battery_level.as_deref().unwrap_or("n/a").bold()
    );
    if summary.interrupted {
        println!("  {}", "interrupted".yellow());
    } else {
        println!("  {}", "completed".green());
    }
}
