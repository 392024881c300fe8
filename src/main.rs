use clap::Parser;
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::Path;

use farmabot::core::config::{self, CliOverrides};
use farmabot::tui;

#[derive(Parser)]
#[command(
    name = "farmabot",
    about = "Terminal chat for finding where to pick up medication"
)]
struct Args {
    /// Backend base URL (overrides FARMABOT_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Disable the periodic backend health probe
    #[arg(long)]
    no_health: bool,
}

/// Starts the file logger. Everything is recorded until the configured
/// level is known; `main` narrows it with `log::set_max_level` afterwards.
fn init_logging(path: &Path) -> bool {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(path) {
        Ok(log_file) => WriteLogger::init(LevelFilter::Trace, log_config, log_file).is_ok(),
        Err(_) => false,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to farmabot.log in current directory
    init_logging(Path::new("farmabot.log"));

    let file_config = config::config_or_default(config::load_config());
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            no_health: args.no_health,
        },
    );
    log::set_max_level(resolved.log_level);

    log::info!("farmabot starting up against {}", resolved.base_url);

    tui::run(resolved)
}
