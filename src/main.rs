use anyhow::Result;
use std::process;
use log::{debug, error};

use extsys::{app, cli, logging};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {:?}", panic_info);
        eprintln!("Panic: {:?}", panic_info);
        process::exit(101);
    }));

    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    if let Some(path) = config_manager.config_file_path() {
        debug!("Using configuration file: {}", path.display());
    }

    if args.no_color {
        colored::control::set_override(false);
    }

    app::run_components(&args, &config_manager)
}
