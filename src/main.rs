mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod output;
mod pricing;
mod source;
mod utils;

use clap::Parser;

use cli::Cli;
use config::Config;
use utils::init_logging;

fn main() {
    let loaded = Config::load();
    let cli = Cli::parse().with_config(loaded.config);

    init_logging(cli.debug);
    if let Some(path) = &loaded.path {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    for warning in &loaded.warnings {
        tracing::warn!(error = %warning, "ignoring config file");
    }

    if let Err(e) = app::run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
