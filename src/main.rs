//! gover is a convenience tool that allows using any Go version as the
//! main one. It also provides basic version management: installing,
//! listing and removing.

mod app;
mod catalog;
mod cli;
mod config;
mod error;
mod exec;
mod fsx;
mod utils;
mod version;

use cli::Cli;
use config::Config;
use error::GoverError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utils::print_error;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => exit_with(err),
    };

    let cli = Cli::new(config);

    // one cancellable context for the whole command: an interrupt tears
    // down any in-flight subprocess or request and surfaces as an error.
    let result = tokio::select! {
        result = cli.run() => result,
        _ = tokio::signal::ctrl_c() => Err(GoverError::Interrupted),
    };

    if let Err(err) = result {
        exit_with(err);
    }
}

fn exit_with(err: GoverError) -> ! {
    print_error(&err.to_string());
    if matches!(err, GoverError::MalformedVersion(_)) {
        eprintln!("\nFor more information, try '--help'.");
    }
    std::process::exit(err.exit_code());
}
