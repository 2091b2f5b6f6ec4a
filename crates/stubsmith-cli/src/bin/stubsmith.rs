use anyhow::Result;
use clap::Parser;

use stubsmith_cli::args::{CliArgs, Command};
use stubsmith_cli::driver;

fn main() -> Result<()> {
    // No-op unless STUBSMITH_LOG or RUST_LOG is set.
    stubsmith_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let output = match args.command {
        Command::Fix { snapshot, pretty } => {
            let loaded = driver::load_file(&snapshot)?;
            driver::to_json(&driver::run_fix(&loaded)?, pretty)?
        }
        Command::Resolve { snapshot, pretty } => {
            let loaded = driver::load_file(&snapshot)?;
            driver::to_json(&driver::run_resolve(&loaded), pretty)?
        }
    };
    println!("{output}");
    Ok(())
}
