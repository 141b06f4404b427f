mod cmd;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::util::logging;

#[derive(clap::Parser)]
#[clap(
    name = "ccs-dss",
    about = "Load, run and build Code Composer Studio projects",
    version
)]
struct Cli {
    /// Location for log file
    ///
    /// If no location is specified, messages only go to stderr.
    #[clap(long, global = true, help_heading = "LOG CONFIGURATION")]
    log_file: Option<PathBuf>,

    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(clap::Subcommand)]
enum Subcommand {
    /// Load a binary onto the target and run it
    Load(cmd::load::Cmd),
    /// Restart the target at its entry point and resume execution
    Restart(cmd::restart::Cmd),
    /// Build the project with the headless CCS builder
    Build(cmd::build::Cmd),
    /// List the build configurations the project declares
    ListTargets(cmd::list_targets::Cmd),
    /// Open the bundled DSS scripting documentation
    Docs(cmd::docs::Cmd),
}

fn main() -> Result<()> {
    let matches = Cli::parse();

    logging::setup(matches.log_file.as_deref())?;

    match matches.subcommand {
        Subcommand::Load(cmd) => cmd.run(),
        Subcommand::Restart(cmd) => cmd.run(),
        Subcommand::Build(cmd) => cmd.run(),
        Subcommand::ListTargets(cmd) => cmd.run(),
        Subcommand::Docs(cmd) => cmd.run(),
    }
}
