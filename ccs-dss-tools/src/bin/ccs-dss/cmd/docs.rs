use std::path::PathBuf;

use anyhow::Context;
use ccs_dss::install;

#[derive(clap::Parser)]
pub struct Cmd {
    /// Base path of the CCS installation; probed from the well-known
    /// locations when omitted
    #[arg(long, env = "DSS_CCS_BASE_PATH")]
    base_path: Option<PathBuf>,

    /// Print the documentation path instead of opening it
    #[arg(long)]
    path_only: bool,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<()> {
        let base_path = match self.base_path {
            Some(path) => path,
            None => install::find_base_path()?,
        };
        let docs = install::docs_path(&base_path);

        if self.path_only {
            println!("{}", docs.display());
        } else {
            open::that(&docs).with_context(|| format!("Failed to open '{}'.", docs.display()))?;
        }

        Ok(())
    }
}
