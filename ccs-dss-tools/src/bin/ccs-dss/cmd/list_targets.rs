use std::path::PathBuf;

use ccs_dss::builder;

#[derive(clap::Parser)]
pub struct Cmd {
    /// Directory containing the .project file
    #[arg(long, env = "DSS_PROJECT_ROOT")]
    project_root: PathBuf,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<()> {
        for configuration in builder::list_configurations(&self.project_root)? {
            println!("{configuration}");
        }

        Ok(())
    }
}
