use std::path::PathBuf;

use anyhow::Context;
use ccs_dss::builder::{self, BuildRequest, BuildType, Eclipse};
use colored::Colorize;

#[derive(clap::Parser)]
pub struct Cmd {
    /// Build configuration to build; repeatable, or 'all' for every
    /// configuration the project declares
    #[arg(long = "target", required = true)]
    targets: Vec<String>,

    /// Build type passed to the headless builder. Possible options:
    /// [incremental, full, clean]
    #[arg(long, default_value_t = BuildType::Incremental)]
    build_type: BuildType,

    /// Directory containing the .project file
    #[arg(long, env = "DSS_PROJECT_ROOT")]
    project_root: PathBuf,

    /// Project name used for build artifacts; defaults to the final path
    /// component of the project root
    #[arg(long, env = "DSS_PROJECT_NAME")]
    project_name: Option<String>,

    /// Suffix distinguishing generated workspaces for the same project
    #[arg(long, env = "DSS_WORKSPACE_SUFFIX")]
    workspace_suffix: Option<String>,

    /// Do not finish non-incremental builds with an extra incremental pass
    #[arg(long)]
    no_finish_incremental: bool,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<()> {
        let mut tool = Eclipse::discover()?;

        let targets = if self.targets.iter().any(|target| target == "all") {
            builder::list_configurations(&self.project_root)?
        } else {
            self.targets.clone()
        };

        for target in targets {
            let mut request = BuildRequest::new(
                target.clone(),
                self.build_type,
                &self.project_root,
                self.workspace_suffix.as_deref(),
            );
            request.project_name = self.project_name.clone();
            request.finish_incremental = !self.no_finish_incremental;

            let artifact = request
                .run(&mut tool)
                .with_context(|| format!("Failed to build configuration '{target}'."))?;

            println!("{} {}", "Built".green().bold(), artifact.display());
        }

        Ok(())
    }
}
