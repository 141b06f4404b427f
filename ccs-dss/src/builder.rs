//! Headless project import and build via the CCS Eclipse launcher.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use regex::Regex;

use crate::workspace;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("An IO error occurred during the execution of the CCS build tool.")]
    Io(#[source] io::Error),
    #[error("The CCS build tool failed: exit code = {0:?}.")]
    Tool(Option<i32>),
    #[error("The project root '{0}' has no final path component to use as the project name.")]
    NoProjectName(PathBuf),
    #[error("Failed to create the build workspace '{path}'.")]
    Workspace {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
    #[error("Failed to read the project file '{path}'.")]
    ProjectFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Build types understood by the headless builder. Labels are passed verbatim
/// on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    #[default]
    Incremental,
    Full,
    Clean,
}

impl BuildType {
    pub fn label(self) -> &'static str {
        match self {
            BuildType::Incremental => "incremental",
            BuildType::Full => "full",
            BuildType::Clean => "clean",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "incremental" => Ok(Self::Incremental),
            "full" => Ok(Self::Full),
            "clean" => Ok(Self::Clean),
            _ => Err(format!("Build type '{s}' is unknown.")),
        }
    }
}

/// Seam between build orchestration and the external process, so tests can
/// record invocations without a CCS installation present.
pub trait BuildTool {
    fn run(&mut self, args: &[OsString]) -> Result<(), BuildError>;
}

/// The real CCS Eclipse launcher.
pub struct Eclipse {
    executable: PathBuf,
}

impl Eclipse {
    pub fn new(executable: PathBuf) -> Self {
        Self { executable }
    }

    /// Use the launcher of the newest installed CCS release.
    pub fn discover() -> Result<Self, crate::Error> {
        crate::install::find_executable().map(Self::new)
    }
}

impl BuildTool for Eclipse {
    fn run(&mut self, args: &[OsString]) -> Result<(), BuildError> {
        tracing::debug!("running {:?} with {:?}", self.executable, args);

        let status = Command::new(&self.executable)
            .args(args)
            .status()
            .map_err(BuildError::Io)?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildError::Tool(status.code()))
        }
    }
}

/// A single headless import-and-build pass for one build configuration.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// The build configuration to build, e.g. `Flash`.
    pub configuration: String,
    pub build_type: BuildType,
    /// Directory containing the `.project` file.
    pub project_root: PathBuf,
    /// Project name used for build artifacts. Defaults to the final path
    /// component of [BuildRequest::project_root].
    pub project_name: Option<String>,
    /// Eclipse workspace handed to the launcher via `-data`.
    pub workspace: PathBuf,
    /// Finish with one extra incremental build when the requested type is not
    /// already incremental. The extra build's exit status is the one reported;
    /// a failure of the first pass is only logged.
    pub finish_incremental: bool,
}

impl BuildRequest {
    pub fn new(
        configuration: impl Into<String>,
        build_type: BuildType,
        project_root: impl Into<PathBuf>,
        workspace_suffix: Option<&str>,
    ) -> Self {
        let project_root = project_root.into();
        let workspace = workspace::workspace_dir(&project_root, workspace_suffix);
        Self {
            configuration: configuration.into(),
            build_type,
            project_root,
            project_name: None,
            workspace,
            finish_incremental: true,
        }
    }

    pub fn project_name(&self) -> Result<&str, BuildError> {
        match &self.project_name {
            Some(name) => Ok(name),
            None => self
                .project_root
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| BuildError::NoProjectName(self.project_root.clone())),
        }
    }

    /// Path of the binary the build produces.
    pub fn artifact(&self) -> Result<PathBuf, BuildError> {
        let name = self.project_name()?;
        Ok(self
            .project_root
            .join(&self.configuration)
            .join(format!("{name}.out")))
    }

    fn base_args(&self) -> Vec<OsString> {
        vec![
            "-noSplash".into(),
            "-data".into(),
            self.workspace.clone().into_os_string(),
        ]
    }

    fn import_args(&self) -> Result<Vec<OsString>, BuildError> {
        let mut args = self.base_args();
        args.extend([
            "-application".into(),
            "com.ti.ccstudio.apps.projectImport".into(),
            "-ccs.location".into(),
            self.project_root.clone().into_os_string(),
            "-ccs.renameTo".into(),
            self.project_name()?.into(),
        ]);
        Ok(args)
    }

    fn build_args(&self, build_type: BuildType) -> Result<Vec<OsString>, BuildError> {
        let mut args = self.base_args();
        args.extend([
            "-application".into(),
            "com.ti.ccstudio.apps.projectBuild".into(),
            "-ccs.projects".into(),
            self.project_name()?.into(),
            "-ccs.configuration".into(),
            self.configuration.clone().into(),
            "-ccs.buildType".into(),
            build_type.label().into(),
        ]);
        Ok(args)
    }

    /// Run the import-and-build flow. Returns the path of the built binary.
    ///
    /// The project is imported first when the workspace is empty; the project
    /// may already be known to a populated workspace, so a failed import is
    /// logged and the build still attempted.
    pub fn run(&self, tool: &mut dyn BuildTool) -> Result<PathBuf, BuildError> {
        if workspace_is_empty(&self.workspace)? {
            std::fs::create_dir_all(&self.workspace).map_err(|source| BuildError::Workspace {
                source,
                path: self.workspace.clone(),
            })?;

            if let Err(error) = tool.run(&self.import_args()?) {
                tracing::warn!("project import failed, continuing: {error}");
            }
        }

        let first = tool.run(&self.build_args(self.build_type)?);

        if self.finish_incremental && self.build_type != BuildType::Incremental {
            if let Err(error) = first {
                tracing::warn!(
                    "{} build failed, the finishing incremental build decides: {error}",
                    self.build_type
                );
            }
            tool.run(&self.build_args(BuildType::Incremental)?)?;
        } else {
            first?;
        }

        self.artifact()
    }
}

fn workspace_is_empty(path: &Path) -> Result<bool, BuildError> {
    match std::fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(error) => Err(BuildError::Workspace {
            source: error,
            path: path.to_path_buf(),
        }),
    }
}

/// Build configuration names declared in the project's `.cproject` file, in
/// declaration order.
pub fn list_configurations(project_root: &Path) -> Result<Vec<String>, BuildError> {
    let path = project_root.join(".cproject");
    let contents = std::fs::read_to_string(&path).map_err(|source| BuildError::ProjectFile {
        source,
        path: path.clone(),
    })?;

    // The `.cproject` format is CDT-internal; configuration elements are the
    // stable part of it.
    let pattern = Regex::new(r#"<configuration\s[^>]*\bname="([^"]+)""#)
        .expect("static regex must parse");

    let mut configurations = Vec::new();
    for captures in pattern.captures_iter(&contents) {
        let name = captures[1].to_string();
        if !configurations.contains(&name) {
            configurations.push(name);
        }
    }

    Ok(configurations)
}
