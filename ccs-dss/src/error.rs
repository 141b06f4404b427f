use std::path::PathBuf;

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::builder::BuildError;
use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No CCS installation found. Probed: {}", format_paths(.searched))]
    InstallationNotFound { searched: Vec<PathBuf> },
    #[error("No CCS build executable found. Probed: {}", format_paths(.searched))]
    ExecutableNotFound { searched: Vec<PathBuf> },
    #[error("An error occurred while driving the debug server")]
    Bridge(#[from] BridgeError),
    #[error("The headless build failed")]
    Build(#[from] BuildError),
    #[error("Cannot {operation} a session that is {state}")]
    InvalidSessionState {
        operation: &'static str,
        state: SessionState,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("'{}'", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
