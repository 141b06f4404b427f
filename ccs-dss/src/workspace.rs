//! Isolated scratch workspaces handed to the headless builder.
//!
//! The builder insists on an Eclipse workspace directory and corrupts it when
//! two invocations share one. Each project root gets its own workspace under
//! the system temp directory, keyed by a hash of the root's path plus an
//! optional suffix for side-by-side invocations against the same project.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Root of all generated workspaces.
pub fn scratch_root() -> PathBuf {
    std::env::temp_dir().join("ccs-dss")
}

/// Per-project scratch directory under [scratch_root].
pub fn project_scratch_dir(project_root: &Path, suffix: Option<&str>) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(project_root.to_string_lossy().as_bytes());
    let digest = hasher.finalize();

    let mut name = format!("{digest:x}");
    if let Some(suffix) = suffix {
        name.push_str(suffix);
    }

    scratch_root().join(name)
}

/// The Eclipse workspace directory for one project root and suffix.
pub fn workspace_dir(project_root: &Path, suffix: Option<&str>) -> PathBuf {
    project_scratch_dir(project_root, suffix).join("workspace")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn workspace_paths_are_deterministic() {
        let root = Path::new("/proj/widget");
        assert_eq!(workspace_dir(root, None), workspace_dir(root, None));
    }

    #[test]
    fn distinct_projects_get_distinct_workspaces() {
        assert_ne!(
            workspace_dir(Path::new("/proj/widget"), None),
            workspace_dir(Path::new("/proj/gadget"), None)
        );
    }

    #[test]
    fn a_suffix_isolates_repeated_invocations() {
        let root = Path::new("/proj/widget");
        assert_ne!(
            workspace_dir(root, Some("-ci")),
            workspace_dir(root, None)
        );
    }

    #[test]
    fn workspaces_live_under_the_scratch_root() {
        let workspace = workspace_dir(Path::new("/proj/widget"), Some("-ci"));
        assert!(workspace.starts_with(scratch_root()));
        assert!(workspace.ends_with("workspace"));
    }
}
