//! Discovery of the local Code Composer Studio installation.
//!
//! CCS has shipped under several directory layouts over the years. The
//! candidate list is static and ordered newest release first; the first
//! candidate that exists on disk wins.

use std::path::{Path, PathBuf};

use crate::Error;

/// Known CCS releases, newest first.
const VERSIONS: [&str; 8] = ["920", "910", "901", "900", "8", "7", "6", "5"];

/// Launcher names for the Eclipse-based headless builder.
const EXECUTABLE_NAMES: [&str; 2] = ["eclipsec.exe", "ccstudio"];

/// Jars making up the DSS classpath, relative to the base path.
const RELATIVE_JAR_PATHS: [&str; 4] = [
    "DebugServer/packages/ti/dss/java/dss.jar",
    "DebugServer/packages/ti/dss/java/com.ti.ccstudio.scripting.environment_3.1.0.jar",
    "DebugServer/packages/ti/dss/java/com.ti.debug.engine_1.0.0.jar",
    "dvt/scripting/dvt_scripting.jar",
];

/// The directory layouts a single release may live under.
fn layout_variants(root: &Path, version: &str) -> [PathBuf; 3] {
    [
        root.join(format!("ccsv{version}")).join("ccs_base"),
        root.join(format!("ccs{version}")).join("ccs").join("ccs_base"),
        // in case the ccsv8 or such gets doubled up
        root.join(format!("ccsv{version}"))
            .join(format!("ccsv{version}"))
            .join("ccs_base"),
    ]
}

#[cfg_attr(windows, allow(dead_code))]
fn linux_candidates(system_root: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![system_root.join("ccs").join("ccs_base")];
    for version in VERSIONS {
        candidates.extend(layout_variants(system_root, version));
        if let Some(home) = home {
            candidates.extend(layout_variants(&home.join("ti"), version));
        }
    }
    candidates
}

#[cfg_attr(not(windows), allow(dead_code))]
fn windows_candidates(system_root: &Path) -> Vec<PathBuf> {
    VERSIONS
        .iter()
        .flat_map(|version| layout_variants(system_root, version))
        .collect()
}

/// All base path candidates for the host operating system, in probe order.
#[cfg(not(windows))]
pub fn candidate_base_paths() -> Vec<PathBuf> {
    let home = directories::UserDirs::new().map(|user| user.home_dir().to_path_buf());
    linux_candidates(Path::new("/opt/ti"), home.as_deref())
}

/// All base path candidates for the host operating system, in probe order.
#[cfg(windows)]
pub fn candidate_base_paths() -> Vec<PathBuf> {
    windows_candidates(Path::new(r"c:\ti"))
}

fn first_existing_dir(candidates: Vec<PathBuf>) -> Result<PathBuf, Error> {
    for candidate in &candidates {
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
    }

    Err(Error::InstallationNotFound {
        searched: candidates,
    })
}

/// Locate the `ccs_base` directory of the newest installed CCS release.
pub fn find_base_path() -> Result<PathBuf, Error> {
    let base_path = first_existing_dir(candidate_base_paths())?;
    tracing::debug!("using CCS installation at {}", base_path.display());
    Ok(base_path)
}

/// Locate the headless build launcher next to `base_path`.
pub fn executable_near(base_path: &Path) -> Result<PathBuf, Error> {
    let eclipse = base_path.parent().unwrap_or(base_path).join("eclipse");
    let candidates: Vec<PathBuf> = EXECUTABLE_NAMES
        .iter()
        .map(|name| eclipse.join(name))
        .collect();

    for candidate in &candidates {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    Err(Error::ExecutableNotFound {
        searched: candidates,
    })
}

/// Locate the headless build launcher of the newest installed CCS release.
pub fn find_executable() -> Result<PathBuf, Error> {
    executable_near(&find_base_path()?)
}

/// Absolute paths of the jars the DSS scripting shell needs on its classpath.
pub fn jar_paths(base_path: &Path) -> Vec<PathBuf> {
    RELATIVE_JAR_PATHS
        .iter()
        .map(|relative| base_path.join(relative))
        .collect()
}

/// Path of the bundled scripting documentation.
pub fn docs_path(base_path: &Path) -> PathBuf {
    base_path
        .join("scripting")
        .join("docs")
        .join("GettingStarted.htm")
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn first_existing_directory_wins() {
        let tempdir = tempfile::tempdir().unwrap();
        let system_root = tempdir.path().join("opt").join("ti");

        let expected = system_root.join("ccsv8").join("ccs_base");
        fs::create_dir_all(&expected).unwrap();

        let found = first_existing_dir(linux_candidates(&system_root, None)).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn newer_releases_shadow_older_ones() {
        let tempdir = tempfile::tempdir().unwrap();
        let system_root = tempdir.path().join("opt").join("ti");

        let newer = system_root.join("ccsv920").join("ccs_base");
        let older = system_root.join("ccsv8").join("ccs_base");
        fs::create_dir_all(&newer).unwrap();
        fs::create_dir_all(&older).unwrap();

        let found = first_existing_dir(linux_candidates(&system_root, None)).unwrap();
        assert_eq!(found, newer);
    }

    #[test]
    fn home_layouts_are_probed_after_each_system_layout() {
        let tempdir = tempfile::tempdir().unwrap();
        let system_root = tempdir.path().join("opt").join("ti");
        let home = tempdir.path().join("home");

        let expected = home.join("ti").join("ccsv910").join("ccs_base");
        fs::create_dir_all(&expected).unwrap();

        let found = first_existing_dir(linux_candidates(&system_root, Some(&home))).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn missing_installation_reports_every_candidate() {
        let tempdir = tempfile::tempdir().unwrap();
        let system_root = tempdir.path().join("opt").join("ti");

        let candidates = linux_candidates(&system_root, None);
        let error = first_existing_dir(candidates.clone()).unwrap_err();

        match error {
            Error::InstallationNotFound { searched } => assert_eq!(searched, candidates),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn candidate_order_is_version_descending() {
        let system_root = Path::new("/opt/ti");
        let candidates = linux_candidates(system_root, None);

        assert_eq!(candidates[0], Path::new("/opt/ti/ccs/ccs_base"));
        assert_eq!(candidates[1], Path::new("/opt/ti/ccsv920/ccs_base"));
        assert_eq!(candidates[2], Path::new("/opt/ti/ccs920/ccs/ccs_base"));
        assert_eq!(candidates[3], Path::new("/opt/ti/ccsv920/ccsv920/ccs_base"));
        assert_eq!(
            candidates.last().unwrap(),
            Path::new("/opt/ti/ccsv5/ccsv5/ccs_base")
        );
    }

    #[test]
    fn executable_is_probed_next_to_the_base_path() {
        let tempdir = tempfile::tempdir().unwrap();
        let base_path = tempdir.path().join("ccsv8").join("ccs_base");
        let eclipse = tempdir.path().join("ccsv8").join("eclipse");
        fs::create_dir_all(&base_path).unwrap();
        fs::create_dir_all(&eclipse).unwrap();
        fs::write(eclipse.join("ccstudio"), b"").unwrap();

        let found = executable_near(&base_path).unwrap();
        assert_eq!(found, eclipse.join("ccstudio"));
    }

    #[test]
    fn missing_executable_reports_every_candidate() {
        let tempdir = tempfile::tempdir().unwrap();
        let base_path = tempdir.path().join("ccsv8").join("ccs_base");
        fs::create_dir_all(&base_path).unwrap();

        let error = executable_near(&base_path).unwrap_err();
        match error {
            Error::ExecutableNotFound { searched } => {
                let eclipse = tempdir.path().join("ccsv8").join("eclipse");
                assert_eq!(
                    searched,
                    vec![eclipse.join("eclipsec.exe"), eclipse.join("ccstudio")]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn jar_paths_are_relative_to_the_base_path() {
        let jars = jar_paths(Path::new("/opt/ti/ccsv8/ccs_base"));
        assert_eq!(jars.len(), 4);
        assert_eq!(
            jars[0],
            Path::new("/opt/ti/ccsv8/ccs_base/DebugServer/packages/ti/dss/java/dss.jar")
        );
        assert_eq!(
            jars[3],
            Path::new("/opt/ti/ccsv8/ccs_base/dvt/scripting/dvt_scripting.jar")
        );
    }
}
