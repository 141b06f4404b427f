//! Options shared between commands that open a target session.

use std::path::PathBuf;

use ccs_dss::bridge::fake::FakeBridge;
use ccs_dss::bridge::TraceLevel;
use ccs_dss::{Session, SessionOptions};

#[derive(clap::Parser, Debug)]
pub struct ConnectionOptions {
    /// The ccxml target configuration file
    #[arg(long, env = "DSS_CCXML", help_heading = "TARGET CONFIGURATION")]
    pub ccxml: PathBuf,

    /// Base path of the CCS installation; probed from the well-known
    /// locations when omitted
    #[arg(long, env = "DSS_CCS_BASE_PATH", help_heading = "TARGET CONFIGURATION")]
    pub base_path: Option<PathBuf>,

    /// Device selection pattern for the debug session
    #[arg(long, env = "DSS_DEVICE", help_heading = "TARGET CONFIGURATION")]
    pub device: Option<String>,

    /// Vendor trace verbosity. Possible options:
    /// [off, severe, warning, info, config, fine, finer, finest, all]
    #[arg(long, default_value_t = TraceLevel::Off, help_heading = "TARGET CONFIGURATION")]
    pub trace_level: TraceLevel,

    /// Write vendor trace to this file
    #[arg(long, help_heading = "TARGET CONFIGURATION")]
    pub trace_log: Option<PathBuf>,

    /// Drive a recording fake instead of real hardware
    #[arg(long, env = "DSS_DRY_RUN", help_heading = "TARGET CONFIGURATION")]
    pub dry_run: bool,
}

impl ConnectionOptions {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            ccxml: self.ccxml.clone(),
            base_path: self.base_path.clone(),
            device_pattern: self.device.clone(),
            trace_level: self.trace_level,
            trace_log: self.trace_log.clone(),
        }
    }

    /// Open a session against the configured target, or against a fake
    /// bridge when `--dry-run` was given.
    pub fn open(&self) -> anyhow::Result<Session> {
        let options = self.session_options();

        let session = if self.dry_run {
            Session::open_with(Box::new(FakeBridge::new()), &options)?
        } else {
            Session::open(&options)?
        };

        Ok(session)
    }
}
