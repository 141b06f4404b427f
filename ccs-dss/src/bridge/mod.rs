//! The narrow adapter to the vendor's Debug Server Scripting object graph.
//!
//! Everything the vendor exposes is remote, dynamically dispatched state
//! behind a JVM. [DssBridge] names the handful of operations this crate
//! needs, so the rest of the code never touches the vendor object graph and
//! tests can substitute [fake::FakeBridge].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub mod fake;
pub mod jvm;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("The DSS scripting shell was not found at '{0}'.")]
    LauncherNotFound(PathBuf),
    #[error("Failed to start the DSS scripting shell.")]
    Spawn(#[source] io::Error),
    #[error("Failed to assemble the DSS classpath.")]
    Classpath(#[source] std::env::JoinPathsError),
    #[error("An IO error occurred while talking to the DSS scripting shell.")]
    Io(#[from] io::Error),
    #[error("The DSS scripting shell exited unexpectedly.")]
    Closed,
    #[error("The debug server reported an error: {0}")]
    Vendor(String),
    #[error("Unexpected reply from the DSS scripting shell: {0:?}")]
    Protocol(String),
}

/// Trace verbosity understood by the vendor scripting environment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    #[default]
    Off,
    Severe,
    Warning,
    Info,
    Config,
    Fine,
    Finer,
    Finest,
    All,
}

impl TraceLevel {
    /// The constant name the vendor's `TraceLevel.valueOf` expects.
    pub fn vendor_name(self) -> &'static str {
        match self {
            TraceLevel::Off => "OFF",
            TraceLevel::Severe => "SEVERE",
            TraceLevel::Warning => "WARNING",
            TraceLevel::Info => "INFO",
            TraceLevel::Config => "CONFIG",
            TraceLevel::Fine => "FINE",
            TraceLevel::Finer => "FINER",
            TraceLevel::Finest => "FINEST",
            TraceLevel::All => "ALL",
        }
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vendor_name().to_lowercase())
    }
}

impl FromStr for TraceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "off" => Ok(Self::Off),
            "severe" => Ok(Self::Severe),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "config" => Ok(Self::Config),
            "fine" => Ok(Self::Fine),
            "finer" => Ok(Self::Finer),
            "finest" => Ok(Self::Finest),
            "all" => Ok(Self::All),
            _ => Err(format!("Trace level '{s}' is unknown.")),
        }
    }
}

/// One named operation per vendor call.
///
/// The call sequence is policed by [crate::Session], not here; an
/// implementation only translates each operation to the vendor bridge.
pub trait DssBridge {
    /// Apply a ccxml target configuration to the debug server.
    fn set_config(&mut self, ccxml: &Path) -> Result<(), BridgeError>;
    /// Open a debug session matching the device selection `pattern`.
    fn open_session(&mut self, pattern: &str) -> Result<(), BridgeError>;
    /// Connect to the physical or simulated target.
    fn connect(&mut self) -> Result<(), BridgeError>;
    /// The current script timeout; `None` means unlimited.
    fn script_timeout(&mut self) -> Result<Option<Duration>, BridgeError>;
    fn set_script_timeout(&mut self, timeout: Option<Duration>) -> Result<(), BridgeError>;
    /// Transfer a binary image into target memory.
    fn load_program(&mut self, binary: &Path) -> Result<(), BridgeError>;
    /// Restart the target at its entry point.
    fn restart(&mut self) -> Result<(), BridgeError>;
    /// Request execution; returns once the run has been requested.
    fn run_asynch(&mut self) -> Result<(), BridgeError>;
    fn reset(&mut self) -> Result<(), BridgeError>;
    fn disconnect(&mut self) -> Result<(), BridgeError>;
    /// Stop the debug server.
    fn stop_server(&mut self) -> Result<(), BridgeError>;
    /// Tear down the scripting runtime. Must be safe to call after failures.
    fn shutdown(&mut self) -> Result<(), BridgeError>;
}
