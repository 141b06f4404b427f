//! A recording bridge for tests and dry runs.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::bridge::{BridgeError, DssBridge};

/// Operations performed against the bridge, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SetConfig(PathBuf),
    OpenSession(String),
    Connect,
    GetScriptTimeout,
    SetScriptTimeout(Option<Duration>),
    LoadProgram(PathBuf),
    Restart,
    RunAsynch,
    Reset,
    Disconnect,
    StopServer,
    Shutdown,
}

/// A bridge that records every operation instead of driving hardware.
///
/// The operation log is shared, so it stays inspectable after the bridge has
/// been consumed by a session.
pub struct FakeBridge {
    operations: Rc<RefCell<Vec<Operation>>>,
    failures: Vec<&'static str>,
    timeout: Option<Duration>,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self {
            operations: Rc::new(RefCell::new(Vec::new())),
            failures: Vec::new(),
            timeout: Some(Duration::from_secs(10)),
        }
    }

    /// Handle to the recorded operations.
    pub fn operations(&self) -> Rc<RefCell<Vec<Operation>>> {
        Rc::clone(&self.operations)
    }

    /// Make the named operation fail with a vendor error. Names match the
    /// [DssBridge] method names.
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.failures.push(operation);
        self
    }

    fn record(&mut self, name: &'static str, operation: Operation) -> Result<(), BridgeError> {
        tracing::debug!("fake bridge: {operation:?}");
        self.operations.borrow_mut().push(operation);
        if self.failures.contains(&name) {
            Err(BridgeError::Vendor(format!("injected {name} failure")))
        } else {
            Ok(())
        }
    }
}

impl Default for FakeBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl DssBridge for FakeBridge {
    fn set_config(&mut self, ccxml: &Path) -> Result<(), BridgeError> {
        self.record("set_config", Operation::SetConfig(ccxml.to_path_buf()))
    }

    fn open_session(&mut self, pattern: &str) -> Result<(), BridgeError> {
        self.record("open_session", Operation::OpenSession(pattern.to_string()))
    }

    fn connect(&mut self) -> Result<(), BridgeError> {
        self.record("connect", Operation::Connect)
    }

    fn script_timeout(&mut self) -> Result<Option<Duration>, BridgeError> {
        self.record("script_timeout", Operation::GetScriptTimeout)?;
        Ok(self.timeout)
    }

    fn set_script_timeout(&mut self, timeout: Option<Duration>) -> Result<(), BridgeError> {
        self.record("set_script_timeout", Operation::SetScriptTimeout(timeout))?;
        self.timeout = timeout;
        Ok(())
    }

    fn load_program(&mut self, binary: &Path) -> Result<(), BridgeError> {
        self.record("load_program", Operation::LoadProgram(binary.to_path_buf()))
    }

    fn restart(&mut self) -> Result<(), BridgeError> {
        self.record("restart", Operation::Restart)
    }

    fn run_asynch(&mut self) -> Result<(), BridgeError> {
        self.record("run_asynch", Operation::RunAsynch)
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        self.record("reset", Operation::Reset)
    }

    fn disconnect(&mut self) -> Result<(), BridgeError> {
        self.record("disconnect", Operation::Disconnect)
    }

    fn stop_server(&mut self) -> Result<(), BridgeError> {
        self.record("stop_server", Operation::StopServer)
    }

    fn shutdown(&mut self) -> Result<(), BridgeError> {
        self.record("shutdown", Operation::Shutdown)
    }
}
