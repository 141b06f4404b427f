//! Target session lifecycle over a scripting bridge.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bridge::jvm::JvmBridge;
use crate::bridge::{DssBridge, TraceLevel};
use crate::install;
use crate::Error;

/// Script timeout applied to a load when the caller has no preference.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(150_000);

/// Lifecycle stage of a [Session].
///
/// Sessions move through a strict sequence: unopened, connected, loaded,
/// closed. The unopened stage precedes the existence of a [Session] value;
/// [Session::open] performs that first transition. No stage can be skipped
/// and none repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Loaded,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Connected => "connected",
            SessionState::Loaded => "loaded",
            SessionState::Closed => "closed",
        })
    }
}

const OPEN_STATES: &[SessionState] = &[SessionState::Connected, SessionState::Loaded];

/// How to reach the target.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The ccxml target configuration file.
    pub ccxml: PathBuf,
    /// CCS installation to run the scripting shell from. Probed from the
    /// well-known locations when absent.
    pub base_path: Option<PathBuf>,
    /// Device selection pattern passed to the debug server. Defaults to `"*"`.
    pub device_pattern: Option<String>,
    pub trace_level: TraceLevel,
    /// Write vendor trace to this file.
    pub trace_log: Option<PathBuf>,
}

impl SessionOptions {
    pub fn new(ccxml: impl Into<PathBuf>) -> Self {
        Self {
            ccxml: ccxml.into(),
            base_path: None,
            device_pattern: None,
            trace_level: TraceLevel::default(),
            trace_log: None,
        }
    }
}

/// An open debug session against one target.
///
/// Each session exclusively owns one scripting runtime; runtimes are never
/// reused across sessions. The runtime is torn down on every exit path,
/// including failed opens and drops.
pub struct Session {
    bridge: Box<dyn DssBridge>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a scripting runtime and connect to the target described by
    /// `options`.
    pub fn open(options: &SessionOptions) -> Result<Self, Error> {
        let base_path = match &options.base_path {
            Some(path) => path.clone(),
            None => install::find_base_path()?,
        };

        let bridge = JvmBridge::start(&base_path, options.trace_level, options.trace_log.as_deref())?;
        Self::open_with(Box::new(bridge), options)
    }

    /// Run the connect sequence over an already started bridge.
    ///
    /// On any failure the bridge is shut down before the error propagates, so
    /// no runtime is left live behind a failed open.
    pub fn open_with(mut bridge: Box<dyn DssBridge>, options: &SessionOptions) -> Result<Self, Error> {
        if let Err(error) = connect_sequence(bridge.as_mut(), options) {
            if let Err(shutdown_error) = bridge.shutdown() {
                tracing::warn!("runtime teardown after failed open also failed: {shutdown_error}");
            }
            return Err(error);
        }

        Ok(Self {
            bridge,
            state: SessionState::Connected,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Load `binary` into target memory and restart the target.
    ///
    /// The script timeout is raised to `timeout` for the transfer and the
    /// prior value restored afterwards, also when the transfer fails.
    pub fn load(&mut self, binary: &Path, timeout: Duration) -> Result<(), Error> {
        self.expect("load", &[SessionState::Connected])?;

        let previous = self.bridge.script_timeout()?;
        self.bridge.set_script_timeout(Some(timeout))?;
        let loaded = self.bridge.load_program(binary);
        let restored = self.bridge.set_script_timeout(previous);
        loaded?;
        restored?;

        self.bridge.restart()?;
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Request target execution. Returns once the run has been requested,
    /// not once it completes.
    pub fn run(&mut self) -> Result<(), Error> {
        self.expect("run", &[SessionState::Loaded])?;
        self.bridge.run_asynch()?;
        Ok(())
    }

    /// Restart the target at its entry point and resume execution.
    pub fn restart(&mut self) -> Result<(), Error> {
        self.expect("restart", OPEN_STATES)?;
        self.bridge.restart()?;
        self.bridge.run_asynch()?;
        Ok(())
    }

    /// Reset the target.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.expect("reset", OPEN_STATES)?;
        self.bridge.reset()?;
        Ok(())
    }

    /// Disconnect from the target and stop the debug server.
    ///
    /// The scripting runtime is torn down even when disconnect or stop fail;
    /// the first failure is the one reported.
    pub fn close(&mut self) -> Result<(), Error> {
        self.expect("close", OPEN_STATES)?;
        self.state = SessionState::Closed;

        let disconnected = self.bridge.disconnect();
        let stopped = self.bridge.stop_server();
        let shutdown = self.bridge.shutdown();

        disconnected?;
        stopped?;
        shutdown?;
        Ok(())
    }

    fn expect(&self, operation: &'static str, allowed: &[SessionState]) -> Result<(), Error> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidSessionState {
                operation,
                state: self.state,
            })
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            if let Err(error) = self.close() {
                tracing::warn!("failed to close session on drop: {error}");
            }
        }
    }
}

fn connect_sequence(bridge: &mut dyn DssBridge, options: &SessionOptions) -> Result<(), Error> {
    bridge.set_config(&options.ccxml)?;
    bridge.open_session(options.device_pattern.as_deref().unwrap_or("*"))?;
    bridge.connect()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::bridge::fake::{FakeBridge, Operation};

    fn options() -> SessionOptions {
        SessionOptions::new("/proj/widget/device.ccxml")
    }

    fn open(bridge: FakeBridge) -> (Session, std::rc::Rc<std::cell::RefCell<Vec<Operation>>>) {
        let operations = bridge.operations();
        let session = Session::open_with(Box::new(bridge), &options()).unwrap();
        (session, operations)
    }

    #[test]
    fn open_runs_the_connect_sequence_in_order() {
        let (session, operations) = open(FakeBridge::new());

        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(
            *operations.borrow(),
            vec![
                Operation::SetConfig("/proj/widget/device.ccxml".into()),
                Operation::OpenSession("*".to_string()),
                Operation::Connect,
            ]
        );
    }

    #[test]
    fn open_passes_the_device_pattern_through() {
        let bridge = FakeBridge::new();
        let operations = bridge.operations();

        let mut options = options();
        options.device_pattern = Some("Texas Instruments XDS110.*".to_string());
        Session::open_with(Box::new(bridge), &options).unwrap();

        assert!(operations
            .borrow()
            .contains(&Operation::OpenSession("Texas Instruments XDS110.*".to_string())));
    }

    #[test]
    fn failed_open_tears_the_runtime_down() {
        let bridge = FakeBridge::new().fail_on("connect");
        let operations = bridge.operations();

        let error = Session::open_with(Box::new(bridge), &options()).unwrap_err();

        assert!(matches!(error, Error::Bridge(_)));
        let shutdowns = operations
            .borrow()
            .iter()
            .filter(|operation| **operation == Operation::Shutdown)
            .count();
        assert_eq!(shutdowns, 1);
    }

    #[test]
    fn load_saves_and_restores_the_script_timeout() {
        let (mut session, operations) = open(FakeBridge::new());

        session
            .load(Path::new("/proj/widget/Flash/widget.out"), Duration::from_secs(5))
            .unwrap();

        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            operations.borrow()[3..],
            [
                Operation::GetScriptTimeout,
                Operation::SetScriptTimeout(Some(Duration::from_secs(5))),
                Operation::LoadProgram("/proj/widget/Flash/widget.out".into()),
                // the fake starts out with a ten second timeout
                Operation::SetScriptTimeout(Some(Duration::from_secs(10))),
                Operation::Restart,
            ]
        );
    }

    #[test]
    fn load_restores_the_timeout_when_the_transfer_fails() {
        let bridge = FakeBridge::new().fail_on("load_program");
        let operations = bridge.operations();
        let mut session = Session::open_with(Box::new(bridge), &options()).unwrap();

        let error = session
            .load(Path::new("/tmp/widget.out"), Duration::from_secs(5))
            .unwrap_err();

        assert!(matches!(error, Error::Bridge(_)));
        assert_eq!(
            *operations.borrow().last().unwrap(),
            Operation::SetScriptTimeout(Some(Duration::from_secs(10)))
        );
    }

    #[test]
    fn run_requires_a_loaded_session() {
        let (mut session, _operations) = open(FakeBridge::new());

        let error = session.run().unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidSessionState {
                operation: "run",
                state: SessionState::Connected,
            }
        ));
    }

    #[test]
    fn load_cannot_fire_twice() {
        let (mut session, _operations) = open(FakeBridge::new());

        session
            .load(Path::new("/tmp/widget.out"), Duration::from_secs(5))
            .unwrap();
        let error = session
            .load(Path::new("/tmp/widget.out"), Duration::from_secs(5))
            .unwrap_err();

        assert!(matches!(error, Error::InvalidSessionState { .. }));
    }

    #[test]
    fn close_releases_the_runtime_exactly_once() {
        let (mut session, operations) = open(FakeBridge::new());

        session.close().unwrap();
        drop(session);

        let shutdowns = operations
            .borrow()
            .iter()
            .filter(|operation| **operation == Operation::Shutdown)
            .count();
        assert_eq!(shutdowns, 1);
    }

    #[test]
    fn close_tears_down_even_when_disconnect_fails() {
        let bridge = FakeBridge::new().fail_on("disconnect");
        let operations = bridge.operations();
        let mut session = Session::open_with(Box::new(bridge), &options()).unwrap();

        let error = session.close().unwrap_err();

        assert!(matches!(error, Error::Bridge(_)));
        assert!(operations.borrow().contains(&Operation::StopServer));
        assert!(operations.borrow().contains(&Operation::Shutdown));
    }

    #[test]
    fn close_cannot_fire_twice() {
        let (mut session, _operations) = open(FakeBridge::new());

        session.close().unwrap();
        let error = session.close().unwrap_err();

        assert!(matches!(
            error,
            Error::InvalidSessionState {
                operation: "close",
                state: SessionState::Closed,
            }
        ));
    }

    #[test]
    fn dropping_an_open_session_closes_it() {
        let bridge = FakeBridge::new();
        let operations = bridge.operations();

        drop(Session::open_with(Box::new(bridge), &options()).unwrap());

        let recorded = operations.borrow();
        assert_eq!(
            recorded[recorded.len() - 3..],
            [Operation::Disconnect, Operation::StopServer, Operation::Shutdown]
        );
    }

    #[test]
    fn reset_reaches_the_target() {
        let (mut session, operations) = open(FakeBridge::new());

        session.reset().unwrap();

        assert_eq!(operations.borrow()[3..], [Operation::Reset]);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn reset_requires_an_open_session() {
        let (mut session, _operations) = open(FakeBridge::new());
        session.close().unwrap();

        let error = session.reset().unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidSessionState {
                operation: "reset",
                state: SessionState::Closed,
            }
        ));
    }

    #[test]
    fn restart_resumes_execution() {
        let (mut session, operations) = open(FakeBridge::new());

        session.restart().unwrap();

        assert_eq!(
            operations.borrow()[3..],
            [Operation::Restart, Operation::RunAsynch]
        );
        // restarting does not advance the lifecycle
        assert_eq!(session.state(), SessionState::Connected);
    }
}
