//! The production bridge: drives the DSS scripting shell shipped with CCS as
//! a child JVM process.
//!
//! The shell runs an embedded driver script that maps one stdin line per
//! operation onto the vendor object graph and answers with `ok`/`err` lines.
//! Vendor console trace can interleave with replies and is skipped.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::bridge::{BridgeError, DssBridge, TraceLevel};
use crate::install;

const DRIVER_SOURCE: &str = include_str!("dss_driver.js");

/// Upper bound on banner lines the shell may print before the driver reports
/// in.
const MAX_GREETING_LINES: usize = 256;

/// How long a quit request may take before the shell gets killed.
const QUIT_GRACE: Duration = Duration::from_secs(5);

pub struct JvmBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    // Keeps the driver script on disk for the lifetime of the shell.
    _driver: tempfile::NamedTempFile,
}

fn launcher_path(base_path: &Path) -> PathBuf {
    let name = if cfg!(windows) { "dss.bat" } else { "dss.sh" };
    base_path.join("scripting").join("bin").join(name)
}

fn classpath(base_path: &Path) -> Result<OsString, BridgeError> {
    let mut paths: Vec<PathBuf> = std::env::var_os("CLASSPATH")
        .map(|existing| std::env::split_paths(&existing).collect())
        .unwrap_or_default();
    paths.extend(install::jar_paths(base_path));

    std::env::join_paths(paths).map_err(BridgeError::Classpath)
}

impl JvmBridge {
    /// Start the scripting shell of the installation at `base_path` and wait
    /// for the driver to report in.
    pub fn start(
        base_path: &Path,
        trace_level: TraceLevel,
        trace_log: Option<&Path>,
    ) -> Result<Self, BridgeError> {
        let launcher = launcher_path(base_path);
        if !launcher.is_file() {
            return Err(BridgeError::LauncherNotFound(launcher));
        }

        let mut driver = tempfile::Builder::new()
            .prefix("ccs-dss-driver-")
            .suffix(".js")
            .tempfile()?;
        driver.write_all(DRIVER_SOURCE.as_bytes())?;
        driver.flush()?;

        tracing::debug!("starting DSS scripting shell {}", launcher.display());

        let mut child = Command::new(&launcher)
            .arg(driver.path())
            .env("CLASSPATH", classpath(base_path)?)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(BridgeError::Spawn)?;

        let stdin = child.stdin.take().ok_or(BridgeError::Closed)?;
        let stdout = BufReader::new(child.stdout.take().ok_or(BridgeError::Closed)?);

        let mut bridge = Self {
            child,
            stdin,
            stdout,
            _driver: driver,
        };
        bridge.expect_ready()?;

        if let Some(log) = trace_log {
            bridge.request(&format!("trace-begin {}", log.display()))?;
        }
        bridge.request(&format!("trace-level {}", trace_level.vendor_name()))?;

        Ok(bridge)
    }

    fn expect_ready(&mut self) -> Result<(), BridgeError> {
        let mut line = String::new();
        for _ in 0..MAX_GREETING_LINES {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(BridgeError::Closed);
            }
            if line.trim_end() == "ready" {
                return Ok(());
            }
            tracing::trace!("dss banner: {}", line.trim_end());
        }
        Err(BridgeError::Protocol(line))
    }

    /// Send one command line and wait for its `ok`/`err` reply.
    fn request(&mut self, command: &str) -> Result<String, BridgeError> {
        tracing::trace!("dss <- {command}");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(BridgeError::Closed);
            }
            let reply = line.trim_end();
            tracing::trace!("dss -> {reply}");

            if reply == "ok" {
                return Ok(String::new());
            }
            if let Some(value) = reply.strip_prefix("ok ") {
                return Ok(value.to_string());
            }
            if let Some(message) = reply.strip_prefix("err ") {
                return Err(BridgeError::Vendor(message.to_string()));
            }
            // Anything else is vendor console output.
        }
    }

    fn request_unit(&mut self, command: &str) -> Result<(), BridgeError> {
        self.request(command).map(|_| ())
    }
}

impl DssBridge for JvmBridge {
    fn set_config(&mut self, ccxml: &Path) -> Result<(), BridgeError> {
        self.request_unit(&format!("set-config {}", ccxml.display()))
    }

    fn open_session(&mut self, pattern: &str) -> Result<(), BridgeError> {
        self.request_unit(&format!("open-session {pattern}"))
    }

    fn connect(&mut self) -> Result<(), BridgeError> {
        self.request_unit("connect")
    }

    fn script_timeout(&mut self) -> Result<Option<Duration>, BridgeError> {
        let reply = self.request("get-timeout")?;
        let millis: i64 = reply
            .trim()
            .parse()
            .map_err(|_| BridgeError::Protocol(reply))?;

        if millis < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_millis(millis as u64)))
        }
    }

    fn set_script_timeout(&mut self, timeout: Option<Duration>) -> Result<(), BridgeError> {
        let millis = match timeout {
            Some(timeout) => timeout.as_millis() as i64,
            None => -1,
        };
        self.request_unit(&format!("set-timeout {millis}"))
    }

    fn load_program(&mut self, binary: &Path) -> Result<(), BridgeError> {
        self.request_unit(&format!("load-program {}", binary.display()))
    }

    fn restart(&mut self) -> Result<(), BridgeError> {
        self.request_unit("restart")
    }

    fn run_asynch(&mut self) -> Result<(), BridgeError> {
        self.request_unit("run-asynch")
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        self.request_unit("reset")
    }

    fn disconnect(&mut self) -> Result<(), BridgeError> {
        self.request_unit("disconnect")
    }

    fn stop_server(&mut self) -> Result<(), BridgeError> {
        self.request_unit("stop-server")
    }

    fn shutdown(&mut self) -> Result<(), BridgeError> {
        let quit = writeln!(self.stdin, "quit").and_then(|()| self.stdin.flush());
        if quit.is_err() {
            // The shell is already gone or wedged; reap it the hard way.
            let _ = self.child.kill();
        }

        let status = match wait_bounded(&mut self.child, QUIT_GRACE)? {
            Some(status) => status,
            None => {
                tracing::debug!("DSS scripting shell ignored quit, killing it");
                self.child.kill()?;
                self.child.wait()?
            }
        };
        if !status.success() {
            tracing::debug!("DSS scripting shell exited with {status}");
        }
        Ok(())
    }
}

/// Wait for `child` to exit, but no longer than `limit`.
fn wait_bounded(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

impl Drop for JvmBridge {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    #[test]
    fn bounded_wait_reaps_an_exited_child() {
        let mut child = Command::new("true").spawn().unwrap();

        let status = wait_bounded(&mut child, Duration::from_secs(5)).unwrap();
        assert!(status.is_some());
    }

    #[test]
    fn bounded_wait_gives_up_on_a_wedged_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        let status = wait_bounded(&mut child, Duration::from_millis(100)).unwrap();
        assert!(status.is_none());

        child.kill().unwrap();
        child.wait().unwrap();
    }
}
