//! # Automation for Code Composer Studio
//!
//! Locates a local CCS installation, drives its Eclipse-based headless
//! builder to import and build projects, and loads binaries onto embedded
//! targets through the Debug Server Scripting (DSS) shell that ships with
//! CCS.
//!
//! # Examples
//!
//! ## Loading and running a binary
//! ```no_run
//! # use ccs_dss::Error;
//! use ccs_dss::{Session, SessionOptions, DEFAULT_LOAD_TIMEOUT};
//!
//! let mut session = Session::open(&SessionOptions::new("device.ccxml"))?;
//! session.load("firmware.out".as_ref(), DEFAULT_LOAD_TIMEOUT)?;
//! session.run()?;
//! session.close()?;
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Building a project configuration
//! ```no_run
//! # use ccs_dss::Error;
//! use ccs_dss::builder::{BuildRequest, BuildType, Eclipse};
//!
//! let request = BuildRequest::new("Flash", BuildType::Full, "/proj/widget", None);
//! let artifact = request.run(&mut Eclipse::discover()?)?;
//! println!("built {}", artifact.display());
//! # Ok::<(), Error>(())
//! ```

pub mod bridge;
pub mod builder;
mod error;
pub mod install;
mod session;
pub mod workspace;

pub use crate::error::Error;
pub use crate::session::{Session, SessionOptions, SessionState, DEFAULT_LOAD_TIMEOUT};
