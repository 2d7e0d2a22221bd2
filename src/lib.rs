//! workspace-proc: supervise one child process per handle
//!
//! Launches a command given as a single command-line string, optionally
//! inside a bubblewrap sandbox, and exposes its stdout and stderr as
//! non-blocking streams that the caller polls at its own pace.
//!
//! # Modules
//!
//! - **execution**: tokenizer, platform launchers, streams, process handle
//! - **isolation**: bubblewrap profile and sandbox capability probes
//! - **monitoring**: exit status and liveness caching
//! - **controller**: id-keyed handle arena
//! - **ffi**: C ABI over the arena
//!
//! Nothing here spawns threads or timers: every call returns immediately,
//! except launch, which waits only until the child has exec'd.
//!
//! # Example
//!
//! ```ignore
//! use workspace_proc::{LaunchOptions, ProcessHandle, ReadOutcome};
//!
//! let mut handle = ProcessHandle::start(&LaunchOptions::new("ls -la").cwd("/tmp"))?;
//! let mut buf = [0u8; 4096];
//! loop {
//!     match handle.read_stdout(&mut buf) {
//!         ReadOutcome::Data(n) => print!("{}", String::from_utf8_lossy(&buf[..n])),
//!         ReadOutcome::EndOfStream => break,
//!         ReadOutcome::WouldBlock => std::thread::sleep(std::time::Duration::from_millis(10)),
//!     }
//! }
//! println!("exit: {:?}", handle.exit_status());
//! ```

pub mod config;
pub mod errors;
pub mod utils;

pub mod execution;
pub mod isolation;
pub mod monitoring;

pub mod controller;
pub mod ffi;

pub use config::LaunchOptions;
pub use controller::{HandleId, Supervisor};
pub use errors::{ProcError, Result};
pub use execution::{tokenize, ProcessHandle, ReadOutcome, StreamKind};
pub use isolation::{sandbox_supported, SystemCapabilities};
pub use monitoring::{ExitStatus, Liveness};
