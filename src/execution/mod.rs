//! Execution layer: tokenizing, launching, and reading from processes
//!
//! # Features
//!
//! - **Tokenizer**: shell-like splitting of a single command line
//! - **Launcher**: fork/exec on POSIX with exec-failure detection,
//!   `CreateProcess` on Windows
//! - **Streams**: non-blocking stdout/stderr reads
//! - **Handle**: liveness caching, termination, and disposal
//!
//! # Examples
//!
//! ```ignore
//! use workspace_proc::{LaunchOptions, ProcessHandle, ReadOutcome};
//!
//! let mut handle = ProcessHandle::start(&LaunchOptions::new("echo hello"))?;
//! let mut buf = [0u8; 4096];
//! match handle.read_stdout(&mut buf) {
//!     ReadOutcome::Data(n) => print!("{}", String::from_utf8_lossy(&buf[..n])),
//!     ReadOutcome::WouldBlock | ReadOutcome::EndOfStream => {}
//! }
//! ```

pub mod backend;
pub mod cmdline;
pub mod handle;
pub mod stream;

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

pub use backend::ProcessBackend;
pub use cmdline::tokenize;
pub use handle::ProcessHandle;
pub use stream::{OutputStream, ReadOutcome, StreamKind};
