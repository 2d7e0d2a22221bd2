//! Platform process capability
//!
//! Each supported platform provides one implementation of [`ProcessBackend`]
//! and a `launch` constructor. Observable behaviour is the same everywhere:
//! reads never block, liveness probes never wait, termination is a request,
//! and release frees every OS resource the process holds.

use std::path::Path;

use crate::errors::Result;
use crate::execution::stream::{ReadOutcome, StreamKind};
use crate::monitoring::ExitStatus;

/// Operations on a launched process
pub trait ProcessBackend: Send {
    /// OS process identifier
    fn pid(&self) -> u32;

    /// Non-blocking read from one of the output streams
    fn read(&mut self, stream: StreamKind, buf: &mut [u8]) -> ReadOutcome;

    /// Non-blocking liveness probe; `None` while the process runs
    fn try_wait(&mut self) -> Option<ExitStatus>;

    /// Ask the process to terminate without waiting for it
    fn terminate(&mut self);

    /// Close descriptors and reap the process, killing it if still alive
    fn release(&mut self);
}

/// Launch `argv` on the current platform
pub fn launch(argv: &[String], cwd: Option<&Path>) -> Result<Box<dyn ProcessBackend>> {
    #[cfg(unix)]
    {
        let process = crate::execution::unix::UnixProcess::launch(argv, cwd)?;
        Ok(Box::new(process))
    }

    #[cfg(windows)]
    {
        let process = crate::execution::windows::WindowsProcess::launch(argv, cwd)?;
        Ok(Box::new(process))
    }
}
