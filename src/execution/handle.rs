//! Caller-owned process handle

use std::fmt;

use log::{debug, info, warn};

use crate::config::LaunchOptions;
use crate::errors::{ProcError, Result};
use crate::execution::backend::{self, ProcessBackend};
use crate::execution::cmdline::tokenize;
use crate::execution::stream::{ReadOutcome, StreamKind};
use crate::isolation::{sandbox_argv, sandbox_supported};
use crate::monitoring::{ExitStatus, Liveness};

/// One launched process and its two output streams
///
/// Dropping the handle disposes of it: descriptors are closed and the
/// process is reaped, being killed first if it is still running.
pub struct ProcessHandle {
    id: String,
    pid: u32,
    backend: Box<dyn ProcessBackend>,
    liveness: Liveness,
}

impl ProcessHandle {
    /// Tokenize, optionally sandbox, and launch the command in `options`
    pub fn start(options: &LaunchOptions) -> Result<Self> {
        let command = tokenize(&options.command_line);
        if command.is_empty() {
            return Err(ProcError::EmptyCommand);
        }

        let cwd = options.working_dir();
        let (argv, launch_cwd) = if options.sandbox && sandbox_supported() {
            (sandbox_argv(&command, cwd), None)
        } else {
            if options.sandbox {
                debug!("[{}] sandbox unavailable on this platform, running unsandboxed", options.id);
            }
            (command, cwd)
        };

        debug!("[{}] launching {:?}", options.id, argv);

        let backend = backend::launch(&argv, launch_cwd).map_err(|e| {
            warn!("[{}] launch failed: {}", options.id, e);
            e
        })?;

        Ok(Self::from_backend(options.id.clone(), backend))
    }

    pub(crate) fn from_backend(id: String, backend: Box<dyn ProcessBackend>) -> Self {
        Self {
            id,
            pid: backend.pid(),
            backend,
            liveness: Liveness::Running,
        }
    }

    /// OS process identifier
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Label from the launch options
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn read(&mut self, stream: StreamKind, buf: &mut [u8]) -> ReadOutcome {
        self.backend.read(stream, buf)
    }

    pub fn read_stdout(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.read(StreamKind::Stdout, buf)
    }

    pub fn read_stderr(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.read(StreamKind::Stderr, buf)
    }

    /// Probe liveness without waiting; the first exit observed is cached
    pub fn liveness(&mut self) -> Liveness {
        if self.liveness.is_running() {
            let probe = self.backend.try_wait();
            if let Some(status) = probe {
                debug!("[{}] pid {} exited with {}", self.id, self.pid, status.code);
            }
            self.liveness.observe(probe);
        }
        self.liveness
    }

    pub fn is_running(&mut self) -> bool {
        self.liveness().is_running()
    }

    /// Exit status once the process has been seen to exit
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        self.liveness().exit_status()
    }

    /// Request termination; poll liveness to observe it
    pub fn kill(&mut self) {
        if self.liveness.is_running() {
            info!("[{}] terminating pid {}", self.id, self.pid);
            self.backend.terminate();
        }
    }

    /// Release all OS resources held for the process
    pub fn dispose(mut self) {
        info!("[{}] disposing pid {}", self.id, self.pid);
        self.backend.release();
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("id", &self.id)
            .field("pid", &self.pid)
            .field("liveness", &self.liveness)
            .finish()
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.backend.release();
    }
}
