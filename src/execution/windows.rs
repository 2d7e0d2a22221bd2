//! Windows process launcher
//!
//! Creation has no separate exec step: `CreateProcess` either starts the
//! target or fails, so the launch result alone tells the two apart. Anonymous
//! pipes cannot be switched to non-blocking mode, so reads first ask
//! `PeekNamedPipe` how much is buffered and never request more than that.

use std::io::{self, Read};
use std::os::windows::io::AsRawHandle;
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};

use log::{debug, warn};
use windows::Win32::Foundation::{ERROR_BROKEN_PIPE, ERROR_DIRECTORY, HANDLE};
use windows::Win32::System::Pipes::PeekNamedPipe;

use crate::errors::{ProcError, Result};
use crate::execution::backend::ProcessBackend;
use crate::execution::stream::{OutputStream, ReadOutcome, StreamKind};
use crate::monitoring::ExitStatus;

/// Pipe reader that reports an empty pipe as `WouldBlock`
pub struct PeekingPipe<R>(R);

impl<R: Read + AsRawHandle> Read for PeekingPipe<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let handle = HANDLE(self.0.as_raw_handle() as _);
        let mut available = 0u32;

        // SAFETY: the handle stays open for as long as `self.0` lives.
        let peeked =
            unsafe { PeekNamedPipe(handle, None, 0, None, Some(&mut available), None) };

        match peeked {
            Err(e) if e.code() == ERROR_BROKEN_PIPE.to_hresult() => Ok(0),
            Err(_) => Err(io::ErrorKind::WouldBlock.into()),
            Ok(()) if available == 0 => Err(io::ErrorKind::WouldBlock.into()),
            Ok(()) => {
                let n = buf.len().min(available as usize);
                self.0.read(&mut buf[..n])
            }
        }
    }
}

/// A process started with `CreateProcess`
pub struct WindowsProcess {
    child: Child,
    stdout: OutputStream<PeekingPipe<ChildStdout>>,
    stderr: OutputStream<PeekingPipe<ChildStderr>>,
    exit: Option<ExitStatus>,
}

impl WindowsProcess {
    /// Start `argv` with piped output, optionally inside `cwd`
    pub fn launch(argv: &[String], cwd: Option<&Path>) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or(ProcError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| classify_spawn_error(e, program, cwd))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcError::Pipe("output pipes missing".to_string()));
        };

        debug!("launched {} as pid {}", program, child.id());

        Ok(Self {
            child,
            stdout: OutputStream::new(StreamKind::Stdout, PeekingPipe(stdout)),
            stderr: OutputStream::new(StreamKind::Stderr, PeekingPipe(stderr)),
            exit: None,
        })
    }
}

fn classify_spawn_error(e: io::Error, program: &str, cwd: Option<&Path>) -> ProcError {
    let errno = e.raw_os_error().unwrap_or(0);
    match cwd {
        Some(dir) if errno == ERROR_DIRECTORY.0 as i32 => ProcError::WorkingDirectory {
            path: dir.display().to_string(),
            errno,
        },
        _ if e.raw_os_error().is_some() => ProcError::Exec {
            program: program.to_string(),
            errno,
        },
        _ => ProcError::Spawn(e.to_string()),
    }
}

impl ProcessBackend for WindowsProcess {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn read(&mut self, stream: StreamKind, buf: &mut [u8]) -> ReadOutcome {
        match stream {
            StreamKind::Stdout => self.stdout.read(buf),
            StreamKind::Stderr => self.stderr.read(buf),
        }
    }

    fn try_wait(&mut self) -> Option<ExitStatus> {
        if self.exit.is_some() {
            return self.exit;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => self.exit = Some(ExitStatus::exited(status.code().unwrap_or(-1))),
            Ok(None) => {}
            Err(e) => warn!("probing pid {} failed: {}", self.child.id(), e),
        }
        self.exit
    }

    fn terminate(&mut self) {
        if self.exit.is_some() {
            return;
        }
        if let Err(e) = self.child.kill() {
            debug!("TerminateProcess on {} failed: {}", self.child.id(), e);
        }
    }

    fn release(&mut self) {
        self.stdout.close();
        self.stderr.close();

        if self.try_wait().is_none() {
            let _ = self.child.kill();
            self.exit = match self.child.wait() {
                Ok(status) => Some(ExitStatus::exited(status.code().unwrap_or(-1))),
                Err(_) => Some(ExitStatus::exited(-1)),
            };
        }
    }
}

impl Drop for WindowsProcess {
    fn drop(&mut self) {
        self.release();
    }
}
