//! POSIX process launcher
//!
//! `fork` + `execvp` with an extra close-on-exec status pipe. The child
//! writes an 8-byte `(stage, errno)` record to the pipe only if a step
//! before or including `exec` fails; a successful `exec` closes the pipe, so
//! the parent's read returns end-of-stream. Either way the read completes as
//! soon as the child execs or exits.
//!
//! Every pipe is created close-on-exec so concurrent launches from other
//! threads never inherit each other's descriptors.

use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

use crate::errors::{ProcError, Result};
use crate::execution::backend::ProcessBackend;
use crate::execution::stream::{OutputStream, ReadOutcome, StreamKind};
use crate::monitoring::ExitStatus;

const STAGE_REDIRECT: i32 = 1;
const STAGE_CHDIR: i32 = 2;
const STAGE_EXEC: i32 = 3;

/// Exit code of a child whose setup failed
const CHILD_FAILURE: i32 = 127;

/// A process started with fork/exec
#[derive(Debug)]
pub struct UnixProcess {
    pid: Pid,
    stdout: OutputStream<File>,
    stderr: OutputStream<File>,
    exit: Option<ExitStatus>,
}

/// Everything the child touches between fork and exec, prepared up front so
/// the child only makes async-signal-safe calls.
struct ChildSetup<'a> {
    argv: &'a [*const libc::c_char],
    cwd: Option<&'a CStr>,
    stdout_fd: RawFd,
    stderr_fd: RawFd,
    status_fd: RawFd,
}

impl UnixProcess {
    /// Fork and exec `argv`, optionally inside `cwd`
    pub fn launch(argv: &[String], cwd: Option<&Path>) -> Result<Self> {
        let program = argv.first().ok_or(ProcError::EmptyCommand)?.clone();

        let c_args = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| ProcError::InvalidArgument(format!("nul byte in {:?}", arg)))
            })
            .collect::<Result<Vec<CString>>>()?;
        let mut arg_ptrs: Vec<*const libc::c_char> = c_args.iter().map(|a| a.as_ptr()).collect();
        arg_ptrs.push(std::ptr::null());

        let c_cwd = cwd
            .map(|dir| {
                CString::new(dir.as_os_str().as_bytes()).map_err(|_| {
                    ProcError::InvalidArgument(format!("nul byte in {}", dir.display()))
                })
            })
            .transpose()?;

        let (stdout_read, stdout_write) = cloexec_pipe()?;
        let (stderr_read, stderr_write) = cloexec_pipe()?;
        let (status_read, status_write) = cloexec_pipe()?;

        let setup = ChildSetup {
            argv: &arg_ptrs,
            cwd: c_cwd.as_deref(),
            stdout_fd: stdout_write.as_raw_fd(),
            stderr_fd: stderr_write.as_raw_fd(),
            status_fd: status_write.as_raw_fd(),
        };

        // SAFETY: the child branch only calls async-signal-safe libc functions
        // on data prepared above, then execs or _exits.
        let pid = match unsafe { fork() } {
            Ok(ForkResult::Child) => unsafe { run_child(&setup) },
            Ok(ForkResult::Parent { child }) => child,
            Err(e) => return Err(ProcError::Spawn(format!("fork failed: {}", e))),
        };

        // Parent keeps only the read ends; the status read below relies on
        // no write end surviving here.
        drop(stdout_write);
        drop(stderr_write);
        drop(status_write);

        match read_status(status_read) {
            Ok(None) => {}
            Ok(Some((stage, errno))) => {
                reap_blocking(pid);
                return Err(match stage {
                    STAGE_REDIRECT => ProcError::Redirect { errno },
                    STAGE_CHDIR => ProcError::WorkingDirectory {
                        path: cwd.map(|d| d.display().to_string()).unwrap_or_default(),
                        errno,
                    },
                    _ => ProcError::Exec { program, errno },
                });
            }
            Err(e) => {
                let _ = kill(pid, Signal::SIGKILL);
                reap_blocking(pid);
                return Err(ProcError::Io(e));
            }
        }

        if let Err(e) = set_nonblocking(&stdout_read).and_then(|_| set_nonblocking(&stderr_read)) {
            let _ = kill(pid, Signal::SIGKILL);
            reap_blocking(pid);
            return Err(ProcError::Io(e));
        }

        debug!("launched {} as pid {}", program, pid);

        Ok(Self {
            pid,
            stdout: OutputStream::new(StreamKind::Stdout, File::from(stdout_read)),
            stderr: OutputStream::new(StreamKind::Stderr, File::from(stderr_read)),
            exit: None,
        })
    }

    fn stream(&mut self, kind: StreamKind) -> &mut OutputStream<File> {
        match kind {
            StreamKind::Stdout => &mut self.stdout,
            StreamKind::Stderr => &mut self.stderr,
        }
    }
}

impl ProcessBackend for UnixProcess {
    fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    fn read(&mut self, stream: StreamKind, buf: &mut [u8]) -> ReadOutcome {
        self.stream(stream).read(buf)
    }

    fn try_wait(&mut self) -> Option<ExitStatus> {
        if self.exit.is_some() {
            return self.exit;
        }

        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => self.exit = Some(ExitStatus::exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                self.exit = Some(ExitStatus::signaled(signal as i32))
            }
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => {
                // Someone else reaped the child; the code is lost.
                warn!("waitpid({}) failed: {}", self.pid, e);
                self.exit = Some(ExitStatus::exited(-1));
            }
        }

        self.exit
    }

    fn terminate(&mut self) {
        // A reaped pid may already belong to another process.
        if self.exit.is_some() {
            return;
        }
        if let Err(e) = kill(self.pid, Signal::SIGTERM) {
            debug!("SIGTERM to {} failed: {}", self.pid, e);
        }
    }

    fn release(&mut self) {
        self.stdout.close();
        self.stderr.close();

        if self.try_wait().is_none() {
            let _ = kill(self.pid, Signal::SIGKILL);
            self.exit = reap_blocking(self.pid).or(Some(ExitStatus::signaled(libc::SIGKILL)));
        }
    }
}

impl Drop for UnixProcess {
    fn drop(&mut self) {
        self.release();
    }
}

/// Create a pipe whose both ends are close-on-exec and above the stdio range
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd)> {
    let (read, write) = raw_pipe().map_err(|e| ProcError::Pipe(e.to_string()))?;
    Ok((lift_above_stdio(read)?, lift_above_stdio(write)?))
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn raw_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(OFlag::O_CLOEXEC)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn raw_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::FdFlag;

    let (read, write) = nix::unistd::pipe()?;
    fcntl(read.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    fcntl(write.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok((read, write))
}

/// Move a descriptor out of 0..=2 so redirecting stdio in the child cannot
/// clobber it.
fn lift_above_stdio(fd: OwnedFd) -> Result<OwnedFd> {
    if fd.as_raw_fd() > libc::STDERR_FILENO {
        return Ok(fd);
    }
    let raw = fcntl(fd.as_raw_fd(), FcntlArg::F_DUPFD_CLOEXEC(libc::STDERR_FILENO + 1))
        .map_err(|e| ProcError::Pipe(e.to_string()))?;
    // SAFETY: F_DUPFD_CLOEXEC returned a fresh descriptor we now own.
    Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

fn set_nonblocking(fd: &OwnedFd) -> io::Result<()> {
    let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Read the child's setup record; `None` means exec succeeded
fn read_status(fd: OwnedFd) -> io::Result<Option<(i32, i32)>> {
    let mut file = File::from(fd);
    let mut record = [0u8; 8];
    let mut filled = 0;

    while filled < record.len() {
        match file.read(&mut record[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if filled == 0 {
        return Ok(None);
    }
    if filled < record.len() {
        return Ok(Some((STAGE_EXEC, 0)));
    }

    let mut stage = [0u8; 4];
    let mut errno = [0u8; 4];
    stage.copy_from_slice(&record[..4]);
    errno.copy_from_slice(&record[4..]);
    Ok(Some((i32::from_ne_bytes(stage), i32::from_ne_bytes(errno))))
}

/// Wait for `pid` to exit, retrying on EINTR
fn reap_blocking(pid: Pid) -> Option<ExitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Some(ExitStatus::exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Some(ExitStatus::signaled(signal as i32))
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => {
                warn!("waitpid({}) failed: {}", pid, e);
                return None;
            }
        }
    }
}

/// Child side of the fork. Never returns.
unsafe fn run_child(setup: &ChildSetup<'_>) -> ! {
    if redirect(setup.stdout_fd, libc::STDOUT_FILENO).is_err()
        || redirect(setup.stderr_fd, libc::STDERR_FILENO).is_err()
    {
        report_failure(setup.status_fd, STAGE_REDIRECT);
    }

    if let Some(dir) = setup.cwd {
        if libc::chdir(dir.as_ptr()) == -1 {
            report_failure(setup.status_fd, STAGE_CHDIR);
        }
    }

    libc::execvp(setup.argv[0], setup.argv.as_ptr());
    report_failure(setup.status_fd, STAGE_EXEC)
}

unsafe fn redirect(fd: RawFd, target: RawFd) -> std::result::Result<(), ()> {
    if libc::dup2(fd, target) == -1 {
        return Err(());
    }
    Ok(())
}

unsafe fn report_failure(status_fd: RawFd, stage: i32) -> ! {
    let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
    let mut record = [0u8; 8];
    record[..4].copy_from_slice(&stage.to_ne_bytes());
    record[4..].copy_from_slice(&errno.to_ne_bytes());
    libc::write(status_fd, record.as_ptr() as *const libc::c_void, record.len());
    libc::_exit(CHILD_FAILURE)
}
