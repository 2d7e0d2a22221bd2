//! C ABI for foreign callers
//!
//! Handles are plain `u64` ids from a process-wide [`Supervisor`]; `0` means
//! "no handle". Strings are UTF-8, owned by the caller and not retained past
//! the call. Using an id after `workspace_free_handle` is harmless: reads
//! report end-of-stream and the process reports not running with code -1.

use std::ffi::{c_char, c_int, CStr};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

use log::warn;

use crate::config::LaunchOptions;
use crate::controller::{HandleId, Supervisor};
use crate::execution::{ReadOutcome, StreamKind};

/// Launch options as laid out by C callers
#[repr(C)]
pub struct WorkspaceOptions {
    /// Full command line (required)
    pub command_line: *const c_char,
    /// Working directory, or null
    pub cwd: *const c_char,
    /// Request sandboxing where supported
    pub sandbox: bool,
    /// Label for log lines, or null
    pub id: *const c_char,
}

fn supervisor() -> MutexGuard<'static, Supervisor> {
    static SUPERVISOR: OnceLock<Mutex<Supervisor>> = OnceLock::new();
    SUPERVISOR
        .get_or_init(|| Mutex::new(Supervisor::new()))
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

/// Copy an optional C string; `Err` on invalid UTF-8
unsafe fn optional_str(ptr: *const c_char) -> Result<Option<String>, ()> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|_| ())
}

unsafe fn options_from_c(options: &WorkspaceOptions) -> Result<LaunchOptions, ()> {
    let command_line = optional_str(options.command_line)?.ok_or(())?;
    let cwd = optional_str(options.cwd)?.filter(|dir| !dir.is_empty());
    let id = optional_str(options.id)?.unwrap_or_default();

    Ok(LaunchOptions {
        command_line,
        cwd: cwd.map(PathBuf::from),
        sandbox: options.sandbox,
        id,
    })
}

/// Start a process. Returns its handle, or 0 if it could not be started.
///
/// # Safety
///
/// `options` must be null or point to a valid [`WorkspaceOptions`] whose
/// non-null strings are NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn workspace_start(options: *const WorkspaceOptions) -> u64 {
    let Some(options) = options.as_ref() else {
        return 0;
    };
    let Ok(options) = options_from_c(options) else {
        warn!("workspace_start: missing command line or invalid UTF-8");
        return 0;
    };

    supervisor()
        .try_start(&options)
        .map(|id| id.as_u64())
        .unwrap_or(0)
}

unsafe fn read_stream(handle: u64, stream: StreamKind, buffer: *mut c_char, size: c_int) -> c_int {
    if buffer.is_null() || size <= 0 {
        return ReadOutcome::WouldBlock.as_raw();
    }
    let Some(id) = HandleId::from_raw(handle) else {
        return ReadOutcome::EndOfStream.as_raw();
    };

    let buf = std::slice::from_raw_parts_mut(buffer as *mut u8, size as usize);
    supervisor()
        .read(id, stream, buf)
        .unwrap_or(ReadOutcome::EndOfStream)
        .as_raw()
}

/// Read available stdout bytes: `>0` count, `0` end-of-stream, `-1` none yet.
///
/// # Safety
///
/// `buffer` must be valid for writes of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn workspace_read_stdout(handle: u64, buffer: *mut c_char, size: c_int) -> c_int {
    read_stream(handle, StreamKind::Stdout, buffer, size)
}

/// Same as [`workspace_read_stdout`] for stderr.
///
/// # Safety
///
/// `buffer` must be valid for writes of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn workspace_read_stderr(handle: u64, buffer: *mut c_char, size: c_int) -> c_int {
    read_stream(handle, StreamKind::Stderr, buffer, size)
}

/// Returns 1 while the process runs, 0 once it has exited. When 0 and
/// `exit_code` is non-null, the exit code is written there.
///
/// # Safety
///
/// `exit_code` must be null or valid for a write of one `c_int`.
#[no_mangle]
pub unsafe extern "C" fn workspace_is_running(handle: u64, exit_code: *mut c_int) -> c_int {
    let probe = HandleId::from_raw(handle).and_then(|id| supervisor().is_running(id).ok());

    let (alive, code) = probe.unwrap_or((false, Some(-1)));
    if alive {
        return 1;
    }
    if let Some(out) = exit_code.as_mut() {
        *out = code.unwrap_or(-1);
    }
    0
}

/// Ask the process to terminate. Does not wait.
#[no_mangle]
pub extern "C" fn workspace_kill(handle: u64) {
    if let Some(id) = HandleId::from_raw(handle) {
        let _ = supervisor().kill(id);
    }
}

/// Release every resource held for `handle`.
#[no_mangle]
pub extern "C" fn workspace_free_handle(handle: u64) {
    if let Some(id) = HandleId::from_raw(handle) {
        let _ = supervisor().dispose(id);
    }
}
