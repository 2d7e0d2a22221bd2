//! Handle arena
//!
//! Callers across a language boundary never hold a [`ProcessHandle`]
//! directly; they receive a [`HandleId`] and pass it back for every
//! operation. Ids are never reused, so a disposed id is reported as
//! [`ProcError::UnknownHandle`] instead of reaching another process.

use std::collections::HashMap;
use std::fmt;

use log::warn;

use crate::config::LaunchOptions;
use crate::errors::{ProcError, Result};
use crate::execution::{ProcessHandle, ReadOutcome, StreamKind};
use crate::monitoring::Liveness;

/// Stable identifier of a launched process; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Rebuild an id received from a caller; zero is never valid
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every live [`ProcessHandle`] by id
#[derive(Debug)]
pub struct Supervisor {
    handles: HashMap<HandleId, ProcessHandle>,
    next_id: u64,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            next_id: 1,
        }
    }

    /// Launch a process; on failure nothing is registered
    pub fn start(&mut self, options: &LaunchOptions) -> Result<HandleId> {
        let handle = ProcessHandle::start(options)?;
        let id = HandleId(self.next_id);
        self.next_id += 1;
        self.handles.insert(id, handle);
        Ok(id)
    }

    /// Like [`Supervisor::start`], but logs and swallows the reason
    pub fn try_start(&mut self, options: &LaunchOptions) -> Option<HandleId> {
        match self.start(options) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("[{}] no handle: {}", options.id, e);
                None
            }
        }
    }

    fn handle_mut(&mut self, id: HandleId) -> Result<&mut ProcessHandle> {
        self.handles
            .get_mut(&id)
            .ok_or(ProcError::UnknownHandle(id.0))
    }

    /// Borrow a handle for direct use
    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut ProcessHandle> {
        self.handles.get_mut(&id)
    }

    pub fn read(&mut self, id: HandleId, stream: StreamKind, buf: &mut [u8]) -> Result<ReadOutcome> {
        Ok(self.handle_mut(id)?.read(stream, buf))
    }

    pub fn read_stdout(&mut self, id: HandleId, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.read(id, StreamKind::Stdout, buf)
    }

    pub fn read_stderr(&mut self, id: HandleId, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.read(id, StreamKind::Stderr, buf)
    }

    /// `(alive, exit_code)`; the code is present only once not alive
    pub fn is_running(&mut self, id: HandleId) -> Result<(bool, Option<i32>)> {
        Ok(match self.handle_mut(id)?.liveness() {
            Liveness::Running => (true, None),
            Liveness::Exited(status) => (false, Some(status.code)),
        })
    }

    pub fn kill(&mut self, id: HandleId) -> Result<()> {
        self.handle_mut(id)?.kill();
        Ok(())
    }

    /// Remove and release a handle; its id is dead afterwards
    pub fn dispose(&mut self, id: HandleId) -> Result<()> {
        let handle = self
            .handles
            .remove(&id)
            .ok_or(ProcError::UnknownHandle(id.0))?;
        handle.dispose();
        Ok(())
    }

    /// Number of handles not yet disposed
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
