//! Non-blocking stream handling for process output

use std::fmt;
use std::io::{self, Read};

use log::warn;

/// Which output stream of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Result of a single non-blocking read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` bytes were copied into the buffer
    Data(usize),
    /// The stream is closed and fully drained; permanent
    EndOfStream,
    /// Nothing available right now
    WouldBlock,
}

impl ReadOutcome {
    /// Encode as `>0` bytes, `0` end-of-stream, `-1` would-block
    pub fn as_raw(&self) -> i32 {
        match self {
            ReadOutcome::Data(n) => i32::try_from(*n).unwrap_or(i32::MAX),
            ReadOutcome::EndOfStream => 0,
            ReadOutcome::WouldBlock => -1,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}

/// One captured output stream
///
/// `R` must be a non-blocking reader: it reports "no data yet" as
/// [`io::ErrorKind::WouldBlock`] and closure as `Ok(0)`. The reader is
/// dropped as soon as end-of-stream is seen.
pub struct OutputStream<R> {
    kind: StreamKind,
    reader: Option<R>,
}

impl<R: Read> OutputStream<R> {
    pub fn new(kind: StreamKind, reader: R) -> Self {
        Self {
            kind,
            reader: Some(reader),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Whether end-of-stream has been reported
    pub fn is_finished(&self) -> bool {
        self.reader.is_none()
    }

    /// Read whatever is available without waiting
    pub fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let Some(reader) = self.reader.as_mut() else {
            return ReadOutcome::EndOfStream;
        };

        // A zero-length read cannot tell closure from an empty buffer.
        if buf.is_empty() {
            return ReadOutcome::WouldBlock;
        }

        loop {
            match reader.read(buf) {
                Ok(0) => {
                    self.reader = None;
                    return ReadOutcome::EndOfStream;
                }
                Ok(n) => return ReadOutcome::Data(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return ReadOutcome::WouldBlock,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("{} read failed, treating as closed: {}", self.kind, e);
                    self.reader = None;
                    return ReadOutcome::EndOfStream;
                }
            }
        }
    }

    /// Close the underlying descriptor
    pub fn close(&mut self) {
        self.reader = None;
    }
}

impl<R> fmt::Debug for OutputStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream")
            .field("kind", &self.kind)
            .field("finished", &self.reader.is_none())
            .finish()
    }
}
