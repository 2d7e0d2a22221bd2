//! Error types for process supervision

use std::io;
use thiserror::Error;

/// Result type for supervisor operations
pub type Result<T> = std::result::Result<T, ProcError>;

/// Errors that can occur while launching or addressing a process
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Command line is empty")]
    EmptyCommand,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Pipe creation failed: {0}")]
    Pipe(String),

    #[error("Process creation failed: {0}")]
    Spawn(String),

    #[error("Failed to execute {program}: {}", describe_errno(.errno))]
    Exec { program: String, errno: i32 },

    #[error("Failed to enter working directory {path}: {}", describe_errno(.errno))]
    WorkingDirectory { path: String, errno: i32 },

    #[error("Failed to redirect output streams: {}", describe_errno(.errno))]
    Redirect { errno: i32 },

    #[error("Unknown process handle: {0}")]
    UnknownHandle(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProcError {
    /// True for failures that happened after the child process existed
    pub fn is_post_fork(&self) -> bool {
        matches!(
            self,
            ProcError::Exec { .. } | ProcError::WorkingDirectory { .. } | ProcError::Redirect { .. }
        )
    }
}

fn describe_errno(errno: &i32) -> String {
    io::Error::from_raw_os_error(*errno).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProcError::EmptyCommand;
        assert_eq!(err.to_string(), "Command line is empty");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ProcError::from(io_err);
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn exec_error_names_program() {
        let err = ProcError::Exec {
            program: "missing-tool".to_string(),
            errno: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("missing-tool"));
        assert!(err.is_post_fork());
    }

    #[test]
    fn working_directory_error_names_path() {
        let err = ProcError::WorkingDirectory {
            path: "/nowhere".to_string(),
            errno: 2,
        };
        assert!(err.to_string().contains("/nowhere"));
        assert!(err.is_post_fork());
    }

    #[test]
    fn pre_fork_errors_are_not_post_fork() {
        assert!(!ProcError::EmptyCommand.is_post_fork());
        assert!(!ProcError::Pipe("EMFILE".to_string()).is_post_fork());
        assert!(!ProcError::UnknownHandle(3).is_post_fork());
    }
}
