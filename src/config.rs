//! Launch configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ProcError, Result};

/// Options for starting one process
///
/// Only `command_line` is required; a JSON document such as
/// `{"command_line": "make test", "sandbox": true}` is a complete
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Full command line, tokenized with shell-like quoting
    pub command_line: String,
    /// Working directory; inherits the caller's when absent
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    /// Run under the platform sandbox when one is available
    #[serde(default)]
    pub sandbox: bool,
    /// Caller-chosen label used in log lines
    #[serde(default)]
    pub id: String,
}

impl LaunchOptions {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            ..Default::default()
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Working directory, treating an empty path as absent
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Parse options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ProcError::InvalidConfig(e.to_string()))
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .map_err(|e| ProcError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builder_sets_fields() {
        let opts = LaunchOptions::new("ls -la")
            .cwd("/tmp")
            .sandbox(true)
            .id("ws-1");

        assert_eq!(opts.command_line, "ls -la");
        assert_eq!(opts.working_dir(), Some(Path::new("/tmp")));
        assert!(opts.sandbox);
        assert_eq!(opts.id, "ws-1");
    }

    #[test]
    fn empty_cwd_counts_as_absent() {
        let opts = LaunchOptions::new("ls").cwd("");
        assert!(opts.working_dir().is_none());
    }

    #[test]
    fn json_with_only_command_line() {
        let opts = LaunchOptions::from_json_str(r#"{"command_line": "echo hi"}"#).unwrap();
        assert_eq!(opts, LaunchOptions::new("echo hi"));
    }

    #[test]
    fn json_with_all_fields() {
        let opts = LaunchOptions::from_json_str(
            r#"{"command_line": "make", "cwd": "/src", "sandbox": true, "id": "build"}"#,
        )
        .unwrap();
        assert_eq!(opts.working_dir(), Some(Path::new("/src")));
        assert!(opts.sandbox);
        assert_eq!(opts.id, "build");
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = LaunchOptions::from_json_str(r#"{"sandbox": true}"#).unwrap_err();
        assert!(matches!(err, ProcError::InvalidConfig(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"command_line": "true", "id": "from-file"}}"#).unwrap();

        let opts = LaunchOptions::from_json_file(file.path()).unwrap();
        assert_eq!(opts.id, "from-file");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LaunchOptions::from_json_file(Path::new("/no/such/options.json")).unwrap_err();
        assert!(matches!(err, ProcError::Io(_)));
    }
}
