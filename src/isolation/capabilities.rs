//! Runtime detection of sandbox support
//!
//! Sandboxing is best-effort: where the platform has no supported primitive
//! a sandbox request silently runs the command unsandboxed. These probes let
//! callers and tests observe that degradation directly.

use std::path::PathBuf;

use crate::isolation::bwrap::BWRAP_PROGRAM;
use crate::utils;

/// Whether a `sandbox` request is honoured on this platform
pub fn sandbox_supported() -> bool {
    cfg!(target_os = "linux")
}

/// Detected system capabilities for sandboxing
#[derive(Debug, Clone)]
pub struct SystemCapabilities {
    /// Platform has a sandbox primitive the launcher uses
    pub sandbox_supported: bool,
    /// Location of the bubblewrap executable, if found on PATH
    pub bwrap_path: Option<PathBuf>,
    /// Running as root (euid == 0)
    pub has_root: bool,
}

impl SystemCapabilities {
    /// Detect all available capabilities on the current system
    pub fn detect() -> Self {
        Self {
            sandbox_supported: sandbox_supported(),
            bwrap_path: utils::find_in_path(BWRAP_PROGRAM),
            has_root: utils::is_root(),
        }
    }

    /// A sandboxed launch can be expected to succeed
    pub fn can_sandbox(&self) -> bool {
        self.sandbox_supported && self.bwrap_path.is_some()
    }

    /// Get a human-readable summary of capabilities
    pub fn summary(&self) -> String {
        let check = |available: bool| if available { "[ok]" } else { "[--]" };
        let bwrap = match &self.bwrap_path {
            Some(path) => format!("{} bubblewrap ({})", check(true), path.display()),
            None => format!("{} bubblewrap", check(false)),
        };

        [
            format!(
                "{} Sandbox support on {}",
                check(self.sandbox_supported),
                std::env::consts::OS
            ),
            bwrap,
            format!("{} Root privileges", check(self.has_root)),
        ]
        .join("\n")
    }
}
