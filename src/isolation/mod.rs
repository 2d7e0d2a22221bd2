//! Isolation layer: bubblewrap sandbox profile
//!
//! On Linux a sandboxed launch runs the command under `bwrap` with a fixed
//! read-only profile. Other platforms fall back to unsandboxed execution;
//! [`sandbox_supported`] reports which case applies.
//!
//! # Examples
//!
//! ```
//! use workspace_proc::isolation::sandbox_argv;
//!
//! let argv = sandbox_argv(&["ls".to_string()], None);
//! assert_eq!(argv[0], "bwrap");
//! ```

pub mod bwrap;
pub mod capabilities;

pub use bwrap::{sandbox_argv, BwrapProfile, BWRAP_PROGRAM};
pub use capabilities::{sandbox_supported, SystemCapabilities};
