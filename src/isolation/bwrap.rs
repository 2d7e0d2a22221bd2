//! Bubblewrap sandbox profile
//!
//! Wraps an argument vector in a fixed, default-deny `bwrap` invocation:
//! every namespace except the network is unshared, all capabilities are
//! dropped, the root filesystem is read-only, and only the working directory
//! (when given) is writable.

use std::path::Path;

/// Sandbox wrapper executable, resolved through `PATH`
pub const BWRAP_PROGRAM: &str = "bwrap";

/// Builds `bwrap` argument vectors
#[derive(Debug, Default)]
pub struct BwrapProfile {
    args: Vec<String>,
}

impl BwrapProfile {
    /// Start from the fixed base profile
    pub fn new() -> Self {
        let mut profile = Self { args: Vec::new() };
        profile.push_base();
        profile
    }

    fn push(&mut self, args: &[&str]) {
        self.args.extend(args.iter().map(|s| s.to_string()));
    }

    fn push_base(&mut self) {
        self.push(&[BWRAP_PROGRAM]);
        self.push(&["--unshare-all", "--share-net"]);
        self.push(&["--die-with-parent"]);
        self.push(&["--cap-drop", "ALL"]);
        self.push(&["--ro-bind", "/", "/"]);
        self.push(&["--dev-bind", "/dev", "/dev"]);
        self.push(&["--proc", "/proc"]);
        self.push(&["--tmpfs", "/tmp"]);
        // Re-asserted after the root bind so reordering rules above cannot
        // leave them writable.
        self.push(&["--ro-bind", "/usr", "/usr"]);
        self.push(&["--ro-bind", "/bin", "/bin"]);
    }

    /// Bind `cwd` read-write at its own path and start the command there
    pub fn workdir(mut self, cwd: &Path) -> Self {
        let cwd = cwd.to_string_lossy().into_owned();
        self.args.push("--bind".to_string());
        self.args.push(cwd.clone());
        self.args.push(cwd.clone());
        self.args.push("--chdir".to_string());
        self.args.push(cwd);
        self
    }

    /// Finish the profile with the wrapped command
    pub fn wrap(mut self, command: &[String]) -> Vec<String> {
        self.args.push("--".to_string());
        self.args.extend(command.iter().cloned());
        self.args
    }
}

/// Produce the sandboxed argument vector for `command`
pub fn sandbox_argv(command: &[String], cwd: Option<&Path>) -> Vec<String> {
    let profile = BwrapProfile::new();
    let profile = match cwd {
        Some(dir) => profile.workdir(dir),
        None => profile,
    };
    profile.wrap(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &[&str]) -> Vec<String> {
        cmd.iter().map(|s| s.to_string()).collect()
    }

    fn contains_seq(haystack: &[String], needle: &[&str]) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
    }

    #[test]
    fn base_profile_starts_with_bwrap() {
        let out = sandbox_argv(&argv(&["ls"]), None);
        assert_eq!(out[0], BWRAP_PROGRAM);
    }

    #[test]
    fn base_profile_rules() {
        let out = sandbox_argv(&argv(&["ls"]), None);
        assert!(contains_seq(&out, &["--unshare-all", "--share-net"]));
        assert!(contains_seq(&out, &["--die-with-parent"]));
        assert!(contains_seq(&out, &["--cap-drop", "ALL"]));
        assert!(contains_seq(&out, &["--ro-bind", "/", "/"]));
        assert!(contains_seq(&out, &["--dev-bind", "/dev", "/dev"]));
        assert!(contains_seq(&out, &["--proc", "/proc"]));
        assert!(contains_seq(&out, &["--tmpfs", "/tmp"]));
        assert!(contains_seq(&out, &["--ro-bind", "/usr", "/usr"]));
        assert!(contains_seq(&out, &["--ro-bind", "/bin", "/bin"]));
    }

    #[test]
    fn read_only_system_dirs_follow_root_bind() {
        let out = sandbox_argv(&argv(&["ls"]), None);
        let root = out.iter().position(|a| a == "/").unwrap();
        let usr = out.iter().position(|a| a == "/usr").unwrap();
        let bin = out.iter().position(|a| a == "/bin").unwrap();
        assert!(root < usr && usr < bin);
    }

    #[test]
    fn command_follows_separator() {
        let out = sandbox_argv(&argv(&["echo", "--help"]), None);
        let n = out.len();
        assert_eq!(&out[n - 3..], &["--", "echo", "--help"]);
    }

    #[test]
    fn no_bind_without_workdir() {
        let out = sandbox_argv(&argv(&["ls"]), None);
        assert!(!out.iter().any(|a| a == "--bind" || a == "--chdir"));
    }

    #[test]
    fn workdir_is_bound_and_entered() {
        let out = sandbox_argv(&argv(&["make"]), Some(Path::new("/work/space")));
        assert!(contains_seq(
            &out,
            &["--bind", "/work/space", "/work/space", "--chdir", "/work/space", "--", "make"]
        ));
    }
}
