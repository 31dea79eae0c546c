//! Explicit host environment value.
//!
//! PATH-like state is carried as a value passed through provisioning steps
//! instead of mutating the process environment. Lookups go through the
//! entry list in order; persisting an entry to the host itself is the host
//! adapter's job.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct HostEnv {
    entries: Vec<PathBuf>,
}

impl HostEnv {
    /// Snapshot the search path of the current process.
    pub fn from_process() -> Self {
        let entries = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();
        Self { entries }
    }

    pub fn from_entries(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Returns an updated environment with `dir` appended to the search path.
    /// Already-listed entries are not duplicated.
    pub fn with_path_entry(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.entries.contains(&dir) {
            self.entries.push(dir);
        }
        self
    }

    /// Locate an executable on this environment's search path.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        let joined = self.joined_path()?;
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, Some(joined), cwd).ok()
    }

    /// The search path as a single string, separated with `separator`.
    /// Used when rendering cron lines, plists and `setx` arguments.
    pub fn path_string(&self, separator: char) -> String {
        self.entries
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(&separator.to_string())
    }

    fn joined_path(&self) -> Option<OsString> {
        if self.entries.is_empty() {
            return None;
        }
        env::join_paths(self.entries.iter()).ok()
    }
}

impl Default for HostEnv {
    fn default() -> Self {
        Self::from_process()
    }
}

#[allow(dead_code)]
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.is_file()
            && std::fs::metadata(path)
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_with_path_entry_appends_once() {
        let env = HostEnv::from_entries(vec![PathBuf::from("/usr/bin")]);
        let env = env.with_path_entry("/opt/cmake/bin");
        let env = env.with_path_entry("/opt/cmake/bin");
        assert_eq!(
            env.entries(),
            &[PathBuf::from("/usr/bin"), PathBuf::from("/opt/cmake/bin")]
        );
    }

    #[test]
    fn test_path_string_separator() {
        let env = HostEnv::from_entries(vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(env.path_string(':'), "/a:/b");
    }

    #[test]
    fn test_which_empty_env() {
        let env = HostEnv::from_entries(vec![]);
        assert!(env.which("sh").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_which_finds_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let expected = make_executable(tmp.path(), "mytool");

        let env = HostEnv::from_entries(vec![tmp.path().to_path_buf()]);
        assert_eq!(env.which("mytool"), Some(expected));
        assert!(env.which("othertool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_which_honors_entry_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = make_executable(first.path(), "mytool");
        make_executable(second.path(), "mytool");

        let env = HostEnv::from_entries(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(env.which("mytool"), Some(expected));
    }

    #[cfg(unix)]
    #[test]
    fn test_which_skips_non_executable() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("mytool"), "data").unwrap();

        let env = HostEnv::from_entries(vec![tmp.path().to_path_buf()]);
        assert!(env.which("mytool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = make_executable(tmp.path(), "mytool");
        let plain = tmp.path().join("plain");
        std::fs::write(&plain, "data").unwrap();

        assert!(is_executable(&exe));
        assert!(!is_executable(&plain));
        assert!(!is_executable(&tmp.path().join("missing")));
    }
}
