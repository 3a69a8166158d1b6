// Host platform tags and vendored executable resolution
//
// The bridge ships one binary per host family. Which one is used depends only on
// the platform tag; nothing is detected at runtime and the path is not checked for
// existence until a process is actually spawned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the vendored bridge executable
pub const BRIDGE_EXECUTABLE: &str = "adb";

/// Directory, next to the running binary, that holds the vendored tools
pub const TOOLS_DIR_NAME: &str = "platform-tools";

/// Host platform families with their own vendored binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostPlatform {
    Windows,
    MacOS,
    Other,
}

impl HostPlatform {
    /// Platform this crate was compiled for
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return HostPlatform::Windows;

        #[cfg(target_os = "macos")]
        return HostPlatform::MacOS;

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return HostPlatform::Other;
    }

    /// Map a platform tag, treating anything unrecognised as generic Unix
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_tag(tag).unwrap_or(HostPlatform::Other)
    }

    /// Strict variant of [`HostPlatform::from_tag`] used for validating config
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "win32" | "windows" => Some(HostPlatform::Windows),
            "darwin" | "macos" => Some(HostPlatform::MacOS),
            "linux" | "unix" | "other" => Some(HostPlatform::Other),
            _ => None,
        }
    }

    /// Canonical tag, which is also the vendored subdirectory name
    pub fn tag(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "win32",
            HostPlatform::MacOS => "darwin",
            HostPlatform::Other => "linux",
        }
    }

    pub fn executable_name(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "adb.exe",
            _ => BRIDGE_EXECUTABLE,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Path of the vendored executable for `platform` beneath `tools_dir`.
///
/// Relative directories are made absolute against the current working directory.
pub fn resolve_executable_path(tools_dir: &Path, platform: HostPlatform) -> PathBuf {
    let base = std::path::absolute(tools_dir).unwrap_or_else(|_| tools_dir.to_path_buf());
    base.join(platform.tag()).join(platform.executable_name())
}

/// Default tools directory: `platform-tools` beside the running executable
pub fn default_tools_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join(TOOLS_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(TOOLS_DIR_NAME)),
        Err(e) => {
            log::warn!("Could not locate running executable ({}), using ./{}", e, TOOLS_DIR_NAME);
            PathBuf::from(TOOLS_DIR_NAME)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_resolve_per_platform() {
        let base = Path::new("/opt/tools");
        assert_eq!(
            resolve_executable_path(base, HostPlatform::Windows),
            PathBuf::from("/opt/tools/win32/adb.exe")
        );
        assert_eq!(
            resolve_executable_path(base, HostPlatform::MacOS),
            PathBuf::from("/opt/tools/darwin/adb")
        );
        assert_eq!(
            resolve_executable_path(base, HostPlatform::Other),
            PathBuf::from("/opt/tools/linux/adb")
        );
    }

    #[test]
    fn test_relative_dir_becomes_absolute() {
        let path = resolve_executable_path(Path::new("vendor"), HostPlatform::Other);
        assert!(path.is_absolute());
        assert!(path.ends_with("vendor/linux/adb"));
    }

    #[test]
    fn test_tags() {
        assert_eq!(HostPlatform::from_tag("win32"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_tag("darwin"), HostPlatform::MacOS);
        assert_eq!(HostPlatform::from_tag("freebsd"), HostPlatform::Other);
        assert_eq!(HostPlatform::parse_tag("freebsd"), None);
        assert_eq!(HostPlatform::parse_tag(" Windows "), Some(HostPlatform::Windows));
        assert_eq!(HostPlatform::MacOS.to_string(), "darwin");
    }

    #[test]
    fn test_current_platform() {
        let current = HostPlatform::current();
        assert_eq!(current.is_windows(), cfg!(target_os = "windows"));
        assert_eq!(HostPlatform::from_tag(current.tag()), current);
    }

    #[test]
    fn test_default_tools_dir() {
        assert!(default_tools_dir().ends_with(TOOLS_DIR_NAME));
    }
}
