use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::platform::{HostPlatform, default_tools_dir, resolve_executable_path};

/// Overrides the tools directory
pub const ENV_TOOLS_DIR: &str = "PLATFORM_TOOLS_DIR";
/// Overrides the executable path outright
pub const ENV_EXECUTABLE: &str = "PLATFORM_TOOLS_ADB";
/// Initial device selection, same variable the bridge itself honours
pub const ENV_SERIAL: &str = "ANDROID_SERIAL";

/// Runner configuration, loaded from TOML and environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory holding the `win32`, `darwin` and `linux` subfolders
    pub tools_dir: Option<PathBuf>,
    /// Explicit executable, bypassing platform resolution
    pub executable: Option<PathBuf>,
    /// Serial of the device to target
    pub device: Option<String>,
    /// Platform tag override (`win32`, `darwin`, `linux`) used to pick the
    /// executable; word splitting still follows the host
    pub platform: Option<String>,
}

impl RunnerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> BridgeResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| BridgeError::config(format!("cannot write {}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> BridgeResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored
    pub fn apply_env_from<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        self.merge(RunnerConfig {
            tools_dir: var(ENV_TOOLS_DIR).map(PathBuf::from),
            executable: var(ENV_EXECUTABLE).map(PathBuf::from),
            device: var(ENV_SERIAL),
            platform: None,
        })
    }

    /// Overlay `other` on top of `self`; set fields in `other` win
    pub fn merge(self, other: RunnerConfig) -> Self {
        Self {
            tools_dir: other.tools_dir.or(self.tools_dir),
            executable: other.executable.or(self.executable),
            device: other.device.or(self.device),
            platform: other.platform.or(self.platform),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(ref exe) = self.executable {
            if exe.as_os_str().is_empty() {
                errors.push("Executable path must not be empty".to_string());
            }
        }

        if let Some(ref dir) = self.tools_dir {
            if dir.as_os_str().is_empty() {
                errors.push("Tools directory must not be empty".to_string());
            }
        }

        if let Some(ref tag) = self.platform {
            if HostPlatform::parse_tag(tag).is_none() {
                errors.push(format!("Unknown platform tag: {}", tag));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Platform to resolve for, defaulting to the compile-time host
    pub fn host_platform(&self) -> HostPlatform {
        self.platform
            .as_deref()
            .map(HostPlatform::from_tag)
            .unwrap_or_else(HostPlatform::current)
    }

    /// Executable path this configuration selects
    pub fn resolve_executable(&self) -> PathBuf {
        if let Some(ref exe) = self.executable {
            return exe.clone();
        }
        let tools_dir = self.tools_dir.clone().unwrap_or_else(default_tools_dir);
        resolve_executable_path(&tools_dir, self.host_platform())
    }

    /// Generate a sample configuration file content
    pub fn generate_sample_config() -> String {
        let sample = RunnerConfig {
            tools_dir: Some(default_tools_dir()),
            executable: None,
            device: None,
            platform: Some(HostPlatform::current().tag().to_string()),
        };
        toml::to_string_pretty(&sample).unwrap_or_else(|_| {
            "# Failed to generate sample configuration".to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host_platform(), HostPlatform::current());
        assert!(config.resolve_executable().ends_with(HostPlatform::current().executable_name()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = RunnerConfig::from_toml_str("device = \"emulator-5556\"\n").unwrap();
        assert_eq!(config.device.as_deref(), Some("emulator-5556"));
        assert!(config.tools_dir.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RunnerConfig::from_toml_str("device = ").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_config_file_operations() {
        let config = RunnerConfig {
            tools_dir: Some(PathBuf::from("/opt/platform-tools")),
            device: Some("ABC123".to_string()),
            ..Default::default()
        };

        let file = NamedTempFile::new().unwrap();
        config.save_to_file(file.path()).unwrap();
        let loaded = RunnerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = RunnerConfig::load_from_file("/nonexistent/platform-tools.toml").unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SERIAL, "from-env"),
            (ENV_EXECUTABLE, "  "),
        ]
        .into_iter()
        .collect();

        let config = RunnerConfig {
            device: Some("from-file".to_string()),
            executable: Some(PathBuf::from("/file/adb")),
            ..Default::default()
        }
        .apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.device.as_deref(), Some("from-env"));
        // Blank values do not clobber the file setting
        assert_eq!(config.executable, Some(PathBuf::from("/file/adb")));
    }

    #[test]
    fn test_validation_errors() {
        let config = RunnerConfig {
            executable: Some(PathBuf::new()),
            platform: Some("plan9".to_string()),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_with_platform_override() {
        let config = RunnerConfig {
            tools_dir: Some(PathBuf::from("/opt/pt")),
            platform: Some("win32".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_executable(), PathBuf::from("/opt/pt/win32/adb.exe"));
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = RunnerConfig::generate_sample_config();
        let parsed = RunnerConfig::from_toml_str(&sample).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
