//! Layered configuration for lmreap
//!
//! Defaults, then an optional YAML/TOML file, then environment variables,
//! then command-line flags. The result is resolved once at startup into a
//! [`LicenseContext`].

use anyhow::Context;
use lmreap_core::{Error, LicenseContext};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// File names probed when locating the license utility
#[cfg(windows)]
const LMUTIL_NAMES: &[&str] = &["lmutil.exe"];
#[cfg(not(windows))]
const LMUTIL_NAMES: &[&str] = &["lmutil", "lmutil.exe"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Explicit license utility path; located automatically when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lmutil_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default = "default_feature")]
    pub feature: String,

    /// Where each raw status report is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,

    /// Seconds to wait before exiting on a terminal outcome
    #[serde(default)]
    pub exit_pause_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            lmutil_path: None,
            server: None,
            feature: default_feature(),
            report_path: None,
            exit_pause_secs: 0,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ReaperConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge process environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Siemens installs export the server under this name
        if let Some(val) = var("SPLM_LICENSE_SERVER") {
            self.server = Some(val);
        }

        if let Some(val) = var("LMREAP_SERVER") {
            self.server = Some(val);
        }

        if let Some(val) = var("LMREAP_LMUTIL") {
            self.lmutil_path = Some(PathBuf::from(val));
        }

        if let Some(val) = var("LMREAP_FEATURE") {
            self.feature = val;
        }

        if let Some(val) = var("LMREAP_REPORT_PATH") {
            self.report_path = Some(PathBuf::from(val));
        }

        if let Some(val) = var("LMREAP_EXIT_PAUSE_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.exit_pause_secs = secs,
                Err(_) => eprintln!(
                    "Warning: Invalid LMREAP_EXIT_PAUSE_SECS '{}', using {}",
                    val, self.exit_pause_secs
                ),
            }
        }

        if let Some(val) = var("LMREAP_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Resolve the license context used by every query and removal.
    ///
    /// Fails when the server address is missing or the license utility
    /// cannot be found.
    pub fn resolve(
        &self,
        ugii_base_dir: Option<&Path>,
        path_var: Option<&OsStr>,
    ) -> lmreap_core::Result<LicenseContext> {
        let server = self
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "license server address not set (set SPLM_LICENSE_SERVER or --server)"
                        .to_string(),
                )
            })?;

        let feature = self.feature.trim();
        if feature.is_empty() {
            return Err(Error::Config("feature name is empty".to_string()));
        }

        let lmutil_path = match &self.lmutil_path {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => {
                return Err(Error::Config(format!(
                    "lmutil not found at {}",
                    path.display()
                )));
            }
            None => locate_lmutil(ugii_base_dir, path_var).ok_or_else(|| {
                Error::Config(
                    "lmutil not found in UGII_BASE_DIR/UGFLEXLM or PATH; add its directory to PATH"
                        .to_string(),
                )
            })?,
        };

        Ok(LicenseContext::new(lmutil_path, server, feature))
    }
}

/// Find the license utility, preferring the NX install's UGFLEXLM directory
/// over `PATH`.
pub fn locate_lmutil(ugii_base_dir: Option<&Path>, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let install_dir = ugii_base_dir.map(|base| base.join("UGFLEXLM"));
    let path_dirs = path_var
        .map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .unwrap_or_default();

    install_dir
        .into_iter()
        .chain(path_dirs)
        .flat_map(|dir| LMUTIL_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

fn default_feature() -> String {
    "nx_design_token".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
