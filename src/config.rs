//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/socedit/socedit.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `SOCEDIT_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::plan::{DEFAULT_GLS_QUERY_FILE, DEFAULT_LDM_QUERY_FILE};

/// Unified configuration for socedit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Remote X display host; unset disables the DISPLAY entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// First argument written to every LDMSQLPlugin component
    pub ldm_query_file: String,
    /// First argument written to every GLSInitServlet component
    pub gls_query_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: None,
            ldm_query_file: DEFAULT_LDM_QUERY_FILE.into(),
            gls_query_file: DEFAULT_GLS_QUERY_FILE.into(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub display: Option<String>,
    pub ldm_query_file: Option<String>,
    pub gls_query_file: Option<String>,
}

/// Get the XDG config directory for socedit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "socedit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("socedit.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            display: overlay.display.clone().or_else(|| self.display.clone()),
            ldm_query_file: overlay
                .ldm_query_file
                .clone()
                .unwrap_or_else(|| self.ldm_query_file.clone()),
            gls_query_file: overlay
                .gls_query_file
                .clone()
                .unwrap_or_else(|| self.gls_query_file.clone()),
        }
    }

    /// Blank display strings mean "no display".
    fn normalize(mut self) -> Self {
        self.display = self
            .display
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }

    /// Set the display from the command line; `None` keeps the loaded value.
    pub fn with_display(self, display: Option<&str>) -> Self {
        match display {
            Some(d) => Self {
                display: Some(d.to_string()),
                ..self
            }
            .normalize(),
            None => self,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), config_file)
    }

    /// Load settings from explicit file locations (no XDG lookup).
    pub fn load_from(
        global_file: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        Ok(current.normalize())
    }

    /// Apply SOCEDIT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SOCEDIT").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("display") {
            settings.display = Some(val);
        }
        if let Ok(val) = config.get_string("ldm_query_file") {
            settings.ldm_query_file = val;
        }
        if let Ok(val) = config.get_string("gls_query_file") {
            settings.gls_query_file = val;
        }

        Ok(settings)
    }

    /// Render as TOML (for `--show-config`).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_overlay_when_merging_then_defaults_kept() {
        let merged = Settings::default().merge_with(&RawSettings::default());
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn given_blank_display_when_normalizing_then_unset() {
        let s = Settings {
            display: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(s.normalize().display, None);
    }

    #[test]
    fn given_cli_display_when_applying_then_overrides_loaded_value() {
        let s = Settings {
            display: Some("a".into()),
            ..Default::default()
        };
        assert_eq!(s.clone().with_display(Some("b")).display.as_deref(), Some("b"));
        assert_eq!(s.with_display(None).display.as_deref(), Some("a"));
    }
}
