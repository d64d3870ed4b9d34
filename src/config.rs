//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/catsel/catsel.toml`
//! 3. Local config: `.catsel.toml` next to the catalog file
//! 4. Environment variables: `CATSEL_*` prefix
//!
//! Command line flags are applied by the caller on top of the loaded settings.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::SelectionMode;
use crate::util::path::expand_path;

/// Tree rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show subtree product counts next to each category
    pub counts: bool,
    /// Show category ids next to names
    pub ids: bool,
    /// Leave disabled categories out of the rendered tree
    pub hide_disabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            counts: true,
            ids: false,
            hide_disabled: false,
        }
    }
}

/// Raw display config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub counts: Option<bool>,
    pub ids: Option<bool>,
    pub hide_disabled: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub mode: Option<SelectionMode>,
    pub resource: Option<String>,
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

impl DisplayConfig {
    fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            counts: overlay.counts.unwrap_or(self.counts),
            ids: overlay.ids.unwrap_or(self.ids),
            hide_disabled: overlay.hide_disabled.unwrap_or(self.hide_disabled),
        }
    }
}

/// Unified configuration for catsel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Selection mode (default: categories-only)
    pub mode: SelectionMode,
    /// Permission resource guarding edits (default: coupons)
    pub resource: String,
    /// Selection state file used when no `--state` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// Tree rendering options
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: SelectionMode::default(),
            resource: "coupons".into(),
            state_file: None,
            display: DisplayConfig::default(),
        }
    }
}

/// Get the XDG config directory for catsel.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "catsel").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("catsel.toml"))
}

/// Get the path to the local config file in a catalog directory.
pub fn local_config_path(catalog_dir: &Path) -> PathBuf {
    catalog_dir.join(".catsel.toml")
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

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(state_file) = &self.state_file {
            self.state_file = Some(expand_path(state_file));
        }
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            mode: overlay.mode.unwrap_or(self.mode),
            resource: overlay
                .resource
                .clone()
                .unwrap_or_else(|| self.resource.clone()),
            state_file: overlay
                .state_file
                .clone()
                .or_else(|| self.state_file.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `catalog_dir` - Optional directory holding the catalog, for local config
    pub fn load(catalog_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the catalog
        if let Some(dir) = catalog_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply CATSEL_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CATSEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        Self::apply_overrides(settings, &config)
    }

    /// Apply individual keys from an already built config source.
    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        if let Ok(val) = config.get_string("mode") {
            settings.mode = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("resource") {
            settings.resource = val;
        }
        if let Ok(val) = config.get_string("state_file") {
            settings.state_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("display.counts") {
            settings.display.counts = val;
        }
        if let Ok(val) = config.get_bool("display.ids") {
            settings.display.ids = val;
        }
        if let Ok(val) = config.get_bool("display.hide_disabled") {
            settings.display.hide_disabled = val;
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# catsel configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/catsel/catsel.toml   (your baseline)
#   Local:  <catalog_dir>/.catsel.toml     (per-catalog overrides)
#   Env:    CATSEL_* environment variables (explicit overrides, e.g. CATSEL_DISPLAY__IDS=true)
#   Flags:  --mode, --state

# Selection mode: "categories-only", "products-only" or "both"
# mode = "categories-only"

# Permission resource whose "edit" grant makes the tree editable
# resource = "coupons"

# Selection state file used when --state is not given
# state_file = "~/.local/state/catsel/selection.json"

[display]
# Show subtree product counts
# counts = true

# Show category ids next to names
# ids = false

# Leave disabled categories out of the tree
# hide_disabled = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert_eq!(settings.resource, "coupons");
        assert!(settings.display.counts);
    }

    #[test]
    fn given_tilde_in_state_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            state_file: Some(PathBuf::from("~/selection.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let state = settings.state_file.unwrap();
        assert!(
            state.to_string_lossy().starts_with(&home),
            "state_file should start with home dir: {}",
            state.display()
        );
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_inherit() {
        let base = Settings::default();
        let overlay = RawSettings {
            mode: Some(SelectionMode::Both),
            display: RawDisplayConfig {
                ids: Some(true),
                ..RawDisplayConfig::default()
            },
            ..RawSettings::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.mode, SelectionMode::Both);
        assert_eq!(result.resource, "coupons");
        assert!(result.display.ids);
        assert!(result.display.counts);
    }

    #[test]
    fn given_override_source_when_applying_then_replaces_values() {
        let config = Config::builder()
            .set_override("mode", "products-only")
            .unwrap()
            .set_override("display.counts", false)
            .unwrap()
            .build()
            .unwrap();

        let result = Settings::apply_overrides(Settings::default(), &config).unwrap();

        assert_eq!(result.mode, SelectionMode::ProductsOnly);
        assert!(!result.display.counts);
    }

    #[test]
    fn given_invalid_mode_override_when_applying_then_config_error() {
        let config = Config::builder()
            .set_override("mode", "everything")
            .unwrap()
            .build()
            .unwrap();

        let result = Settings::apply_overrides(Settings::default(), &config);

        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_through_raw() {
        let settings = Settings {
            mode: SelectionMode::Both,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("mode = \"both\""));
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(raw.mode, Some(SelectionMode::Both));
    }
}
