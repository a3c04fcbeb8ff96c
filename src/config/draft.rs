//! Draft configuration loading from draft.toml
//!
//! The `[draft]` table holds the defaults applied to new sessions and budgets.
//! An optional `season_id` plus `[[pool]]` entries let the binary seed a
//! season's pool on startup:
//!
//! ```toml
//! season_id = 2026
//!
//! [draft]
//! total_points = 120
//! total_rounds = 11
//! pick_time_limit_secs = 45
//! style = "snake"
//! auto_draft = false
//!
//! [[pool]]
//! entity = "Garchomp"
//! cost = 19
//! ```

use crate::{
    core::{SeasonId, pool::NewPoolEntry, sequencer::DraftStyle},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the draft configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "draft.toml";

/// Configuration structure representing the entire draft.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftConfig {
    /// Defaults for sessions and budgets
    #[serde(default)]
    pub draft: DraftSettings,
    /// Season to seed `pool` into at startup
    pub season_id: Option<SeasonId>,
    /// Entities to seed into the pool
    #[serde(default)]
    pub pool: Vec<NewPoolEntry>,
}

/// Defaults applied when a caller does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    /// Budget cap given to every team
    pub total_points: i32,
    /// Rounds per draft
    pub total_rounds: i32,
    /// Advisory per-pick clock in seconds
    pub pick_time_limit_secs: i32,
    /// Ordering rule between rounds
    pub style: DraftStyle,
    /// Whether auto-draft is enabled on new sessions
    pub auto_draft: bool,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            total_points: 120,
            total_rounds: 11,
            pick_time_limit_secs: 45,
            style: DraftStyle::Snake,
            auto_draft: false,
        }
    }
}

impl DraftConfig {
    /// Checks ranges that TOML types cannot express.
    ///
    /// # Errors
    /// Returns `Config` for a non-positive cap, round count or pick clock, an
    /// empty or non-positive pool entry, or pool entries without a `season_id`.
    pub fn validate(&self) -> Result<()> {
        let draft = &self.draft;
        for (name, value) in [
            ("total_points", draft.total_points),
            ("total_rounds", draft.total_rounds),
            ("pick_time_limit_secs", draft.pick_time_limit_secs),
        ] {
            if value < 1 {
                return Err(Error::Config {
                    message: format!("draft.{name} must be positive, got {value}"),
                });
            }
        }

        if !self.pool.is_empty() && self.season_id.is_none() {
            return Err(Error::Config {
                message: "pool entries require a season_id".to_string(),
            });
        }
        for entry in &self.pool {
            if entry.entity.trim().is_empty() || entry.cost < 1 {
                return Err(Error::Config {
                    message: format!(
                        "invalid pool entry \"{}\" with cost {}",
                        entry.entity, entry.cost
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Loads and validates draft configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DraftConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read config file {}: {e}",
            path.as_ref().display()
        ),
    })?;

    let config: DraftConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse draft.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads draft configuration from `DRAFT_CONFIG` or `./draft.toml`.
///
/// A missing default file yields the built-in defaults; a missing file named
/// by `DRAFT_CONFIG` is an error.
pub fn load_default_config() -> Result<DraftConfig> {
    match std::env::var("DRAFT_CONFIG") {
        Ok(path) => load_config(path),
        Err(_) => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_config(path)
            } else {
                info!("No {DEFAULT_CONFIG_PATH} found, using default draft settings");
                Ok(DraftConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_draft_config() {
        let toml_str = r#"
            season_id = 2026

            [draft]
            total_points = 100
            total_rounds = 8
            style = "linear"

            [[pool]]
            entity = "Garchomp"
            cost = 19

            [[pool]]
            entity = "Pikachu"
            cost = 8
        "#;

        let config: DraftConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.season_id, Some(2026));
        assert_eq!(config.draft.total_points, 100);
        assert_eq!(config.draft.total_rounds, 8);
        assert_eq!(config.draft.style, DraftStyle::Linear);
        // Unset keys keep their defaults
        assert_eq!(config.draft.pick_time_limit_secs, 45);
        assert!(!config.draft.auto_draft);
        assert_eq!(config.pool.len(), 2);
        assert_eq!(config.pool[1].entity, "Pikachu");
        assert_eq!(config.pool[1].cost, 8);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DraftConfig = toml::from_str("").unwrap();
        assert_eq!(config.draft, DraftSettings::default());
        assert_eq!(config.draft.total_rounds, 11);
        assert_eq!(config.draft.total_points, 120);
        assert!(config.pool.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let config: DraftConfig = toml::from_str("[draft]\ntotal_rounds = 0").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config: DraftConfig = toml::from_str("[[pool]]\nentity = \"Eevee\"\ncost = 5").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config: DraftConfig =
            toml::from_str("season_id = 1\n[[pool]]\nentity = \"Eevee\"\ncost = 0").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_unknown_style_fails_to_parse() {
        let result: std::result::Result<DraftConfig, _> =
            toml::from_str("[draft]\nstyle = \"random\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
