use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::nutrition::DailyTargets;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Runtime settings read from the environment (and `.env`, if present).
///
/// - `DIET_DATA_DIR`: directory holding `foods.json`, `custom_meals.json` and `logs/`
/// - `DIET_USER`: whose log to use when no user is given explicitly
/// - `DIET_TARGET_KCAL`, `DIET_TARGET_PROTEIN`, `DIET_TARGET_CARBS`, `DIET_TARGET_FAT`
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub user: Option<String>,
    pub targets: DailyTargets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            user: None,
            targets: DailyTargets::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or empty keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let target = |key: &str, default: f64| -> Result<f64> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .ok_or_else(|| anyhow!("{} must be a positive number, got {:?}", key, raw)),
                None => Ok(default),
            }
        };

        let defaults = DailyTargets::default();
        Ok(Self {
            data_dir: get("DIET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            user: get("DIET_USER"),
            targets: DailyTargets {
                kcal: target("DIET_TARGET_KCAL", defaults.kcal)?,
                protein: target("DIET_TARGET_PROTEIN", defaults.protein)?,
                carbs: target("DIET_TARGET_CARBS", defaults.carbs)?,
                fat: target("DIET_TARGET_FAT", defaults.fat)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DIET_DATA_DIR", "/tmp/diet"),
            ("DIET_USER", "alice"),
            ("DIET_TARGET_PROTEIN", "150"),
            ("DIET_TARGET_FAT", ""),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/diet"));
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.targets.protein, 150.0);
        assert_eq!(config.targets.fat, DailyTargets::default().fat);
    }

    #[test]
    fn rejects_bad_target() {
        assert!(config_from(&[("DIET_TARGET_KCAL", "lots")]).is_err());
        assert!(config_from(&[("DIET_TARGET_KCAL", "-5")]).is_err());
    }
}
