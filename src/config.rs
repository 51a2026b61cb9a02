//! Dashboard configuration.
//!
//! Dataset locations are a mapping from logical dataset name to a path.
//! Relative paths resolve against `data_dir`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::Dimension;

pub const FEATURE_IMPORTANCE_DATASET: &str = "feature_importance";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub datasets: BTreeMap<String, PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            datasets: default_datasets(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn default_datasets() -> BTreeMap<String, PathBuf> {
    let mut datasets: BTreeMap<String, PathBuf> = Dimension::ALL
        .iter()
        .map(|d| {
            (
                d.dataset_key().to_string(),
                PathBuf::from(format!("{}.csv", d.dataset_key())),
            )
        })
        .collect();
    datasets.insert(
        FEATURE_IMPORTANCE_DATASET.to_string(),
        PathBuf::from("feature_importance.json"),
    );
    datasets
}

impl DashboardConfig {
    /// Parse a TOML document. Datasets the document does not name keep their
    /// default locations.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let mut config: DashboardConfig = toml::from_str(s)?;
        for (name, path) in default_datasets() {
            config.datasets.entry(name).or_insert(path);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Location of a logical dataset, or `None` when it is not configured.
    pub fn resolve(&self, dataset: &str) -> Option<PathBuf> {
        self.datasets.get(dataset).map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.data_dir.join(path)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_datasets() {
        let config = DashboardConfig::default();
        assert_eq!(
            config.resolve("late_per_region"),
            Some(PathBuf::from("data/late_per_region.csv"))
        );
        assert_eq!(
            config.resolve(FEATURE_IMPORTANCE_DATASET),
            Some(PathBuf::from("data/feature_importance.json"))
        );
        assert_eq!(config.resolve("unknown"), None);
    }

    #[test]
    fn test_toml_overrides_merge_with_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            data_dir = "/srv/supply"
            max_upload_bytes = 1024

            [datasets]
            late_per_region = "regions.csv"
            feature_importance = "/opt/models/features.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(
            config.resolve("late_per_region"),
            Some(PathBuf::from("/srv/supply/regions.csv"))
        );
        assert_eq!(
            config.resolve("late_per_shipping"),
            Some(PathBuf::from("/srv/supply/late_per_shipping.csv"))
        );
        assert_eq!(
            config.resolve(FEATURE_IMPORTANCE_DATASET),
            Some(PathBuf::from("/opt/models/features.csv"))
        );
    }

    #[test]
    fn test_data_dir_override() {
        let config = DashboardConfig::default().with_data_dir("/tmp/metrics");
        assert_eq!(
            config.resolve("late_per_category"),
            Some(PathBuf::from("/tmp/metrics/late_per_category.csv"))
        );
    }

    #[test]
    fn test_missing_config_file() {
        let err = DashboardConfig::load(Path::new("/nonexistent/dashboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
