//! Configuration for the explorer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{ChronicleError, Result};

/// Configuration for an explorer session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Input file locations
    pub data: DataConfig,
    /// Search settings
    pub search: SearchConfig,
    /// Statistics settings
    pub stats: StatsConfig,
    /// Timeline display settings
    pub timeline: TimelineConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl ExplorerConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ChronicleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
            .map_err(|e| ChronicleError::Config(format!("{}: {e}", path.display())))
    }
}

/// Input file locations. Relative paths resolve against the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Person-cluster export (JSON)
    pub dataset_path: PathBuf,
    /// Gazetteer table (CSV)
    pub location_table: PathBuf,
    /// Thesaurus table (CSV)
    pub concept_table: PathBuf,
    /// Citation table (CSV)
    pub citation_table: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data.json"),
            location_table: PathBuf::from("location_uris_enriched.csv"),
            concept_table: PathBuf::from("poolparty_uris_enriched.csv"),
            citation_table: PathBuf::from("zotero_uris.csv"),
        }
    }
}

impl DataConfig {
    /// Resolve every relative path against `base`.
    pub fn with_base_dir(&self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let join = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                base.join(path)
            }
        };

        Self {
            dataset_path: join(&self.dataset_path),
            location_table: join(&self.location_table),
            concept_table: join(&self.concept_table),
            citation_table: join(&self.citation_table),
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum hits returned
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 50 }
    }
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Length of the ranked role and location lists
    pub top_n: usize,
    /// Citations shown by the enrichment listing
    pub listed_citations: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            listed_citations: 50,
        }
    }
}

/// Timeline display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Joins the dates of one entry
    pub date_separator: String,
    /// Shown for entries without dates
    pub undated_label: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            date_separator: ", ".to_string(),
            undated_label: "Date Unknown".to_string(),
        }
    }
}

/// General configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
