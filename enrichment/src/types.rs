//! Core types for the enrichment tables and indices.
//!
//! Row types mirror the CSV columns produced by the extraction scripts; entry
//! types are what the index stores after key normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three enrichment tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Place-name gazetteer
    Location,
    /// Controlled-vocabulary thesaurus
    Concept,
    /// Bibliographic citations
    Citation,
}

impl TableKind {
    /// Columns that must be present in the table header.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Location => &["location_uri", "label", "latitude", "longitude"],
            Self::Concept => &["uri", "type", "dutch_prefLabel", "definition"],
            Self::Citation => &["zotero_uri", "source_reference"],
        }
    }

    /// Get string representation for logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Concept => "concept",
            Self::Citation => "citation",
        }
    }

    /// All tables in load order
    pub fn all() -> [Self; 3] {
        [Self::Location, Self::Concept, Self::Citation]
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the location (gazetteer) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub location_uri: Option<String>,
    pub label: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
}

/// One row of the concept (thesaurus) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptRow {
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub concept_type: Option<String>,
    #[serde(rename = "dutch_prefLabel")]
    pub dutch_pref_label: Option<String>,
    pub definition: Option<String>,
}

/// One row of the citation table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationRow {
    pub zotero_uri: Option<String>,
    pub source_reference: Option<String>,
}

/// A gazetteer entry, keyed by lowercase location URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Place name (empty when the table had none)
    pub label: String,
    /// Latitude, absent rather than defaulted
    pub latitude: Option<f64>,
    /// Longitude, absent rather than defaulted
    pub longitude: Option<f64>,
}

impl LocationEntry {
    /// Coordinates when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A controlled-vocabulary term, keyed by its URI exactly as provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptEntry {
    /// Category tag (activity, identityType, locationRelation, ...)
    pub concept_type: String,
    /// Preferred Dutch label
    pub label: Option<String>,
    /// Free-text definition
    pub definition: Option<String>,
}

impl ConceptEntry {
    /// Preferred label, empty when the thesaurus had none.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Error types for enrichment table ingestion.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// A required column is missing from a present table
    #[error("{table} table is missing required column `{column}`")]
    MissingColumn { table: TableKind, column: String },

    /// The CSV could not be read or a row could not be decoded
    #[error("failed to read {table} table: {source}")]
    Csv {
        table: TableKind,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;
