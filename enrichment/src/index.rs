//! Enrichment index assembly.
//!
//! Builds the three lookup maps from table rows. Location keys are stored
//! lowercase; concept keys are stored exactly as provided; citation keys are
//! stored twice, as given and lowercased.

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::tables::EnrichmentTables;
use crate::types::*;

/// Location URI (lowercase) to gazetteer entry.
pub type LocationIndex = HashMap<String, LocationEntry>;

/// Concept URI (case-sensitive) to thesaurus entry.
pub type ConceptIndex = HashMap<String, ConceptEntry>;

/// Citation URI (both case variants) to formatted reference.
pub type CitationIndex = HashMap<String, String>;

/// Event-type labels that take priority over the thesaurus.
pub const EVENT_LABEL_OVERRIDES: &[(&str, &str)] = &[(
    "https://github.com/globalise-huygens/nlp-event-detection/wiki#beingdead",
    "Deceased",
)];

/// Build the gazetteer map. Rows without a URI are skipped.
pub fn build_location_index(rows: &[LocationRow]) -> LocationIndex {
    let mut index = LocationIndex::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        let Some(uri) = non_empty(row.location_uri.as_deref()) else {
            skipped += 1;
            continue;
        };

        index.insert(
            uri.to_lowercase(),
            LocationEntry {
                label: row.label.clone().unwrap_or_default(),
                latitude: row.latitude,
                longitude: row.longitude,
            },
        );
    }

    debug!(entries = index.len(), skipped, "Built location index");
    index
}

/// Build the thesaurus map. Rows with an empty label are kept.
pub fn build_concept_index(rows: &[ConceptRow]) -> ConceptIndex {
    let mut index = ConceptIndex::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        let Some(uri) = non_empty(row.uri.as_deref()) else {
            skipped += 1;
            continue;
        };

        index.insert(
            uri.to_string(),
            ConceptEntry {
                concept_type: row.concept_type.clone().unwrap_or_default(),
                label: row.dutch_pref_label.clone().filter(|l| !l.is_empty()),
                definition: row.definition.clone().filter(|d| !d.is_empty()),
            },
        );
    }

    debug!(entries = index.len(), skipped, "Built concept index");
    index
}

/// Build the citation map.
///
/// Each row contributes two keys, the URI as given and the URI lowercased,
/// both mapping to the citation text (or to the URI itself when the row has
/// no citation text).
pub fn build_citation_index(rows: &[CitationRow]) -> CitationIndex {
    let mut index = CitationIndex::with_capacity(rows.len() * 2);

    for row in rows {
        let Some(uri) = non_empty(row.zotero_uri.as_deref()) else {
            continue;
        };

        let citation = non_empty(row.source_reference.as_deref())
            .unwrap_or(uri)
            .to_string();

        index.insert(uri.to_lowercase(), citation.clone());
        index.insert(uri.to_string(), citation);
    }

    debug!(entries = index.len(), "Built citation index");
    index
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The assembled enrichment lookups for a session.
///
/// Immutable once built; share it behind an `Arc` for concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentIndex {
    pub(crate) locations: LocationIndex,
    pub(crate) concepts: ConceptIndex,
    pub(crate) citations: CitationIndex,
    pub(crate) event_labels: HashMap<String, String>,
}

impl EnrichmentIndex {
    /// An index with no table data (only the built-in event overrides).
    pub fn empty() -> Self {
        Self::from_parts(HashMap::new(), HashMap::new(), HashMap::new())
    }

    /// Build every map from parsed table rows.
    pub fn from_tables(tables: &EnrichmentTables) -> Self {
        Self::from_parts(
            build_location_index(&tables.locations),
            build_concept_index(&tables.concepts),
            build_citation_index(&tables.citations),
        )
    }

    /// Assemble an index from prebuilt maps.
    pub fn from_parts(
        locations: LocationIndex,
        concepts: ConceptIndex,
        citations: CitationIndex,
    ) -> Self {
        let event_labels = EVENT_LABEL_OVERRIDES
            .iter()
            .map(|(uri, label)| (uri.to_string(), label.to_string()))
            .collect();

        Self {
            locations,
            concepts,
            citations,
            event_labels,
        }
    }

    /// Gazetteer entry for a location URI (any case).
    pub fn location(&self, uri: &str) -> Option<&LocationEntry> {
        self.locations.get(&uri.to_lowercase())
    }

    /// Thesaurus entry for a concept URI (exact case).
    pub fn concept(&self, uri: &str) -> Option<&ConceptEntry> {
        self.concepts.get(uri)
    }

    /// All gazetteer entries.
    pub fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    /// All thesaurus entries.
    pub fn concepts(&self) -> &ConceptIndex {
        &self.concepts
    }

    /// All citation keys, both case variants.
    pub fn citations(&self) -> &CitationIndex {
        &self.citations
    }

    /// Number of distinct citations, taken as half the key count since every
    /// row is stored under two keys.
    ///
    /// A URI that is already all lowercase occupies a single key, so tables
    /// holding such URIs are under-counted here. Use
    /// [`unique_citations`](Self::unique_citations)`.len()` for the exact
    /// figure.
    pub fn unique_citation_count(&self) -> usize {
        self.citations.len() / 2
    }

    /// Citations deduplicated by lowercase URI, sorted by that URI.
    pub fn unique_citations(&self) -> Vec<(&str, &str)> {
        let mut unique: BTreeMap<String, (&str, &str)> = BTreeMap::new();
        let mut keys: Vec<&String> = self.citations.keys().collect();
        keys.sort();

        for key in keys {
            unique
                .entry(key.to_lowercase())
                .or_insert((key.as_str(), self.citations[key].as_str()));
        }

        unique.into_values().collect()
    }

    /// Thesaurus entries grouped by their type tag, sorted by type then URI.
    pub fn concepts_by_type(&self) -> BTreeMap<&str, Vec<(&str, &ConceptEntry)>> {
        let mut grouped: BTreeMap<&str, Vec<(&str, &ConceptEntry)>> = BTreeMap::new();

        for (uri, entry) in &self.concepts {
            grouped
                .entry(entry.concept_type.as_str())
                .or_default()
                .push((uri.as_str(), entry));
        }

        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }

        grouped
    }

    /// SHA-256 over the sorted contents of every map.
    ///
    /// Building twice from identical tables yields the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        let mut locations: Vec<_> = self.locations.iter().collect();
        locations.sort_by(|a, b| a.0.cmp(b.0));
        for (uri, entry) in locations {
            hasher.update(b"L\0");
            hasher.update(uri.as_bytes());
            hasher.update(b"\0");
            hasher.update(entry.label.as_bytes());
            hasher.update(format!("\0{:?}\0{:?}\n", entry.latitude, entry.longitude).as_bytes());
        }

        let mut concepts: Vec<_> = self.concepts.iter().collect();
        concepts.sort_by(|a, b| a.0.cmp(b.0));
        for (uri, entry) in concepts {
            hasher.update(b"C\0");
            hasher.update(uri.as_bytes());
            hasher.update(b"\0");
            hasher.update(entry.concept_type.as_bytes());
            hasher.update(format!("\0{:?}\0{:?}\n", entry.label, entry.definition).as_bytes());
        }

        let mut citations: Vec<_> = self.citations.iter().collect();
        citations.sort();
        for (uri, citation) in citations {
            hasher.update(b"Z\0");
            hasher.update(uri.as_bytes());
            hasher.update(b"\0");
            hasher.update(citation.as_bytes());
            hasher.update(b"\n");
        }

        hex::encode(hasher.finalize())
    }
}
