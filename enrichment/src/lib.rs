//! Enrichment lookups for GLOBALISE VOC person records
//!
//! Raw person records carry URIs from three external sources. This crate
//! turns the tabular exports of those sources into lookup maps and resolves
//! URIs to display text:
//!
//! - **Gazetteer** (location URI → place name, coordinates), case-insensitive keys
//! - **Thesaurus** (concept URI → Dutch preferred label, definition), case-sensitive keys
//! - **Citations** (Zotero URI → formatted reference), stored under both case variants
//!
//! # Key Components
//!
//! - [`EnrichmentTables`]: Parsed CSV rows, with contractual column checks
//! - [`EnrichmentIndex`]: The three maps plus built-in event overrides
//! - [`EnrichmentIndex::resolve_label`] and friends: Fallback-chained resolution
//!
//! # Example
//!
//! ```ignore
//! use enrichment::{EnrichmentIndex, EnrichmentTables};
//!
//! let tables = EnrichmentTables::from_sources(Some(&locations_csv), None, None)?;
//! let index = EnrichmentIndex::from_tables(&tables);
//! let place = index.resolve_location_text(&record.location, &record.description);
//! ```

pub mod index;
pub mod resolver;
pub mod tables;
pub mod types;

// Re-export main types
pub use index::{
    build_citation_index, build_concept_index, build_location_index, CitationIndex, ConceptIndex,
    EnrichmentIndex, LocationIndex, EVENT_LABEL_OVERRIDES,
};
pub use resolver::contains_citation_uri;
pub use tables::EnrichmentTables;
pub use types::*;
