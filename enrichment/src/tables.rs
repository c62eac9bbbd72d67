//! CSV ingestion for the enrichment tables.
//!
//! A table that is absent is the caller's concern (it simply passes no
//! bytes and gets an empty row set). A table that is present but lacks one of
//! its contractual columns is a configuration error and fails here, before
//! any index is built.

use std::io::Read;

use csv::StringRecord;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::*;

/// Raw rows of all three enrichment tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentTables {
    pub locations: Vec<LocationRow>,
    pub concepts: Vec<ConceptRow>,
    pub citations: Vec<CitationRow>,
}

impl EnrichmentTables {
    /// Tables with no rows at all (every source absent).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse whichever tables are present. `None` means the table file does
    /// not exist and yields an empty row set.
    pub fn from_sources(
        locations: Option<&[u8]>,
        concepts: Option<&[u8]>,
        citations: Option<&[u8]>,
    ) -> Result<Self> {
        Ok(Self {
            locations: locations.map(read_location_rows).transpose()?.unwrap_or_default(),
            concepts: concepts.map(read_concept_rows).transpose()?.unwrap_or_default(),
            citations: citations.map(read_citation_rows).transpose()?.unwrap_or_default(),
        })
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.locations.len() + self.concepts.len() + self.citations.len()
    }
}

/// Read the location table (`location_uri,label,latitude,longitude`).
pub fn read_location_rows<R: Read>(reader: R) -> Result<Vec<LocationRow>> {
    read_rows(TableKind::Location, reader)
}

/// Read the concept table (`uri,type,dutch_prefLabel,definition`).
pub fn read_concept_rows<R: Read>(reader: R) -> Result<Vec<ConceptRow>> {
    read_rows(TableKind::Concept, reader)
}

/// Read the citation table (`zotero_uri,source_reference`).
pub fn read_citation_rows<R: Read>(reader: R) -> Result<Vec<CitationRow>> {
    read_rows(TableKind::Citation, reader)
}

fn read_rows<T, R>(table: TableKind, reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let csv_err = |source| EnrichmentError::Csv { table, source };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = normalize_headers(reader.headers().map_err(csv_err)?);
    validate_headers(table, &headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.deserialize(Some(&headers)).map_err(csv_err)?);
    }

    debug!(table = %table, rows = rows.len(), "Read enrichment table");
    Ok(rows)
}

/// Strip a UTF-8 byte-order mark and surrounding whitespace from header names.
fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim()
        })
        .collect()
}

fn validate_headers(table: TableKind, headers: &StringRecord) -> Result<()> {
    for column in table.required_columns() {
        if !headers.iter().any(|h| h == *column) {
            return Err(EnrichmentError::MissingColumn {
                table,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}
