//! Label resolution against the enrichment index.
//!
//! Every resolver degrades to the caller's fallback text; none of them fail.

use crate::index::EnrichmentIndex;

/// Fragments that mark a string as carrying a bibliographic-reference URI.
const CITATION_URI_MARKERS: &[&str] = &["zotero://", "zotero.org"];

impl EnrichmentIndex {
    /// Best human-readable label for `uri`.
    ///
    /// Tries the gazetteer (case-insensitive) before the thesaurus
    /// (case-sensitive). An empty label in either table yields `fallback`.
    pub fn resolve_label<'a>(&'a self, uri: &str, fallback: &'a str) -> &'a str {
        if uri.is_empty() {
            return fallback;
        }

        if let Some(location) = self.location(uri) {
            return non_empty_or(&location.label, fallback);
        }

        if let Some(concept) = self.concept(uri) {
            return non_empty_or(concept.label(), fallback);
        }

        fallback
    }

    /// Like [`resolve_label`](Self::resolve_label), with the built-in event
    /// overrides taking priority over the thesaurus.
    pub fn resolve_event_label<'a>(&'a self, uri: &str, fallback: &'a str) -> &'a str {
        match self.event_labels.get(uri) {
            Some(label) => label.as_str(),
            None => self.resolve_label(uri, fallback),
        }
    }

    /// Place name for a location reference.
    ///
    /// When the URI does not resolve, the upper-cased description is tried as
    /// a surrogate key (older exports keyed places by name).
    pub fn resolve_location_text<'a>(&'a self, uri: &str, description: &'a str) -> &'a str {
        let label = self.resolve_label(uri, "");
        if !label.is_empty() {
            return label;
        }

        if description.is_empty() {
            return description;
        }

        self.resolve_label(&description.to_uppercase(), description)
    }

    /// Formatted citation for a source string.
    ///
    /// Exact match first, then lowercase. A string that embeds a reference
    /// URI inside a longer annotation resolves through the longest citation
    /// key it contains (ties broken by key order). Otherwise the input is
    /// returned unchanged.
    pub fn resolve_citation<'a>(&'a self, source: &'a str) -> &'a str {
        if source.is_empty() {
            return source;
        }

        if let Some(citation) = self.citations.get(source) {
            return citation;
        }

        if let Some(citation) = self.citations.get(&source.to_lowercase()) {
            return citation;
        }

        if !contains_citation_uri(source) {
            return source;
        }

        self.citations
            .iter()
            .filter(|(key, _)| !key.is_empty() && source.contains(key.as_str()))
            .max_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| b.0.cmp(a.0)))
            .map(|(_, citation)| citation.as_str())
            .unwrap_or(source)
    }
}

/// Whether `text` carries a recognizable bibliographic-reference URI.
pub fn contains_citation_uri(text: &str) -> bool {
    let lower = text.to_lowercase();
    CITATION_URI_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn non_empty_or<'a>(label: &'a str, fallback: &'a str) -> &'a str {
    if label.is_empty() {
        fallback
    } else {
        label
    }
}
