//! Dataset and enrichment statistics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use enrichment::EnrichmentIndex;

use crate::dataset::Dataset;
use crate::types::{PersonCluster, UNKNOWN_NAME};

/// A label and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Summary figures for a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub total_clusters: usize,
    pub total_activities: usize,
    pub total_events: usize,
    pub total_location_relations: usize,
    /// Distinct resolved location labels
    pub unique_locations: usize,
    /// Clusters with at least one appellation or activity date
    pub clusters_with_dates: usize,
    /// Most frequent resolved role labels
    pub top_roles: Vec<LabelCount>,
    /// Most frequent resolved location labels
    pub top_locations: Vec<LabelCount>,
}

impl DatasetStats {
    /// Compute statistics, ranking at most `top_n` roles and locations.
    pub fn compute(dataset: &Dataset, index: &EnrichmentIndex, top_n: usize) -> Self {
        let mut roles: HashMap<&str, usize> = HashMap::new();
        let mut locations: HashMap<&str, usize> = HashMap::new();
        let mut stats = Self {
            total_clusters: dataset.len(),
            total_activities: 0,
            total_events: 0,
            total_location_relations: 0,
            unique_locations: 0,
            clusters_with_dates: 0,
            top_roles: Vec::new(),
            top_locations: Vec::new(),
        };

        for (_, cluster) in dataset.iter() {
            stats.total_activities += cluster.activities.len();
            stats.total_events += cluster.events.len();
            stats.total_location_relations += cluster.locations.len();
            if has_dates(cluster) {
                stats.clusters_with_dates += 1;
            }

            for activity in &cluster.activities {
                let fallback = activity
                    .meta
                    .original_label
                    .as_deref()
                    .unwrap_or(UNKNOWN_NAME);
                let label = index.resolve_label(activity.activity.as_deref().unwrap_or(""), fallback);
                *roles.entry(label).or_default() += 1;
            }

            for location in &cluster.locations {
                let description = location
                    .original_location_description
                    .as_deref()
                    .unwrap_or(UNKNOWN_NAME);
                let label =
                    index.resolve_location_text(location.location.as_deref().unwrap_or(""), description);
                *locations.entry(label).or_default() += 1;
            }
        }

        stats.unique_locations = locations.len();
        stats.top_roles = rank(roles, top_n);
        stats.top_locations = rank(locations, top_n);
        stats
    }
}

fn has_dates(cluster: &PersonCluster) -> bool {
    cluster
        .appellations
        .iter()
        .any(|a| a.meta.annotation_date.as_deref().is_some_and(|d| !d.trim().is_empty()))
        || cluster.activities.iter().any(|a| a.meta.dates().next().is_some())
}

/// Count descending, then label ascending.
fn rank(counts: HashMap<&str, usize>, top_n: usize) -> Vec<LabelCount> {
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Sizes and fingerprint of the enrichment index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentOverview {
    pub locations: usize,
    pub locations_with_coordinates: usize,
    pub concepts: usize,
    /// Distinct citations (each is indexed under two keys)
    pub citations: usize,
    /// Concept count per type tag
    pub concepts_by_type: BTreeMap<String, usize>,
    pub fingerprint: String,
}

impl EnrichmentOverview {
    pub fn compute(index: &EnrichmentIndex) -> Self {
        Self {
            locations: index.locations().len(),
            locations_with_coordinates: index
                .locations()
                .values()
                .filter(|entry| entry.coordinates().is_some())
                .count(),
            concepts: index.concepts().len(),
            citations: index.unique_citation_count(),
            concepts_by_type: index
                .concepts_by_type()
                .into_iter()
                .map(|(concept_type, entries)| (concept_type.to_string(), entries.len()))
                .collect(),
            fingerprint: index.fingerprint(),
        }
    }
}

/// A gazetteer entry as listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationListing {
    pub uri: String,
    pub label: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A thesaurus entry as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptListing {
    pub uri: String,
    pub label: Option<String>,
    pub has_definition: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationListing {
    pub uri: String,
    pub citation: String,
}

/// Contents of the enrichment index, for browsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentListing {
    /// Sorted by URI
    pub locations: Vec<LocationListing>,
    /// Grouped by type tag, each group sorted by URI
    pub concepts: BTreeMap<String, Vec<ConceptListing>>,
    /// The first citations by lowercase URI
    pub citations: Vec<CitationListing>,
    /// Distinct citations in the index
    pub citations_total: usize,
    /// Set when the citation list was cut short
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations_note: Option<String>,
}

impl EnrichmentListing {
    /// List the index, keeping at most `citation_limit` citations.
    pub fn compute(index: &EnrichmentIndex, citation_limit: usize) -> Self {
        let mut locations: Vec<LocationListing> = index
            .locations()
            .iter()
            .map(|(uri, entry)| LocationListing {
                uri: uri.clone(),
                label: entry.label.clone(),
                latitude: entry.latitude,
                longitude: entry.longitude,
            })
            .collect();
        locations.sort_by(|a, b| a.uri.cmp(&b.uri));

        let concepts = index
            .concepts_by_type()
            .into_iter()
            .map(|(concept_type, entries)| {
                let listed = entries
                    .into_iter()
                    .map(|(uri, entry)| ConceptListing {
                        uri: uri.to_string(),
                        label: entry.label.clone(),
                        has_definition: entry.definition.is_some(),
                    })
                    .collect();
                (concept_type.to_string(), listed)
            })
            .collect();

        let unique = index.unique_citations();
        let citations_total = unique.len();
        let citations: Vec<CitationListing> = unique
            .into_iter()
            .take(citation_limit)
            .map(|(uri, citation)| CitationListing {
                uri: uri.to_string(),
                citation: citation.to_string(),
            })
            .collect();
        let citations_note = (citations.len() < citations_total)
            .then(|| format!("Showing {} of {} citations", citations.len(), citations_total));

        Self {
            locations,
            concepts,
            citations,
            citations_total,
            citations_note,
        }
    }
}
