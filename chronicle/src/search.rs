//! Person search over the loaded dataset.
//!
//! Text criteria are case-insensitive substring matches against both the
//! raw record text and the enriched labels of the URIs it carries, so a
//! query for "koopman" finds clusters whose activity is only a thesaurus URI.

use serde::{Deserialize, Serialize};

use enrichment::EnrichmentIndex;

use crate::dataset::Dataset;
use crate::dates::year_range;
use crate::types::{non_blank, PersonCluster};

/// Search criteria. Every field is optional; an empty query matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Substring of any appellation
    pub name: Option<String>,
    /// Substring of any location relation's text or resolved place
    pub location: Option<String>,
    /// Substring of any activity's label or resolved role
    pub role: Option<String>,
    /// Substring of any activity's employer
    pub employer: Option<String>,
    /// Cluster's latest year must be at least this
    pub year_from: Option<i32>,
    /// Cluster's earliest year must be at most this
    pub year_to: Option<i32>,
    /// Equals the label of the first labelled identity
    pub gender: Option<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `cluster` satisfies every given criterion.
    pub fn matches(&self, cluster: &PersonCluster, index: &EnrichmentIndex) -> bool {
        if let Some(name) = needle(&self.name) {
            let found = cluster
                .appellations
                .iter()
                .filter_map(|a| a.appellation.as_deref())
                .any(|text| contains(text, &name));
            if !found {
                return false;
            }
        }

        if let Some(location) = needle(&self.location) {
            if !location_texts(cluster, index).any(|text| contains(text, &location)) {
                return false;
            }
        }

        if let Some(role) = needle(&self.role) {
            if !role_texts(cluster, index).any(|text| contains(text, &role)) {
                return false;
            }
        }

        if let Some(employer) = needle(&self.employer) {
            let found = cluster
                .activities
                .iter()
                .filter_map(|a| a.employer.as_deref())
                .any(|text| contains(text, &employer));
            if !found {
                return false;
            }
        }

        if self.year_from.is_some() || self.year_to.is_some() {
            let Some((min, max)) = cluster_years(cluster) else {
                return false;
            };
            if self.year_from.is_some_and(|from| max < from) {
                return false;
            }
            if self.year_to.is_some_and(|to| min > to) {
                return false;
            }
        }

        if let Some(gender) = needle(&self.gender) {
            match cluster_gender(cluster) {
                Some(label) if label.to_lowercase() == gender => {}
                _ => return false,
            }
        }

        true
    }
}

/// A matching cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub cluster_id: String,
    pub primary_name: String,
}

/// Clusters matching `query`, in cluster-id order, at most `max_results`.
pub fn search(
    dataset: &Dataset,
    index: &EnrichmentIndex,
    query: &SearchQuery,
    max_results: usize,
) -> Vec<SearchHit> {
    dataset
        .iter()
        .filter(|(_, cluster)| query.matches(cluster, index))
        .take(max_results)
        .map(|(id, cluster)| SearchHit {
            cluster_id: id.to_string(),
            primary_name: cluster.primary_name().to_string(),
        })
        .collect()
}

/// Year span of a cluster, from appellation annotation dates and activity
/// annotation and start dates.
pub fn cluster_years(cluster: &PersonCluster) -> Option<(i32, i32)> {
    let appellation_dates = cluster
        .appellations
        .iter()
        .filter_map(|a| a.meta.annotation_date.as_deref());
    let activity_dates = cluster.activities.iter().flat_map(|a| a.meta.dates());

    year_range(appellation_dates.chain(activity_dates))
}

/// Label of the first identity record that has one.
pub fn cluster_gender(cluster: &PersonCluster) -> Option<&str> {
    cluster
        .identities
        .iter()
        .find_map(|i| non_blank(i.meta.original_label.as_deref()))
}

fn location_texts<'a>(
    cluster: &'a PersonCluster,
    index: &'a EnrichmentIndex,
) -> impl Iterator<Item = &'a str> {
    cluster.locations.iter().flat_map(move |l| {
        let description = l.original_location_description.as_deref().unwrap_or("");
        [
            l.meta.original_label(),
            description,
            index.resolve_label(l.location.as_deref().unwrap_or(""), ""),
            index.resolve_label(l.location_relation.as_deref().unwrap_or(""), ""),
            index.resolve_location_text("", description),
        ]
    })
}

fn role_texts<'a>(
    cluster: &'a PersonCluster,
    index: &'a EnrichmentIndex,
) -> impl Iterator<Item = &'a str> {
    cluster.activities.iter().flat_map(move |a| {
        [
            a.meta.original_label(),
            index.resolve_label(a.activity.as_deref().unwrap_or(""), ""),
            index.resolve_label(a.activity_type.as_deref().unwrap_or(""), ""),
        ]
    })
}

fn needle(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(|v| v.trim().to_lowercase())
}

fn contains(haystack: &str, needle: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use enrichment::{ConceptEntry, LocationEntry};

    use crate::types::{Activity, Appellation, Identity, LocationRelation, RecordMeta};

    const KOOPMAN: &str = "https://vocab.example/Koopman";
    const BATAVIA: &str = "https://gazetteer.example/batavia";

    fn index() -> EnrichmentIndex {
        let concepts = HashMap::from([(
            KOOPMAN.to_string(),
            ConceptEntry {
                concept_type: "activity".to_string(),
                label: Some("koopman".to_string()),
                definition: None,
            },
        )]);
        let locations = HashMap::from([(
            BATAVIA.to_string(),
            LocationEntry {
                label: "Batavia".to_string(),
                latitude: Some(-6.13),
                longitude: Some(106.82),
            },
        )]);
        EnrichmentIndex::from_parts(locations, concepts, HashMap::new())
    }

    fn dated(date: &str) -> RecordMeta {
        RecordMeta {
            annotation_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn dataset() -> Dataset {
        let jan = PersonCluster {
            appellations: vec![Appellation {
                appellation: Some("Jan Pieterszoon".to_string()),
                meta: dated("1680"),
                ..Default::default()
            }],
            activities: vec![Activity {
                activity: Some(KOOPMAN.to_string()),
                employer: Some("VOC".to_string()),
                meta: RecordMeta {
                    start_date: Some("1685-03-01".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            locations: vec![LocationRelation {
                location: Some(BATAVIA.to_string()),
                ..Default::default()
            }],
            identities: vec![Identity {
                meta: RecordMeta {
                    original_label: Some("Man".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };

        let maria = PersonCluster {
            appellations: vec![Appellation {
                appellation: Some("Maria Jans".to_string()),
                meta: dated("1720"),
                ..Default::default()
            }],
            locations: vec![LocationRelation {
                original_location_description: Some("Kaap de Goede Hoop".to_string()),
                ..Default::default()
            }],
            identities: vec![Identity {
                meta: RecordMeta {
                    original_label: Some("vrouw".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };

        Dataset::from_clusters([
            ("c-1".to_string(), jan),
            ("c-2".to_string(), maria),
            ("c-3".to_string(), PersonCluster::default()),
        ])
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.cluster_id.as_str()).collect()
    }

    fn run(query: SearchQuery) -> Vec<SearchHit> {
        search(&dataset(), &index(), &query, 50)
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert!(SearchQuery::default().is_empty());
        assert_eq!(ids(&run(SearchQuery::default())), vec!["c-1", "c-2", "c-3"]);
    }

    #[test]
    fn test_name_is_case_insensitive_substring() {
        let hits = run(SearchQuery {
            name: Some("JAN".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-1", "c-2"]);
        assert_eq!(hits[0].primary_name, "Jan Pieterszoon");
    }

    #[test]
    fn test_role_matches_enriched_label() {
        let hits = run(SearchQuery {
            role: Some("koop".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-1"]);
    }

    #[test]
    fn test_location_matches_resolved_and_raw_text() {
        let resolved = run(SearchQuery {
            location: Some("batavia".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&resolved), vec!["c-1"]);

        let raw = run(SearchQuery {
            location: Some("goede hoop".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&raw), vec!["c-2"]);
    }

    #[test]
    fn test_employer() {
        let hits = run(SearchQuery {
            employer: Some("voc".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-1"]);
    }

    #[test]
    fn test_year_bounds_exclude_undated() {
        let hits = run(SearchQuery {
            year_from: Some(1700),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-2"]);

        let hits = run(SearchQuery {
            year_to: Some(1682),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-1"]);
    }

    #[test]
    fn test_cluster_years_include_activity_start() {
        let dataset = dataset();
        assert_eq!(cluster_years(dataset.get("c-1").unwrap()), Some((1680, 1685)));
        assert_eq!(cluster_years(dataset.get("c-3").unwrap()), None);
    }

    #[test]
    fn test_gender_is_exact_label() {
        let hits = run(SearchQuery {
            gender: Some("Vrouw".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&hits), vec!["c-2"]);

        let hits = run(SearchQuery {
            gender: Some("vrouwen".to_string()),
            ..Default::default()
        });
        assert!(hits.is_empty());
    }

    #[test]
    fn test_max_results() {
        let hits = search(&dataset(), &index(), &SearchQuery::default(), 2);
        assert_eq!(ids(&hits), vec!["c-1", "c-2"]);
    }
}
