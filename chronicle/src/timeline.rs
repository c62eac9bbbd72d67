//! Timeline sequencing.
//!
//! Observations are ordered by their lexicographically smallest date string.
//! Dates are free text, so this is only chronological for zero-padded
//! `YYYY[-MM-DD]` values; no date is ever parsed for ordering.

use serde::Serialize;

use enrichment::EnrichmentIndex;

use crate::config::TimelineConfig;
use crate::dataset::Dataset;
use crate::dates::year_range;
use crate::observation::{aggregate_observations, Observation, ObservationMap};
use crate::profile::ObservationView;
use crate::types::PersonCluster;

/// Position of an observation on the timeline.
///
/// The derived order puts every dated key before [`SortKey::Undated`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Dated(String),
    Undated,
}

impl SortKey {
    /// Sort key of an observation: its smallest date string.
    pub fn for_observation(observation: &Observation) -> Self {
        match observation.dates.first() {
            Some(date) => Self::Dated(date.clone()),
            None => Self::Undated,
        }
    }

    pub fn is_dated(&self) -> bool {
        matches!(self, Self::Dated(_))
    }
}

/// One observation placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub sort_key: SortKey,
    /// All dates of the observation, sorted
    pub dates: Vec<String>,
    /// Dates joined for display, or the undated label
    pub date_display: String,
    pub observation: Observation,
}

/// Order observations with the default display settings.
pub fn sequence_timeline(observations: ObservationMap) -> Vec<TimelineEntry> {
    sequence_timeline_with(observations, &TimelineConfig::default())
}

/// Order observations: dated entries by sort key, undated last, ties by
/// observation id.
pub fn sequence_timeline_with(
    observations: ObservationMap,
    config: &TimelineConfig,
) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = observations
        .into_values()
        .map(|observation| {
            let dates: Vec<String> = observation.dates.iter().cloned().collect();
            let date_display = if dates.is_empty() {
                config.undated_label.clone()
            } else {
                dates.join(&config.date_separator)
            };

            TimelineEntry {
                sort_key: SortKey::for_observation(&observation),
                dates,
                date_display,
                observation,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.sort_key
            .cmp(&b.sort_key)
            .then_with(|| a.observation.observation_id.cmp(&b.observation.observation_id))
    });

    entries
}

/// Counts over a sequenced timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSummary {
    pub total: usize,
    pub dated: usize,
    /// Smallest and largest four-digit year in the dated entries
    pub year_range: Option<(i32, i32)>,
}

impl TimelineSummary {
    pub fn of(entries: &[TimelineEntry]) -> Self {
        Self {
            total: entries.len(),
            dated: entries.iter().filter(|e| e.sort_key.is_dated()).count(),
            year_range: year_range(
                entries
                    .iter()
                    .flat_map(|e| e.dates.iter().map(String::as_str)),
            ),
        }
    }
}

/// A timeline entry with its records resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    #[serde(flatten)]
    pub entry: TimelineEntry,
    pub resolved: ObservationView,
}

/// A cluster's sequenced timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub entries: Vec<ResolvedEntry>,
    pub summary: TimelineSummary,
}

impl Timeline {
    /// Aggregate and sequence a cluster's observations, resolving each
    /// entry's records against `index` and relations into `dataset`.
    pub fn for_cluster(
        cluster: &PersonCluster,
        index: &EnrichmentIndex,
        dataset: &Dataset,
        config: &TimelineConfig,
    ) -> Self {
        let entries = sequence_timeline_with(aggregate_observations(cluster), config);
        let summary = TimelineSummary::of(&entries);

        Self {
            entries: entries
                .into_iter()
                .map(|entry| ResolvedEntry {
                    resolved: ObservationView::resolve(&entry.observation, index, dataset),
                    entry,
                })
                .collect(),
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use enrichment::ConceptEntry;

    use crate::types::{Activity, Appellation, RecordMeta};

    fn observation(id: &str, dates: &[&str]) -> (String, Observation) {
        let mut observation = Observation::new(id);
        observation.dates = dates.iter().map(|d| d.to_string()).collect();
        (id.to_string(), observation)
    }

    fn order(entries: &[TimelineEntry]) -> Vec<&str> {
        entries
            .iter()
            .map(|e| e.observation.observation_id.as_str())
            .collect()
    }

    #[test]
    fn test_undated_last() {
        let observations: ObservationMap = [
            observation("a", &["1680"]),
            observation("b", &["1675"]),
            observation("c", &[]),
        ]
        .into_iter()
        .collect();

        let entries = sequence_timeline(observations);
        assert_eq!(order(&entries), vec!["b", "a", "c"]);
        assert_eq!(entries[2].sort_key, SortKey::Undated);
        assert_eq!(entries[2].date_display, "Date Unknown");
    }

    #[test]
    fn test_ties_break_by_observation_id() {
        let observations: ObservationMap = [
            observation("obs-9", &["1700"]),
            observation("obs-2", &["1700"]),
            observation("obs-z", &[]),
            observation("obs-a", &[]),
        ]
        .into_iter()
        .collect();

        let entries = sequence_timeline(observations);
        assert_eq!(order(&entries), vec!["obs-2", "obs-9", "obs-a", "obs-z"]);
    }

    #[test]
    fn test_sort_key_is_smallest_date() {
        let (_, obs) = observation("a", &["1690-02-01", "1689", "1690"]);
        assert_eq!(SortKey::for_observation(&obs), SortKey::Dated("1689".to_string()));
    }

    #[test]
    fn test_lexicographic_not_chronological() {
        // Free-text dates sort as strings
        let observations: ObservationMap = [
            observation("a", &["Jan 1680"]),
            observation("b", &["1702"]),
        ]
        .into_iter()
        .collect();

        let entries = sequence_timeline(observations);
        assert_eq!(order(&entries), vec!["b", "a"]);
    }

    #[test]
    fn test_date_display_uses_separator() {
        let observations: ObservationMap = [observation("a", &["1681", "1680"])].into_iter().collect();
        let config = TimelineConfig {
            date_separator: " / ".to_string(),
            undated_label: "?".to_string(),
        };

        let entries = sequence_timeline_with(observations, &config);
        assert_eq!(entries[0].date_display, "1680 / 1681");
        assert_eq!(entries[0].dates, vec!["1680", "1681"]);
    }

    #[test]
    fn test_timeline_for_cluster() {
        let appellation = |id: &str, date: Option<&str>| Appellation {
            appellation: Some("Jan".to_string()),
            meta: RecordMeta {
                observation_id: Some(id.to_string()),
                annotation_date: date.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        };
        let cluster = PersonCluster {
            appellations: vec![
                appellation("obs-1", Some("1690-05-01")),
                appellation("obs-2", Some("1675")),
                appellation("obs-3", None),
            ],
            ..Default::default()
        };

        let timeline = Timeline::for_cluster(
            &cluster,
            &EnrichmentIndex::empty(),
            &Dataset::default(),
            &TimelineConfig::default(),
        );
        let entries: Vec<TimelineEntry> = timeline.entries.iter().map(|e| e.entry.clone()).collect();
        assert_eq!(order(&entries), vec!["obs-2", "obs-1", "obs-3"]);
        assert_eq!(timeline.entries[0].resolved.names, vec!["Jan"]);
        assert_eq!(
            timeline.summary,
            TimelineSummary {
                total: 3,
                dated: 2,
                year_range: Some((1675, 1690)),
            }
        );
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = Timeline::for_cluster(
            &PersonCluster::default(),
            &EnrichmentIndex::empty(),
            &Dataset::default(),
            &TimelineConfig::default(),
        );
        assert!(timeline.is_empty());
        assert_eq!(timeline.summary.year_range, None);
    }

    #[test]
    fn test_timeline_entries_resolve_uris() {
        let index = EnrichmentIndex::from_parts(
            HashMap::new(),
            HashMap::from([(
                "https://v/Koopman".to_string(),
                ConceptEntry {
                    concept_type: "activity".to_string(),
                    label: Some("koopman".to_string()),
                    definition: None,
                },
            )]),
            HashMap::from([(
                "zotero://select/items/ABC".to_string(),
                "NA, VOC 1520".to_string(),
            )]),
        );
        let cluster = PersonCluster {
            activities: vec![Activity {
                activity: Some("https://v/Koopman".to_string()),
                meta: RecordMeta {
                    observation_id: Some("obs-1".to_string()),
                    annotation_date: Some("1702".to_string()),
                    observation_source: Some("zotero://select/items/ABC".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };

        let timeline =
            Timeline::for_cluster(&cluster, &index, &Dataset::default(), &TimelineConfig::default());
        let entry = &timeline.entries[0];
        assert_eq!(entry.resolved.activities[0].role, "koopman");
        assert_eq!(entry.resolved.source.as_deref(), Some("NA, VOC 1520"));
        // The raw observation is kept alongside
        assert_eq!(
            entry.entry.observation.source.as_deref(),
            Some("zotero://select/items/ABC")
        );

        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["entries"][0]["date_display"], "1702");
        assert_eq!(json["entries"][0]["resolved"]["activities"][0]["role"], "koopman");
    }
}
