//! Observation aggregation.
//!
//! Regroups a cluster's per-category records into the source observations
//! they were taken from. Records without an `observation_id` take no part.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::trace;

use crate::types::*;

/// Observations keyed by observation id.
pub type ObservationMap = BTreeMap<String, Observation>;

/// All records sharing one `observation_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Observation {
    pub observation_id: String,
    pub activities: Vec<Activity>,
    pub appellations: Vec<Appellation>,
    pub identities: Vec<Identity>,
    pub locations: Vec<LocationRelation>,
    pub events: Vec<Event>,
    pub relations: Vec<Relation>,
    /// Union of annotation and start dates, in string order
    pub dates: BTreeSet<String>,
    /// Source of the first record visited that had one
    pub source: Option<String>,
    /// Reconstruction source of the first record visited that had one
    pub reconstruction_source: Option<String>,
    /// Page or folio of the first record visited that had one
    pub location_in_source: Option<String>,
}

impl Observation {
    /// Create an empty observation.
    pub fn new(observation_id: impl Into<String>) -> Self {
        Self {
            observation_id: observation_id.into(),
            ..Default::default()
        }
    }

    /// Add a record, merging its dates and attribution.
    pub fn push(&mut self, record: RecordRef<'_>) {
        let meta = record.meta();

        self.dates.extend(meta.dates().map(str::to_string));

        fill_once(&mut self.source, meta.observation_source.as_deref());
        fill_once(
            &mut self.reconstruction_source,
            meta.reconstruction_source.as_deref(),
        );
        fill_once(
            &mut self.location_in_source,
            meta.location_in_observation_source.as_deref(),
        );

        match record {
            RecordRef::Activity(r) => self.activities.push(r.clone()),
            RecordRef::Appellation(r) => self.appellations.push(r.clone()),
            RecordRef::Identity(r) => self.identities.push(r.clone()),
            RecordRef::Location(r) => self.locations.push(r.clone()),
            RecordRef::Event(r) => self.events.push(r.clone()),
            RecordRef::Relation(r) => self.relations.push(r.clone()),
        }
    }

    /// Total records across all categories.
    pub fn record_count(&self) -> usize {
        self.activities.len()
            + self.appellations.len()
            + self.identities.len()
            + self.locations.len()
            + self.events.len()
            + self.relations.len()
    }

    /// Whether any date was recorded.
    pub fn is_dated(&self) -> bool {
        !self.dates.is_empty()
    }
}

fn fill_once(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(value) = non_blank(value) {
            *slot = Some(value.to_string());
        }
    }
}

/// Group a cluster's records by observation id.
///
/// Categories are visited in [`RecordCategory::AGGREGATION_ORDER`], so the
/// attribution of an observation comes from the earliest category that
/// carries one.
pub fn aggregate_observations(cluster: &PersonCluster) -> ObservationMap {
    let mut observations = ObservationMap::new();
    let mut unassigned = 0usize;

    for category in RecordCategory::AGGREGATION_ORDER {
        for record in cluster.records(category) {
            let Some(id) = record.meta().observation_id() else {
                unassigned += 1;
                continue;
            };

            observations
                .entry(id.to_string())
                .or_insert_with(|| Observation::new(id))
                .push(record);
        }
    }

    trace!(
        observations = observations.len(),
        unassigned,
        "Aggregated observations"
    );
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(observation_id: Option<&str>, date: Option<&str>, source: Option<&str>) -> RecordMeta {
        RecordMeta {
            observation_id: observation_id.map(str::to_string),
            annotation_date: date.map(str::to_string),
            observation_source: source.map(str::to_string),
            ..Default::default()
        }
    }

    fn sample_cluster() -> PersonCluster {
        PersonCluster {
            appellations: vec![
                Appellation {
                    appellation: Some("Jan".to_string()),
                    meta: meta(Some("obs-1"), Some("1680"), Some("appellation source")),
                    ..Default::default()
                },
                Appellation {
                    appellation: Some("Johannes".to_string()),
                    meta: meta(None, Some("1690"), None),
                    ..Default::default()
                },
            ],
            activities: vec![Activity {
                meta: RecordMeta {
                    start_date: Some("1679-04-01".to_string()),
                    ..meta(Some("obs-1"), None, Some("activity source"))
                },
                ..Default::default()
            }],
            events: vec![Event {
                meta: meta(Some("obs-2"), Some("1700"), Some("event source")),
                ..Default::default()
            }],
            relations: vec![Relation {
                other_person: Some("c-2".to_string()),
                meta: meta(Some("obs-2"), None, None),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_records_grouped_across_categories() {
        let observations = aggregate_observations(&sample_cluster());

        assert_eq!(observations.len(), 2);
        let first = &observations["obs-1"];
        assert_eq!(first.appellations.len(), 1);
        assert_eq!(first.activities.len(), 1);
        let second = &observations["obs-2"];
        assert_eq!(second.events.len(), 1);
        assert_eq!(second.relations.len(), 1);
    }

    #[test]
    fn test_records_without_observation_id_are_excluded() {
        let observations = aggregate_observations(&sample_cluster());
        let total: usize = observations.values().map(Observation::record_count).sum();
        assert_eq!(total, 4);
        assert!(observations
            .values()
            .all(|o| o.appellations.iter().all(|a| a.appellation.as_deref() != Some("Johannes"))));
    }

    #[test]
    fn test_dates_are_unioned() {
        let observations = aggregate_observations(&sample_cluster());
        let dates: Vec<&str> = observations["obs-1"].dates.iter().map(String::as_str).collect();
        assert_eq!(dates, vec!["1679-04-01", "1680"]);
        assert!(observations["obs-2"].is_dated());
    }

    #[test]
    fn test_source_first_write_wins_in_category_order() {
        let observations = aggregate_observations(&sample_cluster());
        // activities are visited before appellations
        assert_eq!(observations["obs-1"].source.as_deref(), Some("activity source"));
        assert_eq!(observations["obs-2"].source.as_deref(), Some("event source"));
    }

    #[test]
    fn test_empty_cluster_has_no_observations() {
        assert!(aggregate_observations(&PersonCluster::default()).is_empty());
    }
}
