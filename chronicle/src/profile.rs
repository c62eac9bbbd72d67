//! Resolved, display-ready view of one person cluster.

use serde::Serialize;

use enrichment::EnrichmentIndex;

use crate::crossref::{resolve_cross_reference, CrossReference};
use crate::dataset::Dataset;
use crate::observation::Observation;
use crate::types::*;

/// Everything about one person with URIs resolved to text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonProfile {
    pub cluster_id: String,
    pub primary_name: String,
    pub record_counts: RecordCounts,
    pub name_variants: Vec<NameVariant>,
    pub activities: Vec<ActivityView>,
    pub locations: Vec<LocationView>,
    pub events: Vec<EventView>,
    pub identities: Vec<IdentityView>,
    pub relations: Vec<RelationView>,
    pub external_references: Vec<ExternalReferenceView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub appellations: usize,
    pub activities: usize,
    pub events: usize,
    pub relations: usize,
}

/// A distinct name and the dates it was recorded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameVariant {
    pub name: String,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityView {
    pub role: String,
    pub employer: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub relation: String,
    pub place: String,
    /// Latitude and longitude from the gazetteer
    pub coordinates: Option<(f64, f64)>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub label: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub label: String,
    pub date: Option<String>,
}

/// A relation with its cross-reference outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationView {
    pub label: String,
    pub target: Option<String>,
    /// Whether the target cluster is in the dataset
    pub found: bool,
    pub target_name: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalReferenceView {
    pub database: String,
    pub id: String,
}

/// One observation's records with URIs resolved to text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationView {
    pub names: Vec<String>,
    pub activities: Vec<ActivityView>,
    pub identities: Vec<IdentityView>,
    pub locations: Vec<LocationView>,
    pub events: Vec<EventView>,
    pub relations: Vec<RelationView>,
    /// Citation text of the observation source
    pub source: Option<String>,
    pub reconstruction_source: Option<String>,
    pub location_in_source: Option<String>,
}

impl ObservationView {
    /// Resolve the records of `observation` the same way a profile does.
    pub fn resolve(observation: &Observation, index: &EnrichmentIndex, dataset: &Dataset) -> Self {
        Self {
            names: observation
                .appellations
                .iter()
                .filter_map(|a| non_blank(a.appellation.as_deref()))
                .map(str::to_string)
                .collect(),
            activities: observation
                .activities
                .iter()
                .map(|a| activity_view(a, index))
                .collect(),
            identities: observation
                .identities
                .iter()
                .map(|i| identity_view(i, index))
                .collect(),
            locations: observation
                .locations
                .iter()
                .map(|l| location_view(l, index))
                .collect(),
            events: observation.events.iter().map(|e| event_view(e, index)).collect(),
            relations: observation
                .relations
                .iter()
                .map(|r| relation_view(r, index, dataset))
                .collect(),
            source: citation(index, &observation.source),
            reconstruction_source: citation(index, &observation.reconstruction_source),
            location_in_source: observation.location_in_source.clone(),
        }
    }
}

const UNKNOWN_ACTIVITY: &str = "Activity";
const UNKNOWN_EVENT: &str = "Event";
const UNKNOWN_RELATION: &str = "Unknown relation";

impl PersonProfile {
    /// Resolve every record of `cluster` against `index`, following
    /// relations into `dataset`.
    pub fn build(
        cluster_id: &str,
        cluster: &PersonCluster,
        index: &EnrichmentIndex,
        dataset: &Dataset,
    ) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            primary_name: cluster.primary_name().to_string(),
            record_counts: RecordCounts {
                appellations: cluster.appellations.len(),
                activities: cluster.activities.len(),
                events: cluster.events.len(),
                relations: cluster.relations.len(),
            },
            name_variants: name_variants(&cluster.appellations),
            activities: cluster
                .activities
                .iter()
                .map(|a| activity_view(a, index))
                .collect(),
            locations: cluster
                .locations
                .iter()
                .map(|l| location_view(l, index))
                .collect(),
            events: cluster.events.iter().map(|e| event_view(e, index)).collect(),
            identities: cluster
                .identities
                .iter()
                .map(|i| identity_view(i, index))
                .collect(),
            relations: cluster
                .relations
                .iter()
                .map(|r| relation_view(r, index, dataset))
                .collect(),
            external_references: cluster
                .external_references
                .iter()
                .map(|x| ExternalReferenceView {
                    database: x.external_db_name.clone().unwrap_or_default(),
                    id: x.external_id.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

fn name_variants(appellations: &[Appellation]) -> Vec<NameVariant> {
    let mut variants: Vec<NameVariant> = Vec::new();

    for appellation in appellations {
        let Some(name) = non_blank(appellation.appellation.as_deref()) else {
            continue;
        };

        let position = match variants.iter().position(|v| v.name == name) {
            Some(position) => position,
            None => {
                variants.push(NameVariant {
                    name: name.to_string(),
                    dates: Vec::new(),
                });
                variants.len() - 1
            }
        };

        if let Some(date) = non_blank(appellation.meta.annotation_date.as_deref()) {
            variants[position].dates.push(date.to_string());
        }
    }

    variants
}

fn activity_view(activity: &Activity, index: &EnrichmentIndex) -> ActivityView {
    let fallback = non_blank(activity.meta.original_label.as_deref()).unwrap_or(UNKNOWN_ACTIVITY);

    ActivityView {
        role: index.resolve_label(opt(&activity.activity), fallback).to_string(),
        employer: activity.employer.clone(),
        location: place_text(
            index,
            &activity.location,
            &activity.original_location_description,
        ),
        start_date: activity.meta.start_date.clone(),
        end_date: activity.meta.end_date.clone(),
        source: citation(index, &activity.meta.observation_source),
    }
}

fn location_view(location: &LocationRelation, index: &EnrichmentIndex) -> LocationView {
    LocationView {
        relation: index
            .resolve_label(
                opt(&location.location_relation),
                or_unknown(location.meta.original_label()),
            )
            .to_string(),
        place: place_text(index, &location.location, &location.original_location_description)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        coordinates: index
            .location(opt(&location.location))
            .and_then(|entry| entry.coordinates()),
        date: location.meta.annotation_date.clone(),
    }
}

fn event_view(event: &Event, index: &EnrichmentIndex) -> EventView {
    let fallback = non_blank(event.meta.original_label.as_deref()).unwrap_or(UNKNOWN_EVENT);

    EventView {
        label: index.resolve_event_label(opt(&event.event), fallback).to_string(),
        date: non_blank(event.meta.start_date.as_deref())
            .or(non_blank(event.meta.annotation_date.as_deref()))
            .map(str::to_string),
        location: place_text(index, &event.location, &event.original_location_description),
        source: citation(index, &event.meta.observation_source),
    }
}

fn identity_view(identity: &Identity, index: &EnrichmentIndex) -> IdentityView {
    IdentityView {
        label: index
            .resolve_label(opt(&identity.identity), or_unknown(identity.meta.original_label()))
            .to_string(),
        date: identity.meta.annotation_date.clone(),
    }
}

fn relation_view(relation: &Relation, index: &EnrichmentIndex, dataset: &Dataset) -> RelationView {
    let uri = opt(&relation.relation);
    let reference = resolve_cross_reference(relation, dataset);

    RelationView {
        label: index.resolve_label(uri, relation_fragment(uri)).to_string(),
        target: non_blank(relation.other_person.as_deref()).map(str::to_string),
        found: reference.is_found(),
        target_name: match reference {
            CrossReference::Found { primary_name, .. } => Some(primary_name.to_string()),
            _ => None,
        },
        date: relation.meta.annotation_date.clone(),
    }
}

/// Fallback label for a relation URI: the fragment after `#`.
fn relation_fragment(uri: &str) -> &str {
    if uri.is_empty() {
        return UNKNOWN_RELATION;
    }
    match uri.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        _ => uri,
    }
}

fn place_text(
    index: &EnrichmentIndex,
    uri: &Option<String>,
    description: &Option<String>,
) -> Option<String> {
    let text = index.resolve_location_text(opt(uri), opt(description));
    (!text.is_empty()).then(|| text.to_string())
}

fn citation(index: &EnrichmentIndex, source: &Option<String>) -> Option<String> {
    non_blank(source.as_deref()).map(|s| index.resolve_citation(s).to_string())
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn or_unknown(label: &str) -> &str {
    if label.trim().is_empty() {
        UNKNOWN_NAME
    } else {
        label
    }
}
