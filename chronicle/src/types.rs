//! Core types for person clusters and their records.
//!
//! Field names follow the GLOBALISE persons export (`activeAs`,
//! `annotationDate`, `otherPerson`, ...). Every field that an export may omit
//! is an `Option`; text fields also accept JSON numbers and booleans.

use serde::{Deserialize, Deserializer, Serialize};

use enrichment::EnrichmentError;

/// Fields shared by every observation-bearing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Groups records taken from the same source observation
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub observation_id: Option<String>,
    /// Date the observation was annotated
    #[serde(
        rename = "annotationDate",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotation_date: Option<String>,
    #[serde(
        rename = "startDate",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<String>,
    #[serde(
        rename = "endDate",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    /// Citation of the archival source (often a Zotero URI)
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub observation_source: Option<String>,
    /// Citation of the reconstruction that produced this record
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub reconstruction_source: Option<String>,
    /// Page or folio within the source
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub location_in_observation_source: Option<String>,
    /// Human-authored label as written in the source
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub original_label: Option<String>,
}

impl RecordMeta {
    /// Observation id, if present and non-blank.
    pub fn observation_id(&self) -> Option<&str> {
        non_blank(self.observation_id.as_deref())
    }

    /// Dates that place the record in time (annotation and start dates).
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        [self.annotation_date.as_deref(), self.start_date.as_deref()]
            .into_iter()
            .filter_map(non_blank)
    }

    /// Original label, or `""`.
    pub fn original_label(&self) -> &str {
        self.original_label.as_deref().unwrap_or("")
    }
}

/// A name under which the person was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appellation {
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub appellation: Option<String>,
    #[serde(
        rename = "appellationType",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub appellation_type: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// A role or position held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Thesaurus URI of the role
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(
        rename = "activityType",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_type: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    /// Gazetteer URI of the place of work
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub original_location_description: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// A relation to a place (origin, residence, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRelation {
    /// Thesaurus URI of the kind of relation
    #[serde(
        rename = "locationRelation",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_relation: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub original_location_description: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// A life event (baptism, death, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event-type URI
    #[serde(
        alias = "eventType",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub original_location_description: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// An identity statement (gender, religion, status, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(
        rename = "identityType",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub identity_type: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// A relation to another person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation-type URI
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Cluster id of the related person
    #[serde(
        rename = "otherPerson",
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub other_person: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// A link to the same person in another database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub external_db_name: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// All records believed to describe one historical individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonCluster {
    /// Person ids merged into this cluster (kept as exported)
    #[serde(default)]
    pub persons: Vec<serde_json::Value>,
    #[serde(default)]
    pub appellations: Vec<Appellation>,
    #[serde(rename = "activeAs", default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(rename = "locationRelations", default)]
    pub locations: Vec<LocationRelation>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(rename = "externalReferences", default)]
    pub external_references: Vec<ExternalReference>,
}

/// Display name used when a cluster has no appellation.
pub const UNKNOWN_NAME: &str = "Unknown";

impl PersonCluster {
    /// The `appellation` of the first appellation record, or "Unknown".
    pub fn primary_name(&self) -> &str {
        self.appellations
            .first()
            .and_then(|a| a.appellation.as_deref())
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Records of one category, in stored order.
    pub fn records(&self, category: RecordCategory) -> Vec<RecordRef<'_>> {
        match category {
            RecordCategory::Activities => self.activities.iter().map(RecordRef::Activity).collect(),
            RecordCategory::Appellations => {
                self.appellations.iter().map(RecordRef::Appellation).collect()
            }
            RecordCategory::Identities => self.identities.iter().map(RecordRef::Identity).collect(),
            RecordCategory::Locations => self.locations.iter().map(RecordRef::Location).collect(),
            RecordCategory::Events => self.events.iter().map(RecordRef::Event).collect(),
            RecordCategory::Relations => self.relations.iter().map(RecordRef::Relation).collect(),
        }
    }
}

/// The observation-bearing record categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    Activities,
    Appellations,
    Identities,
    Locations,
    Events,
    Relations,
}

impl RecordCategory {
    /// Visiting order for observation aggregation.
    ///
    /// Source attribution is first-write-wins in this order.
    pub const AGGREGATION_ORDER: [Self; 6] = [
        Self::Activities,
        Self::Appellations,
        Self::Identities,
        Self::Locations,
        Self::Events,
        Self::Relations,
    ];
}

/// A borrowed record of any category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordRef<'a> {
    Activity(&'a Activity),
    Appellation(&'a Appellation),
    Identity(&'a Identity),
    Location(&'a LocationRelation),
    Event(&'a Event),
    Relation(&'a Relation),
}

impl<'a> RecordRef<'a> {
    /// Shared fields of the record.
    pub fn meta(&self) -> &'a RecordMeta {
        match self {
            Self::Activity(r) => &r.meta,
            Self::Appellation(r) => &r.meta,
            Self::Identity(r) => &r.meta,
            Self::Location(r) => &r.meta,
            Self::Event(r) => &r.meta,
            Self::Relation(r) => &r.meta,
        }
    }

    /// Category this record belongs to.
    pub fn category(&self) -> RecordCategory {
        match self {
            Self::Activity(_) => RecordCategory::Activities,
            Self::Appellation(_) => RecordCategory::Appellations,
            Self::Identity(_) => RecordCategory::Identities,
            Self::Location(_) => RecordCategory::Locations,
            Self::Event(_) => RecordCategory::Events,
            Self::Relation(_) => RecordCategory::Relations,
        }
    }
}

/// Error types for chronicle operations.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// The dataset is not valid JSON or does not match the export shape
    #[error("Invalid dataset JSON: {0}")]
    Dataset(#[from] serde_json::Error),

    /// The dataset parsed but is structurally unusable
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A cluster could not be decoded
    #[error("Invalid cluster {id}: {source}")]
    InvalidCluster {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// An enrichment table is present but malformed
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// No cluster with this id in the loaded dataset
    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),
}

pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Accept strings, numbers and booleans as text; `null` is absent.
fn text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
