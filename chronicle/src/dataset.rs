//! The loaded person-cluster dataset.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{ChronicleError, PersonCluster, Result};

/// Id under which a document holding one bare cluster is stored.
pub const SINGLE_CLUSTER_ID: &str = "single_cluster";

/// Person clusters keyed by cluster id. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    clusters: BTreeMap<String, PersonCluster>,
}

impl Dataset {
    /// Build from already-decoded clusters.
    pub fn from_clusters(clusters: impl IntoIterator<Item = (String, PersonCluster)>) -> Self {
        Self {
            clusters: clusters.into_iter().collect(),
        }
    }

    /// Parse an export document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    /// Parse an export document that is already JSON.
    ///
    /// Either a mapping of cluster id to cluster, or a single cluster object
    /// (recognized by having both `persons` and `appellations`), stored under
    /// [`SINGLE_CLUSTER_ID`]. Non-object entries in a mapping are skipped.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ChronicleError::InvalidDataset(
                "expected a JSON object of person clusters".to_string(),
            ));
        };

        if is_single_cluster(&map) {
            let cluster = decode_cluster(SINGLE_CLUSTER_ID, Value::Object(map))?;
            return Ok(Self::from_clusters([(SINGLE_CLUSTER_ID.to_string(), cluster)]));
        }

        let mut clusters = BTreeMap::new();
        let mut skipped = 0usize;

        for (id, value) in map {
            if !value.is_object() {
                skipped += 1;
                continue;
            }
            let cluster = decode_cluster(&id, value)?;
            clusters.insert(id, cluster);
        }

        debug!(clusters = clusters.len(), skipped, "Parsed dataset");
        Ok(Self { clusters })
    }

    /// Cluster by exact id.
    pub fn get(&self, id: &str) -> Option<&PersonCluster> {
        self.clusters.get(id)
    }

    /// Stored id and cluster for an exact id.
    pub fn get_key_value(&self, id: &str) -> Option<(&str, &PersonCluster)> {
        self.clusters
            .get_key_value(id)
            .map(|(key, cluster)| (key.as_str(), cluster))
    }

    /// Clusters in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonCluster)> {
        self.clusters.iter().map(|(id, cluster)| (id.as_str(), cluster))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

fn is_single_cluster(map: &Map<String, Value>) -> bool {
    map.contains_key("persons") && map.contains_key("appellations")
}

fn decode_cluster(id: &str, value: Value) -> Result<PersonCluster> {
    serde_json::from_value(value).map_err(|source| ChronicleError::InvalidCluster {
        id: id.to_string(),
        source,
    })
}
