//! Loaded explorer session and its shared store.
//!
//! A [`Session`] is immutable: the dataset and enrichment index are built
//! once and every operation takes the session explicitly. Reloading builds a
//! fresh session and swaps it in whole; readers holding the previous
//! snapshot keep using it undisturbed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info};

use enrichment::EnrichmentIndex;

use crate::config::ExplorerConfig;
use crate::crossref::{resolve_cross_reference, CrossReference};
use crate::dataset::Dataset;
use crate::profile::PersonProfile;
use crate::search::{search, SearchHit, SearchQuery};
use crate::source::DataSource;
use crate::stats::{DatasetStats, EnrichmentListing, EnrichmentOverview};
use crate::timeline::Timeline;
use crate::types::{ChronicleError, PersonCluster, Relation, Result};

/// A loaded dataset with its enrichment index.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    enrichment: EnrichmentIndex,
    /// Enrichment index fingerprint
    fingerprint: String,
    /// SHA-256 of the dataset document
    dataset_digest: String,
    loaded_at: DateTime<Utc>,
    config: ExplorerConfig,
}

impl Session {
    /// Assemble a session from parts already in memory.
    pub fn new(dataset: Dataset, enrichment: EnrichmentIndex, config: ExplorerConfig) -> Self {
        Self::with_digest(dataset, enrichment, config, String::new())
    }

    fn with_digest(
        dataset: Dataset,
        enrichment: EnrichmentIndex,
        config: ExplorerConfig,
        dataset_digest: String,
    ) -> Self {
        Self {
            fingerprint: enrichment.fingerprint(),
            dataset,
            enrichment,
            dataset_digest,
            loaded_at: Utc::now(),
            config,
        }
    }

    /// Load inputs from `source` and build everything.
    pub async fn load(source: &dyn DataSource, config: ExplorerConfig) -> Result<Self> {
        let tables = source.load_tables().await?;
        let enrichment = EnrichmentIndex::from_tables(&tables);

        let json = source.load_dataset().await?;
        let dataset_digest = hex::encode(Sha256::digest(json.as_bytes()));
        let dataset = Dataset::from_json_str(&json)?;

        let session = Self::with_digest(dataset, enrichment, config, dataset_digest);
        info!(
            source = %source.describe(),
            clusters = session.dataset.len(),
            table_rows = tables.row_count(),
            fingerprint = %session.fingerprint,
            "Session loaded"
        );
        Ok(session)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn enrichment(&self) -> &EnrichmentIndex {
        &self.enrichment
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn dataset_digest(&self) -> &str {
        &self.dataset_digest
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Cluster by exact id.
    pub fn cluster(&self, cluster_id: &str) -> Result<&PersonCluster> {
        self.dataset
            .get(cluster_id)
            .ok_or_else(|| ChronicleError::ClusterNotFound(cluster_id.to_string()))
    }

    /// Clusters matching `query`, capped at the configured maximum.
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        let hits = search(
            &self.dataset,
            &self.enrichment,
            query,
            self.config.search.max_results,
        );
        debug!(hits = hits.len(), "Search completed");
        hits
    }

    /// Sequenced timeline of one cluster.
    pub fn timeline(&self, cluster_id: &str) -> Result<Timeline> {
        let cluster = self.cluster(cluster_id)?;
        Ok(Timeline::for_cluster(
            cluster,
            &self.enrichment,
            &self.dataset,
            &self.config.timeline,
        ))
    }

    /// Resolved profile of one cluster.
    pub fn profile(&self, cluster_id: &str) -> Result<PersonProfile> {
        let cluster = self.cluster(cluster_id)?;
        Ok(PersonProfile::build(
            cluster_id,
            cluster,
            &self.enrichment,
            &self.dataset,
        ))
    }

    /// Cross-reference outcome of each relation of one cluster.
    pub fn relations(&self, cluster_id: &str) -> Result<Vec<(&Relation, CrossReference<'_>)>> {
        let cluster = self.cluster(cluster_id)?;
        Ok(cluster
            .relations
            .iter()
            .map(|relation| (relation, resolve_cross_reference(relation, &self.dataset)))
            .collect())
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats::compute(&self.dataset, &self.enrichment, self.config.stats.top_n)
    }

    pub fn enrichment_overview(&self) -> EnrichmentOverview {
        EnrichmentOverview::compute(&self.enrichment)
    }

    /// Every gazetteer and thesaurus entry, plus the first citations.
    pub fn enrichment_listing(&self) -> EnrichmentListing {
        EnrichmentListing::compute(&self.enrichment, self.config.stats.listed_citations)
    }
}

/// Outcome of [`SessionStore::reload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    /// Whether the enrichment fingerprint or dataset digest differs
    pub changed: bool,
    pub fingerprint: String,
}

/// Shares the current session among concurrent readers.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Arc<Session>>>,
    source: Arc<dyn DataSource>,
}

impl SessionStore {
    /// Load the first session from `source`.
    pub async fn open(source: Arc<dyn DataSource>, config: ExplorerConfig) -> Result<Self> {
        let session = Session::load(source.as_ref(), config).await?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(session))),
            source,
        })
    }

    /// The current session. Unaffected by later reloads.
    pub async fn snapshot(&self) -> Arc<Session> {
        Arc::clone(&*self.current.read().await)
    }

    /// Rebuild the session from the source and swap it in.
    ///
    /// On error the current session is kept.
    pub async fn reload(&self) -> Result<ReloadOutcome> {
        let config = self.snapshot().await.config().clone();
        let session = Session::load(self.source.as_ref(), config).await?;

        let mut current = self.current.write().await;
        let changed = current.fingerprint != session.fingerprint
            || current.dataset_digest != session.dataset_digest;
        let outcome = ReloadOutcome {
            changed,
            fingerprint: session.fingerprint.clone(),
        };
        *current = Arc::new(session);

        info!(changed, fingerprint = %outcome.fingerprint, "Session reloaded");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enrichment::TableKind;

    use crate::source::StaticSource;

    const DATASET: &str = r#"{
        "c-1": {
            "persons": ["p-1"],
            "appellations": [
                { "appellation": "Jan Pieterszoon", "observation_id": "obs-1", "annotationDate": "1680" }
            ],
            "relations": [
                { "relation": "https://vocab.example#hasSpouse", "otherPerson": "c-2" },
                { "relation": "https://vocab.example#hasChild", "otherPerson": "c-9" }
            ]
        },
        "c-2": { "persons": ["p-2"], "appellations": [{ "appellation": "Maria Jans" }] }
    }"#;

    async fn store(source: &StaticSource) -> SessionStore {
        SessionStore::open(Arc::new(source.clone()), ExplorerConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_session_operations() {
        let source = StaticSource::new(DATASET);
        let session = store(&source).await.snapshot().await;

        assert_eq!(session.dataset().len(), 2);
        assert_eq!(session.timeline("c-1").unwrap().entries.len(), 1);
        assert_eq!(session.profile("c-1").unwrap().primary_name, "Jan Pieterszoon");
        assert_eq!(session.search(&SearchQuery::default()).len(), 2);
        assert_eq!(session.stats().total_clusters, 2);

        let relations = session.relations("c-1").unwrap();
        assert!(relations[0].1.is_found());
        assert_eq!(
            relations[1].1,
            CrossReference::NotFound {
                target: "c-9".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_cluster() {
        let source = StaticSource::new(DATASET);
        let session = store(&source).await.snapshot().await;

        let err = session.timeline("c-404").unwrap_err();
        assert!(matches!(err, ChronicleError::ClusterNotFound(id) if id == "c-404"));
    }

    #[tokio::test]
    async fn test_reload_swaps_whole_session() {
        let source = StaticSource::new(DATASET);
        let store = store(&source).await;
        let before = store.snapshot().await;

        let unchanged = store.reload().await.unwrap();
        assert!(!unchanged.changed);

        source
            .set_table(
                TableKind::Concept,
                Some("uri,type,dutch_prefLabel,definition\nhttps://vocab.example#hasSpouse,relation,echtgenote,\n"),
            )
            .await;
        let outcome = store.reload().await.unwrap();
        assert!(outcome.changed);

        let after = store.snapshot().await;
        assert_eq!(after.profile("c-1").unwrap().relations[0].label, "echtgenote");
        // Earlier snapshots are untouched
        assert_eq!(before.profile("c-1").unwrap().relations[0].label, "hasSpouse");
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[tokio::test]
    async fn test_dataset_change_is_detected() {
        let source = StaticSource::new(DATASET);
        let store = store(&source).await;

        source.set_dataset(r#"{ "c-3": { "persons": [] } }"#).await;
        let outcome = store.reload().await.unwrap();
        assert!(outcome.changed);
        assert!(store.snapshot().await.cluster("c-3").is_ok());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_session() {
        let source = StaticSource::new(DATASET);
        let store = store(&source).await;

        source.set_dataset("not json").await;
        assert!(store.reload().await.is_err());
        assert_eq!(store.snapshot().await.dataset().len(), 2);
    }
}
