//! Where a session's inputs come from.
//!
//! The core never performs I/O itself. A [`DataSource`] hands it the raw
//! tables and dataset; the session builds everything else.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use enrichment::{EnrichmentTables, TableKind};

use crate::config::DataConfig;
use crate::types::{ChronicleError, Result};

/// Supplier of enrichment tables and the dataset document.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Parse whichever enrichment tables exist.
    ///
    /// A missing table yields no rows; a malformed one is an error.
    async fn load_tables(&self) -> Result<EnrichmentTables>;

    /// Raw dataset JSON.
    async fn load_dataset(&self) -> Result<String>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Reads inputs from files on disk.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    data: DataConfig,
}

impl FileSystemSource {
    pub fn new(data: DataConfig) -> Self {
        Self { data }
    }

    /// Resolve the default file names against `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(DataConfig::default().with_base_dir(dir))
    }

    fn table_path(&self, kind: TableKind) -> &Path {
        match kind {
            TableKind::Location => &self.data.location_table,
            TableKind::Concept => &self.data.concept_table,
            TableKind::Citation => &self.data.citation_table,
        }
    }

    async fn read_table(&self, kind: TableKind) -> Result<Option<Vec<u8>>> {
        let path = self.table_path(kind);
        let bytes = read_optional(path).await?;
        match &bytes {
            Some(b) => debug!(table = %kind, path = %path.display(), bytes = b.len(), "Read enrichment table"),
            None => info!(table = %kind, path = %path.display(), "Enrichment table not found, lookups fall back"),
        }
        Ok(bytes)
    }
}

/// Read a file, treating "not found" as absent.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ChronicleError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[async_trait]
impl DataSource for FileSystemSource {
    async fn load_tables(&self) -> Result<EnrichmentTables> {
        let mut contents: [Option<Vec<u8>>; 3] = Default::default();
        for (slot, kind) in contents.iter_mut().zip(TableKind::all()) {
            *slot = self.read_table(kind).await?;
        }
        let [locations, concepts, citations] = contents;

        Ok(EnrichmentTables::from_sources(
            locations.as_deref(),
            concepts.as_deref(),
            citations.as_deref(),
        )?)
    }

    async fn load_dataset(&self) -> Result<String> {
        let path = &self.data.dataset_path;
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ChronicleError::Io {
                path: path.display().to_string(),
                source,
            })
    }

    fn describe(&self) -> String {
        let dir = self
            .data
            .dataset_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        format!("filesystem:{}", dir.display())
    }
}

#[derive(Debug, Clone, Default)]
struct StaticContents {
    locations: Option<Vec<u8>>,
    concepts: Option<Vec<u8>>,
    citations: Option<Vec<u8>>,
    dataset: String,
}

/// In-memory inputs, replaceable between reloads.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    contents: Arc<RwLock<StaticContents>>,
}

impl StaticSource {
    /// A source with the given dataset and no tables.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(StaticContents {
                dataset: dataset.into(),
                ..Default::default()
            })),
        }
    }

    /// Set (or clear) one table's CSV text.
    pub async fn set_table(&self, kind: TableKind, csv: Option<&str>) {
        let mut contents = self.contents.write().await;
        let bytes = csv.map(|c| c.as_bytes().to_vec());
        match kind {
            TableKind::Location => contents.locations = bytes,
            TableKind::Concept => contents.concepts = bytes,
            TableKind::Citation => contents.citations = bytes,
        }
    }

    /// Replace the dataset document.
    pub async fn set_dataset(&self, dataset: impl Into<String>) {
        self.contents.write().await.dataset = dataset.into();
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn load_tables(&self) -> Result<EnrichmentTables> {
        let contents = self.contents.read().await;
        Ok(EnrichmentTables::from_sources(
            contents.locations.as_deref(),
            contents.concepts.as_deref(),
            contents.citations.as_deref(),
        )?)
    }

    async fn load_dataset(&self) -> Result<String> {
        Ok(self.contents.read().await.dataset.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_tables() {
        let source = StaticSource::new("{}");
        source
            .set_table(
                TableKind::Citation,
                Some("zotero_uri,source_reference\nzotero://select/items/A,NA VOC 1\n"),
            )
            .await;

        let tables = source.load_tables().await.unwrap();
        assert_eq!(tables.citations.len(), 1);
        assert!(tables.locations.is_empty());
        assert_eq!(source.load_dataset().await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_static_source_malformed_table() {
        let source = StaticSource::new("{}");
        source
            .set_table(TableKind::Location, Some("uri,label\nhttp://x,X\n"))
            .await;

        let err = source.load_tables().await.unwrap_err();
        assert!(matches!(err, ChronicleError::Enrichment(_)));
    }

    #[tokio::test]
    async fn test_filesystem_missing_tables_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSystemSource::in_dir(dir.path());

        let tables = source.load_tables().await.unwrap();
        assert_eq!(tables.row_count(), 0);
    }

    #[tokio::test]
    async fn test_filesystem_reads_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let tables = [
            (
                "location_uris_enriched.csv",
                "location_uri,label,latitude,longitude\nhttps://g.example/gouda,Gouda,,\n",
            ),
            (
                "poolparty_uris_enriched.csv",
                "uri,type,dutch_prefLabel,definition\nhttps://v.example/Koopman,activity,koopman,\n",
            ),
            (
                "zotero_uris.csv",
                "zotero_uri,source_reference\nzotero://select/items/A,NA VOC 1\n",
            ),
        ];
        for (name, csv) in tables {
            std::fs::write(dir.path().join(name), csv).unwrap();
        }

        let tables = FileSystemSource::in_dir(dir.path()).load_tables().await.unwrap();
        assert_eq!(tables.locations.len(), 1);
        assert_eq!(tables.concepts.len(), 1);
        assert_eq!(tables.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_filesystem_missing_dataset_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSystemSource::in_dir(dir.path());

        let err = source.load_dataset().await.unwrap_err();
        assert!(matches!(err, ChronicleError::Io { .. }));
    }
}
