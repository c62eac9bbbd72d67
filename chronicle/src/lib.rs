//! Person-cluster exploration for GLOBALISE VOC records
//!
//! Builds on the [`enrichment`] crate to turn raw person clusters into
//! display-ready views. Everything here is a pure function over data that is
//! already in memory; only [`source`] touches the filesystem.
//!
//! # Key Components
//!
//! - [`Dataset`]: Clusters keyed by id, parsed from the persons export
//! - [`aggregate_observations`]: Regroups a cluster's records by source observation
//! - [`sequence_timeline`]: Orders observations by their earliest date string
//! - [`resolve_cross_reference`]: Follows a relation to another cluster, exact ids only
//! - [`SearchQuery`], [`DatasetStats`], [`PersonProfile`]: Browsing views
//! - [`Session`] / [`SessionStore`]: One loaded dataset, shared read-only, reloaded whole
//!
//! # Example
//!
//! ```ignore
//! use chronicle::{ExplorerConfig, FileSystemSource, SessionStore};
//!
//! let source = Arc::new(FileSystemSource::in_dir("data"));
//! let store = SessionStore::open(source, ExplorerConfig::default()).await?;
//! let timeline = store.snapshot().await.timeline("cluster-17")?;
//! ```

pub mod config;
pub mod crossref;
pub mod dataset;
pub mod dates;
pub mod observation;
pub mod profile;
pub mod search;
pub mod session;
pub mod source;
pub mod stats;
pub mod timeline;
pub mod types;

// Re-export main types
pub use config::{DataConfig, ExplorerConfig, TimelineConfig};
pub use crossref::{resolve_cross_reference, CrossReference};
pub use dataset::{Dataset, SINGLE_CLUSTER_ID};
pub use observation::{aggregate_observations, Observation, ObservationMap};
pub use profile::{ObservationView, PersonProfile};
pub use search::{search, SearchHit, SearchQuery};
pub use session::{ReloadOutcome, Session, SessionStore};
pub use source::{DataSource, FileSystemSource, StaticSource};
pub use stats::{
    CitationListing, ConceptListing, DatasetStats, EnrichmentListing, EnrichmentOverview,
    LabelCount, LocationListing,
};
pub use timeline::{
    sequence_timeline, sequence_timeline_with, ResolvedEntry, SortKey, Timeline, TimelineEntry,
    TimelineSummary,
};
pub use types::*;
