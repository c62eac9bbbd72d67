//! Explorer subcommands.

use clap::{Args, Subcommand};
use serde::Serialize;

use chronicle::{CrossReference, SearchQuery, Session};

/// Explorer commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find persons matching the given filters
    Search(SearchArgs),

    /// Show a person's resolved profile
    Person {
        /// Cluster id
        cluster_id: String,
    },

    /// Show a person's observations in date order
    Timeline {
        /// Cluster id
        cluster_id: String,
    },

    /// Follow a person's relations to other clusters
    Relations {
        /// Cluster id
        cluster_id: String,
    },

    /// Summarize the dataset
    Stats,

    /// Summarize the enrichment tables
    Enrichment {
        /// List locations, concepts and citations instead of counting them
        #[arg(long)]
        list: bool,
    },
}

/// Search filters
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// Part of any recorded name
    #[arg(long)]
    pub name: Option<String>,

    /// Part of a place of origin, residence or work
    #[arg(long)]
    pub location: Option<String>,

    /// Part of a job title or role
    #[arg(long)]
    pub role: Option<String>,

    /// Part of an employer name
    #[arg(long)]
    pub employer: Option<String>,

    /// Active from this year onwards
    #[arg(long = "from")]
    pub year_from: Option<i32>,

    /// Active up to this year
    #[arg(long = "to")]
    pub year_to: Option<i32>,

    /// Recorded gender label
    #[arg(long)]
    pub gender: Option<String>,
}

impl From<SearchArgs> for SearchQuery {
    fn from(args: SearchArgs) -> Self {
        Self {
            name: args.name,
            location: args.location,
            role: args.role,
            employer: args.employer,
            year_from: args.year_from,
            year_to: args.year_to,
            gender: args.gender,
        }
    }
}

#[derive(Debug, Serialize)]
struct RelationRow<'a> {
    relation: Option<&'a str>,
    other_person: Option<&'a str>,
    date: Option<&'a str>,
    #[serde(flatten)]
    reference: CrossReference<'a>,
}

/// Run a command against a loaded session, returning pretty JSON.
pub fn execute_command(session: &Session, command: Commands) -> anyhow::Result<String> {
    let output = match command {
        Commands::Search(args) => {
            let query = SearchQuery::from(args);
            serde_json::to_string_pretty(&session.search(&query))?
        }
        Commands::Person { cluster_id } => serde_json::to_string_pretty(&session.profile(&cluster_id)?)?,
        Commands::Timeline { cluster_id } => {
            serde_json::to_string_pretty(&session.timeline(&cluster_id)?)?
        }
        Commands::Relations { cluster_id } => {
            let rows: Vec<RelationRow<'_>> = session
                .relations(&cluster_id)?
                .into_iter()
                .map(|(relation, reference)| RelationRow {
                    relation: relation.relation.as_deref(),
                    other_person: relation.other_person.as_deref(),
                    date: relation.meta.annotation_date.as_deref(),
                    reference,
                })
                .collect();
            serde_json::to_string_pretty(&rows)?
        }
        Commands::Stats => serde_json::to_string_pretty(&session.stats())?,
        Commands::Enrichment { list: false } => {
            serde_json::to_string_pretty(&session.enrichment_overview())?
        }
        Commands::Enrichment { list: true } => {
            serde_json::to_string_pretty(&session.enrichment_listing())?
        }
    };

    Ok(output)
}
