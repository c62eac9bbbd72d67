//! voc-explorer: Command-line explorer for GLOBALISE VOC person records
//!
//! Loads a persons export and its enrichment tables once, runs one command
//! and prints the result as JSON:
//! - Person search by name, place, role, employer, years and gender
//! - Resolved person profiles and observation timelines
//! - Relation cross-references within the export
//! - Dataset and enrichment statistics

mod cli;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use chronicle::{ExplorerConfig, FileSystemSource, Session};

use cli::{execute_command, Commands};

#[derive(Parser)]
#[command(name = "voc-explorer")]
#[command(about = "Explore GLOBALISE VOC person records")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "VOC_EXPLORER_CONFIG", default_value = "voc-explorer.yaml")]
    config: PathBuf,

    /// Directory holding the dataset and enrichment tables
    #[arg(short, long, env = "VOC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Load the config file, or defaults when it does not exist.
fn load_config(path: &Path) -> anyhow::Result<ExplorerConfig> {
    if path.exists() {
        Ok(ExplorerConfig::from_file(path)?)
    } else {
        Ok(ExplorerConfig::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    // Initialize tracing
    let level = config.general.log_level.clone();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("voc_explorer={level}").parse()?)
                .add_directive(format!("chronicle={level}").parse()?)
                .add_directive(format!("enrichment={level}").parse()?),
        )
        .init();

    if !cli.config.exists() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| PathBuf::from("."));
    config.data = config.data.with_base_dir(&data_dir);
    info!(data_dir = %data_dir.display(), "Loading session");

    let source = FileSystemSource::new(config.data.clone());
    let session = Session::load(&source, config).await?;

    let output = execute_command(&session, cli.command)?;
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "voc-explorer",
            "--data-dir",
            "/srv/voc",
            "search",
            "--name",
            "goosen",
            "--from",
            "1700",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/voc")));
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.name.as_deref(), Some("goosen"));
                assert_eq!(args.year_from, Some(1700));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_enrichment_list() {
        let cli = Cli::try_parse_from(["voc-explorer", "enrichment", "--list"]).unwrap();
        assert!(matches!(cli.command, Commands::Enrichment { list: true }));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/voc-explorer.yaml")).unwrap();
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search:\n  max_results: 5").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.stats.top_n, 15);
    }
}
