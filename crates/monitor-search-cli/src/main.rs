//! Monitor Search CLI - search issue tracker issues and comments

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use monitor_search_core::config::Config;
use monitor_search_core::domain::search::{
    AccessLevels, PhraseMode, SearchOrdering, SearchRequest, SearchResult, SearchService,
};
use monitor_search_core::storage::{AccessMode, Database, DatabaseConfig};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "monitor-search")]
#[command(author, version, about = "Search the Monitor issue tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search issues and comments
    Search {
        /// Query text
        text: String,
        /// Phrase mode (any, all, exact); anything else is an exact match
        #[arg(short, long, default_value = "exact")]
        phrase: String,
        /// Ordering (newest, oldest, popular, alpha, category)
        #[arg(short, long, default_value = "newest")]
        ordering: String,
        /// Area to search; repeat for several
        #[arg(short, long = "area", default_values = ["issues", "comments"])]
        areas: Vec<String>,
        /// View access level the caller holds; repeat for several
        #[arg(long = "access-level", default_values = ["1"])]
        access_levels: Vec<i64>,
        /// Database path (defaults to the configured path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// List searchable areas
    Areas,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor {
        /// Database path (defaults to the configured path)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let directive = if cli.quiet {
        "monitor_search=warn"
    } else {
        "monitor_search=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            text,
            phrase,
            ordering,
            areas,
            access_levels,
            db,
        } => {
            let request = SearchRequest::new(text)
                .with_phrase(PhraseMode::parse(&phrase))
                .with_ordering(SearchOrdering::parse(&ordering))
                .with_areas(areas);
            let access_levels = AccessLevels::new(access_levels);
            cmd_search(request, access_levels, db.as_deref(), cli.format, cli.quiet).await
        }

        Commands::Areas => cmd_areas(cli.format),

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor { db } => cmd_doctor(db.as_deref(), cli.quiet).await,
    }
}

/// Open the database at `path`, or at the configured path
///
/// Read-only opens never create, migrate or write the file.
async fn open_database(
    config: &Config,
    path: Option<&Path>,
    mode: AccessMode,
) -> anyhow::Result<Database> {
    let path = path.map_or_else(|| config.database.path.clone(), Path::to_path_buf);
    debug!(path = %path.display(), ?mode, "Opening database");

    let db_config =
        DatabaseConfig::with_path(path).max_connections(config.database.max_connections);
    let db_config = match mode {
        AccessMode::ReadOnly => db_config.read_only(),
        AccessMode::ReadWrite => db_config,
    };
    Database::new(db_config).await
}

/// Convert a core error into a CLI error, keeping its code and hint
fn report(err: monitor_search_core::Error) -> anyhow::Error {
    match err.suggestion() {
        Some(hint) => anyhow::anyhow!("[{}] {}\n  Hint: run `{}`", err.code(), err, hint),
        None => anyhow::anyhow!("[{}] {}", err.code(), err),
    }
}

async fn cmd_search(
    request: SearchRequest,
    access_levels: AccessLevels,
    db_path: Option<&Path>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let settings = config.search_settings();
    if !settings.enabled {
        warn!("Issue tracker search is disabled (search.enabled = false)");
    }

    let db = open_database(&config, db_path, AccessMode::ReadOnly).await?;
    let service = SearchService::new(db.pool().clone(), settings);
    let results = service
        .search(&request, &access_levels)
        .await
        .map_err(report)?;
    db.close().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                if !quiet {
                    println!("No results.");
                }
            } else {
                print!("{}", render_results(&results));
                if !quiet {
                    println!();
                    println!("{} result(s)", results.len());
                }
            }
        }
    }

    Ok(())
}

/// Render results as text, one block per result
fn render_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for result in results {
        let section = result.section.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{}  [{}]  {}\n    {}\n",
            result.title,
            section,
            result.created.format("%Y-%m-%d %H:%M"),
            result.href
        ));
    }
    out
}

fn cmd_areas(format: OutputFormat) -> anyhow::Result<()> {
    let areas = SearchService::searchable_areas();

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = areas
                .iter()
                .map(|(key, label)| (key.to_string(), serde_json::Value::from(*label)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Text => {
            for (key, label) in areas {
                println!("{:<10} {}", key, label);
            }
        }
    }

    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.validate()?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(db_path: Option<&Path>, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Monitor Search Health Check");
        println!("===========================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
                if config.search.enabled {
                    println!("[OK] Search: Enabled");
                } else {
                    println!("[!!] Search: Disabled (search.enabled = false)");
                }
            }
            config
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            Config::default()
        }
    };

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check database
    match open_database(&config, db_path, AccessMode::ReadWrite).await {
        Ok(db) => {
            match db.health_check().await {
                Ok(()) => {
                    if !quiet {
                        println!("[OK] Database: Connected");
                        if let Some(path) = db.path() {
                            println!("     Path: {}", path.display());
                        }
                    }

                    match db.migration_status().await {
                        Ok(status) if status.needs_migration => {
                            all_ok = false;
                            if !quiet {
                                println!(
                                    "[!!] Database: Migrations pending (v{} -> v{})",
                                    status.current_version, status.target_version
                                );
                            }
                        }
                        Ok(status) => {
                            if !quiet {
                                println!("[OK] Database: Schema v{}", status.current_version);
                            }
                        }
                        Err(e) => {
                            all_ok = false;
                            if !quiet {
                                println!("[!!] Database: Migration check failed - {}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] Database: Health check failed - {}", e);
                    }
                }
            }
            db.close().await;
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: Failed to initialize - {}", e);
            }
        }
    }

    // Summary
    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    if all_ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Health check failed"))
    }
}
