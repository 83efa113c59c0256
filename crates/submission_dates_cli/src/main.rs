//! Command-line driver for the submission dates store.
//!
//! # Responsibility
//! - Expose store operations for scripting and manual inspection.
//! - Print results as JSON on stdout; errors go to stderr with exit code 1.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;
use std::path::PathBuf;
use submission_dates_core::db::open_db;
use submission_dates_core::{
    core_version, SqliteSubmissionDatesRepository, StoreConfig, SubmissionDatesService,
    SubmissionParams, METADATA_FORM_ID,
};

/// Record and inspect received/revised/accepted dates per resource.
#[derive(Parser, Debug)]
#[command(name = "submission-dates", version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "submission_dates.sqlite3")]
    db: PathBuf,

    /// JSON store configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for log files (overrides config)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the dates recorded for a resource
    Get { resource_id: String },

    /// Set one date field
    Set {
        resource_id: String,
        /// received, revised or accepted
        field: String,
        /// Date as YYYY-MM-DD
        value: String,
    },

    /// Clear one date field
    Clear { resource_id: String, field: String },

    /// Apply form parameters given as KEY=VALUE; an empty VALUE clears
    Submit {
        resource_id: String,
        #[arg(value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Import metadata tags given as TAG=TEXT
    Import {
        resource_id: String,
        #[arg(value_parser = parse_key_value)]
        tags: Vec<(String, String)>,
    },

    /// Print the API schema declaration for the date fields
    Schema,

    /// Print the edit-form inputs for a resource
    Form {
        resource_id: String,
        #[arg(long, default_value = METADATA_FORM_ID)]
        form_id: String,
    },

    /// Delete the dates of a removed resource
    Delete { resource_id: String },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    config.init_logging()?;
    info!(
        "event=cli_start module=cli status=ok version={} command={:?}",
        core_version(),
        cli.command
    );

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteSubmissionDatesRepository::try_new(&conn)?;
    let service = SubmissionDatesService::with_config(repo, &config);

    let output = match cli.command {
        Commands::Get { resource_id } => serde_json::to_value(service.get_fields(&resource_id)?)?,
        Commands::Set {
            resource_id,
            field,
            value,
        } => {
            service.set_field(&resource_id, &field, Some(value.as_str()))?;
            serde_json::to_value(service.get_fields(&resource_id)?)?
        }
        Commands::Clear { resource_id, field } => {
            service.set_field(&resource_id, &field, None)?;
            serde_json::to_value(service.get_fields(&resource_id)?)?
        }
        Commands::Submit {
            resource_id,
            params,
        } => {
            let params: SubmissionParams = params
                .into_iter()
                .map(|(key, value)| (key, Some(value).filter(|v| !v.is_empty())))
                .collect();
            serde_json::to_value(service.apply_submission(&resource_id, &params)?)?
        }
        Commands::Import { resource_id, tags } => {
            let report = service.import_tags(
                &resource_id,
                tags.iter().map(|(tag, text)| (tag.as_str(), text.as_str())),
            );
            json!({
                "applied": report.applied,
                "ignored": report.ignored,
                "rejected": report
                    .rejected
                    .iter()
                    .map(|err| err.to_string())
                    .collect::<Vec<_>>(),
                "record": service.get_fields(&resource_id)?,
            })
        }
        Commands::Schema => serde_json::to_value(service.describe_schema())?,
        Commands::Form {
            resource_id,
            form_id,
        } => serde_json::to_value(service.form_fields(&form_id, &resource_id)?)?,
        Commands::Delete { resource_id } => {
            json!({ "deleted": service.delete_for_resource(&resource_id)? })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config `{}`", path.display()))?;
            StoreConfig::from_json_str(&raw)?
        }
        None => StoreConfig::default(),
    };

    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}
