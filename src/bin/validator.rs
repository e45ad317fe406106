//! Wiremap Validator CLI
//!
//! Checks component dependencies and mapping integrity over a persisted
//! collection document.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wiremap::config::{OutputFormat, WiremapConfig};
use wiremap::{
    all_missing_mappings, check_dependencies, clean_orphaned_mappings, store, validate_mappings,
    Collection,
};

#[derive(Parser)]
#[command(name = "wiremap-validator")]
#[command(about = "Check component dependencies and mapping integrity")]
struct Cli {
    /// Path to the collection document (overrides configuration)
    #[arg(short, long)]
    collection: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one component's dependencies (by id or name)
    Check {
        /// Component id or name
        component: String,
    },

    /// Run the collection-wide mapping integrity pass
    Integrity {
        /// Treat warnings as blocking
        #[arg(long)]
        strict: bool,
    },

    /// List every missing mapping across the collection
    Missing,

    /// Strip references to a deleted component and rewrite the document
    Clean {
        /// Id of the deleted component
        deleted_id: String,
        /// Write the cleaned document here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a JSON governance report
    Report {
        /// Output file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = WiremapConfig::load_from(cli.config.as_deref())?;
    let path = cli
        .collection
        .clone()
        .unwrap_or_else(|| config.collection.path.clone());
    let collection = store::load(&path)?;

    match cli.command {
        Commands::Check { component } => {
            let resolved = collection
                .resolve(&component)
                .ok_or_else(|| format!("No component matches '{}'", component))?;

            let report = check_dependencies(&resolved.id, collection.components())?;

            if !report.has_missing_dependencies {
                println!("✅ {} - all dependencies satisfied", resolved.name);
                return Ok(());
            }

            println!(
                "❌ {} - {} missing field(s):",
                resolved.name,
                report.missing_fields.len()
            );
            for missing in &report.missing_fields {
                let from = collection
                    .find(&missing.from)
                    .map(|c| c.name.as_str())
                    .unwrap_or(missing.from.as_str());
                match &missing.message {
                    Some(message) => {
                        println!("  └─ {} (from {}): {}", missing.path, from, message)
                    }
                    None => println!("  └─ {} (from {})", missing.path, from),
                }
            }
            std::process::exit(1);
        }

        Commands::Integrity { strict } => {
            let report = validate_mappings(collection.components());
            let strict = strict || config.validation.strict;

            if report.is_empty() {
                println!("✅ Mapping integrity - no issues in {} component(s)", collection.len());
                return Ok(());
            }

            print!("{}", report);

            if report.has_errors() || (strict && report.warning_count() > 0) {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Missing => {
            let rows = all_missing_mappings(collection.components())?;

            if rows.is_empty() {
                println!("✅ No missing mappings detected");
                return Ok(());
            }

            println!("❌ {} missing mapping(s):", rows.len());
            for row in &rows {
                match &row.message {
                    Some(message) => println!(
                        "  {} needs {} (required by {}): {}",
                        row.component_name, row.missing_field, row.from_component, message
                    ),
                    None => println!(
                        "  {} needs {} (required by {})",
                        row.component_name, row.missing_field, row.from_component
                    ),
                }
            }
            std::process::exit(1);
        }

        Commands::Clean { deleted_id, output } => {
            let cleaned = clean_orphaned_mappings(collection.components(), &deleted_id);
            let target = output.unwrap_or(path);
            let pretty = config.output.format == OutputFormat::Pretty;
            store::save(&target, &cleaned, pretty)?;
            println!(
                "✅ Cleaned references to {} across {} component(s), wrote {:?}",
                deleted_id,
                cleaned.len(),
                target
            );
            Ok(())
        }

        Commands::Report { output } => {
            let report = build_report(&collection)?;
            let report_json = serde_json::to_string_pretty(&report)?;

            if let Some(path) = output {
                std::fs::write(&path, &report_json)?;
                println!("✅ Report written to {:?}", path);
            } else {
                println!("{}", report_json);
            }
            Ok(())
        }
    }
}

fn build_report(collection: &Collection) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let integrity = validate_mappings(collection.components());
    let missing = all_missing_mappings(collection.components())?;

    Ok(serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "fingerprint": collection.fingerprint().as_str(),
        "components": collection.len(),
        "integrity": {
            "errors": integrity.error_count(),
            "warnings": integrity.warning_count(),
            "issues": integrity.all(),
        },
        "missing_mappings": missing,
    }))
}
