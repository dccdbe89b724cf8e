//! Leadflow - service-lead workflow
//!
//! Command-line entry point: loads configuration, initializes logging and
//! dispatches one maintenance, query or import command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use leadflow_domain::{LeadUpdate, NewLead};
use leadflow_infra::config;
use leadflow_lib::commands::{imports, leads, maintenance};
use leadflow_lib::utils::logging::init_tracing;
use leadflow_lib::AppContext;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "leadflow", version, about = "Service-lead workflow")]
struct Cli {
    /// Configuration file (TOML or JSON); probed next to the binary when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Name recorded as the operator in notes and logs
    #[arg(long, global = true, env = "LEADFLOW_ACTOR")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply database migrations and exit
    Migrate,
    /// Report database, schema and channel health
    Health,
    /// Assign service numbers to servis leads missing one
    Backfill,
    /// Deliver notifications left pending
    Redeliver {
        #[arg(default_value_t = maintenance::DEFAULT_REDELIVER_LIMIT)]
        limit: usize,
    },
    /// Create or reconfigure the service-number counter
    Sequence {
        #[arg(long)]
        prefix: String,
        #[arg(long, default_value_t = 5)]
        padding: u32,
        #[arg(long)]
        company: Option<i64>,
        #[arg(long)]
        next: Option<i64>,
    },
    /// Create a lead from a JSON file
    Create { file: PathBuf },
    /// Apply a JSON change set to a lead
    Update { id: i64, file: PathBuf },
    /// Show a lead card
    Lead { id: i64 },
    /// List calls matching a lead's phone numbers
    Calls {
        id: i64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Lead count per stage
    Stages,
    /// Counters for one technician
    Usta { id: i64 },
    /// Import records from a JSON array file
    Import {
        #[command(subcommand)]
        kind: ImportKind,
    },
}

#[derive(Debug, Subcommand)]
enum ImportKind {
    Stages { file: PathBuf },
    Employees { file: PathBuf },
    Calls { file: PathBuf },
    Sales { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut config = config::load_from_file(Some(path.clone()))?;
            config::apply_env_overrides(&mut config)?;
            config
        }
        None => config::load()?,
    };
    init_tracing(&config.logging)?;

    let ctx = AppContext::new(config).context("failed to initialize application context")?;
    let actor = cli.actor.as_deref();

    match cli.command {
        Command::Migrate => print_json(&ctx.db.schema_version()?),
        Command::Health => {
            let status = maintenance::health(&ctx).await?;
            print_json(&status)?;
            if !status.is_healthy {
                anyhow::bail!(
                    "{}",
                    status.message.as_deref().unwrap_or("unhealthy")
                );
            }
            Ok(())
        }
        Command::Backfill => print_json(&maintenance::backfill_service_numbers(&ctx).await?),
        Command::Redeliver { limit } => {
            print_json(&maintenance::redeliver_notifications(&ctx, limit).await?)
        }
        Command::Sequence { prefix, padding, company, next } => {
            let setup = maintenance::SequenceSetup {
                company_id: company,
                prefix,
                padding,
                number_next: next,
            };
            maintenance::configure_sequence(&ctx, setup).await?;
            Ok(())
        }
        Command::Create { file } => {
            let new: NewLead = read_json(&file).await?;
            print_json(&leads::create_lead(&ctx, new, actor).await?)
        }
        Command::Update { id, file } => {
            let update: LeadUpdate = read_json(&file).await?;
            print_json(&leads::update_lead(&ctx, id, update, actor).await?)
        }
        Command::Lead { id } => print_json(&leads::lead_card(&ctx, id).await?),
        Command::Calls { id, limit } => print_json(&leads::lead_calls(&ctx, id, limit).await?),
        Command::Stages => print_json(&leads::stage_counts(&ctx).await?),
        Command::Usta { id } => print_json(&leads::technician_stats(&ctx, id).await?),
        Command::Import { kind } => {
            let imported = match kind {
                ImportKind::Stages { file } => imports::import_stages(&ctx, &file).await?,
                ImportKind::Employees { file } => imports::import_employees(&ctx, &file).await?,
                ImportKind::Calls { file } => imports::import_calls(&ctx, &file).await?,
                ImportKind::Sales { file } => imports::import_sales(&ctx, &file).await?,
            };
            print_json(&imported)
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
