use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use data_alchemist::{
    load_bundle, validate_selected, AdvisorConfig, AllocationConfig, BundleReport, EntityKind,
    Severity, ValidationIssue,
};

/// Command-line arguments for data-alchemist
#[derive(Parser, Debug)]
#[command(name = "data-alchemist")]
#[command(about = "Validate client / worker / task datasets before allocation export")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate datasets and print the verdict
    Validate(ValidateArgs),
    /// List the required columns of each dataset
    Columns,
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    /// Clients file (.csv or .json)
    #[arg(long, env = "ALCHEMIST_CLIENTS")]
    clients: Option<PathBuf>,

    /// Workers file (.csv or .json)
    #[arg(long, env = "ALCHEMIST_WORKERS")]
    workers: Option<PathBuf>,

    /// Tasks file (.csv or .json)
    #[arg(long, env = "ALCHEMIST_TASKS")]
    tasks: Option<PathBuf>,

    /// Only validate this dataset (defaults to every dataset given)
    #[arg(long, env = "ALCHEMIST_KIND", value_parser = parse_kind)]
    kind: Option<EntityKind>,

    /// Rules + priorities JSON, carried into the report untouched
    #[arg(long, env = "ALCHEMIST_RULES")]
    rules: Option<PathBuf>,

    /// Advisory oracle endpoint; unset disables advisory checks
    #[arg(long, env = "ALCHEMIST_ADVISORY_URL")]
    advisory_url: Option<String>,

    /// Per-request timeout for the advisory oracle
    #[arg(long, default_value = "30", env = "ALCHEMIST_ADVISORY_TIMEOUT_SECS")]
    advisory_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "ALCHEMIST_FORMAT")]
    format: OutputFormat,

    /// Exit with status 2 when the bundle is not ready for export
    #[arg(long, env = "ALCHEMIST_STRICT")]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_kind(s: &str) -> Result<EntityKind> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "data_alchemist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Validate(validate_args) => run_validate(validate_args).await,
        Command::Columns => {
            run_columns();
            Ok(())
        }
    }
}

fn run_columns() {
    for kind in EntityKind::ALL {
        println!("{}: {}", kind, kind.required_fields().join(", "));
    }
}

async fn run_validate(args: ValidateArgs) -> Result<()> {
    let bundle = load_bundle(
        args.clients.as_deref(),
        args.workers.as_deref(),
        args.tasks.as_deref(),
    )?;

    let kinds: Vec<EntityKind> = match args.kind {
        Some(kind) => vec![kind],
        None => [
            (EntityKind::Clients, args.clients.is_some()),
            (EntityKind::Workers, args.workers.is_some()),
            (EntityKind::Tasks, args.tasks.is_some()),
        ]
        .into_iter()
        .filter(|(_, given)| *given)
        .map(|(kind, _)| kind)
        .collect(),
    };

    if kinds.is_empty() {
        anyhow::bail!("Nothing to validate: pass at least one of --clients, --workers, --tasks");
    }

    let advisor = AdvisorConfig::new(args.advisory_url, args.advisory_timeout_secs)
        .build()
        .context("Failed to set up advisory oracle")?;

    let mut report = validate_selected(&kinds, &bundle, advisor.as_ref()).await;
    if let Some(path) = &args.rules {
        report = report.with_allocation(AllocationConfig::from_file(path)?);
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_report(&report),
    }

    if args.strict && !report.ready_for_export {
        std::process::exit(2);
    }

    Ok(())
}

fn print_issue(issue: &ValidationIssue) {
    let icon = match issue.severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
    };
    let location = match (issue.row, issue.column.as_str()) {
        (0, "") => "dataset".to_string(),
        (0, column) => column.to_string(),
        (row, "") => format!("row {}", row),
        (row, column) => format!("row {} / {}", row, column),
    };

    println!("   {} [{}] {}", icon, location, issue.message);
    if let Some(suggestion) = &issue.suggestion {
        println!("      💡 {}", suggestion);
    }
}

fn print_report(report: &BundleReport) {
    println!("✨ Data Alchemist - Validation Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for dataset in &report.datasets {
        let result = &dataset.result;
        let status = if result.is_valid { "✅" } else { "❌" };

        println!("\n{} {}", status, dataset.kind);
        println!("   {}", result.summary_line());
        for issue in result.errors.iter().chain(result.warnings.iter()) {
            print_issue(issue);
        }
    }

    if let Some(allocation) = &report.allocation {
        println!(
            "\n⚙️  {} business rules carried through (priority weights total {})",
            allocation.rules.len(),
            allocation.priorities.total_weight()
        );
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.ready_for_export {
        println!("🎉 {}", report.summary());
    } else {
        println!("🚫 {}", report.summary());
    }
}
