//! orgdiff CLI - compare aggregate metrics across two org connections
//!
//! Usage:
//!   orgdiff plan --object <name> --metric <token>... --schema <describe.json>
//!   orgdiff validate --object <name> --metric <token>... --schema <describe.json>
//!   orgdiff compare --object <name> --metric <token>... \
//!       --source-schema <describe.json> --target-schema <describe.json> \
//!       --source-results <results.json> --target-results <results.json>
//!   orgdiff cache clear
//!
//! `plan` and `validate` work entirely offline from a captured describe
//! payload. `compare` replays captured aggregate results through the full
//! pipeline; a live transport drives the same library API instead.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use orgdiff::cache::MetadataCache;
use orgdiff::compare::{run_comparison, CompareOptions, Environment};
use orgdiff::config::Settings;
use orgdiff::exec::FixtureExecutor;
use orgdiff::metric;
use orgdiff::plan;
use orgdiff::report::{render, ReportFormat};
use orgdiff::schema::{SchemaProvider, StaticSchemaProvider};

#[derive(Parser)]
#[command(name = "orgdiff")]
#[command(about = "orgdiff - Reconcile aggregate metrics across two org connections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile metrics into aggregate queries without executing them
    Plan {
        /// Object API name
        #[arg(short, long)]
        object: String,

        /// Metric token (repeatable, or comma-joined)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,

        /// Base filter applied to every query
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Path to a captured describe JSON for the object
        #[arg(short, long)]
        schema: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "queries")]
        format: PlanFormat,
    },

    /// Validate metric tokens against a describe payload
    Validate {
        /// Object API name
        #[arg(short, long)]
        object: String,

        /// Metric token (repeatable, or comma-joined)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,

        /// Path to a captured describe JSON for the object
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Run the full comparison pipeline from captured results
    Compare {
        /// Object API name
        #[arg(short, long)]
        object: String,

        /// Metric token (repeatable, or comma-joined)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,

        /// Base filter applied to every query
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Source environment describe JSON
        #[arg(long)]
        source_schema: PathBuf,

        /// Target environment describe JSON
        #[arg(long)]
        target_schema: PathBuf,

        /// Source environment captured results JSON
        #[arg(long)]
        source_results: PathBuf,

        /// Target environment captured results JSON
        #[arg(long)]
        target_results: PathBuf,

        /// Sample matching rows (0 = use the configured default limit)
        #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
        sample: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Manage the describe cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove every cached describe snapshot
    Clear,
}

#[derive(Clone, ValueEnum)]
enum PlanFormat {
    /// The query strings, one per line
    Queries,
    /// The full plan as JSON
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(arg: OutputFormat) -> Self {
        match arg {
            OutputFormat::Table => ReportFormat::Table,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            object,
            metrics,
            filter,
            schema,
            format,
        } => cmd_plan(object, metrics, filter, schema, format).await,
        Commands::Validate {
            object,
            metrics,
            schema,
        } => cmd_validate(object, metrics, schema).await,
        Commands::Compare {
            object,
            metrics,
            filter,
            source_schema,
            target_schema,
            source_results,
            target_results,
            sample,
            format,
        } => {
            cmd_compare(
                object,
                metrics,
                filter,
                source_schema,
                target_schema,
                source_results,
                target_results,
                sample,
                format,
            )
            .await
        }
        Commands::Cache { command } => cmd_cache(command),
    }
}

async fn resolve_offline(
    object: &str,
    metrics: &[String],
    schema_path: &PathBuf,
) -> Result<Vec<orgdiff::metric::ResolvedMetric>, String> {
    let provider = StaticSchemaProvider::from_json_file(schema_path)
        .map_err(|e| format!("Error reading '{}': {}", schema_path.display(), e))?;
    let schema = provider
        .describe_object(object)
        .await
        .map_err(|e| e.to_string())?;
    let parsed = metric::parse(metrics).map_err(|e| e.to_string())?;
    metric::validate(&parsed, &schema, "schema").map_err(|e| e.to_string())
}

async fn cmd_plan(
    object: String,
    metrics: Vec<String>,
    filter: Option<String>,
    schema: PathBuf,
    format: PlanFormat,
) -> ExitCode {
    let resolved = match resolve_offline(&object, &metrics, &schema).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let plan = match plan::compile(&object, &resolved, filter.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        PlanFormat::Queries => {
            for query in plan.aggregate_queries() {
                println!("{}", query);
            }
        }
        PlanFormat::Json => match serde_json::to_string_pretty(&plan) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing plan: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

async fn cmd_validate(object: String, metrics: Vec<String>, schema: PathBuf) -> ExitCode {
    match resolve_offline(&object, &metrics, &schema).await {
        Ok(resolved) => {
            for metric in &resolved {
                let value_type = match metric.value_type {
                    orgdiff::metric::ValueType::Number => "number",
                    orgdiff::metric::ValueType::Date => "date",
                };
                println!("{}  ({})", metric, value_type);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_compare(
    object: String,
    metrics: Vec<String>,
    filter: Option<String>,
    source_schema: PathBuf,
    target_schema: PathBuf,
    source_results: PathBuf,
    target_results: PathBuf,
    sample: Option<usize>,
    format: OutputFormat,
) -> ExitCode {
    let settings = match Settings::load_or_default() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let load_provider = |path: &PathBuf| {
        StaticSchemaProvider::from_json_file(path)
            .map_err(|e| format!("Error reading '{}': {}", path.display(), e))
    };
    let load_executor = |path: &PathBuf| {
        FixtureExecutor::from_json_file(path)
            .map_err(|e| format!("Error reading '{}': {}", path.display(), e))
    };

    let (source_provider, target_provider) =
        match (load_provider(&source_schema), load_provider(&target_schema)) {
            (Ok(s), Ok(t)) => (s, t),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
    let (source_executor, target_executor) = match (
        load_executor(&source_results),
        load_executor(&target_results),
    ) {
        (Ok(s), Ok(t)) => (s, t),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // --sample with no count falls back to the configured default.
    let sample = sample.map(|n| {
        if n == 0 {
            settings.defaults.sample_limit
        } else {
            n
        }
    });

    let options = CompareOptions {
        object,
        metrics,
        filter,
        sample,
    };
    let source = Environment {
        label: "source",
        schema: &source_provider,
        executor: &source_executor,
    };
    let target = Environment {
        label: "target",
        schema: &target_provider,
        executor: &target_executor,
    };

    match run_comparison(&options, &source, &target).await {
        Ok(outcome) => {
            print!("{}", render(&outcome.rows, format.into()));
            if let (Some(s), Some(t)) = (&outcome.source_samples, &outcome.target_samples) {
                println!();
                println!("Source samples: {}", serde_json::to_string(s).unwrap_or_default());
                println!("Target samples: {}", serde_json::to_string(t).unwrap_or_default());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Comparison failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_cache(command: CacheCommands) -> ExitCode {
    match command {
        CacheCommands::Clear => match MetadataCache::open().and_then(|c| c.clear_all()) {
            Ok(()) => {
                println!("Describe cache cleared");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error clearing cache: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
