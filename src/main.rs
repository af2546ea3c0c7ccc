//! Chat Eval command line.
//!
//! `analyze` classifies a transcript, `accept-all` seeds human labels,
//! `progress` reports review coverage and `evaluate` scores a labeled dataset.

use anyhow::{Context, Result};
use chat_eval::adapters::{build_classifier, JsonFileStore};
use chat_eval::application::{
    AnalyzeConversationCommand, AnalyzeConversationHandler, EvaluateAccuracyCommand,
    EvaluateAccuracyHandler,
};
use chat_eval::config::{AiProvider, AppConfig};
use chat_eval::domain::classification::DatasetRow;
use chat_eval::domain::labeling::LabelingSession;
use chat_eval::ports::{Artifact, DatasetSource, MessageSource, ReportSink};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Machine columns a dataset needs before it can be reviewed.
const MACHINE_COLUMNS: [&str; 3] = ["llm_sentiment", "llm_topic", "llm_answered"];

#[derive(Parser)]
#[command(name = "chat-eval")]
#[command(about = "Measure LLM versus human label agreement on support chats", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every message of a transcript
    Analyze {
        /// Transcript JSON (`{"messages": [...]}` or a bare array)
        #[arg(short, long)]
        input: PathBuf,

        /// Dataset JSON to write
        #[arg(short, long)]
        output: PathBuf,

        /// Overrides CHAT_EVAL__AI__PROVIDER
        #[arg(long)]
        provider: Option<AiProvider>,
    },

    /// Score a labeled dataset
    Evaluate {
        #[arg(short, long)]
        input: PathBuf,

        /// Metrics JSON to write
        #[arg(short, long)]
        report: PathBuf,

        /// Confusion matrices JSON to write
        #[arg(long)]
        confusion: Option<PathBuf>,

        /// Markdown report to write
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Per-row correctness JSON to write
        #[arg(long)]
        detailed: Option<PathBuf>,
    },

    /// Show how much of a dataset carries human labels
    Progress {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Copy machine labels into the manual columns of every unlabeled row
    AcceptAll {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "chat_eval=debug" } else { "chat_eval=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Flips to true on Ctrl-C; the analyzer stops after the message in flight.
fn cancellation_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current message");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn analyze(input: PathBuf, output: PathBuf, provider: Option<AiProvider>) -> Result<()> {
    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(provider) = provider {
        config.ai.provider = provider;
    }
    config.validate().context("invalid configuration")?;

    let store = JsonFileStore::new();
    let messages = store
        .load_messages(&input)
        .await
        .with_context(|| format!("reading transcript {}", input.display()))?;

    let classifier = build_classifier(&config.ai).context("building classifier")?;
    let handler = AnalyzeConversationHandler::new(classifier, config.classification.clone());

    let result = handler
        .handle(AnalyzeConversationCommand { messages }, cancellation_on_ctrl_c())
        .await
        .context("analysis failed")?;

    store
        .persist(Artifact::Dataset(&result.rows), &output)
        .await
        .with_context(|| format!("writing dataset {}", output.display()))?;

    println!("{}", serde_json::to_string_pretty(&result.summary)?);
    for (kind, counts) in &result.distributions {
        println!("{}:", kind);
        for (label, count) in counts {
            println!("  {:<22} {}", label, count);
        }
    }
    if result.summary.cancelled {
        warn!(
            processed = result.rows.len(),
            total = result.summary.total,
            "run was cancelled; dataset is partial"
        );
    }
    Ok(())
}

async fn evaluate(
    input: PathBuf,
    report: PathBuf,
    confusion: Option<PathBuf>,
    markdown: Option<PathBuf>,
    detailed: Option<PathBuf>,
) -> Result<()> {
    let store = Arc::new(JsonFileStore::new());
    let handler = EvaluateAccuracyHandler::new(store.clone(), store);

    let report = handler
        .handle(EvaluateAccuracyCommand {
            input,
            report,
            confusion,
            markdown,
            detailed,
        })
        .await
        .context("evaluation failed")?;

    println!(
        "evaluated {} rows ({} excluded)",
        report.evaluated_rows, report.excluded_rows
    );
    for (kind, category) in &report.categories {
        let verdict = match category.gap {
            None => "target met".to_string(),
            Some(gap) => format!("{:.1} points below target", gap * 100.0),
        };
        println!(
            "{:<10} accuracy {:>6.2}%  f1 {:.3}  {}",
            kind.as_str(),
            category.metrics.accuracy * 100.0,
            category.metrics.f1,
            verdict
        );
    }
    println!("overall    accuracy {:>6.2}%", report.overall_accuracy * 100.0);
    Ok(())
}

async fn load_session(input: &Path) -> Result<LabelingSession> {
    let rows: Vec<DatasetRow> = JsonFileStore::new()
        .load_dataset(input, &MACHINE_COLUMNS)
        .await
        .with_context(|| format!("reading dataset {}", input.display()))?;

    let mut session = LabelingSession::new();
    session.resume(rows)?;
    Ok(session)
}

async fn progress(input: PathBuf) -> Result<()> {
    let session = load_session(&input).await?;
    let progress = session.progress();
    println!(
        "{}/{} labeled ({:.1}%)",
        progress.labeled,
        progress.total,
        progress.percent()
    );
    Ok(())
}

async fn accept_all(input: PathBuf, output: PathBuf) -> Result<()> {
    let mut session = load_session(&input).await?;
    let accepted = session.accept_remaining()?;
    let rows = session.to_dataset();

    JsonFileStore::new()
        .persist(Artifact::Dataset(&rows), &output)
        .await
        .with_context(|| format!("writing dataset {}", output.display()))?;

    let progress = session.progress();
    info!(accepted, labeled = progress.labeled, total = progress.total, "machine labels accepted");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs, cli.verbose);

    match cli.command {
        Commands::Analyze {
            input,
            output,
            provider,
        } => analyze(input, output, provider).await,
        Commands::Evaluate {
            input,
            report,
            confusion,
            markdown,
            detailed,
        } => evaluate(input, report, confusion, markdown, detailed).await,
        Commands::Progress { input } => progress(input).await,
        Commands::AcceptAll { input, output } => accept_all(input, output).await,
    }
}
