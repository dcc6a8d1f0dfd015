use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fakescan_core::{format_count, format_created_at, AppConfig};
use fakescan_model::{Classifier, EnsembleParams, ModelSummary};
use fakescan_pipeline::Analysis;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fakescan-cli")]
#[command(about = "Fake account detection command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify one account, using the cache when it is fresh
    Analyze {
        username: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Train the ensemble and report accuracy on the training corpus
    Evaluate {
        #[arg(long, env = "FAKESCAN_GENUINE_DATASET", default_value = "./data/users.csv")]
        genuine: PathBuf,

        #[arg(long, env = "FAKESCAN_FAKE_DATASET", default_value = "./data/fusers.csv")]
        fake: PathBuf,

        #[arg(long, env = "FAKESCAN_MODEL_SEED", default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze { username, json }) => run_analyze(&username, json).await,
        Some(Commands::Db { command }) => run_db(command).await,
        Some(Commands::Evaluate {
            genuine,
            fake,
            seed,
        }) => run_evaluate(genuine, fake, seed).await,
        None => {
            println!("fakescan-cli: try `fakescan-cli --help`");
            Ok(())
        }
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = fakescan_db::PoolConfig::from_app_config(config);
    fakescan_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")
}

async fn run_analyze(username: &str, json: bool) -> anyhow::Result<()> {
    let config = Arc::new(fakescan_core::load_app_config()?);
    let pool = connect(&config).await?;

    let training_config = Arc::clone(&config);
    let classifier =
        tokio::task::spawn_blocking(move || fakescan_pipeline::train_classifier(&training_config))
            .await
            .context("training task panicked")?
            .context("failed to train classifier")?;

    let analyzer = fakescan_pipeline::build_analyzer(&config, pool, Arc::new(classifier))?;
    let analysis = analyzer.analyze(username).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis_json(&analysis))?);
    } else {
        print!("{}", render_analysis(&analysis));
    }
    Ok(())
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = fakescan_core::load_app_config()?;
    let pool = connect(&config).await?;
    match command {
        DbCommands::Ping => {
            fakescan_db::ping(&pool).await?;
            println!("database: ok");
        }
        DbCommands::Migrate => {
            let applied = fakescan_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

async fn run_evaluate(genuine: PathBuf, fake: PathBuf, seed: u64) -> anyhow::Result<()> {
    let classifier = tokio::task::spawn_blocking(move || {
        Classifier::from_datasets(&genuine, &fake, &EnsembleParams::with_seed(seed))
    })
    .await
    .context("training task panicked")?
    .context("failed to train classifier")?;

    print!("{}", render_summary(classifier.summary()));
    Ok(())
}

fn analysis_json(analysis: &Analysis) -> serde_json::Value {
    serde_json::json!({
        "username": analysis.record.username,
        "prediction": analysis.result.label,
        "confidence": analysis.result.confidence,
        "source": analysis.result.source,
        "account": analysis.record,
    })
}

fn render_analysis(analysis: &Analysis) -> String {
    let record = &analysis.record;
    let count = |value: Option<i64>| value.map_or_else(|| "N/A".to_string(), format_count);
    let rows = [
        ("source", analysis.result.source.display_name().to_string()),
        ("followers", count(record.followers_count)),
        ("following", count(record.friends_count)),
        ("tweets", count(record.statuses_count)),
        ("listed", count(record.listed_count)),
        ("created", format_created_at(&record.created_at)),
        ("verified", if record.verified { "yes" } else { "no" }.to_string()),
    ];

    let mut out = format!(
        "@{}: {} ({:.1}% confidence)\n",
        record.username, analysis.result.label, analysis.result.confidence
    );
    for (name, value) in rows {
        out.push_str(&format!("  {:<10} {value}\n", format!("{name}:")));
    }
    out
}

fn render_summary(summary: &ModelSummary) -> String {
    let learners = summary
        .learners
        .iter()
        .map(|learner| (learner.name, learner.training_accuracy))
        .chain(std::iter::once((
            "soft_vote",
            summary.ensemble_training_accuracy,
        )));

    let mut out = format!(
        "corpus: {} genuine, {} fake\n",
        summary.genuine_samples, summary.fake_samples
    );
    for (name, accuracy) in learners {
        out.push_str(&format!("  {name:<20} {:>6.2}%\n", accuracy * 100.0));
    }
    out
}
