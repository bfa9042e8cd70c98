use anyhow::{Context, Result};
use beltscraper::{
    config::Settings,
    pipeline::Pipeline,
    store::{ChampionStore, Namespace, SqliteStore},
    summary::{records_in_category, StandingsSummary},
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "beltscraper", about = "Boxing championship standings ETL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the standings page once and replace the stored snapshot.
    Run,
    /// Print categories and vacant-title counts from the stored snapshot.
    Summary {
        /// Also list the champions of one weight class.
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    // ─── 2) configuration ────────────────────────────────────────────
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Run => run(&settings).await,
        Command::Summary { category } => summary(&settings, category.as_deref()),
    }
}

async fn run(settings: &Settings) -> Result<()> {
    info!(source = %settings.source_url, "local pipeline run");
    let store = SqliteStore::open(&settings.store_uri, Namespace::default())
        .context("opening document store")?;
    let pipeline = Pipeline::from_settings(settings, store)?;

    let outcome = pipeline.run().await;
    println!("{} ({})", outcome.message, outcome.status);
    if !outcome.is_success() {
        anyhow::bail!("pipeline run failed with status {}", outcome.status);
    }
    Ok(())
}

fn summary(settings: &Settings, category: Option<&str>) -> Result<()> {
    // One handle for every read below.
    let store = SqliteStore::open(&settings.store_uri, Namespace::default())
        .context("opening document store")?;
    let records = store.find_all().context("reading standings")?;

    let summary = StandingsSummary::from_records(&records);
    print!("{}", summary);

    match category {
        Some(cat) => {
            println!("\nChampions in: {}", cat);
            for r in records_in_category(&records, cat) {
                println!(
                    "  WBA: {:<24} WBC: {:<24} IBF: {:<24} WBO: {:<24} The Ring: {}",
                    r.wba, r.wbc, r.ibf, r.wbo, r.the_ring
                );
            }
        }
        None => {
            println!("\nCategories:");
            for c in &summary.categories {
                println!("  {}", c);
            }
        }
    }
    Ok(())
}
