mod report;
mod seed;

use clap::{Parser, Subcommand};

use fbpulse_db::PgStore;
use fbpulse_enrich::{EnrichConfig, HttpEnricher};

#[derive(Debug, Parser)]
#[command(name = "fbpulse-cli")]
#[command(about = "Feedback insight command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replace all feedback with a deterministic 48-hour sample set.
    Seed,
    /// Run one enrichment pass over records still missing a summary.
    Enrich {
        /// Override the configured batch size.
        #[arg(long)]
        batch: Option<i64>,
    },
    /// Print top themes, recommendations, and 24h movement.
    Report {
        /// Day window (0 = all time).
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = fbpulse_core::load_app_config()?;
    let pool_config = fbpulse_db::PoolConfig::from_app_config(&config);
    let pool = fbpulse_db::connect_pool(&config.database_url, pool_config).await?;
    fbpulse_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Seed => {
            let count = seed::run(&pool).await?;
            println!("seeded {count} feedback records");
        }
        Commands::Enrich { batch } => {
            let store = PgStore::new(pool);
            let enricher = HttpEnricher::new(EnrichConfig::from_app_config(&config))?;
            let batch = batch.unwrap_or(config.enrich_batch_size);
            let outcome = fbpulse_enrich::enrich_pending(&store, &enricher, batch).await?;
            println!(
                "enriched {} records ({} failed)",
                outcome.enriched, outcome.failed
            );
        }
        Commands::Report { days } => {
            let store = PgStore::new(pool);
            report::run(&store, days).await?;
        }
    }

    Ok(())
}
