mod analyze;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "marketpulse-cli")]
#[command(about = "Financial news sentiment analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch recent news for a topic and classify each article's market sentiment
    Analyze {
        /// Company, ticker, asset or theme to search news for
        #[arg(long)]
        topic: String,

        /// Number of articles to analyze (defaults to MARKETPULSE_DEFAULT_ARTICLES)
        #[arg(long)]
        count: Option<usize>,

        /// Print the raw JSON report instead of the text summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("marketpulse-cli: run `marketpulse-cli analyze --topic <TOPIC>`; see --help");
        return Ok(());
    };

    let config = marketpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Analyze { topic, count, json } => {
            analyze::run_analyze(&config, &topic, count, json).await?;
        }
    }

    Ok(())
}
