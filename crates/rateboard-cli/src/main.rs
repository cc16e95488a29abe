use clap::{Parser, Subcommand};
use rateboard_core::{estimate_prices, normalize_username, ProfileEstimate, Tier};
use rateboard_scraper::{ChromeLauncher, FetcherSettings, ProfileFetcher, ProfileSource};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rateboard-cli")]
#[command(about = "Influencer rate estimates from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a public profile and print its JSON estimate
    Estimate {
        /// Profile handle, with or without a leading @
        username: String,
    },
    /// Print post and story prices for a follower count
    Price {
        followers: u64,
    },
    /// Convert a display count such as "12.3K" into an integer
    ParseCount {
        display: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate { username } => run_estimate(&username).await?,
        Commands::Price { followers } => {
            println!("{}", serde_json::to_string_pretty(&price_report(followers))?);
        }
        Commands::ParseCount { display } => {
            let count = rateboard_core::try_parse_count(&display)
                .ok_or_else(|| anyhow::anyhow!("\"{display}\" is not a recognisable count"))?;
            println!("{count}");
        }
    }

    Ok(())
}

fn price_report(followers: u64) -> serde_json::Value {
    let prices = estimate_prices(followers);
    serde_json::json!({
        "followers": followers,
        "tier": Tier::for_followers(followers),
        "postPrice": prices.post_price,
        "storyPrice": prices.story_price,
    })
}

async fn run_estimate(raw_username: &str) -> anyhow::Result<()> {
    let username = normalize_username(raw_username)
        .ok_or_else(|| anyhow::anyhow!("username is required"))?;

    let config = rateboard_core::load_app_config()?;
    // stdout carries the JSON estimate.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let fetcher = ProfileFetcher::new(
        ChromeLauncher::new(config.browser.clone()),
        FetcherSettings::from_app_config(&config),
    );
    tracing::info!(username = %username, "fetching profile");
    let snapshot = fetcher.fetch(&username).await?;

    let estimate = ProfileEstimate::from(snapshot);
    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
