use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod pipeline;
mod search;
mod watch;

#[derive(Debug, Parser)]
#[command(name = "fynd")]
#[command(about = "Blocket search, saved watches, and deal scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search listings for a query and print them
    Search {
        query: String,

        /// Restrict results to a location (repeatable)
        #[arg(long)]
        location: Vec<String>,

        /// Marketplace category id
        #[arg(long)]
        category: Option<String>,

        /// Write the run as a JSON artifact to the exports directory
        #[arg(long)]
        export: bool,
    },
    /// Manage saved watches
    Watch {
        #[command(subcommand)]
        command: watch::WatchCommands,
    },
    /// Run the full scoring pipeline for a query
    Pipeline {
        query: String,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// Hard location constraint (repeatable)
        #[arg(long)]
        location: Vec<String>,

        /// Only keep listings offering shipping
        #[arg(long)]
        require_shipping: bool,

        /// Requested condition: ny, som-ny, bra, ok, defekt
        #[arg(long)]
        condition: Option<String>,

        /// Soft preference criterion (repeatable): attribute=value,
        /// attribute>=n, attribute<=n, or attribute~text
        #[arg(long = "prefer", value_name = "CRITERION")]
        prefer: Vec<String>,

        /// Skip AI domain discovery and score directly
        #[arg(long)]
        no_discovery: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = fynd_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            location,
            category,
            export,
        } => search::run(&config, &query, location, category, export).await,
        Commands::Watch { command } => watch::run(&config, command).await,
        Commands::Pipeline {
            query,
            min_price,
            max_price,
            location,
            require_shipping,
            condition,
            prefer,
            no_discovery,
        } => {
            pipeline::run(
                &config,
                &query,
                pipeline::ProfileArgs {
                    min_price,
                    max_price,
                    locations: location,
                    require_shipping,
                    condition,
                    prefer,
                },
                no_discovery,
            )
            .await
        }
    }
}

/// Blocket client built from process configuration.
pub(crate) fn build_blocket_client(
    config: &fynd_core::AppConfig,
) -> anyhow::Result<fynd_blocket::BlocketClient> {
    fynd_blocket::BlocketClient::new(
        &config.blocket_base_url,
        config.blocket_request_timeout_secs,
        &config.blocket_user_agent,
        config.blocket_max_retries,
        config.blocket_retry_backoff_base_ms,
        config.blocket_max_pages,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Blocket client: {e}"))
}

pub(crate) fn print_listing(listing: &fynd_core::NormalizedListing) {
    let price = listing
        .price
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| format!("{:.0} {}", p.amount, p.currency));
    let location = listing.location.as_deref().unwrap_or("-");
    println!("{price:>12}  {location:<20}  {}", listing.title);
    println!("{:>12}  {}", "", listing.url);
}
