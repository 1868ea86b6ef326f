//! `fynd watch` — saved-watch management and runs.

use clap::Subcommand;
use uuid::Uuid;

use fynd_core::{AppConfig, ExportMode, PreferenceProfile, SearchFilters};
use fynd_pipeline::{watch_export, ExportWriter};

#[derive(Debug, Subcommand)]
pub(crate) enum WatchCommands {
    /// Save a new watch
    Add {
        query: String,

        /// Display name for the watch
        #[arg(long)]
        name: Option<String>,

        /// Search location (repeatable)
        #[arg(long)]
        location: Vec<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// Only keep listings offering shipping
        #[arg(long)]
        require_shipping: bool,
    },
    /// List saved watches
    List,
    /// Delete a watch and its seen history
    Delete { id: Uuid },
    /// Re-run a watch against the marketplace
    Run {
        id: Uuid,

        /// Only report listings not seen in earlier runs
        #[arg(long)]
        delta: bool,

        /// Write the run as a JSON artifact to the exports directory
        #[arg(long)]
        export: bool,
    },
}

pub(crate) async fn run(config: &AppConfig, command: WatchCommands) -> anyhow::Result<()> {
    let pool_config = fynd_db::PoolConfig::from_app_config(config);
    let pool = fynd_db::connect_pool(&config.database_url, pool_config).await?;
    fynd_db::run_migrations(&pool).await?;

    match command {
        WatchCommands::Add {
            query,
            name,
            location,
            min_price,
            max_price,
            require_shipping,
        } => {
            let filters = SearchFilters {
                locations: location.clone(),
                category: None,
                sort_order: None,
            };
            let preferences = PreferenceProfile {
                min_price,
                max_price,
                locations: location,
                require_shipping,
                ..PreferenceProfile::default()
            };
            let watch =
                fynd_db::create_watch(&pool, name.as_deref(), &query, &filters, &preferences)
                    .await?;
            println!("created watch {} for '{}'", watch.id, watch.query);
        }
        WatchCommands::List => {
            let watches = fynd_db::list_watches(&pool).await?;
            if watches.is_empty() {
                println!("no watches saved");
            }
            for watch in watches {
                println!(
                    "{}  {:<24}  '{}'",
                    watch.id,
                    watch.name.as_deref().unwrap_or("-"),
                    watch.query
                );
            }
        }
        WatchCommands::Delete { id } => {
            if fynd_db::delete_watch(&pool, id).await? {
                println!("deleted watch {id}");
            } else {
                anyhow::bail!("watch {id} not found");
            }
        }
        WatchCommands::Run { id, delta, export } => {
            let client = crate::build_blocket_client(config)?;
            let mode = if delta {
                ExportMode::Delta
            } else {
                ExportMode::Full
            };

            let run = fynd_pipeline::run_watch(&pool, &client, id, mode).await?;
            for listing in &run.listings {
                crate::print_listing(listing);
            }
            println!(
                "\nwatch '{}': {} new, {} already seen",
                run.watch.name.as_deref().unwrap_or(&run.watch.query),
                run.new_count,
                run.seen_count
            );

            if export {
                let artifact = watch_export(run);
                let path = ExportWriter::new(&config.exports_dir).write(&artifact)?;
                println!("exported to {}", path.display());
            }
        }
    }
    Ok(())
}
