//! `fynd search` — ad-hoc search, printed and optionally exported.

use fynd_core::{AppConfig, SearchFilters};
use fynd_pipeline::{search_export, ExportWriter};

pub(crate) async fn run(
    config: &AppConfig,
    query: &str,
    locations: Vec<String>,
    category: Option<String>,
    export: bool,
) -> anyhow::Result<()> {
    let filters = SearchFilters {
        locations,
        category,
        sort_order: None,
    };
    let client = crate::build_blocket_client(config)?;

    let run = fynd_pipeline::run_search(&client, query, &filters).await?;

    if run.listings.is_empty() {
        println!("no listings found for '{query}'");
    }
    for listing in &run.listings {
        crate::print_listing(listing);
    }
    println!(
        "\n{} listings ({} invalid records dropped)",
        run.listings.len(),
        run.dropped_invalid
    );

    if export {
        let artifact = search_export(query, &filters, run);
        let path = ExportWriter::new(&config.exports_dir).write(&artifact)?;
        println!("exported to {}", path.display());
    }
    Ok(())
}
