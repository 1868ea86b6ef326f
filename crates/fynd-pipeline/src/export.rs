//! Run artifact assembly and atomic JSON export.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use fynd_core::{FullRunExport, MarketSummary, NormalizedListing};

use crate::comps;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize run export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write export to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes run exports as immutable JSON artifacts under one directory.
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Serializes the export and writes it all-or-nothing.
    ///
    /// The document is fully serialized in memory first, written to a
    /// `.tmp` sibling, then renamed into place. A failure at any step
    /// leaves no partial artifact at the final path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Serialize`] if the export cannot be
    /// encoded, or [`ExportError::Io`] on any filesystem failure.
    pub fn write(&self, export: &FullRunExport) -> Result<PathBuf, ExportError> {
        let json = serde_json::to_vec_pretty(export)?;

        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = format!(
            "run-{}-{}.json",
            export.metadata.exported_at.format("%Y%m%dT%H%M%SZ"),
            export.metadata.run_id
        );
        let final_path = self.dir.join(&file_name);
        let tmp_path = self.dir.join(format!("{file_name}.tmp"));

        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ExportError::Io { path, source }
        };

        let mut file = fs::File::create(&tmp_path).map_err(io_err(&tmp_path))?;
        file.write_all(&json).map_err(io_err(&tmp_path))?;
        file.sync_all().map_err(io_err(&tmp_path))?;
        drop(file);
        fs::rename(&tmp_path, &final_path).map_err(io_err(&final_path))?;

        info!(path = %final_path.display(), items = export.body.len(), "wrote run export");
        Ok(final_path)
    }
}

/// Price picture across the full fetched set, for export metadata.
/// `None` when no listing carries a price.
#[must_use]
pub fn market_summary(listings: &[NormalizedListing]) -> Option<MarketSummary> {
    let prices: Vec<f64> = listings
        .iter()
        .filter_map(NormalizedListing::price_amount)
        .filter(|amount| *amount > 0.0)
        .collect();
    let stats = comps::market_stats(&prices, None, 0)?;
    Some(MarketSummary {
        total_listings: listings.len(),
        with_price: prices.len(),
        median_price: stats.median,
        min_price: stats.min_price,
        max_price: stats.max_price,
    })
}
