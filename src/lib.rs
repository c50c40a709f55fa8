//! # Iconify-dl Library
//!
//! Browse an Iconify-compatible icon catalog and download selected icons as
//! standalone SVG files.
//!
//! ## Features
//!
//! - **Catalog access**: list collections, list icon names, fetch icon bodies in batches
//! - **SVG rendering**: fixed template with optional target size and color substitution
//! - **Progress events**: one event per written file on an unbounded channel
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use iconify_dl::{RenderParams, Selection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let selection: Selection = [("mdi", ["account", "home"])].into_iter().collect();
//!     let (events, _receiver) = tokio::sync::mpsc::unbounded_channel();
//!
//!     let written = iconify_dl::download(&selection, "./icons", RenderParams::default(), &events).await?;
//!     println!("{written} icons downloaded");
//!     Ok(())
//! }
//! ```

use std::path::Path;

// Re-export core types that users might need
pub use crate::core::catalog::{create_http_client, CatalogClient, CatalogConfig, Collection, IconBatchResponse, IconBody};
pub use crate::core::error::{suggest_collection, Error, Result};
pub use crate::core::pipeline::{check_path_component, icon_path, partition_chunks, Pipeline, ProgressEvent, ProgressSender, Selection, CHUNK_SIZE};
pub use crate::core::render::{Canvas, RenderParams, Renderer, COLOR_SENTINEL};

// Internal modules
mod core;

/// Download a selection from the public Iconify API
///
/// Builds a catalog client and renderer with default settings, then runs the
/// pipeline, sending one [`ProgressEvent`] per written file.
///
/// # Arguments
/// * `selection` - Icons to download, keyed by collection ID
/// * `base_path` - Directory receiving one sub-directory per collection
/// * `params` - Target size and color applied to every icon
/// * `events` - Progress channel; a closed receiver does not stop the download
pub async fn download(
    selection: &Selection,
    base_path: impl AsRef<Path>,
    params: RenderParams,
    events: &ProgressSender,
) -> Result<usize> {
    download_with_config(selection, base_path, params, events, CatalogConfig::default()).await
}

/// Download a selection from a custom catalog endpoint
pub async fn download_with_config(
    selection: &Selection,
    base_path: impl AsRef<Path>,
    params: RenderParams,
    events: &ProgressSender,
    config: CatalogConfig,
) -> Result<usize> {
    let catalog = CatalogClient::with_config(config)?;
    let renderer = Renderer::new()?;

    Pipeline::new(&catalog, &renderer, params, base_path.as_ref())
        .run(selection, events)
        .await
}
