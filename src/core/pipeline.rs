//! Batch fetch-and-render pipeline for iconify-dl
//!
//! Walks a selection chunk by chunk, renders every returned icon to
//! `<base>/<collection>/<icon>.svg` and reports each written file on an
//! event channel. Work is strictly sequential and stops at the first error.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

use crate::core::catalog::CatalogClient;
use crate::core::error::{Error, Result};
use crate::core::render::{Canvas, RenderParams, Renderer};

/// Maximum number of icon names sent in one batch request
pub const CHUNK_SIZE: usize = 10;

/// One successfully written icon file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub collection: String,
    pub icon: String,
}

impl ProgressEvent {
    /// Label shown in the progress window
    pub fn label(&self) -> String {
        format!("{}: {}", self.collection, self.icon)
    }
}

pub type ProgressSender = UnboundedSender<ProgressEvent>;

/// Icons chosen for download, keyed by collection ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    collections: BTreeMap<String, Vec<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add icons to a collection, ignoring names already selected
    pub fn insert<I, S>(&mut self, collection: impl Into<String>, icons: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.collections.entry(collection.into()).or_default();
        let mut seen: HashSet<String> = entry.iter().cloned().collect();
        for icon in icons {
            let icon = icon.into();
            if seen.insert(icon.clone()) {
                entry.push(icon);
            }
        }
    }

    /// Number of icons across all collections
    pub fn total_icons(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_icons() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.collections
            .iter()
            .map(|(collection, icons)| (collection.as_str(), icons.as_slice()))
    }
}

impl<K, V, S> FromIterator<(K, V)> for Selection
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut selection = Selection::new();
        for (collection, icons) in iter {
            selection.insert(collection, icons);
        }
        selection
    }
}

/// Split icon names into consecutive request chunks, keeping their order
pub fn partition_chunks(icons: &[String]) -> std::slice::Chunks<'_, String> {
    icons.chunks(CHUNK_SIZE)
}

/// Destination path of a rendered icon
pub fn icon_path(base_path: &Path, collection: &str, icon: &str) -> PathBuf {
    base_path.join(collection).join(format!("{icon}.svg"))
}

/// Reject names that would not stay a single entry under their parent directory
pub fn check_path_component(kind: &str, name: &str) -> Result<()> {
    let escapes = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);

    if escapes {
        return Err(Error::InvalidInput(format!("Invalid {kind} name '{name}'")));
    }
    Ok(())
}

/// Sequential fetch, render and write loop
pub struct Pipeline<'a> {
    catalog: &'a CatalogClient,
    renderer: &'a Renderer,
    params: RenderParams,
    base_path: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a CatalogClient,
        renderer: &'a Renderer,
        params: RenderParams,
        base_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            renderer,
            params,
            base_path: base_path.into(),
        }
    }

    /// Download every selected icon, returning how many files were written
    ///
    /// A closed event channel only means nobody is watching; the run continues.
    pub async fn run(&self, selection: &Selection, events: &ProgressSender) -> Result<usize> {
        let mut sink = EventSink {
            sender: events,
            open: true,
        };
        let mut written = 0;

        for (collection, icons) in selection.iter() {
            for chunk in partition_chunks(icons) {
                written += self.process_chunk(collection, chunk, &mut sink).await?;
            }
        }

        Ok(written)
    }

    async fn process_chunk(
        &self,
        collection: &str,
        chunk: &[String],
        sink: &mut EventSink<'_>,
    ) -> Result<usize> {
        check_path_component("collection", collection)?;
        for name in chunk {
            check_path_component("icon", name)?;
        }

        debug!("Fetching {} icons from {collection}", chunk.len());
        let batch = self.catalog.fetch_icon_batch(collection, chunk).await?;

        // Only requested names are written, in request order
        let returned: Vec<_> = chunk
            .iter()
            .filter_map(|name| batch.icons.get_key_value(name))
            .collect();

        let missing = chunk.len() - returned.len();
        if missing > 0 {
            debug!("{missing} requested icons absent from {collection} response");
        }
        let unrequested = batch.icons.len() - returned.len();
        if unrequested > 0 {
            debug!("Ignoring {unrequested} unrequested icons in {collection} response");
        }

        let collection_dir = self.base_path.join(collection);
        let mut written = 0;

        for (name, icon) in returned {
            tokio::fs::create_dir_all(&collection_dir)
                .await
                .map_err(|e| Error::filesystem(&collection_dir, e))?;

            let document = self
                .renderer
                .render(&icon.body, Canvas::resolve(&batch, icon), &self.params)?;

            let path = icon_path(&self.base_path, collection, name);
            tokio::fs::write(&path, document)
                .await
                .map_err(|e| Error::filesystem(&path, e))?;

            written += 1;
            sink.emit(ProgressEvent {
                collection: collection.to_string(),
                icon: name.clone(),
            });
        }

        Ok(written)
    }
}

struct EventSink<'a> {
    sender: &'a ProgressSender,
    open: bool,
}

impl EventSink<'_> {
    fn emit(&mut self, event: ProgressEvent) {
        if self.open && self.sender.send(event).is_err() {
            debug!("Progress display closed, continuing without it");
            self.open = false;
        }
    }
}
