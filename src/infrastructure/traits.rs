//! I/O boundary traits for testability
//!
//! These traits abstract where catalogs come from and where selections are
//! kept, allowing services to be tested with in-memory implementations.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{CatalogSnapshot, Selection};
use crate::util::path::parent_dir;

/// Source of backend catalog snapshots.
pub trait CatalogSource: Send + Sync {
    /// Load the categories, products and permissions found at `location`.
    fn load_catalog(&self, location: &Path) -> io::Result<CatalogSnapshot>;
}

/// Persistence for the caller-owned selection.
pub trait SelectionStore: Send + Sync {
    /// Load a selection. A missing store yields an empty selection.
    fn load_selection(&self, location: &Path) -> io::Result<Selection>;

    /// Replace the stored selection.
    fn save_selection(&self, location: &Path, selection: &Selection) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Catalog snapshot stored as a JSON file.
#[derive(Debug, Default)]
pub struct JsonCatalogFile;

impl CatalogSource for JsonCatalogFile {
    fn load_catalog(&self, location: &Path) -> io::Result<CatalogSnapshot> {
        debug!("load_catalog: {}", location.display());
        let content = std::fs::read_to_string(location)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }
}

/// Selection stored as a JSON file, replaced atomically on save.
#[derive(Debug, Default)]
pub struct JsonSelectionFile;

impl SelectionStore for JsonSelectionFile {
    fn load_selection(&self, location: &Path) -> io::Result<Selection> {
        if !location.exists() {
            debug!("load_selection: {} missing, starting empty", location.display());
            return Ok(Selection::default());
        }
        let content = std::fs::read_to_string(location)?;
        if content.trim().is_empty() {
            return Ok(Selection::default());
        }
        let selection = serde_json::from_str(&content)?;
        Ok(selection)
    }

    fn save_selection(&self, location: &Path, selection: &Selection) -> io::Result<()> {
        let dir = parent_dir(location);
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, selection)?;
        tmp.write_all(b"\n")?;
        tmp.persist(location).map_err(|e| e.error)?;
        debug!("save_selection: wrote {}", location.display());
        Ok(())
    }
}

// ============================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================

/// Catalog handed over directly, ignoring the location.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    pub snapshot: CatalogSnapshot,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn load_catalog(&self, _location: &Path) -> io::Result<CatalogSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Selection kept in memory, ignoring the location.
#[derive(Debug, Default)]
pub struct InMemorySelectionStore {
    selection: std::sync::Mutex<Selection>,
}

impl InMemorySelectionStore {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection: std::sync::Mutex::new(selection),
        }
    }

    pub fn current(&self) -> Selection {
        self.selection
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl SelectionStore for InMemorySelectionStore {
    fn load_selection(&self, _location: &Path) -> io::Result<Selection> {
        Ok(self.current())
    }

    fn save_selection(&self, _location: &Path, selection: &Selection) -> io::Result<()> {
        let mut guard = self
            .selection
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "selection store poisoned"))?;
        *guard = selection.clone();
        Ok(())
    }
}
