//! Selector service
//!
//! Loads a catalog snapshot, builds the category selector for it and applies
//! toggles against the caller's stored selection.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    descendants, CatalogSnapshot, CategorySelector, DomainError, NodeData, Product, Selection,
};
use crate::infrastructure::traits::{CatalogSource, SelectionStore};

/// Result of applying one toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Selection after the toggle (unchanged for no-ops)
    pub selection: Selection,
    /// Whether the selector reported a change
    pub changed: bool,
    /// Where the selection was written, if anywhere
    pub persisted: Option<PathBuf>,
}

/// Service running selector operations against catalog and selection stores.
pub struct SelectorService {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn SelectionStore>,
    settings: Arc<Settings>,
}

impl SelectorService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn SelectionStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            catalog,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read the backend snapshot at `location`.
    pub fn load_snapshot(&self, location: &Path) -> ApplicationResult<CatalogSnapshot> {
        self.catalog.load_catalog(location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::CatalogNotFound(location.to_path_buf()),
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => ApplicationError::Catalog {
                path: location.to_path_buf(),
                message: e.to_string(),
            },
            _ => ApplicationError::OperationFailed {
                context: format!("read catalog: {}", location.display()),
                source: Box::new(e),
            },
        })
    }

    /// Build the selector for the catalog, honouring mode and permissions.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, location: &Path) -> ApplicationResult<CategorySelector> {
        let snapshot = self.load_snapshot(location)?;
        debug!(
            "open: {} category records, {} products",
            snapshot.categories.len(),
            snapshot.products.len()
        );
        let selector =
            CategorySelector::new(&snapshot.categories, snapshot.products, self.settings.mode);
        Ok(match &snapshot.permissions {
            Some(permissions) => selector.with_permissions(permissions, &self.settings.resource),
            None => selector,
        })
    }

    /// Explicit state path, falling back to the configured one.
    pub fn state_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.state_file.clone())
    }

    /// Stored selection, or an empty one when no state path is known.
    pub fn load_selection(&self, state: Option<&Path>) -> ApplicationResult<Selection> {
        match self.state_path(state) {
            Some(path) => self
                .store
                .load_selection(&path)
                .with_path_context("load selection", &path),
            None => Ok(Selection::default()),
        }
    }

    pub fn roots(&self, location: &Path) -> ApplicationResult<Vec<NodeData>> {
        let selector = self.open(location)?;
        Ok(selector.forest().root_data().into_iter().cloned().collect())
    }

    pub fn descendants(
        &self,
        location: &Path,
        category_id: &str,
    ) -> ApplicationResult<Vec<String>> {
        let selector = self.open(location)?;
        descendants(selector.forest(), category_id)
            .ok_or_else(|| DomainError::UnknownCategory(category_id.to_string()).into())
    }

    /// Products passing the category filter.
    ///
    /// Uses `categories` when given, otherwise the stored selection's categories.
    pub fn filter(
        &self,
        location: &Path,
        categories: &[String],
        state: Option<&Path>,
    ) -> ApplicationResult<Vec<Product>> {
        let selector = self.open(location)?;
        let selection = if categories.is_empty() {
            self.load_selection(state)?
        } else {
            Selection::new().with_categories(categories.iter().cloned())
        };
        Ok(selector
            .visible_products(&selection)
            .into_iter()
            .cloned()
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn toggle_category(
        &self,
        location: &Path,
        state: Option<&Path>,
        category_id: &str,
        should_select: bool,
    ) -> ApplicationResult<ToggleOutcome> {
        let selector = self.open(location)?;
        let current = self.load_selection(state)?;
        let mut next = current.clone();
        let changed = selector.toggle(category_id, should_select, &current, &mut next);
        self.finish(state, next, changed)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn toggle_product(
        &self,
        location: &Path,
        state: Option<&Path>,
        product_id: &str,
        should_select: bool,
    ) -> ApplicationResult<ToggleOutcome> {
        let selector = self.open(location)?;
        let current = self.load_selection(state)?;
        let mut next = current.clone();
        let changed = selector.toggle_product(product_id, should_select, &current, &mut next);
        self.finish(state, next, changed)
    }

    fn finish(
        &self,
        state: Option<&Path>,
        selection: Selection,
        changed: bool,
    ) -> ApplicationResult<ToggleOutcome> {
        let mut persisted = None;
        if changed {
            if let Some(path) = self.state_path(state) {
                self.store
                    .save_selection(&path, &selection)
                    .with_path_context("save selection", &path)?;
                info!("selection saved to {}", path.display());
                persisted = Some(path);
            }
        }
        Ok(ToggleOutcome {
            selection,
            changed,
            persisted,
        })
    }

    /// Invariant violations in the catalog's category forest.
    pub fn check(&self, location: &Path) -> ApplicationResult<Vec<DomainError>> {
        let selector = self.open(location)?;
        Ok(selector.forest().validate())
    }
}
