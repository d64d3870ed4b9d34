//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::SelectorService;
use crate::config::Settings;
use crate::infrastructure::traits::{
    CatalogSource, JsonCatalogFile, JsonSelectionFile, SelectionStore,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Catalog source abstraction
    pub catalog: Arc<dyn CatalogSource>,

    /// Selection persistence abstraction
    pub store: Arc<dyn SelectionStore>,

    pub selector: SelectorService,
}

impl ServiceContainer {
    /// Create a new service container with JSON file implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(JsonCatalogFile),
            Arc::new(JsonSelectionFile),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn SelectionStore>,
    ) -> Self {
        let settings = Arc::new(settings);
        let selector = SelectorService::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&settings),
        );

        Self {
            settings,
            catalog,
            store,
            selector,
        }
    }
}
