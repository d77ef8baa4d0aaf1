use std::sync::Arc;

use ticket_printer::Transports;

use crate::core::{Config, Result};
use crate::services::PrinterService;
use crate::store::{JsonFileStore, PosStore};

/// Server state shared by every handler
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | configuration (immutable) |
/// | store | Arc<dyn PosStore> | sales and configuration records |
/// | printer | PrinterService | printer facade owning the single connection |
///
/// Cloning is cheap; every field is shared.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn PosStore>,
    pub printer: PrinterService,
}

impl ServerState {
    /// Open the store, build the printer core on the host transports and
    /// reconnect to the last used printer
    pub async fn initialize(config: &Config) -> Result<Self> {
        let store = JsonFileStore::open(&config.data_file).await?;
        tracing::info!(path = %store.path().display(), "Store opened");

        let state = Self::with_transports(config.clone(), Arc::new(store), Transports::native(&config.connection_options()));

        if state.printer.auto_connect().await {
            tracing::info!("Reconnected to the last used printer");
        }

        Ok(state)
    }

    /// Build the state on explicit transports
    ///
    /// Used by tests with in-memory transports
    pub fn with_transports(
        config: Config,
        store: Arc<dyn PosStore>,
        transports: Transports,
    ) -> Self {
        let printer = PrinterService::new(
            transports,
            config.connection_options(),
            config.charset,
            store.clone(),
        );
        Self {
            config,
            store,
            printer,
        }
    }

    /// Release the printer connection
    pub async fn shutdown(&self) {
        self.printer.shutdown().await;
    }
}
