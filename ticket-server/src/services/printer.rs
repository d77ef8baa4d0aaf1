//! Printer service
//!
//! Glues the printer core to the store: reads the sale and configuration
//! records, hands them to the dispatcher and remembers the last printer.

use std::sync::Arc;

use serde::Serialize;
use ticket_printer::{
    BusinessConfig, Charset, ConnectionManager, ConnectionOptions, DispatchOutcome, Detector,
    PrintDispatcher, PrinterDescriptor, SaleDocument, StatusReport, TicketConfig,
    TicketEncoder, Transports, preview_text,
};
use tracing::{info, instrument, warn};

use crate::store::PosStore;
use crate::utils::{AppError, AppResult};

/// Response of a sale print request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintResponse {
    pub sale_id: i64,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Printer facade shared by all handlers
#[derive(Debug, Clone)]
pub struct PrinterService {
    detector: Detector,
    dispatcher: Arc<PrintDispatcher>,
    store: Arc<dyn PosStore>,
}

impl PrinterService {
    pub fn new(
        transports: Transports,
        options: ConnectionOptions,
        charset: Charset,
        store: Arc<dyn PosStore>,
    ) -> Self {
        let detector = Detector::new(transports.clone(), &options);
        let connection = Arc::new(ConnectionManager::new(transports, options));
        let dispatcher = Arc::new(PrintDispatcher::new(connection, TicketEncoder::new(charset)));
        Self {
            detector,
            dispatcher,
            store,
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        self.dispatcher.connection()
    }

    pub async fn detect(&self) -> Vec<PrinterDescriptor> {
        self.detector.detect().await
    }

    /// Connect to a printer and remember it for the next start
    #[instrument(skip(self))]
    pub async fn connect(&self, printer_name: &str) -> AppResult<StatusReport> {
        let printer_name = printer_name.trim();
        if printer_name.is_empty() {
            return Err(AppError::validation("printerName is required"));
        }

        self.connection().connect(printer_name).await?;

        if let Err(e) = self.store.set_printer_name(printer_name).await {
            warn!(error = %e, "Failed to remember the connected printer");
        }

        Ok(self.status())
    }

    pub async fn disconnect(&self) -> StatusReport {
        self.connection().disconnect().await;
        self.status()
    }

    pub fn status(&self) -> StatusReport {
        self.connection().status().report()
    }

    /// Print the diagnostic page on the connected printer
    pub async fn test_print(&self) -> AppResult<()> {
        let config = self.ticket_config().await?;
        let paper = config.paper()?;
        let now = chrono::Local::now().naive_local();
        self.dispatcher.test_print(paper, now).await?;
        Ok(())
    }

    /// Print a stored sale, falling back to browser printing
    #[instrument(skip(self))]
    pub async fn print_sale(&self, sale_id: i64) -> AppResult<PrintResponse> {
        let (sale, business, config) = self.load(sale_id).await?;
        let outcome = self.dispatcher.dispatch(&sale, &business, &config).await?;
        Ok(PrintResponse { sale_id, outcome })
    }

    /// Plain-text rendering of a stored sale's ticket
    pub async fn preview_sale(&self, sale_id: i64) -> AppResult<String> {
        let (sale, business, config) = self.load(sale_id).await?;
        let encoder = self.dispatcher.encoder();
        let ticket = encoder.encode(&sale, &business, &config)?;
        Ok(preview_text(ticket.as_bytes(), encoder.charset()))
    }

    pub async fn business_config(&self) -> AppResult<Option<BusinessConfig>> {
        Ok(self.store.business_config().await?)
    }

    pub async fn save_business_config(&self, config: BusinessConfig) -> AppResult<BusinessConfig> {
        config.validate()?;
        Ok(self.store.save_business_config(config).await?)
    }

    /// Stored ticket configuration, defaults when none is stored
    pub async fn ticket_config(&self) -> AppResult<TicketConfig> {
        Ok(self.store.ticket_config().await?.unwrap_or_default())
    }

    /// Save the ticket configuration, keeping the remembered printer when
    /// the update does not name one
    pub async fn save_ticket_config(&self, mut config: TicketConfig) -> AppResult<TicketConfig> {
        config.validate()?;
        if config.printer_name.is_none() {
            config.printer_name = self.store.ticket_config().await?.and_then(|c| c.printer_name);
        }
        Ok(self.store.save_ticket_config(config).await?)
    }

    /// Reconnect to the last used printer, if any
    pub async fn auto_connect(&self) -> bool {
        let last = match self.store.ticket_config().await {
            Ok(config) => config.and_then(|c| c.printer_name),
            Err(e) => {
                warn!(error = %e, "Could not read the last used printer");
                None
            }
        };
        self.connection().auto_connect(last.as_deref()).await
    }

    pub async fn shutdown(&self) {
        info!("Releasing printer connection");
        self.connection().disconnect().await;
    }

    async fn load(&self, sale_id: i64) -> AppResult<(SaleDocument, BusinessConfig, TicketConfig)> {
        let sale = self
            .store
            .sale(sale_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sale {sale_id}")))?;
        let business = self.store.business_config().await?.unwrap_or_default();
        let config = self.ticket_config().await?;
        Ok((sale, business, config))
    }
}

