//! Print dispatcher
//!
//! Encodes a ticket and prints it on the connected printer. When there is
//! no connection, or the write fails, the encoded bytes are returned as
//! base64 for the browser to print instead. Only invalid input fails a
//! dispatch.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::connection::ConnectionManager;
use crate::error::{PrintError, PrintResult};
use crate::escpos::PaperWidth;
use crate::model::{BusinessConfig, SaleDocument, TicketConfig};
use crate::receipt::{EncodedTicket, TicketEncoder};

/// How a ticket ended up being printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMethod {
    DirectPrint,
    BrowserPrint,
}

/// Result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub method: PrintMethod,
    /// Base64 ESC/POS stream, present for browser printing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<String>,
}

impl DispatchOutcome {
    pub fn direct() -> Self {
        Self {
            method: PrintMethod::DirectPrint,
            commands: None,
        }
    }

    pub fn browser(ticket: &EncodedTicket) -> Self {
        Self {
            method: PrintMethod::BrowserPrint,
            commands: Some(ticket.to_base64()),
        }
    }
}

/// Routes encoded tickets to the printer or back to the client
#[derive(Debug)]
pub struct PrintDispatcher {
    connection: Arc<ConnectionManager>,
    encoder: TicketEncoder,
}

impl PrintDispatcher {
    pub fn new(connection: Arc<ConnectionManager>, encoder: TicketEncoder) -> Self {
        Self {
            connection,
            encoder,
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    pub fn encoder(&self) -> &TicketEncoder {
        &self.encoder
    }

    /// Encode and print a sale ticket
    ///
    /// Print failures degrade to browser printing; only encoding errors
    /// are returned.
    #[instrument(skip_all, fields(sale_id = sale.id))]
    pub async fn dispatch(
        &self,
        sale: &SaleDocument,
        business: &BusinessConfig,
        config: &TicketConfig,
    ) -> PrintResult<DispatchOutcome> {
        let ticket = self.encoder.encode(sale, business, config)?;

        if !config.enable_print {
            info!("Direct printing disabled, returning commands to the browser");
            return Ok(DispatchOutcome::browser(&ticket));
        }

        Ok(self.deliver(&ticket).await)
    }

    /// Print a diagnostic page on the connected printer
    #[instrument(skip(self))]
    pub async fn test_print(&self, paper: PaperWidth, printed_at: NaiveDateTime) -> PrintResult<()> {
        let ticket = self.encoder.test_ticket(paper, printed_at);
        self.connection.write(ticket.as_bytes()).await?;
        info!("Test page printed");
        Ok(())
    }

    async fn deliver(&self, ticket: &EncodedTicket) -> DispatchOutcome {
        match self.connection.write(ticket.as_bytes()).await {
            Ok(()) => {
                info!(bytes = ticket.len(), "Ticket printed");
                DispatchOutcome::direct()
            }
            Err(PrintError::NotConnected) => {
                info!("No printer connected, returning commands to the browser");
                DispatchOutcome::browser(ticket)
            }
            Err(e) => {
                warn!(error = %e, "Direct print failed, returning commands to the browser");
                DispatchOutcome::browser(ticket)
            }
        }
    }
}
