//! # ticket-printer
//!
//! Receipt-printer core of the point-of-sale backend.
//!
//! ## Scope
//!
//! - Printer detection across USB (known thermal vendors) and OS print queues
//! - One managed printer connection with bounded, serialized I/O
//! - ESC/POS command building and code-page text encoding
//! - Customer ticket encoding from sale and configuration records
//! - Dispatch to the printer, falling back to base64 for browser printing
//!
//! Persistence and HTTP stay in application code (`ticket-server`).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ticket_printer::{
//!     ConnectionManager, ConnectionOptions, Detector, PrintDispatcher, TicketEncoder, Transports,
//! };
//!
//! let options = ConnectionOptions::default();
//! let transports = Transports::native(&options);
//!
//! let printers = Detector::new(transports.clone(), &options).detect().await;
//! let connection = Arc::new(ConnectionManager::new(transports, options));
//! connection.connect_descriptor(&printers[0]).await?;
//!
//! let dispatcher = PrintDispatcher::new(connection, TicketEncoder::default());
//! let outcome = dispatcher.dispatch(&sale, &business, &ticket_config).await?;
//! ```

mod connection;
mod descriptor;
mod detector;
mod dispatcher;
mod encoding;
mod error;
mod escpos;
mod model;
mod preview;
mod receipt;
pub mod transport;
mod vendors;

// Re-exports
pub use connection::ConnectionManager;
pub use descriptor::{
    ConnectionState, ConnectionStatus, PrinterDescriptor, PrinterTarget, StatusReport,
    TransportKind, USB_PREFIX,
};
pub use detector::Detector;
pub use dispatcher::{DispatchOutcome, PrintDispatcher, PrintMethod};
pub use encoding::{CHARSETS, Charset, CharsetInfo, PLACEHOLDER};
pub use error::{PrintError, PrintResult};
pub use escpos::{EscPosBuilder, PaperWidth};
pub use model::{
    BusinessConfig, FiscalType, FontSize, MAX_COPIES, SaleDocument, SaleItem, SaleTotals,
    TicketConfig, format_money,
};
pub use preview::preview_text;
pub use receipt::{EncodedTicket, Section, TicketEncoder};
pub use transport::{ConnectionOptions, Transports};
pub use vendors::{THERMAL_VENDORS, ThermalVendor, find_vendor, is_thermal_vendor};
