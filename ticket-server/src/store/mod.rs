//! Store collaborator
//!
//! Supplies the business and ticket configuration records and the sales
//! the printer core encodes. The printer core never talks to the store
//! directly; [`crate::services::PrinterService`] reads records and hands
//! them over.

mod json;

pub use json::JsonFileStore;

use std::fmt;

use async_trait::async_trait;
use ticket_printer::{BusinessConfig, SaleDocument, TicketConfig};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store data: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Records the printer service needs
#[async_trait]
pub trait PosStore: Send + Sync + fmt::Debug {
    async fn business_config(&self) -> StoreResult<Option<BusinessConfig>>;

    async fn save_business_config(&self, config: BusinessConfig) -> StoreResult<BusinessConfig>;

    async fn ticket_config(&self) -> StoreResult<Option<TicketConfig>>;

    async fn save_ticket_config(&self, config: TicketConfig) -> StoreResult<TicketConfig>;

    /// Remember the last connected printer, creating the ticket
    /// configuration with defaults when none exists yet
    async fn set_printer_name(&self, name: &str) -> StoreResult<()>;

    async fn sale(&self, id: i64) -> StoreResult<Option<SaleDocument>>;

    /// Insert or replace a sale
    async fn put_sale(&self, sale: SaleDocument) -> StoreResult<()>;
}
