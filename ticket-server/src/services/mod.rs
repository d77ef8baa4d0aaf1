//! Services
//!
//! - [`PrinterService`] - printer facade used by the HTTP handlers

pub mod printer;

pub use printer::{PrintResponse, PrinterService};
