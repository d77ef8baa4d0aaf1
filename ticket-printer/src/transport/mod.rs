//! Printer transport layer
//!
//! Pluggable transports behind one interface:
//! ```text
//!           ┌────────────────────┐
//!           │  Transport trait   │  ◄── discover + open
//!           └─────────┬──────────┘
//!                     │
//!     ┌───────────────┼────────────────┐
//!     ▼               ▼                ▼
//! UsbTransport   SystemTransport   MemoryTransport
//! (bulk OUT)     (OS print queue)  (in-process, tests)
//! ```
//!
//! A transport enumerates printers and opens a [`PrinterHandle`]; the
//! handle owns the live device or queue binding until it is closed.

mod memory;
mod system;
mod usb;

pub use memory::{MemoryTransport, MemoryTransportStats};
pub use system::SystemTransport;
pub use usb::UsbTransport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::descriptor::{PrinterDescriptor, PrinterTarget, TransportKind};
use crate::error::PrintResult;

/// An open connection to one printer
#[async_trait]
pub trait PrinterHandle: Send + Sync + fmt::Debug {
    /// Send raw ESC/POS bytes and wait until the transport acknowledges them
    async fn write(&mut self, data: &[u8]) -> PrintResult<()>;

    /// Release the underlying device or queue binding
    async fn close(&mut self) -> PrintResult<()>;
}

/// A way of reaching printers
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    fn kind(&self) -> TransportKind;

    /// Enumerate printers reachable through this transport
    async fn discover(&self) -> PrintResult<Vec<PrinterDescriptor>>;

    /// Open a handle to the target, including any liveness check
    async fn open(&self, target: &PrinterTarget) -> PrintResult<Box<dyn PrinterHandle>>;
}

/// Timeouts applied to transport calls
///
/// Writes are never cancelled from outside: a handle bounds its own I/O
/// (USB bulk transfers use `usb_timeout`) and a system queue job is
/// awaited until the spooler acknowledges it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Bound on opening a system queue, liveness check included
    pub connect_timeout: Duration,
    /// Bound on USB open and each USB bulk write
    pub usb_timeout: Duration,
    /// Bound on each detection source
    pub detect_timeout: Duration,
}

impl ConnectionOptions {
    pub fn open_timeout(&self, kind: TransportKind) -> Duration {
        match kind {
            TransportKind::Usb => self.usb_timeout,
            TransportKind::System => self.connect_timeout,
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            usb_timeout: Duration::from_millis(3000),
            detect_timeout: Duration::from_millis(5000),
        }
    }
}

/// The pair of transports the printer core works with
#[derive(Debug, Clone)]
pub struct Transports {
    pub usb: Arc<dyn Transport>,
    pub system: Arc<dyn Transport>,
}

impl Transports {
    /// Transports backed by the host's USB stack and print spooler
    pub fn native(options: &ConnectionOptions) -> Self {
        Self {
            usb: Arc::new(UsbTransport::new(options.usb_timeout)),
            system: Arc::new(SystemTransport::new()),
        }
    }

    pub fn new(usb: Arc<dyn Transport>, system: Arc<dyn Transport>) -> Self {
        Self { usb, system }
    }

    pub fn get(&self, kind: TransportKind) -> &Arc<dyn Transport> {
        match kind {
            TransportKind::Usb => &self.usb,
            TransportKind::System => &self.system,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let options = ConnectionOptions::default();
        assert_eq!(
            options.open_timeout(TransportKind::System),
            Duration::from_millis(5000)
        );
        assert_eq!(
            options.open_timeout(TransportKind::Usb),
            options.usb_timeout
        );
    }
}
