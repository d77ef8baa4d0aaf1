//! Printer detection
//!
//! Runs both enumeration sources concurrently, each bounded by its own
//! timeout. A failing source is logged and contributes nothing; the other
//! source's printers are still returned.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::descriptor::{PrinterDescriptor, TransportKind};
use crate::error::{PrintError, PrintResult};
use crate::transport::{ConnectionOptions, Transport, Transports};

/// Enumerates printers across the USB and system transports
#[derive(Debug, Clone)]
pub struct Detector {
    transports: Transports,
    timeout: Duration,
}

impl Detector {
    pub fn new(transports: Transports, options: &ConnectionOptions) -> Self {
        Self {
            transports,
            timeout: options.detect_timeout,
        }
    }

    /// Detect printers: USB first, then system queues
    ///
    /// Never fails. No de-duplication is applied, within or across sources.
    #[instrument(skip(self))]
    pub async fn detect(&self) -> Vec<PrinterDescriptor> {
        let (usb, system) = tokio::join!(
            self.scan(&self.transports.usb),
            self.scan(&self.transports.system)
        );

        let mut printers = Vec::new();
        for result in [usb, system] {
            match result {
                Ok(found) => printers.extend(found),
                Err(e) => warn!(error = %e, "Detection source skipped"),
            }
        }

        info!(count = printers.len(), "Printers detected");
        printers
    }

    async fn scan(&self, transport: &Arc<dyn Transport>) -> PrintResult<Vec<PrinterDescriptor>> {
        let source_name = match transport.kind() {
            TransportKind::Usb => "usb",
            TransportKind::System => "system",
        };

        let found = tokio::time::timeout(self.timeout, transport.discover())
            .await
            .map_err(|_| PrintError::DetectionSourceFailed {
                source_name,
                reason: format!("timed out after {} ms", self.timeout.as_millis()),
            })?
            .map_err(|e| PrintError::DetectionSourceFailed {
                source_name,
                reason: e.to_string(),
            })?;

        info!(source = source_name, count = found.len(), "Source scanned");
        Ok(found)
    }
}
