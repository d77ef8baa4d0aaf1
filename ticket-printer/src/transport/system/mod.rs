//! Operating-system print queue transport
//!
//! Printers installed in the OS spooler are reached by queue name and
//! receive jobs in RAW mode so ESC/POS bytes pass through untouched.
//! - Windows: Win32 spooler API
//! - Unix: CUPS command-line tools

#[cfg(not(windows))]
mod cups;
#[cfg(windows)]
mod windows;

#[cfg(not(windows))]
use cups as platform;
#[cfg(windows)]
use windows as platform;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{PrinterHandle, Transport};
use crate::descriptor::{PrinterDescriptor, PrinterTarget, TransportKind};
use crate::error::{PrintError, PrintResult};

/// OS print queue transport
#[derive(Debug, Default, Clone)]
pub struct SystemTransport;

impl SystemTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for SystemTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::System
    }

    #[instrument(skip(self))]
    async fn discover(&self) -> PrintResult<Vec<PrinterDescriptor>> {
        let queues = platform::list_queues().await?;
        Ok(queues
            .iter()
            .map(|q| PrinterDescriptor::system(q, platform::MANUFACTURER))
            .collect())
    }

    #[instrument(skip(self), fields(target = %target))]
    async fn open(&self, target: &PrinterTarget) -> PrintResult<Box<dyn PrinterHandle>> {
        let PrinterTarget::System { queue } = target else {
            return Err(PrintError::InvalidConfig(format!(
                "Not a print queue: {}",
                target
            )));
        };

        if !platform::is_online(queue).await? {
            return Err(PrintError::ConnectionFailed(format!(
                "Print queue not available: {}",
                queue
            )));
        }

        info!(queue = %queue, "Print queue online");
        Ok(Box::new(QueueHandle {
            queue: Some(queue.clone()),
        }))
    }
}

/// Binding to a named print queue
///
/// Queues hold no OS resource between jobs; each write is one RAW job.
#[derive(Debug)]
pub struct QueueHandle {
    queue: Option<String>,
}

#[async_trait]
impl PrinterHandle for QueueHandle {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        let queue = self.queue.as_deref().ok_or(PrintError::NotConnected)?;
        platform::submit_raw(queue, data).await
    }

    async fn close(&mut self) -> PrintResult<()> {
        self.queue = None;
        Ok(())
    }
}
