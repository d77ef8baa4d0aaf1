//! Memory transport (in-process)
//!
//! Simulated printers for tests and demos. Records every open, close and
//! write so callers can assert ordering, and can be scripted to fail or
//! stall at each step.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{PrinterHandle, Transport};
use crate::descriptor::{PrinterDescriptor, PrinterTarget, TransportKind};
use crate::error::{PrintError, PrintResult};

#[derive(Debug, Default)]
struct MemoryState {
    printers: Vec<PrinterDescriptor>,
    discover_error: Option<String>,
    discover_delay: Duration,
    open_delay: Duration,
    write_delay: Duration,
    write_timeout: Option<Duration>,
    fail_writes: bool,
    events: Vec<String>,
    written: Vec<Vec<u8>>,
    stats: MemoryTransportStats,
}

/// Call counters of a [`MemoryTransport`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTransportStats {
    pub opens: usize,
    pub closes: usize,
    pub writes: usize,
}

/// In-process transport with simulated printers
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    kind: TransportKind,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// Add a printer that discovery reports and `open` accepts
    pub fn with_printer(self, descriptor: PrinterDescriptor) -> Self {
        self.state.lock().printers.push(descriptor);
        self
    }

    /// Make every discovery call fail with the given reason
    pub fn fail_discovery(&self, reason: impl Into<String>) {
        self.state.lock().discover_error = Some(reason.into());
    }

    pub fn set_discover_delay(&self, delay: Duration) {
        self.state.lock().discover_delay = delay;
    }

    pub fn set_open_delay(&self, delay: Duration) {
        self.state.lock().open_delay = delay;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = delay;
    }

    /// Bound each simulated write; a write slower than the bound gives up
    /// after it and reports `Timeout`, like a transfer the device aborted
    pub fn set_write_timeout(&self, limit: Duration) {
        self.state.lock().write_timeout = Some(limit);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Ordered log of `open:`, `close:`, `write_start:` and `write_end:` events
    pub fn events(&self) -> Vec<String> {
        self.state.lock().events.clone()
    }

    /// Payloads of successful writes, in completion order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    pub fn stats(&self) -> MemoryTransportStats {
        self.state.lock().stats
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn discover(&self) -> PrintResult<Vec<PrinterDescriptor>> {
        let delay = self.state.lock().discover_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        if let Some(reason) = &state.discover_error {
            return Err(PrintError::System(reason.clone()));
        }
        Ok(state.printers.clone())
    }

    async fn open(&self, target: &PrinterTarget) -> PrintResult<Box<dyn PrinterHandle>> {
        let address = target.address();
        let delay = self.state.lock().open_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if !state.printers.iter().any(|p| p.address == address) {
            return Err(PrintError::ConnectionFailed(format!(
                "Printer not found: {}",
                address
            )));
        }
        state.stats.opens += 1;
        state.events.push(format!("open:{}", address));

        Ok(Box::new(MemoryHandle {
            address,
            state: self.state.clone(),
            open: true,
        }))
    }
}

#[derive(Debug)]
struct MemoryHandle {
    address: String,
    state: Arc<Mutex<MemoryState>>,
    open: bool,
}

#[async_trait]
impl PrinterHandle for MemoryHandle {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        if !self.open {
            return Err(PrintError::NotConnected);
        }

        let (delay, limit) = {
            let mut state = self.state.lock();
            state.events.push(format!("write_start:{}", self.address));
            (state.write_delay, state.write_timeout)
        };
        let timed_out = limit.filter(|limit| delay > *limit);
        let wait = timed_out.unwrap_or(delay);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let mut state = self.state.lock();
        state.events.push(format!("write_end:{}", self.address));
        if let Some(limit) = timed_out {
            return Err(PrintError::Timeout(format!(
                "Write to {} did not complete within {} ms",
                self.address,
                limit.as_millis()
            )));
        }
        if state.fail_writes {
            return Err(PrintError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "simulated write failure",
            )));
        }
        state.stats.writes += 1;
        state.written.push(data.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> PrintResult<()> {
        if std::mem::replace(&mut self.open, false) {
            let mut state = self.state.lock();
            state.stats.closes += 1;
            state.events.push(format!("close:{}", self.address));
        }
        Ok(())
    }
}
