//! Printer connection manager
//!
//! Owns the single live printer connection of the process.
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──ok──▶ Connected
//!       ▲                        │                 │
//!       └─────────failure────────┘                 │
//!       └──────────────disconnect──────────────────┘
//! ```
//!
//! `connect`, `disconnect` and `write` hold one operation lock for their
//! whole duration, transport I/O included, so a write never interleaves
//! with another write or with a reconnect. Waiters are served in arrival
//! order (tokio's mutex is fair). `status` reads a separate snapshot and
//! never waits for the operation lock.

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::descriptor::{ConnectionState, PrinterDescriptor, PrinterTarget};
use crate::error::{PrintError, PrintResult};
use crate::transport::{ConnectionOptions, PrinterHandle, Transports};

struct ActiveConnection {
    target: PrinterTarget,
    handle: Box<dyn PrinterHandle>,
}

/// Manages the one printer connection
pub struct ConnectionManager {
    transports: Transports,
    options: ConnectionOptions,
    active: Mutex<Option<ActiveConnection>>,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(transports: Transports, options: ConnectionOptions) -> Self {
        Self {
            transports,
            options,
            active: Mutex::new(None),
            state: RwLock::new(ConnectionState::disconnected()),
        }
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Snapshot of the connection state
    pub fn status(&self) -> ConnectionState {
        self.state.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().is_connected()
    }

    /// Connect to a printer by name or address
    ///
    /// `USB:<vendor>:<product>` opens a USB device, anything else a system
    /// queue. An existing connection is fully closed first, whatever the
    /// outcome of the new attempt.
    #[instrument(skip(self))]
    pub async fn connect(&self, printer: &str) -> PrintResult<()> {
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            self.release(previous).await;
        }

        let target = match PrinterTarget::parse(printer) {
            Ok(target) => target,
            Err(e) => {
                self.set_state(ConnectionState::disconnected());
                return Err(PrintError::ConnectionFailed(e.to_string()));
            }
        };

        self.set_state(ConnectionState::connecting(&target));

        match self.open(&target).await {
            Ok(handle) => {
                info!(target = %target, transport = %target.kind(), "Printer connected");
                self.set_state(ConnectionState::connected(&target));
                *active = Some(ActiveConnection { target, handle });
                Ok(())
            }
            Err(e) => {
                warn!(target = %target, error = %e, "Printer connection failed");
                self.set_state(ConnectionState::disconnected());
                Err(e)
            }
        }
    }

    /// Connect to a printer from a detection pass
    pub async fn connect_descriptor(&self, descriptor: &PrinterDescriptor) -> PrintResult<()> {
        self.connect(&descriptor.address).await
    }

    /// Close the connection if one is open
    ///
    /// Idempotent and infallible: close errors are logged.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            self.release(previous).await;
        }
        self.set_state(ConnectionState::disconnected());
    }

    /// Write raw bytes to the connected printer
    ///
    /// The write runs to completion under the operation lock; it is never
    /// cancelled here. The handle bounds its own I/O and reports
    /// `Timeout` once the transfer has been given up. A failed write keeps
    /// the connection; the caller decides whether to reconnect.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn write(&self, data: &[u8]) -> PrintResult<()> {
        let mut active = self.active.lock().await;
        let conn = active.as_mut().ok_or(PrintError::NotConnected)?;

        match conn.handle.write(data).await {
            Ok(()) => {
                info!(target = %conn.target, "Print data sent");
                Ok(())
            }
            Err(e) => {
                warn!(target = %conn.target, error = %e, "Printer write failed");
                Err(e)
            }
        }
    }

    /// Reconnect to the last-used printer at startup
    ///
    /// Returns whether a connection was established. Failure is logged
    /// and leaves the manager disconnected.
    pub async fn auto_connect(&self, last_printer: Option<&str>) -> bool {
        let Some(name) = last_printer.map(str::trim).filter(|n| !n.is_empty()) else {
            info!("No saved printer, skipping auto-connect");
            return false;
        };

        match self.connect(name).await {
            Ok(()) => {
                info!(printer = name, "Auto-connected to saved printer");
                true
            }
            Err(e) => {
                warn!(printer = name, error = %e, "Auto-connect failed");
                false
            }
        }
    }

    async fn open(&self, target: &PrinterTarget) -> PrintResult<Box<dyn PrinterHandle>> {
        let transport = self.transports.get(target.kind());
        let limit = self.options.open_timeout(target.kind());

        match tokio::time::timeout(limit, transport.open(target)).await {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(PrintError::ConnectionFailed(reason))) => {
                Err(PrintError::ConnectionFailed(reason))
            }
            Ok(Err(e)) => Err(PrintError::ConnectionFailed(e.to_string())),
            Err(_) => Err(PrintError::ConnectionFailed(format!(
                "{} did not respond within {} ms",
                target,
                limit.as_millis()
            ))),
        }
    }

    async fn release(&self, mut conn: ActiveConnection) {
        if let Err(e) = conn.handle.close().await {
            warn!(target = %conn.target, error = %e, "Error closing printer handle");
        }
        info!(target = %conn.target, "Printer disconnected");
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &*self.state.read())
            .field("options", &self.options)
            .finish()
    }
}
