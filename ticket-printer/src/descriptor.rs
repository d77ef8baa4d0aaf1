//! Printer descriptors and connection state
//!
//! Value types shared by the detector, the connection manager and callers:
//! - [`PrinterDescriptor`]: one discoverable printer from a detection pass
//! - [`PrinterTarget`]: a parsed printer address a connection can be opened to
//! - [`ConnectionState`]: snapshot of the single live connection

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PrintError, PrintResult};

/// Prefix of USB printer addresses (`USB:<vendor>:<product>`)
pub const USB_PREFIX: &str = "USB:";

/// Transport used to reach a printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Raw USB bulk device
    #[serde(rename = "USB")]
    Usb,
    /// Operating-system print queue
    #[serde(rename = "WINDOWS", alias = "SYSTEM")]
    System,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Usb => "USB",
            TransportKind::System => "WINDOWS",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A printer found by a detection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub transport: TransportKind,
    /// `USB:<vendor>:<product>` for USB, the queue name for system printers
    #[serde(rename = "path")]
    pub address: String,
    pub manufacturer: String,
}

impl PrinterDescriptor {
    pub fn usb(vendor_id: u16, product_id: u16, vendor_name: &str) -> Self {
        Self {
            name: format!("{} Thermal ({}:{})", vendor_name, vendor_id, product_id),
            transport: TransportKind::Usb,
            address: PrinterTarget::Usb {
                vendor_id,
                product_id,
            }
            .address(),
            manufacturer: vendor_name.to_string(),
        }
    }

    pub fn system(queue: &str, manufacturer: &str) -> Self {
        Self {
            name: queue.to_string(),
            transport: TransportKind::System,
            address: queue.to_string(),
            manufacturer: manufacturer.to_string(),
        }
    }

    pub fn target(&self) -> PrintResult<PrinterTarget> {
        PrinterTarget::parse(&self.address)
    }
}

/// Parsed printer address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrinterTarget {
    Usb { vendor_id: u16, product_id: u16 },
    System { queue: String },
}

impl PrinterTarget {
    /// Parse a printer name or address
    ///
    /// Anything starting with `USB:` must carry a vendor and product id
    /// (decimal, or hex with a `0x` prefix); everything else names a
    /// system print queue.
    pub fn parse(s: &str) -> PrintResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PrintError::InvalidConfig(
                "Printer name must not be empty".to_string(),
            ));
        }

        let Some(rest) = strip_prefix_ignore_case(s, USB_PREFIX) else {
            return Ok(PrinterTarget::System {
                queue: s.to_string(),
            });
        };

        let mut parts = rest.split(':');
        let (Some(vid), Some(pid), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid USB address: {}",
                s
            )));
        };

        Ok(PrinterTarget::Usb {
            vendor_id: parse_usb_id(vid, s)?,
            product_id: parse_usb_id(pid, s)?,
        })
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            PrinterTarget::Usb { .. } => TransportKind::Usb,
            PrinterTarget::System { .. } => TransportKind::System,
        }
    }

    /// Canonical address string
    pub fn address(&self) -> String {
        match self {
            PrinterTarget::Usb {
                vendor_id,
                product_id,
            } => format!("{}{}:{}", USB_PREFIX, vendor_id, product_id),
            PrinterTarget::System { queue } => queue.clone(),
        }
    }
}

impl fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.is_char_boundary(prefix.len()) {
        let (head, tail) = s.split_at(prefix.len());
        if head.eq_ignore_ascii_case(prefix) {
            return Some(tail);
        }
    }
    None
}

fn parse_usb_id(raw: &str, address: &str) -> PrintResult<u16> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => raw.parse::<u16>(),
    };
    parsed.map_err(|_| PrintError::InvalidConfig(format!("Invalid USB address: {}", address)))
}

/// Lifecycle state of the printer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot of the single printer connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub transport: Option<TransportKind>,
    pub target: Option<String>,
}

impl ConnectionState {
    pub fn disconnected() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            transport: None,
            target: None,
        }
    }

    pub fn connecting(target: &PrinterTarget) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            transport: Some(target.kind()),
            target: Some(target.address()),
        }
    }

    pub fn connected(target: &PrinterTarget) -> Self {
        Self {
            status: ConnectionStatus::Connected,
            transport: Some(target.kind()),
            target: Some(target.address()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Status as reported to clients
    pub fn report(&self) -> StatusReport {
        let connected = self.is_connected();
        StatusReport {
            connected,
            port_name: self.target.clone().filter(|_| connected),
            printer_type: self.transport.filter(|_| connected).map(|t| t.as_str().to_string()),
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Client-facing connection status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub connected: bool,
    pub port_name: Option<String>,
    #[serde(rename = "type")]
    pub printer_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usb_decimal_and_hex() {
        let expected = PrinterTarget::Usb {
            vendor_id: 0x04b8,
            product_id: 0x0e15,
        };
        assert_eq!(PrinterTarget::parse("USB:1208:3605").unwrap(), expected);
        assert_eq!(PrinterTarget::parse("usb:0x04b8:0x0E15").unwrap(), expected);
        assert_eq!(expected.address(), "USB:1208:3605");
    }

    #[test]
    fn test_parse_system_queue() {
        let target = PrinterTarget::parse("  POS-80 Caja  ").unwrap();
        assert_eq!(
            target,
            PrinterTarget::System {
                queue: "POS-80 Caja".to_string()
            }
        );
        assert_eq!(target.kind(), TransportKind::System);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PrinterTarget::parse("").is_err());
        assert!(PrinterTarget::parse("USB:1208").is_err());
        assert!(PrinterTarget::parse("USB:xyz:1").is_err());
        assert!(PrinterTarget::parse("USB:1:2:3").is_err());
    }

    #[test]
    fn test_usb_descriptor_round_trips_to_target() {
        let d = PrinterDescriptor::usb(0x0fe6, 0x811e, "XPrinter");
        assert_eq!(d.name, "XPrinter Thermal (4070:33054)");
        assert_eq!(d.address, "USB:4070:33054");
        assert_eq!(
            d.target().unwrap(),
            PrinterTarget::Usb {
                vendor_id: 0x0fe6,
                product_id: 0x811e
            }
        );
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let d = PrinterDescriptor::system("EPSON TM-T20", "Windows Printer");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "WINDOWS");
        assert_eq!(json["path"], "EPSON TM-T20");
        assert_eq!(json["manufacturer"], "Windows Printer");
    }

    #[test]
    fn test_status_report() {
        let report = ConnectionState::disconnected().report();
        assert!(!report.connected);
        assert_eq!(report.port_name, None);

        let target = PrinterTarget::parse("USB:1208:3605").unwrap();
        let report = ConnectionState::connected(&target).report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["connected"], true);
        assert_eq!(json["portName"], "USB:1208:3605");
        assert_eq!(json["type"], "USB");
    }
}
