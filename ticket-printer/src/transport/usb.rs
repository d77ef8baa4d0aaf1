//! USB transport
//!
//! Talks to thermal printers as raw USB devices: the first bulk OUT
//! endpoint of the device's active configuration receives the ESC/POS
//! stream unchanged.

use std::time::Duration;

use async_trait::async_trait;
use nusb::transfer::{Direction, EndpointType};
use tracing::{debug, info, instrument};

use super::{PrinterHandle, Transport};
use crate::descriptor::{PrinterDescriptor, PrinterTarget, TransportKind};
use crate::error::{PrintError, PrintResult};
use crate::vendors::find_vendor;

/// USB bulk-transfer transport
#[derive(Debug, Clone)]
pub struct UsbTransport {
    /// Bound on each bulk write
    write_timeout: Duration,
}

impl UsbTransport {
    pub fn new(write_timeout: Duration) -> Self {
        Self { write_timeout }
    }
}

#[async_trait]
impl Transport for UsbTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Usb
    }

    #[instrument(skip(self))]
    async fn discover(&self) -> PrintResult<Vec<PrinterDescriptor>> {
        tokio::task::spawn_blocking(scan_thermal_printers)
            .await
            .map_err(|e| PrintError::Usb(format!("Task join failed: {}", e)))?
    }

    #[instrument(skip(self), fields(target = %target))]
    async fn open(&self, target: &PrinterTarget) -> PrintResult<Box<dyn PrinterHandle>> {
        let PrinterTarget::Usb {
            vendor_id,
            product_id,
        } = *target
        else {
            return Err(PrintError::InvalidConfig(format!(
                "Not a USB address: {}",
                target
            )));
        };

        let write_timeout = self.write_timeout;
        let handle = tokio::task::spawn_blocking(move || {
            open_device(vendor_id, product_id, write_timeout)
        })
        .await
        .map_err(|e| PrintError::Usb(format!("Task join failed: {}", e)))??;

        Ok(Box::new(handle))
    }
}

fn scan_thermal_printers() -> PrintResult<Vec<PrinterDescriptor>> {
    let devices = nusb::list_devices().map_err(|e| PrintError::Usb(e.to_string()))?;

    let mut printers = Vec::new();
    for dev in devices {
        let Some(vendor) = find_vendor(dev.vendor_id()) else {
            continue;
        };
        debug!(
            vendor = vendor.name,
            vid = dev.vendor_id(),
            pid = dev.product_id(),
            "Found thermal printer"
        );
        printers.push(PrinterDescriptor::usb(
            dev.vendor_id(),
            dev.product_id(),
            vendor.name,
        ));
    }

    Ok(printers)
}

fn open_device(
    vendor_id: u16,
    product_id: u16,
    write_timeout: Duration,
) -> PrintResult<UsbHandle> {
    let info = nusb::list_devices()
        .map_err(PrintError::connection)?
        .find(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        .ok_or_else(|| {
            PrintError::ConnectionFailed(format!(
                "USB printer not found: {}:{}",
                vendor_id, product_id
            ))
        })?;

    let device = info.open().map_err(PrintError::connection)?;

    let config = device
        .active_configuration()
        .map_err(PrintError::connection)?;

    let (interface_number, endpoint) = config
        .interface_alt_settings()
        .find_map(|alt| {
            alt.endpoints()
                .find(|ep| {
                    ep.direction() == Direction::Out && ep.transfer_type() == EndpointType::Bulk
                })
                .map(|ep| (alt.interface_number(), ep.address()))
        })
        .ok_or_else(|| {
            PrintError::ConnectionFailed(format!(
                "USB device {}:{} has no bulk OUT endpoint",
                vendor_id, product_id
            ))
        })?;

    // The kernel printer driver usually owns the interface on Linux
    let interface = device
        .detach_and_claim_interface(interface_number)
        .map_err(PrintError::connection)?;

    info!(
        vid = vendor_id,
        pid = product_id,
        interface = interface_number,
        endpoint,
        "USB printer opened"
    );

    Ok(UsbHandle {
        interface: Some(interface),
        endpoint,
        write_timeout,
        label: format!("{}:{}", vendor_id, product_id),
    })
}

/// Claimed USB interface with its bulk OUT endpoint
pub struct UsbHandle {
    interface: Option<nusb::Interface>,
    endpoint: u8,
    write_timeout: Duration,
    label: String,
}

impl std::fmt::Debug for UsbHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbHandle")
            .field("device", &self.label)
            .field("endpoint", &self.endpoint)
            .field("open", &self.interface.is_some())
            .finish()
    }
}

#[async_trait]
impl PrinterHandle for UsbHandle {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        let interface = self.interface.as_ref().ok_or(PrintError::NotConnected)?;

        // Dropping the transfer future on timeout cancels the transfer
        let transfer = interface.bulk_out(self.endpoint, data.to_vec());
        let completion = tokio::time::timeout(self.write_timeout, transfer)
            .await
            .map_err(|_| {
                PrintError::Timeout(format!(
                    "Bulk write to {} did not complete within {} ms",
                    self.label,
                    self.write_timeout.as_millis()
                ))
            })?;

        completion
            .into_result()
            .map_err(|e| PrintError::Usb(format!("Bulk write to {} failed: {}", self.label, e)))?;

        Ok(())
    }

    async fn close(&mut self) -> PrintResult<()> {
        // Dropping the interface releases the claim
        if self.interface.take().is_some() {
            debug!(device = %self.label, "USB interface released");
        }
        Ok(())
    }
}
