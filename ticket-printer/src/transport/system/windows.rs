//! Windows spooler queues
//!
//! Uses the Win32 printing API. The calls are synchronous and run on the
//! blocking thread pool.

use core::ffi::c_void;

use tracing::warn;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW, GetPrinterW,
    OpenPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_HANDLE, PRINTER_INFO_5W,
    PRINTER_INFO_6, PRINTER_STATUS_OFFLINE, StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

use crate::error::{PrintError, PrintResult};

pub const MANUFACTURER: &str = "Windows Printer";

pub async fn list_queues() -> PrintResult<Vec<String>> {
    run_blocking(list_queues_sync).await
}

pub async fn is_online(queue: &str) -> PrintResult<bool> {
    let queue = queue.to_string();
    run_blocking(move || Ok(check_online(&queue))).await
}

pub async fn submit_raw(queue: &str, data: &[u8]) -> PrintResult<()> {
    let queue = queue.to_string();
    let data = data.to_vec();
    run_blocking(move || write_raw(&queue, &data)).await
}

async fn run_blocking<T, F>(f: F) -> PrintResult<T>
where
    F: FnOnce() -> PrintResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PrintError::System(format!("Task join failed: {}", e)))?
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Check if a port is a virtual printer port
fn is_virtual_port(port: &str) -> bool {
    let p = port.to_lowercase();
    p == "file:"
        || p == "portprompt:"
        || p == "xpsport:"
        || p.starts_with("onenote")
        || p == "nul:"
        || p.starts_with("wfsport:")
}

/// List installed queues, skipping virtual printers (PDF, XPS, OneNote)
fn list_queues_sync() -> PrintResult<Vec<String>> {
    unsafe {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);

        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buf: Vec<u8> = vec![0; needed as usize];
        EnumPrintersW(
            flags,
            None,
            5,
            Some(buf.as_mut_slice()),
            &mut needed,
            &mut returned,
        )
        .map_err(|_| PrintError::System("EnumPrintersW failed".to_string()))?;

        let ptr = buf.as_ptr() as *const PRINTER_INFO_5W;
        let slice = std::slice::from_raw_parts(ptr, returned as usize);

        let mut result = Vec::new();
        for info in slice.iter() {
            if info.pPrinterName.is_null() {
                continue;
            }
            let name = PWSTR(info.pPrinterName.0).to_string().unwrap_or_default();
            let port = if info.pPortName.is_null() {
                String::new()
            } else {
                PWSTR(info.pPortName.0).to_string().unwrap_or_default()
            };

            if !is_virtual_port(&port) {
                result.push(name);
            }
        }

        Ok(result)
    }
}

/// A queue is online when it opens and is not flagged offline
fn check_online(name: &str) -> bool {
    unsafe {
        let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
        let name_w = to_wide(name);

        if OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None).is_err() {
            return false;
        }

        let mut online = true;
        let mut needed: u32 = 0;
        let _ = GetPrinterW(handle, 6, None, &mut needed);
        if needed > 0 {
            let mut buf: Vec<u8> = vec![0; needed as usize];
            if GetPrinterW(handle, 6, Some(buf.as_mut_slice()), &mut needed).is_ok() {
                let info = *(buf.as_ptr() as *const PRINTER_INFO_6);
                online = (info.dwStatus & PRINTER_STATUS_OFFLINE) == 0;
            }
        }

        let _ = ClosePrinter(handle);
        online
    }
}

/// Submit one RAW job to the spooler
fn write_raw(name: &str, data: &[u8]) -> PrintResult<()> {
    unsafe {
        let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
        let name_w = to_wide(name);

        OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
            .map_err(|_| PrintError::System(format!("OpenPrinterW failed: {}", name)))?;

        let doc_name_w = to_wide("Ticket");
        let datatype_w = to_wide("RAW");
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        if StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
            let _ = ClosePrinter(handle);
            return Err(PrintError::System("StartDocPrinter failed".to_string()));
        }

        if !StartPagePrinter(handle).as_bool() {
            let _ = EndDocPrinter(handle);
            let _ = ClosePrinter(handle);
            return Err(PrintError::System("StartPagePrinter failed".to_string()));
        }

        let mut written: u32 = 0;
        let ok = WritePrinter(
            handle,
            data.as_ptr() as *const c_void,
            data.len() as u32,
            &mut written,
        );

        let _ = EndPagePrinter(handle);
        let _ = EndDocPrinter(handle);
        let _ = ClosePrinter(handle);

        if !ok.as_bool() {
            return Err(PrintError::System("WritePrinter failed".to_string()));
        }

        if written != data.len() as u32 {
            warn!(written, expected = data.len(), "Spooler accepted a partial job");
            return Err(PrintError::System("Incomplete write".to_string()));
        }

        Ok(())
    }
}
