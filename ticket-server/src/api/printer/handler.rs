//! Printer API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use ticket_printer::{PrinterDescriptor, StatusReport};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub printer_name: String,
}

/// List printers on USB and the system queues
pub async fn detect(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<PrinterDescriptor>>>> {
    Ok(ok(state.printer.detect().await))
}

pub async fn connect(
    State(state): State<ServerState>,
    Json(payload): Json<ConnectRequest>,
) -> AppResult<Json<AppResponse<StatusReport>>> {
    let status = state.printer.connect(&payload.printer_name).await?;
    Ok(ok_with_message(status, "Printer connected"))
}

pub async fn disconnect(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<StatusReport>>> {
    let status = state.printer.disconnect().await;
    Ok(ok_with_message(status, "Printer disconnected"))
}

pub async fn status(State(state): State<ServerState>) -> AppResult<Json<AppResponse<StatusReport>>> {
    Ok(ok(state.printer.status()))
}

/// Print the diagnostic page
pub async fn test_print(State(state): State<ServerState>) -> AppResult<Json<AppResponse<bool>>> {
    state.printer.test_print().await?;
    Ok(ok_with_message(true, "Test page printed"))
}
