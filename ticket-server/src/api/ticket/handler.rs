//! Ticket API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::services::PrintResponse;
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub sale_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub sale_id: i64,
    pub text: String,
}

/// Print a sale ticket, or hand the commands back for browser printing
pub async fn print(
    State(state): State<ServerState>,
    Json(payload): Json<SaleRequest>,
) -> AppResult<Json<AppResponse<PrintResponse>>> {
    let response = state.printer.print_sale(payload.sale_id).await?;
    Ok(ok(response))
}

pub async fn preview(
    State(state): State<ServerState>,
    Json(payload): Json<SaleRequest>,
) -> AppResult<Json<AppResponse<PreviewResponse>>> {
    let text = state.printer.preview_sale(payload.sale_id).await?;
    Ok(ok(PreviewResponse {
        sale_id: payload.sale_id,
        text,
    }))
}
