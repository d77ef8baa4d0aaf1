//! Configuration API Handlers
//!
//! Update bodies are taken as raw JSON so shape errors surface as
//! validation errors in the response envelope.

use axum::{Json, extract::State};
use serde::Serialize;
use serde::de::DeserializeOwned;
use ticket_printer::{BusinessConfig, TicketConfig};

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Serialize)]
pub struct AllConfig {
    pub business: Option<BusinessConfig>,
    pub ticket: TicketConfig,
}

fn parse<T: DeserializeOwned>(payload: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(payload).map_err(|e| AppError::validation(e.to_string()))
}

pub async fn get_business(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Option<BusinessConfig>>>> {
    Ok(ok(state.printer.business_config().await?))
}

pub async fn update_business(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<Json<AppResponse<BusinessConfig>>> {
    let config: BusinessConfig = parse(payload)?;
    let saved = state.printer.save_business_config(config).await?;
    Ok(ok_with_message(saved, "Business configuration saved"))
}

pub async fn get_ticket(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<TicketConfig>>> {
    Ok(ok(state.printer.ticket_config().await?))
}

pub async fn update_ticket(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<Json<AppResponse<TicketConfig>>> {
    let config: TicketConfig = parse(payload)?;
    let saved = state.printer.save_ticket_config(config).await?;
    Ok(ok_with_message(saved, "Ticket configuration saved"))
}

pub async fn get_all(State(state): State<ServerState>) -> AppResult<Json<AppResponse<AllConfig>>> {
    Ok(ok(AllConfig {
        business: state.printer.business_config().await?,
        ticket: state.printer.ticket_config().await?,
    }))
}
