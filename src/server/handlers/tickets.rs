use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::models::{
    CreateTicket, ReportCriteria, Ticket, TicketFilter, TicketReport, UpdateTicket,
};
use crate::server::services::export::{ExportFile, ExportFormat};

#[derive(Debug, Serialize)]
pub struct TicketEnvelope {
    pub message: &'static str,
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    pub tickets: Vec<Ticket>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub report_data: TicketReport,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

pub async fn submit_ticket(
    State(state): State<AppState>,
    Json(input): Json<CreateTicket>,
) -> Result<(StatusCode, Json<TicketEnvelope>), ApiError> {
    info!(
        "received ticket submission: {} ({} attachments)",
        input.title,
        input.attachments.len()
    );
    let ticket = state.facade.submit_ticket(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(TicketEnvelope {
            message: "Ticket submitted successfully",
            ticket,
        }),
    ))
}

pub async fn tickets_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TicketListResponse>, ApiError> {
    let tickets = state.facade.tickets_for_user(user_id).await?;
    let total = tickets.len();
    Ok(Json(TicketListResponse { tickets, total }))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.facade.ticket_status(id).await?;
    Ok(Json(TicketResponse { ticket }))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<TicketListResponse>, ApiError> {
    let tickets = state.facade.tickets(&filter).await?;
    let total = tickets.len();
    Ok(Json(TicketListResponse { tickets, total }))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateTicket>,
) -> Result<Json<TicketEnvelope>, ApiError> {
    let ticket = state.facade.update_ticket(id, patch).await?;
    Ok(Json(TicketEnvelope {
        message: "Ticket updated successfully",
        ticket,
    }))
}

pub async fn close_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketEnvelope>, ApiError> {
    let ticket = state.facade.close_ticket(id).await?;
    Ok(Json(TicketEnvelope {
        message: "Ticket closed successfully",
        ticket,
    }))
}

pub async fn generate_report(
    State(state): State<AppState>,
    Json(criteria): Json<ReportCriteria>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.facade.generate_report(&criteria).await?;
    Ok(Json(ReportResponse {
        success: true,
        report_data: report,
    }))
}

pub async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(criteria): Json<ReportCriteria>,
) -> Result<ExportFile, ApiError> {
    let format: ExportFormat = query.format.parse()?;
    let report = state.facade.generate_report(&criteria).await?;
    state.facade.export_report(format, &report)
}
