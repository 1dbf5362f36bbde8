use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::models::{Company, RegisterCompany, UpdateCompany};

#[derive(Debug, Deserialize)]
pub struct CheckCompanyRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckCompanyResponse {
    pub exists: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CompanyEnvelope {
    pub message: &'static str,
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub company: Company,
}

pub async fn check_company(
    State(state): State<AppState>,
    Json(req): Json<CheckCompanyRequest>,
) -> Result<Json<CheckCompanyResponse>, ApiError> {
    let exists = state.store.company_email_exists(&req.email).await?;
    let message = if exists {
        "Company email already registered"
    } else {
        "Email is available"
    };
    Ok(Json(CheckCompanyResponse { exists, message }))
}

pub async fn register_company(
    State(state): State<AppState>,
    Json(input): Json<RegisterCompany>,
) -> Result<(StatusCode, Json<CompanyEnvelope>), ApiError> {
    let company = state.store.register_company(input).await?;
    info!("company registered: {} - {}", company.name, company.email);
    Ok((
        StatusCode::CREATED,
        Json(CompanyEnvelope {
            message: "Company registered successfully",
            company,
        }),
    ))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = state.store.company(id).await?;
    Ok(Json(CompanyResponse { company }))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateCompany>,
) -> Result<Json<CompanyEnvelope>, ApiError> {
    let company = state.store.update_company(id, patch).await?;
    info!("company updated: {}", company.name);
    Ok(Json(CompanyEnvelope {
        message: "Company updated successfully",
        company,
    }))
}
