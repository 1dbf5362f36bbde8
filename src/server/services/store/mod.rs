use async_trait::async_trait;
use uuid::Uuid;

use crate::server::error::ApiError;
use crate::server::models::{
    Company, CreateTicket, CreateUser, RegisterCompany, Ticket, TicketFilter, UpdateCompany,
    UpdateTicket, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Persistence surface for tickets, users, and companies. The HTTP layer
/// only ever talks to this trait so tests can run against [`MemoryStore`]
/// while deployments use [`PostgresStore`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_ticket(&self, input: CreateTicket) -> Result<Ticket, ApiError>;
    async fn ticket(&self, id: Uuid) -> Result<Ticket, ApiError>;
    async fn tickets_by_submitter(&self, user_id: Uuid) -> Result<Vec<Ticket>, ApiError>;
    async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, ApiError>;
    async fn update_ticket(&self, id: Uuid, patch: UpdateTicket) -> Result<Ticket, ApiError>;
    /// Closes unconditionally; any prior status is accepted.
    async fn close_ticket(&self, id: Uuid) -> Result<Ticket, ApiError>;

    async fn create_user(&self, input: CreateUser) -> Result<User, ApiError>;
    async fn user(&self, id: Uuid) -> Result<User, ApiError>;

    async fn register_company(&self, input: RegisterCompany) -> Result<Company, ApiError>;
    async fn company(&self, id: Uuid) -> Result<Company, ApiError>;
    async fn update_company(&self, id: Uuid, patch: UpdateCompany) -> Result<Company, ApiError>;
    async fn company_email_exists(&self, email: &str) -> Result<bool, ApiError>;
}

/// Human-facing sequential ticket code: `TKT-` + 6-digit zero-padded ordinal.
pub fn format_display_id(ordinal: u64) -> String {
    format!("TKT-{ordinal:06}")
}
