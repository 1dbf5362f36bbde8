use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::server::error::ApiError;
use crate::server::models::{
    Address, Attachment, Company, CreateTicket, CreateUser, RegisterCompany, Ticket, TicketFilter,
    TicketStatus, UpdateCompany, UpdateTicket, User, UserRole,
};
use crate::server::services::store::{format_display_id, Store};

/// Postgres-backed store. Display-ID ordinals come from a single-row counter
/// bumped inside the creating transaction, so two concurrent submissions can
/// never observe the same count.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    display_id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    category: String,
    submitted_by: Uuid,
    submitted_by_email: String,
    submitted_by_name: String,
    attachments: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = ApiError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let attachments: Vec<Attachment> = serde_json::from_value(row.attachments)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt attachment metadata: {e}")))?;
        Ok(Ticket {
            id: row.id,
            display_id: row.display_id,
            title: row.title,
            description: row.description,
            status: row.status.parse()?,
            priority: row.priority.parse()?,
            category: row.category.parse()?,
            submitted_by: row.submitted_by,
            submitted_by_email: row.submitted_by_email,
            submitted_by_name: row.submitted_by_name,
            attachments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_str() {
            "applicant" => UserRole::Applicant,
            "employee" => UserRole::Employee,
            "hr" => UserRole::Hr,
            "admin" => UserRole::Admin,
            other => {
                return Err(ApiError::Internal(anyhow::anyhow!(
                    "unknown user role in database: {other}"
                )))
            }
        };
        Ok(User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            created_at: row.created_at,
        })
    }
}

fn role_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Applicant => "applicant",
        UserRole::Employee => "employee",
        UserRole::Hr => "hr",
        UserRole::Admin => "admin",
    }
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    country: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: Address {
                street: row.street,
                city: row.city,
                state: row.state,
                zip: row.zip,
                country: row.country,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TICKET_COLUMNS: &str = "id, display_id, title, description, status, priority, category, \
     submitted_by, submitted_by_email, submitted_by_name, attachments, created_at, updated_at";

impl PostgresStore {
    async fn write_ticket(&self, ticket: &Ticket) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE tickets SET title = $2, description = $3, status = $4, priority = $5, \
             category = $6, attachments = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(ticket.id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.category.as_str())
        .bind(serde_json::to_value(&ticket.attachments).expect("attachments serialize"))
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("Ticket"))?;
        row.try_into()
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_ticket(&self, input: CreateTicket) -> Result<Ticket, ApiError> {
        input.validate()?;
        let submitter = self.user(input.user_id).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound("User"),
            other => other,
        })?;

        let mut tx = self.pool.begin().await?;
        let ordinal: i64 = sqlx::query_scalar(
            "UPDATE ticket_counter SET value = value + 1 WHERE id = 1 RETURNING value",
        )
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            display_id: format_display_id(ordinal as u64),
            title: input.title,
            description: input.description,
            status: TicketStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            category: input.category,
            submitted_by: submitter.id,
            submitted_by_name: submitter.display_name(),
            submitted_by_email: submitter.email,
            attachments: input
                .attachments
                .into_iter()
                .map(|a| a.into_attachment(now))
                .collect(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO tickets (id, display_id, title, description, status, priority, category, \
             submitted_by, submitted_by_email, submitted_by_name, attachments, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(ticket.id)
        .bind(&ticket.display_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.category.as_str())
        .bind(ticket.submitted_by)
        .bind(&ticket.submitted_by_email)
        .bind(&ticket.submitted_by_name)
        .bind(serde_json::to_value(&ticket.attachments).expect("attachments serialize"))
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(ticket)
    }

    async fn ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        self.fetch_ticket(id).await
    }

    async fn tickets_by_submitter(&self, user_id: Uuid) -> Result<Vec<Ticket>, ApiError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE submitted_by = $1 \
             ORDER BY created_at DESC, display_id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, ApiError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE \
             ($1::text IS NULL OR status = $1) AND \
             ($2::text IS NULL OR priority = $2) AND \
             ($3::text IS NULL OR category = $3) \
             ORDER BY created_at DESC, display_id DESC"
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.priority.map(|p| p.as_str()))
        .bind(filter.category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn update_ticket(&self, id: Uuid, patch: UpdateTicket) -> Result<Ticket, ApiError> {
        let mut ticket = self.fetch_ticket(id).await?;
        ticket.apply_update(patch, Utc::now())?;
        self.write_ticket(&ticket).await?;
        Ok(ticket)
    }

    async fn close_ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let mut ticket = self.fetch_ticket(id).await?;
        ticket.status = TicketStatus::Closed;
        ticket.updated_at = Utc::now();
        self.write_ticket(&ticket).await?;
        Ok(ticket)
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, ApiError> {
        input.validate()?;
        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(role_str(input.role))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists".into()),
            other => other,
        })?;
        Ok(User {
            id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            created_at: now,
        })
    }

    async fn user(&self, id: Uuid) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, first_name, last_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
        row.try_into()
    }

    async fn register_company(&self, input: RegisterCompany) -> Result<Company, ApiError> {
        input.validate()?;
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO companies (id, name, email, phone, street, city, state, zip, country, \
             is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address.street)
        .bind(&company.address.city)
        .bind(&company.address.state)
        .bind(&company.address.zip)
        .bind(&company.address.country)
        .bind(company.is_active)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Company email already registered".into()),
            other => other,
        })?;
        Ok(company)
    }

    async fn company(&self, id: Uuid) -> Result<Company, ApiError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT id, name, email, phone, street, city, state, zip, country, is_active, \
             created_at, updated_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("Company"))?;
        Ok(row.into())
    }

    async fn update_company(&self, id: Uuid, patch: UpdateCompany) -> Result<Company, ApiError> {
        let mut company = self.company(id).await?;
        company.apply_update(patch, Utc::now());
        sqlx::query(
            "UPDATE companies SET name = $2, email = $3, phone = $4, street = $5, city = $6, \
             state = $7, zip = $8, country = $9, updated_at = $10 WHERE id = $1",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address.street)
        .bind(&company.address.city)
        .bind(&company.address.state)
        .bind(&company.address.zip)
        .bind(&company.address.country)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(company)
    }

    async fn company_email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
