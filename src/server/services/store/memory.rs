use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::server::error::ApiError;
use crate::server::models::{
    Company, CreateTicket, CreateUser, RegisterCompany, Ticket, TicketFilter, TicketStatus,
    UpdateCompany, UpdateTicket, User,
};
use crate::server::services::store::{format_display_id, Store};

/// In-process store used by the test suite and local experiments. Display-ID
/// assignment goes through an atomic counter, so concurrent submissions can
/// never mint the same code.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    ticket_seq: AtomicU64,
}

#[derive(Default)]
struct Inner {
    tickets: HashMap<Uuid, Ticket>,
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
        tickets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.display_id.cmp(&a.display_id))
        });
        tickets
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_ticket(&self, input: CreateTicket) -> Result<Ticket, ApiError> {
        input.validate()?;
        let mut inner = self.inner.write().expect("store lock poisoned");
        let submitter = inner
            .users
            .get(&input.user_id)
            .ok_or(ApiError::NotFound("User"))?
            .clone();

        let ordinal = self.ticket_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            display_id: format_display_id(ordinal),
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
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .tickets
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound("Ticket"))
    }

    async fn tickets_by_submitter(&self, user_id: Uuid) -> Result<Vec<Ticket>, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        let tickets = inner
            .tickets
            .values()
            .filter(|t| t.submitted_by == user_id)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(tickets))
    }

    async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        let tickets = inner
            .tickets
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(Self::sorted_desc(tickets))
    }

    async fn update_ticket(&self, id: Uuid, patch: UpdateTicket) -> Result<Ticket, ApiError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let ticket = inner
            .tickets
            .get_mut(&id)
            .ok_or(ApiError::NotFound("Ticket"))?;
        ticket.apply_update(patch, Utc::now())?;
        Ok(ticket.clone())
    }

    async fn close_ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let ticket = inner
            .tickets
            .get_mut(&id)
            .ok_or(ApiError::NotFound("Ticket"))?;
        ticket.status = TicketStatus::Closed;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, ApiError> {
        input.validate()?;
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.users.values().any(|u| u.email == input.email) {
            return Err(ApiError::Conflict("User already exists".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: Uuid) -> Result<User, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound("User"))
    }

    async fn register_company(&self, input: RegisterCompany) -> Result<Company, ApiError> {
        input.validate()?;
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.companies.values().any(|c| c.email == input.email) {
            return Err(ApiError::Conflict(
                "Company email already registered".into(),
            ));
        }
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
        inner.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn company(&self, id: Uuid) -> Result<Company, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .companies
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound("Company"))
    }

    async fn update_company(&self, id: Uuid, patch: UpdateCompany) -> Result<Company, ApiError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let company = inner
            .companies
            .get_mut(&id)
            .ok_or(ApiError::NotFound("Company"))?;
        company.apply_update(patch, Utc::now());
        Ok(company.clone())
    }

    async fn company_email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.companies.values().any(|c| c.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::models::{TicketCategory, UserRole};

    async fn seeded_store() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                email: "pat@example.com".into(),
                first_name: "Pat".into(),
                last_name: "Lee".into(),
                role: UserRole::Employee,
            })
            .await
            .unwrap();
        (store, user)
    }

    fn submission(user_id: Uuid, title: &str) -> CreateTicket {
        CreateTicket {
            title: title.into(),
            description: "something broke".into(),
            priority: None,
            category: TicketCategory::TechnicalIssue,
            user_id,
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn display_ids_are_sequential_and_unique() {
        let (store, user) = seeded_store().await;
        let mut seen = std::collections::HashSet::new();
        for i in 0..5 {
            let t = store
                .create_ticket(submission(user.id, &format!("ticket {i}")))
                .await
                .unwrap();
            assert!(t.display_id.starts_with("TKT-"));
            assert_eq!(t.display_id.len(), 10);
            assert!(seen.insert(t.display_id));
        }
        let last = store.tickets(&TicketFilter::default()).await.unwrap();
        assert_eq!(last.len(), 5);
    }

    #[tokio::test]
    async fn create_denormalizes_submitter_identity() {
        let (store, user) = seeded_store().await;
        let t = store
            .create_ticket(submission(user.id, "printer jam"))
            .await
            .unwrap();
        assert_eq!(t.submitted_by_email, "pat@example.com");
        assert_eq!(t.submitted_by_name, "Pat Lee");
        assert_eq!(t.status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn create_for_unknown_submitter_fails_not_found() {
        let (store, _) = seeded_store().await;
        let err = store
            .create_ticket(submission(Uuid::new_v4(), "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("User")));
    }

    #[tokio::test]
    async fn close_works_from_any_status() {
        let (store, user) = seeded_store().await;
        let t = store
            .create_ticket(submission(user.id, "wifi down"))
            .await
            .unwrap();
        let before = t.updated_at;

        let closed = store.close_ticket(t.id).await.unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert!(closed.updated_at > before);

        // Closing an already-closed ticket stays closed.
        let again = store.close_ticket(t.id).await.unwrap();
        assert_eq!(again.status, TicketStatus::Closed);
    }
}
