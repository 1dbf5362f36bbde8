use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::server::error::ApiError;
use crate::server::models::{
    CreateTicket, ReportCriteria, Ticket, TicketFilter, TicketReport, UpdateTicket,
};
use crate::server::services::export::{exporter_for, ExportFile, ExportFormat};
use crate::server::services::observer::{TicketEvent, TicketObserver};
use crate::server::services::report;
use crate::server::services::store::Store;

/// Single entry point for ticket operations. Wraps the store, fans
/// notifications out to observers after state-changing calls, and fronts
/// report generation and export.
pub struct TicketFacade {
    store: Arc<dyn Store>,
    observers: Vec<Arc<dyn TicketObserver>>,
}

impl TicketFacade {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            observers: Vec::new(),
        }
    }

    /// Registers an observer; notification order follows registration order.
    pub fn attach(&mut self, observer: Arc<dyn TicketObserver>) {
        self.observers.push(observer);
    }

    pub async fn submit_ticket(&self, input: CreateTicket) -> Result<Ticket, ApiError> {
        let ticket = self.store.create_ticket(input).await?;
        info!("ticket created: {} - {}", ticket.display_id, ticket.title);
        self.notify(TicketEvent::Created, &ticket);
        Ok(ticket)
    }

    pub async fn update_ticket(&self, id: Uuid, patch: UpdateTicket) -> Result<Ticket, ApiError> {
        let ticket = self.store.update_ticket(id, patch).await?;
        info!("ticket updated: {} - {}", ticket.display_id, ticket.title);
        self.notify(TicketEvent::Updated, &ticket);
        Ok(ticket)
    }

    pub async fn close_ticket(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let ticket = self.store.close_ticket(id).await?;
        info!("ticket closed: {} - {}", ticket.display_id, ticket.title);
        self.notify(TicketEvent::Closed, &ticket);
        Ok(ticket)
    }

    pub async fn ticket_status(&self, id: Uuid) -> Result<Ticket, ApiError> {
        self.store.ticket(id).await
    }

    pub async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, ApiError> {
        self.store.tickets_by_submitter(user_id).await
    }

    pub async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, ApiError> {
        self.store.tickets(filter).await
    }

    pub async fn generate_report(
        &self,
        criteria: &ReportCriteria,
    ) -> Result<TicketReport, ApiError> {
        let filter = criteria.ticket_filter()?;
        let tickets = self.store.tickets(&filter).await?;
        let report = report::generate(tickets, criteria);
        info!(
            "ticket report generated: {} tickets found",
            report.statistics.total_tickets
        );
        Ok(report)
    }

    pub fn export_report(
        &self,
        format: ExportFormat,
        report: &TicketReport,
    ) -> Result<ExportFile, ApiError> {
        exporter_for(format).export(report)
    }

    /// Synchronous fan-out in registration order. Each observer's result is
    /// captured independently so one failure cannot abort the rest.
    fn notify(&self, event: TicketEvent, ticket: &Ticket) {
        for observer in &self.observers {
            if let Err(e) = observer.on_ticket_event(event, ticket) {
                warn!(
                    "observer {} failed on {} event for {}: {e:#}",
                    observer.name(),
                    event,
                    ticket.display_id
                );
            }
        }
    }
}
