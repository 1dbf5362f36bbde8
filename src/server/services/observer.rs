use std::fmt;

use tracing::info;

use crate::server::models::ticket::Ticket;

/// Event tag passed to observers after a state-changing ticket operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEvent {
    Created,
    Updated,
    Closed,
}

impl TicketEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketEvent::Created => "created",
            TicketEvent::Updated => "updated",
            TicketEvent::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener notified after each successful create/update/close. Observers
/// run synchronously in registration order; a failure is captured per
/// observer and never prevents the remaining observers from running.
pub trait TicketObserver: Send + Sync {
    fn name(&self) -> &'static str;
    fn on_ticket_event(&self, event: TicketEvent, ticket: &Ticket) -> anyhow::Result<()>;
}

/// Built-in observer that logs a human-readable notification; on close it
/// additionally logs the would-send-email message for the submitter.
pub struct NotificationObserver;

impl TicketObserver for NotificationObserver {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn on_ticket_event(&self, event: TicketEvent, ticket: &Ticket) -> anyhow::Result<()> {
        info!(
            "sending notification to user: Notification: Ticket [{}] - {} was {}.",
            ticket.display_id, ticket.title, event
        );
        if event == TicketEvent::Closed {
            info!(
                "Email sent to {}: Your ticket has been closed.",
                ticket.submitted_by_email
            );
        }
        Ok(())
    }
}
