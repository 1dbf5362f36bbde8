use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::server::error::ApiError;

pub const MAX_ATTACHMENTS: usize = 5;
pub const MAX_ATTACHMENT_BYTES: i64 = 5 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    /// Transition table for the ticket lifecycle. `Closed` is terminal;
    /// re-asserting the current status is a no-op and always allowed.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        if self == next {
            return true;
        }
        match self {
            Pending => matches!(next, InProgress | Resolved | Closed),
            InProgress => matches!(next, Pending | Resolved | Closed),
            Resolved => matches!(next, Closed | InProgress),
            Closed => false,
        }
    }

    pub fn is_resolved_or_closed(self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TicketStatus::Pending),
            "In Progress" => Ok(TicketStatus::InProgress),
            "Resolved" => Ok(TicketStatus::Resolved),
            "Closed" => Ok(TicketStatus::Closed),
            other => Err(ApiError::Validation(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Critical => "Critical",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(TicketPriority::Low),
            "Medium" => Ok(TicketPriority::Medium),
            "High" => Ok(TicketPriority::High),
            "Critical" => Ok(TicketPriority::Critical),
            other => Err(ApiError::Validation(format!(
                "unknown ticket priority: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketCategory {
    #[serde(rename = "Technical Issue")]
    TechnicalIssue,
    Account,
    Payroll,
    #[serde(rename = "Leave Request")]
    LeaveRequest,
    Benefits,
    Other,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::TechnicalIssue => "Technical Issue",
            TicketCategory::Account => "Account",
            TicketCategory::Payroll => "Payroll",
            TicketCategory::LeaveRequest => "Leave Request",
            TicketCategory::Benefits => "Benefits",
            TicketCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Technical Issue" => Ok(TicketCategory::TechnicalIssue),
            "Account" => Ok(TicketCategory::Account),
            "Payroll" => Ok(TicketCategory::Payroll),
            "Leave Request" => Ok(TicketCategory::LeaveRequest),
            "Benefits" => Ok(TicketCategory::Benefits),
            other => {
                if other == "Other" {
                    Ok(TicketCategory::Other)
                } else {
                    Err(ApiError::Validation(format!(
                        "unknown ticket category: {other}"
                    )))
                }
            }
        }
    }
}

/// Attachment metadata. The bytes themselves live in an external blob store;
/// only this record travels with the ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub stored_name: String,
    pub original_name: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment metadata as submitted by a client, before the server stamps
/// the upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    pub stored_name: String,
    pub original_name: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl NewAttachment {
    pub fn into_attachment(self, uploaded_at: DateTime<Utc>) -> Attachment {
        Attachment {
            stored_name: self.stored_name,
            original_name: self.original_name,
            path: self.path,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            uploaded_at,
        }
    }
}

pub fn validate_attachments(attachments: &[NewAttachment]) -> Result<(), ApiError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(ApiError::Validation(format!(
            "at most {MAX_ATTACHMENTS} attachments are allowed"
        )));
    }
    for attachment in attachments {
        if !ALLOWED_MIME_TYPES.contains(&attachment.mime_type.as_str()) {
            return Err(ApiError::Validation(format!(
                "only image attachments (jpg, jpeg, png, gif) are allowed, got {}",
                attachment.mime_type
            )));
        }
        if attachment.size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(ApiError::Validation(format!(
                "attachment {} exceeds the 5MB limit",
                attachment.original_name
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[serde(rename = "ticketId")]
    pub display_id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub submitted_by: Uuid,
    pub submitted_by_email: String,
    pub submitted_by_name: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Applies a partial update in place. Only provided, non-empty fields
    /// change; new attachments append to the existing list; a requested
    /// status change must be legal per the transition table.
    pub fn apply_update(&mut self, patch: UpdateTicket, now: DateTime<Utc>) -> Result<(), ApiError> {
        if let Some(status) = patch.status {
            if !self.status.can_transition_to(status) {
                return Err(ApiError::Validation(format!(
                    "cannot move ticket {} from {} to {}",
                    self.display_id, self.status, status
                )));
            }
            self.status = status;
        }
        if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(description) = patch.description.filter(|d| !d.trim().is_empty()) {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if !patch.attachments.is_empty() {
            validate_attachments(&patch.attachments)?;
            self.attachments.extend(
                patch
                    .attachments
                    .into_iter()
                    .map(|a| a.into_attachment(now)),
            );
        }
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    pub category: TicketCategory,
    pub user_id: Uuid,
    #[serde(default)]
    pub attachments: Vec<NewAttachment>,
}

impl CreateTicket {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::Validation("description is required".into()));
        }
        validate_attachments(&self.attachments)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    #[serde(default)]
    pub attachments: Vec<NewAttachment>,
}

/// Conjunction of the provided fields; absent fields impose no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.map_or(true, |s| ticket.status == s)
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self.category.map_or(true, |c| ticket.category == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            display_id: "TKT-000001".into(),
            title: "VPN keeps dropping".into(),
            description: "Disconnects every ten minutes".into(),
            status: TicketStatus::Pending,
            priority: TicketPriority::Medium,
            category: TicketCategory::TechnicalIssue,
            submitted_by: Uuid::new_v4(),
            submitted_by_email: "sam@example.com".into(),
            submitted_by_name: "Sam Doe".into(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn new_attachment(name: &str) -> NewAttachment {
        NewAttachment {
            stored_name: format!("{name}-stored"),
            original_name: name.into(),
            path: format!("/uploads/{name}"),
            mime_type: "image/png".into(),
            size_bytes: 1024,
        }
    }

    #[test]
    fn closed_is_terminal() {
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Pending));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::InProgress));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Resolved));
        assert!(TicketStatus::Closed.can_transition_to(TicketStatus::Closed));
    }

    #[test]
    fn resolved_can_reopen_to_in_progress_only() {
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Closed));
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::Pending));
    }

    #[test]
    fn status_only_update_leaves_other_fields_alone() {
        let mut t = ticket();
        t.attachments.push(new_attachment("a.png").into_attachment(t.created_at));
        let before = t.clone();

        let patch = UpdateTicket {
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        t.apply_update(patch, Utc::now()).unwrap();

        assert_eq!(t.status, TicketStatus::Resolved);
        assert_eq!(t.title, before.title);
        assert_eq!(t.description, before.description);
        assert_eq!(t.priority, before.priority);
        assert_eq!(t.attachments, before.attachments);
        assert!(t.updated_at > before.updated_at);
    }

    #[test]
    fn update_appends_attachments() {
        let mut t = ticket();
        let now = Utc::now();
        t.attachments.push(new_attachment("a.png").into_attachment(now));
        t.attachments.push(new_attachment("b.png").into_attachment(now));

        let patch = UpdateTicket {
            attachments: vec![new_attachment("c.png"), new_attachment("d.png")],
            ..Default::default()
        };
        t.apply_update(patch, Utc::now()).unwrap();

        assert_eq!(t.attachments.len(), 4);
        assert_eq!(t.attachments[0].original_name, "a.png");
        assert_eq!(t.attachments[3].original_name, "d.png");
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut t = ticket();
        t.status = TicketStatus::Closed;
        let patch = UpdateTicket {
            status: Some(TicketStatus::Pending),
            ..Default::default()
        };
        let err = t.apply_update(patch, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn non_image_attachment_is_rejected() {
        let mut bad = new_attachment("notes.pdf");
        bad.mime_type = "application/pdf".into();
        assert!(validate_attachments(&[bad]).is_err());
    }

    #[test]
    fn oversized_attachment_is_rejected() {
        let mut big = new_attachment("huge.png");
        big.size_bytes = MAX_ATTACHMENT_BYTES + 1;
        assert!(validate_attachments(&[big]).is_err());
    }

    #[test]
    fn wire_enums_use_display_spellings() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let json = serde_json::to_string(&TicketCategory::LeaveRequest).unwrap();
        assert_eq!(json, "\"Leave Request\"");
    }
}
