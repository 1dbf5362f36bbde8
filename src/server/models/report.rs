use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::server::error::ApiError;
use crate::server::models::ticket::{
    Ticket, TicketCategory, TicketFilter, TicketPriority, TicketStatus,
};

/// The sentinel the report UI sends for "no constraint".
const ALL: &str = "All";

/// Raw report criteria as received over the wire. `category`/`status`/
/// `priority` stay strings here because the sentinel `"All"` is not a
/// member of the corresponding enums.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl ReportCriteria {
    /// Resolves the criteria into a store filter, treating absent fields and
    /// the `"All"` sentinel as unconstrained. Unknown enum values fail
    /// `Validation`.
    pub fn ticket_filter(&self) -> Result<TicketFilter, ApiError> {
        Ok(TicketFilter {
            status: parse_constraint::<TicketStatus>(self.status.as_deref())?,
            priority: parse_constraint::<TicketPriority>(self.priority.as_deref())?,
            category: parse_constraint::<TicketCategory>(self.category.as_deref())?,
        })
    }

    /// Inclusive date window; the end date expands to 23:59:59.999 so the
    /// whole final day is covered.
    pub fn date_bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = self
            .start_date
            .map(|d| d.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc());
        let end = self.end_date.map(|d| {
            d.and_hms_milli_opt(23, 59, 59, 999)
                .expect("valid end of day")
                .and_utc()
        });
        (start, end)
    }
}

fn parse_constraint<T: FromStr<Err = ApiError>>(value: Option<&str>) -> Result<Option<T>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) if v == ALL || v.is_empty() => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

/// Filter echo included in the report payload, `"All"` standing in for
/// unconstrained fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: String,
    pub status: String,
    pub priority: String,
}

impl From<&ReportCriteria> for ReportFilters {
    fn from(criteria: &ReportCriteria) -> Self {
        let or_all = |v: &Option<String>| {
            v.clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| ALL.to_string())
        };
        Self {
            start_date: criteria.start_date,
            end_date: criteria.end_date,
            category: or_all(&criteria.category),
            status: or_all(&criteria.status),
            priority: or_all(&criteria.priority),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    pub total_tickets: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Mean (updatedAt - createdAt) over Resolved/Closed tickets, in hours,
    /// rounded to one decimal place. Zero when no such tickets exist.
    pub average_resolution_time: f64,
}

/// Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReport {
    pub tickets: Vec<Ticket>,
    pub statistics: ReportStatistics,
    pub filters: ReportFilters,
    pub generated_at: DateTime<Utc>,
}
