use chrono::Utc;
use std::collections::BTreeMap;

use crate::server::models::report::{ReportCriteria, ReportStatistics, TicketReport};
use crate::server::models::ticket::Ticket;

/// Builds a report over an already status/priority/category-filtered ticket
/// set: applies the inclusive date window, then derives the counts and the
/// average resolution time.
pub fn generate(tickets: Vec<Ticket>, criteria: &ReportCriteria) -> TicketReport {
    let (start, end) = criteria.date_bounds();
    let tickets: Vec<Ticket> = tickets
        .into_iter()
        .filter(|t| start.map_or(true, |s| t.created_at >= s))
        .filter(|t| end.map_or(true, |e| t.created_at <= e))
        .collect();

    TicketReport {
        statistics: statistics(&tickets),
        filters: criteria.into(),
        generated_at: Utc::now(),
        tickets,
    }
}

fn statistics(tickets: &[Ticket]) -> ReportStatistics {
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_priority: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut resolution_seconds = 0i64;
    let mut resolved_count = 0u32;

    for ticket in tickets {
        *by_status.entry(ticket.status.to_string()).or_default() += 1;
        *by_priority.entry(ticket.priority.to_string()).or_default() += 1;
        *by_category.entry(ticket.category.to_string()).or_default() += 1;

        if ticket.status.is_resolved_or_closed() {
            resolution_seconds += (ticket.updated_at - ticket.created_at).num_seconds();
            resolved_count += 1;
        }
    }

    let average_resolution_time = if resolved_count > 0 {
        let hours = resolution_seconds as f64 / f64::from(resolved_count) / 3600.0;
        (hours * 10.0).round() / 10.0
    } else {
        0.0
    };

    ReportStatistics {
        total_tickets: tickets.len(),
        by_status,
        by_priority,
        by_category,
        average_resolution_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::models::ticket::{TicketCategory, TicketPriority, TicketStatus};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn ticket_at(status: TicketStatus, created_at: DateTime<Utc>, resolution: Duration) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            display_id: "TKT-000001".into(),
            title: "t".into(),
            description: "d".into(),
            status,
            priority: TicketPriority::Medium,
            category: TicketCategory::Payroll,
            submitted_by: Uuid::new_v4(),
            submitted_by_email: "a@b.c".into(),
            submitted_by_name: "A B".into(),
            attachments: Vec::new(),
            created_at,
            updated_at: created_at + resolution,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn counts_by_status_priority_category() {
        let now = Utc::now();
        let tickets = vec![
            ticket_at(TicketStatus::Pending, now, Duration::zero()),
            ticket_at(TicketStatus::Pending, now, Duration::zero()),
            ticket_at(TicketStatus::Resolved, now, Duration::hours(1)),
            ticket_at(TicketStatus::Closed, now, Duration::hours(1)),
        ];
        let report = generate(tickets, &ReportCriteria::default());

        assert_eq!(report.statistics.total_tickets, 4);
        assert_eq!(report.statistics.by_status["Pending"], 2);
        assert_eq!(report.statistics.by_status["Resolved"], 1);
        assert_eq!(report.statistics.by_status["Closed"], 1);
        // Only observed values appear.
        assert!(!report.statistics.by_status.contains_key("In Progress"));
        assert_eq!(report.statistics.by_category["Payroll"], 4);
    }

    #[test]
    fn average_resolution_time_in_hours_one_decimal() {
        let now = Utc::now();
        let tickets = vec![
            ticket_at(TicketStatus::Resolved, now, Duration::hours(2)),
            ticket_at(TicketStatus::Resolved, now, Duration::hours(4)),
            // Pending tickets do not count toward resolution time.
            ticket_at(TicketStatus::Pending, now, Duration::hours(100)),
        ];
        let report = generate(tickets, &ReportCriteria::default());
        assert_eq!(report.statistics.average_resolution_time, 3.0);
    }

    #[test]
    fn average_resolution_time_rounds_to_one_decimal() {
        let now = Utc::now();
        let tickets = vec![
            ticket_at(TicketStatus::Closed, now, Duration::minutes(10)),
            ticket_at(TicketStatus::Closed, now, Duration::minutes(30)),
        ];
        let report = generate(tickets, &ReportCriteria::default());
        // 20 minutes = 0.333... hours -> 0.3
        assert_eq!(report.statistics.average_resolution_time, 0.3);
    }

    #[test]
    fn no_resolved_tickets_means_zero_average() {
        let tickets = vec![ticket_at(
            TicketStatus::Pending,
            Utc::now(),
            Duration::zero(),
        )];
        let report = generate(tickets, &ReportCriteria::default());
        assert_eq!(report.statistics.average_resolution_time, 0.0);
    }

    #[test]
    fn end_date_includes_the_whole_day() {
        let created = at(2024, 3, 15, 14); // 2pm on the end date
        let tickets = vec![ticket_at(TicketStatus::Pending, created, Duration::zero())];
        let criteria = ReportCriteria {
            end_date: Some(created.date_naive()),
            ..Default::default()
        };
        let report = generate(tickets, &criteria);
        assert_eq!(report.statistics.total_tickets, 1);
    }

    #[test]
    fn date_window_is_inclusive_on_both_ends() {
        let tickets = vec![
            ticket_at(TicketStatus::Pending, at(2024, 3, 10, 0), Duration::zero()),
            ticket_at(TicketStatus::Pending, at(2024, 3, 12, 9), Duration::zero()),
            ticket_at(TicketStatus::Pending, at(2024, 3, 20, 9), Duration::zero()),
        ];
        let criteria = ReportCriteria {
            start_date: Some(at(2024, 3, 10, 0).date_naive()),
            end_date: Some(at(2024, 3, 12, 0).date_naive()),
            ..Default::default()
        };
        let report = generate(tickets, &criteria);
        assert_eq!(report.statistics.total_tickets, 2);
    }

    #[test]
    fn filters_echo_all_for_unconstrained_fields() {
        let report = generate(Vec::new(), &ReportCriteria::default());
        assert_eq!(report.filters.category, "All");
        assert_eq!(report.filters.status, "All");
        assert_eq!(report.filters.priority, "All");
    }
}
