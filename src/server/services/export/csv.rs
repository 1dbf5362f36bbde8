use crate::server::error::ApiError;
use crate::server::models::report::TicketReport;
use crate::server::services::export::{
    format_date, quoted, report_filename, ExportFile, ReportExporter, REPORT_COLUMNS,
};

/// Comma-delimited export. Title and submitter name are quoted with embedded
/// quotes doubled; the remaining columns are bare enum/date strings.
pub struct CsvReportExporter;

impl ReportExporter for CsvReportExporter {
    fn export(&self, report: &TicketReport) -> Result<ExportFile, ApiError> {
        let mut lines = Vec::with_capacity(report.tickets.len() + 1);
        lines.push(REPORT_COLUMNS.join(","));
        for ticket in &report.tickets {
            lines.push(
                [
                    ticket.display_id.clone(),
                    quoted(&ticket.title),
                    ticket.category.to_string(),
                    ticket.priority.to_string(),
                    ticket.status.to_string(),
                    quoted(&ticket.submitted_by_name),
                    ticket.submitted_by_email.clone(),
                    format_date(ticket.created_at),
                    format_date(ticket.updated_at),
                ]
                .join(","),
            );
        }
        Ok(ExportFile {
            filename: report_filename("csv"),
            content_type: "text/csv; charset=utf-8",
            bytes: lines.join("\n").into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::models::report::{ReportCriteria, TicketReport};
    use crate::server::models::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus};
    use crate::server::services::report;
    use chrono::Utc;
    use uuid::Uuid;

    fn report_with(title: &str) -> TicketReport {
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            display_id: "TKT-000007".into(),
            title: title.into(),
            description: "d".into(),
            status: TicketStatus::Pending,
            priority: TicketPriority::High,
            category: TicketCategory::Account,
            submitted_by: Uuid::new_v4(),
            submitted_by_email: "kim@example.com".into(),
            submitted_by_name: "Kim Park".into(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        report::generate(vec![ticket], &ReportCriteria::default())
    }

    #[test]
    fn header_row_matches_report_columns() {
        let file = CsvReportExporter.export(&report_with("t")).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.starts_with(
            "Ticket ID,Title,Category,Priority,Status,Submitted By,Email,Created Date,Updated Date\n"
        ));
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        let file = CsvReportExporter.export(&report_with("He said \"hi\"")).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.contains("\"He said \"\"hi\"\"\""));
    }

    #[test]
    fn row_carries_ticket_fields_in_order() {
        let file = CsvReportExporter.export(&report_with("Broken badge")).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("TKT-000007,\"Broken badge\",Account,High,Pending,\"Kim Park\",kim@example.com,"));
    }

    #[test]
    fn filename_and_content_type() {
        let file = CsvReportExporter.export(&report_with("t")).unwrap();
        assert!(file.filename.ends_with(".csv"));
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
    }
}
