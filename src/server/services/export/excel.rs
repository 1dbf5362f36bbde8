use crate::server::error::ApiError;
use crate::server::models::report::TicketReport;
use crate::server::services::export::{
    format_date, report_filename, ExportFile, ReportExporter, REPORT_COLUMNS,
};

/// Tab-delimited spreadsheet export. A UTF-8 byte-order mark leads the file
/// so spreadsheet readers detect the encoding; embedded quotes are doubled
/// but fields are not wrapped, matching the tab-separated dialect.
pub struct ExcelReportExporter;

impl ReportExporter for ExcelReportExporter {
    fn export(&self, report: &TicketReport) -> Result<ExportFile, ApiError> {
        let mut lines = Vec::with_capacity(report.tickets.len() + 1);
        lines.push(REPORT_COLUMNS.join("\t"));
        for ticket in &report.tickets {
            lines.push(
                [
                    ticket.display_id.clone(),
                    ticket.title.replace('"', "\"\""),
                    ticket.category.to_string(),
                    ticket.priority.to_string(),
                    ticket.status.to_string(),
                    ticket.submitted_by_name.clone(),
                    ticket.submitted_by_email.clone(),
                    format_date(ticket.created_at),
                    format_date(ticket.updated_at),
                ]
                .join("\t"),
            );
        }
        let mut bytes = "\u{FEFF}".as_bytes().to_vec();
        bytes.extend_from_slice(lines.join("\n").as_bytes());
        Ok(ExportFile {
            filename: report_filename("xls"),
            content_type: "application/vnd.ms-excel; charset=utf-8",
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::models::report::ReportCriteria;
    use crate::server::models::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus};
    use crate::server::services::report;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_report() -> TicketReport {
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            display_id: "TKT-000003".into(),
            title: "Payslip missing".into(),
            description: "d".into(),
            status: TicketStatus::Resolved,
            priority: TicketPriority::Low,
            category: TicketCategory::Payroll,
            submitted_by: Uuid::new_v4(),
            submitted_by_email: "lee@example.com".into(),
            submitted_by_name: "Lee Chan".into(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        report::generate(vec![ticket], &ReportCriteria::default())
    }

    #[test]
    fn starts_with_utf8_bom() {
        let file = ExcelReportExporter.export(&sample_report()).unwrap();
        assert_eq!(&file.bytes[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn rows_are_tab_delimited() {
        let file = ExcelReportExporter.export(&sample_report()).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        let header = text.trim_start_matches('\u{FEFF}').lines().next().unwrap();
        assert_eq!(header.split('\t').count(), 9);
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("TKT-000003\tPayslip missing\tPayroll\tLow\tResolved\t"));
    }

    #[test]
    fn filename_uses_xls_suffix() {
        let file = ExcelReportExporter.export(&sample_report()).unwrap();
        assert!(file.filename.ends_with(".xls"));
        assert_eq!(file.content_type, "application/vnd.ms-excel; charset=utf-8");
    }
}
