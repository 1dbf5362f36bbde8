use crate::server::error::ApiError;
use crate::server::models::report::TicketReport;
use crate::server::services::export::{
    format_date, report_filename, ExportFile, ReportExporter, REPORT_COLUMNS,
};

/// Print-dialog export. Server-side PDF rendering is out of scope, so this
/// strategy emits a print-ready HTML document that opens the client print
/// dialog as soon as it loads.
pub struct PdfReportExporter;

impl ReportExporter for PdfReportExporter {
    fn export(&self, report: &TicketReport) -> Result<ExportFile, ApiError> {
        let mut rows = String::new();
        for ticket in &report.tickets {
            rows.push_str("<tr>");
            for cell in [
                ticket.display_id.as_str(),
                ticket.title.as_str(),
                ticket.category.as_str(),
                ticket.priority.as_str(),
                ticket.status.as_str(),
                ticket.submitted_by_name.as_str(),
                ticket.submitted_by_email.as_str(),
                &format_date(ticket.created_at),
                &format_date(ticket.updated_at),
            ] {
                rows.push_str("<td>");
                rows.push_str(&escape_html(cell));
                rows.push_str("</td>");
            }
            rows.push_str("</tr>\n");
        }

        let header: String = REPORT_COLUMNS
            .iter()
            .map(|c| format!("<th>{c}</th>"))
            .collect();

        let html = format!(
            "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Ticket Report</title>\n\
             <style>table{{border-collapse:collapse}}td,th{{border:1px solid #444;padding:4px 8px}}</style>\n\
             </head>\n<body onload=\"window.print()\">\n\
             <h1>Ticket Report</h1>\n\
             <p>{total} tickets, generated {generated}</p>\n\
             <table>\n<tr>{header}</tr>\n{rows}</table>\n\
             </body>\n</html>\n",
            total = report.statistics.total_tickets,
            generated = format_date(report.generated_at),
        );

        Ok(ExportFile {
            filename: report_filename("html"),
            content_type: "text/html; charset=utf-8",
            bytes: html.into_bytes(),
        })
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::models::report::ReportCriteria;
    use crate::server::services::report;

    #[test]
    fn document_triggers_print_dialog() {
        let report = report::generate(Vec::new(), &ReportCriteria::default());
        let file = PdfReportExporter.export(&report).unwrap();
        let html = String::from_utf8(file.bytes).unwrap();
        assert!(html.contains("window.print()"));
        assert!(file.filename.ends_with(".html"));
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(escape_html("<b>&"), "&lt;b&gt;&amp;");
    }
}
