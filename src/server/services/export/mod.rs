use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::server::error::ApiError;
use crate::server::models::report::TicketReport;

pub mod csv;
pub mod excel;
pub mod pdf;

pub use csv::CsvReportExporter;
pub use excel::ExcelReportExporter;
pub use pdf::PdfReportExporter;

pub(crate) const REPORT_COLUMNS: [&str; 9] = [
    "Ticket ID",
    "Title",
    "Category",
    "Priority",
    "Status",
    "Submitted By",
    "Email",
    "Created Date",
    "Updated Date",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Csv,
    Excel,
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PDF" => Ok(ExportFormat::Pdf),
            "CSV" => Ok(ExportFormat::Csv),
            "EXCEL" => Ok(ExportFormat::Excel),
            other => Err(ApiError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rendered report download: filename, content type, and body bytes,
/// served as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(self.content_type),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_str(&disposition)
                        .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// Format-specific report serializer.
pub trait ReportExporter: Send + Sync {
    fn export(&self, report: &TicketReport) -> Result<ExportFile, ApiError>;
}

/// Selects the exporter for a format.
pub fn exporter_for(format: ExportFormat) -> Box<dyn ReportExporter> {
    match format {
        ExportFormat::Pdf => Box::new(PdfReportExporter),
        ExportFormat::Csv => Box::new(CsvReportExporter),
        ExportFormat::Excel => Box::new(ExcelReportExporter),
    }
}

pub(crate) fn report_filename(extension: &str) -> String {
    format!("ticket-report-{}.{extension}", Utc::now().format("%Y-%m-%d"))
}

pub(crate) fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Double-quote escaping as the report screens expect: the value is wrapped
/// in quotes with embedded quotes doubled.
pub(crate) fn quoted(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(
            "Excel".parse::<ExportFormat>().unwrap(),
            ExportFormat::Excel
        );
    }

    #[test]
    fn unknown_format_fails_unsupported() {
        let err = "XML".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(f) if f == "XML"));
    }

    #[test]
    fn quoted_doubles_embedded_quotes() {
        assert_eq!(quoted("He said \"hi\""), "\"He said \"\"hi\"\"\"");
        assert_eq!(quoted("plain"), "\"plain\"");
        assert_eq!(quoted(""), "");
    }

    #[test]
    fn report_filename_carries_iso_date() {
        let name = report_filename("csv");
        assert!(name.starts_with("ticket-report-"));
        assert!(name.ends_with(".csv"));
        // e.g. ticket-report-2026-08-30.csv
        assert_eq!(name.len(), "ticket-report-".len() + 10 + ".csv".len());
    }
}
