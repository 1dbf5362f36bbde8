pub mod export;
pub mod facade;
pub mod observer;
pub mod report;
pub mod store;

pub use export::{ExportFile, ExportFormat, ReportExporter};
pub use facade::TicketFacade;
pub use observer::{NotificationObserver, TicketEvent, TicketObserver};
pub use store::{MemoryStore, PostgresStore, Store};
