pub mod company;
pub mod report;
pub mod ticket;
pub mod user;

pub use company::{Address, Company, RegisterCompany, UpdateCompany};
pub use report::{ReportCriteria, ReportFilters, ReportStatistics, TicketReport};
pub use ticket::{
    Attachment, CreateTicket, NewAttachment, Ticket, TicketCategory, TicketFilter, TicketPriority,
    TicketStatus, UpdateTicket,
};
pub use user::{CreateUser, User, UserRole};
