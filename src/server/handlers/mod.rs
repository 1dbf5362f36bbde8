pub mod companies;
pub mod health;
pub mod tickets;
pub mod users;

pub use companies::{check_company, get_company, register_company, update_company};
pub use health::health_check;
pub use tickets::{
    close_ticket, export_report, generate_report, get_ticket, list_tickets, submit_ticket,
    tickets_by_user, update_ticket,
};
pub use users::{create_user, get_user};
