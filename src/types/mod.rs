mod audit;
mod models;
mod views;

pub use audit::AuditEvent;
pub use models::*;
pub use views::*;
