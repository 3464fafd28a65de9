pub mod chat;
pub mod health_checks;
pub mod notifications;

pub use health_checks::*;
