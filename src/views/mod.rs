pub mod chat;
pub mod notification;
