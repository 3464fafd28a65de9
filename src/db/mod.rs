pub mod account;
pub mod conversation;
pub mod message;
pub mod notification;
