pub mod account;
pub mod chat;

pub use account::*;
pub use chat::*;
