pub mod account;
pub mod chat;
pub mod notification;

pub use account::*;
pub use chat::*;
pub use notification::*;
