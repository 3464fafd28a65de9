pub mod get;
pub mod mark;
