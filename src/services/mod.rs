pub mod dispatcher;
pub mod resolver;

pub use dispatcher::MessageDispatcher;
pub use resolver::ConversationResolver;
