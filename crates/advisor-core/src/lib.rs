pub mod config;
pub mod conversation;
pub mod error;
pub mod filter;
pub mod request;
pub mod result;
pub mod secret;

// Re-export common types
pub use conversation::{Conversation, TransportConvention, Turn, TurnRole};
pub use error::AdvisorError;
pub use filter::{FilterKind, FilterSelection};
pub use request::{ChatRequest, RequestBuilder};
pub use result::CallResult;
