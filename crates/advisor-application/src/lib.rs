//! Application layer for the watch advisor.
//!
//! Use cases that coordinate the domain types in `advisor-core` with the
//! transports and caller in `advisor-interaction`.

pub mod advisor_service;
pub mod bootstrap;
pub mod session;

pub use advisor_service::AdvisorService;
pub use bootstrap::{build_service, service_with_transport};
pub use session::ChatSession;
