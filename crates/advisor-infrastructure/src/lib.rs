pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::paths::AdvisorPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::{ConfigStorage, SecretStorage};
