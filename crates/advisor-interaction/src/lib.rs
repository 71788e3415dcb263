pub mod caller;
pub mod flattened_prompt_transport;
pub mod gemini_api_transport;
mod http;
pub mod normalize;
pub mod retry;
pub mod transport;

pub use caller::{CallReport, CallState, ResilientCaller};
pub use flattened_prompt_transport::FlattenedPromptTransport;
pub use gemini_api_transport::GeminiApiTransport;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{ChatTransport, RawCandidate, RawOutputItem, RawReply, TransportError};
