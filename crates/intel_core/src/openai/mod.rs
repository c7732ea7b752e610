//! OpenAI互換の上流API連携

pub mod client;
pub mod error;
pub mod request;

pub use client::{ChatBackend, CompletionRequest, OpenAiBackend};
pub use error::{classify_message, UpstreamError, UpstreamErrorKind};
