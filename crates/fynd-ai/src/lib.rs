//! AI-backed domain discovery for the fynd pipeline.
//!
//! [`LlmClient`] talks to an OpenAI-compatible chat-completions endpoint
//! in JSON mode; [`discovery`] turns a sample of listings into an
//! [`fynd_core::InferredDomain`], enforcing the confidence gate at the
//! boundary. Any response that cannot be validated against the contract
//! is an [`InferenceError`], never silently coerced.

pub mod discovery;
mod error;
mod llm;

pub use discovery::discover_domain;
pub use error::InferenceError;
pub use llm::LlmClient;
