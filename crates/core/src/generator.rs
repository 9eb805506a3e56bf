//! Generator traits — the abstraction over text-completion backends.
//!
//! Two layers:
//! - [`Completion`] is a fallible backend (an HTTP model endpoint, a local model).
//! - [`Generator`] is the capability the engine consumes. It never fails:
//!   implementations map every backend error to deterministic fallback text.
//!
//! The engine only ever sees `Generator`, so runs are testable without any
//! network access.

use async_trait::async_trait;

use crate::error::GeneratorError;

/// A fallible text-completion backend.
#[async_trait]
pub trait Completion: Send + Sync {
    /// A human-readable name for this backend (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send one prompt and wait for the full completion text.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GeneratorError>;
}

/// The text-generation capability used by planning, execution and reflection.
///
/// `generate` never raises. An empty return value is the only failure signal
/// and callers treat it as a failed execution.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Whether a real backend is configured. Fixed at construction.
    fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> String;
}
