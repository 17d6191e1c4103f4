//! Chat completion boundary
//!
//! A remote chat model translates free text into intent payloads. The trait
//! is the seam: the dispatcher sees prompt-in/text-out, tests substitute
//! scripted implementations, and HTTP details stay inside the client.

pub mod deepseek;

pub use deepseek::DeepSeekClient;

use async_trait::async_trait;

use crate::error::Result;

/// A chat completion service: free-text prompt in, raw reply text out.
///
/// Implementations report every failure (transport, HTTP status, malformed
/// body, empty reply) as `ExternalService` so callers can treat the boundary
/// uniformly.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Service name, for logs.
    fn name(&self) -> &str;
}
