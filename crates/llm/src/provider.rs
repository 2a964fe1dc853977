pub(crate) mod openai;

use async_trait::async_trait;

use crate::{
    error::UpstreamError,
    messages::{CompletionRequest, CompletionResult},
};

/// A chat-completion backend.
///
/// Note for async_trait: the server holds the provider as a trait object, so the trait
/// must stay dyn-compatible.
#[async_trait]
pub(crate) trait Provider: Send + Sync {
    /// Send one completion request. Implementations make exactly one attempt and must give
    /// up once `request.timeout` has elapsed.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResult, UpstreamError>;

    /// Label reported to callers alongside successful completions.
    fn name(&self) -> &str;
}
