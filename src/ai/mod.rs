//! Generative AI integration for image captioning
//!
//! Defines the captioning capability the rest of the crate depends on, a
//! Gemini-backed implementation, and a mock for tests and local harnesses.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiCaptionClient;
pub use mock::MockCaptionClient;

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends a prompt plus one image to a generative model.
///
/// Implementations return the raw response body untouched; interpreting it is
/// the job of [`crate::normalize`]. Errors are call-level failures only
/// (transport, auth, quota, timeout) and are classified by [`crate::failure`].
#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        mime_type: &str,
        image_bytes: &[u8],
    ) -> Result<serde_json::Value>;
}

#[async_trait]
impl<T: CaptionService + ?Sized> CaptionService for Arc<T> {
    async fn generate(
        &self,
        prompt: &str,
        mime_type: &str,
        image_bytes: &[u8],
    ) -> Result<serde_json::Value> {
        (**self).generate(prompt, mime_type, image_bytes).await
    }
}
