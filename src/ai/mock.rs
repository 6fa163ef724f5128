use super::CaptionService;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

enum MockReply {
    Body(Value),
    Failure(String),
}

/// Canned [`CaptionService`] for tests and offline harnesses.
///
/// Replies are served in the order they were added and cycle once exhausted.
/// With no replies configured, every call returns a single-candidate response
/// with a fixed caption.
pub struct MockCaptionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    last_prompt: Arc<Mutex<Option<String>>>,
    last_mime_type: Arc<Mutex<Option<String>>>,
}

impl MockCaptionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
            last_mime_type: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_response(self, body: Value) -> Self {
        self.replies.lock().unwrap().push(MockReply::Body(body));
        self
    }

    /// Shorthand for a response whose first candidate holds `text`.
    pub fn with_caption(self, text: &str) -> Self {
        self.with_response(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
    }

    /// Queue a call-level failure carrying `message`.
    pub fn with_failure(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Failure(message.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_mime_type(&self) -> Option<String> {
        self.last_mime_type.lock().unwrap().clone()
    }
}

impl Default for MockCaptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionService for MockCaptionClient {
    async fn generate(
        &self,
        prompt: &str,
        mime_type: &str,
        _image_bytes: &[u8],
    ) -> Result<Value> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_mime_type.lock().unwrap() = Some(mime_type.to_string());

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "A mock caption." }] },
                    "finishReason": "STOP"
                }]
            }));
        }

        match &replies[(*count - 1) % replies.len()] {
            MockReply::Body(body) => Ok(body.clone()),
            MockReply::Failure(message) => Err(Error::AiProvider(message.clone())),
        }
    }
}
