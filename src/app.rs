//! Application orchestration for captioning one uploaded image.

use crate::ai::{CaptionService, GeminiCaptionClient};
use crate::models::{CaptionRequest, Config};
use crate::normalize::{self, Outcome};
use crate::{prompts, Error, Result};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Builds prompts, calls the caption service and interprets its response.
///
/// Holds no mutable state, so one instance serves concurrent requests.
pub struct App {
    caption: Option<Box<dyn CaptionService>>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub caption: Box<dyn CaptionService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            caption: Some(services.caption),
        }
    }

    /// An app with no model; every caption call fails with
    /// [`Error::ModelNotInitialized`].
    pub fn without_model() -> Self {
        Self { caption: None }
    }

    /// Construct the Gemini-backed app from configuration.
    ///
    /// A missing API key is logged and leaves the app running without a
    /// model rather than failing startup.
    pub fn new(config: &Config) -> Self {
        let Some(api_key) = config.google_api_key.clone() else {
            error!("GOOGLE_API_KEY is not set; caption requests will fail until it is configured");
            return Self::without_model();
        };

        let mut client = GeminiCaptionClient::new(
            api_key,
            config.gemini_model.clone(),
            config.gemini_timeout,
        );
        if let Some(base_url) = &config.gemini_base_url {
            client = client.with_base_url(base_url.clone());
        }
        info!("Caption provider: Gemini (model: {})", client.model());

        Self::with_services(AppServices {
            caption: Box::new(client),
        })
    }

    pub fn is_model_ready(&self) -> bool {
        self.caption.is_some()
    }

    /// Caption one image.
    ///
    /// Refusals and unusable responses come back as `Ok`; only failures of the
    /// external call are `Err`. Nothing is retried.
    pub async fn caption(&self, request: &CaptionRequest) -> Result<Outcome> {
        let service = self.caption.as_ref().ok_or(Error::ModelNotInitialized)?;
        let request_id = Uuid::new_v4();

        async move {
            if request.keywords.is_empty() {
                info!("No keywords provided, captioning from the image alone");
            }

            let prompt = prompts::build(&request.keywords);
            debug!("Prompt sent to model: {}", prompt);

            let body = service
                .generate(&prompt, &request.mime_type, &request.image_bytes)
                .await?;

            let outcome = normalize::normalize_value(&body);
            info!(outcome = outcome.kind(), "Caption result: {:?}", outcome);
            Ok::<_, Error>(outcome)
        }
        .instrument(info_span!(
            "caption",
            %request_id,
            mime_type = %request.mime_type,
            bytes = request.image_bytes.len()
        ))
        .await
    }
}
