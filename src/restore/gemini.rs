/// Google Gemini image restoration client
///
/// Sends the photo as inline data to `generateContent` and pulls the first
/// inline image out of the reply.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::RestorationService;
use crate::config::AppConfig;
use crate::error::RestoreError;
use crate::state::data::DataUrl;

const NO_IMAGE_MESSAGE: &str = "The service did not return an image. Please try again.";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: RequestInlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// `{"error": {"message": ...}}` body returned on failures
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, RestoreError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_key: config.api_key().map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            prompt: config.prompt.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

/// Pick the restored image out of a successful response
fn extract_image(response: GenerateResponse) -> Result<String, RestoreError> {
    let mut replies = Vec::new();

    for candidate in response.candidates {
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        for part in parts {
            if let Some(inline) = part.inline_data {
                return Ok(format!("data:{};base64,{}", inline.mime_type, inline.data));
            }
            if let Some(text) = part.text {
                replies.push(text);
            }
        }
        if let Some(reason) = candidate.finish_reason {
            debug!("Candidate finished without an image: {}", reason);
        }
    }

    let reply = replies.join(" ").trim().to_string();
    if !reply.is_empty() {
        return Err(RestoreError::NoImage(reply));
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(RestoreError::NoImage(format!(
            "The request was blocked by the service ({}).",
            reason
        )));
    }

    Err(RestoreError::NoImage(NO_IMAGE_MESSAGE.to_string()))
}

#[async_trait]
impl RestorationService for GeminiClient {
    async fn restore(&self, base64: &str, mime_type: &str) -> Result<String, RestoreError> {
        let api_key = self.api_key.as_deref().ok_or(RestoreError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Image {
                        inline_data: RequestInlineData {
                            mime_type,
                            data: base64,
                        },
                    },
                    RequestPart::Text { text: &self.prompt },
                ],
            }],
        };

        let url = self.endpoint();
        debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Restoration response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .ok()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!("Restoration service error: {} - {}", status, message);
            return Err(RestoreError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let data_url = extract_image(parsed)?;

        if DataUrl::parse(&data_url).payload.is_empty() {
            warn!("Service returned an empty image payload");
            return Err(RestoreError::NoImage(NO_IMAGE_MESSAGE.to_string()));
        }

        Ok(data_url)
    }
}
