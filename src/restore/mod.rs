/// Remote photo restoration
///
/// The UI only talks to `RestorationService`; `gemini::GeminiClient` is
/// the production implementation.
pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::RestoreError;
use crate::state::data::RestorationResult;
use crate::state::session::RestorationRequest;

pub use gemini::GeminiClient;

#[async_trait]
pub trait RestorationService: Send + Sync {
    /// Send one photo and get the restored image back as a data URL
    async fn restore(&self, base64: &str, mime_type: &str) -> Result<String, RestoreError>;
}

/// Stand-in used when the real client could not be constructed
#[derive(Debug, Clone)]
pub struct UnavailableService {
    pub reason: String,
}

#[async_trait]
impl RestorationService for UnavailableService {
    async fn restore(&self, _base64: &str, _mime_type: &str) -> Result<String, RestoreError> {
        Err(RestoreError::Service {
            status: 0,
            message: self.reason.clone(),
        })
    }
}

/// Run one restoration and turn the outcome into something the UI can hold
///
/// Errors come back as the message to show the user.
pub async fn run_restoration(
    service: Arc<dyn RestorationService>,
    request: RestorationRequest,
) -> Result<RestorationResult, String> {
    info!("✨ Sending {} image for restoration", request.mime_type);

    let outcome = service
        .restore(&request.base64, &request.mime_type)
        .await
        .and_then(|data_url| RestorationResult::from_data_url(data_url).map_err(RestoreError::from));

    match outcome {
        Ok(result) => {
            info!("✅ Restoration complete ({})", result.mime_type);
            Ok(result)
        }
        Err(e) => {
            error!("Restoration failed: {:?}", e);
            Err(e.user_message())
        }
    }
}
