/// The restore workflow as a state machine
///
/// Each variant carries only the data valid in that state, so a
/// `Success` always has both images and `Idle` has neither.
use tracing::{info, warn};

use super::data::{ImageFile, RestorationResult};

#[derive(Debug, Clone)]
pub enum AppState {
    /// Waiting for a photo. `decoding` is set while a picked file is being read.
    Idle {
        error: Option<String>,
        decoding: bool,
    },
    /// Photo loaded, waiting for the user to start enhancement
    Preview { image: ImageFile },
    /// A restoration request is in flight
    Processing { image: ImageFile },
    Success {
        image: ImageFile,
        restored: RestorationResult,
    },
    /// Restoration failed; the photo is kept so the user can retry
    Error { image: ImageFile, message: String },
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Idle {
            error: None,
            decoding: false,
        }
    }
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Idle { .. } => "idle",
            AppState::Preview { .. } => "preview",
            AppState::Processing { .. } => "processing",
            AppState::Success { .. } => "success",
            AppState::Error { .. } => "error",
        }
    }
}

/// What to send to the restoration service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorationRequest {
    pub base64: String,
    pub mime_type: String,
}

/// Owns the current `AppState` and enforces the allowed transitions
///
/// Events that don't apply to the current state are logged and ignored.
#[derive(Debug, Default)]
pub struct Session {
    state: AppState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The photo currently loaded, if any
    pub fn image(&self) -> Option<&ImageFile> {
        match &self.state {
            AppState::Idle { .. } => None,
            AppState::Preview { image }
            | AppState::Processing { image }
            | AppState::Success { image, .. }
            | AppState::Error { image, .. } => Some(image),
        }
    }

    pub fn restored(&self) -> Option<&RestorationResult> {
        match &self.state {
            AppState::Success { restored, .. } => Some(restored),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            AppState::Idle { error, .. } => error.as_deref(),
            AppState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// A new file may be picked only from Idle with no decode in flight
    pub fn can_select(&self) -> bool {
        matches!(self.state, AppState::Idle { decoding: false, .. })
    }

    /// Cancel is disabled while a restoration is in flight
    pub fn can_cancel(&self) -> bool {
        matches!(
            self.state,
            AppState::Preview { .. } | AppState::Error { .. } | AppState::Success { .. }
        )
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, AppState::Processing { .. })
    }

    /// A validated file is about to be read
    pub fn begin_decode(&mut self) -> bool {
        if !self.can_select() {
            warn!("Ignoring file selection in state {}", self.state.name());
            return false;
        }
        self.state = AppState::Idle {
            error: None,
            decoding: true,
        };
        true
    }

    /// The picked file failed validation; stay in Idle with a message
    pub fn reject_selection(&mut self, message: impl Into<String>) -> bool {
        if !self.can_select() {
            warn!("Ignoring selection error in state {}", self.state.name());
            return false;
        }
        self.state = AppState::Idle {
            error: Some(message.into()),
            decoding: false,
        };
        true
    }

    /// Decoding finished: Idle -> Preview
    pub fn file_loaded(&mut self, image: ImageFile) -> bool {
        if !matches!(self.state, AppState::Idle { .. }) {
            warn!("Ignoring decoded file in state {}", self.state.name());
            return false;
        }
        info!(
            "Loaded {} ({}, {})",
            image.source.display(),
            image.mime_type,
            image.size_label()
        );
        self.state = AppState::Preview { image };
        true
    }

    /// Decoding failed; stay in Idle with a message
    pub fn decode_failed(&mut self, message: impl Into<String>) -> bool {
        if !matches!(self.state, AppState::Idle { .. }) {
            warn!("Ignoring decode failure in state {}", self.state.name());
            return false;
        }
        self.state = AppState::Idle {
            error: Some(message.into()),
            decoding: false,
        };
        true
    }

    /// Preview or Error -> Processing
    ///
    /// Returns the request to send, or None when a restoration can't start
    /// (including when one is already in flight).
    pub fn begin_restoration(&mut self) -> Option<RestorationRequest> {
        let image = match std::mem::take(&mut self.state) {
            AppState::Preview { image } | AppState::Error { image, .. } => image,
            other => {
                warn!("Ignoring enhance request in state {}", other.name());
                self.state = other;
                return None;
            }
        };

        let request = RestorationRequest {
            base64: image.base64.clone(),
            mime_type: image.mime_type.clone(),
        };
        self.state = AppState::Processing { image };
        Some(request)
    }

    /// Processing -> Success
    pub fn restoration_succeeded(&mut self, restored: RestorationResult) -> bool {
        match std::mem::take(&mut self.state) {
            AppState::Processing { image } => {
                self.state = AppState::Success { image, restored };
                true
            }
            other => {
                warn!("Ignoring restoration result in state {}", other.name());
                self.state = other;
                false
            }
        }
    }

    /// Processing -> Error, keeping the photo for a retry
    pub fn restoration_failed(&mut self, message: impl Into<String>) -> bool {
        match std::mem::take(&mut self.state) {
            AppState::Processing { image } => {
                self.state = AppState::Error {
                    image,
                    message: message.into(),
                };
                true
            }
            other => {
                warn!("Ignoring restoration failure in state {}", other.name());
                self.state = other;
                false
            }
        }
    }

    /// Back to a clean Idle from Preview, Error or Success
    pub fn reset(&mut self) -> bool {
        if !self.can_cancel() {
            warn!("Ignoring reset in state {}", self.state.name());
            return false;
        }
        self.state = AppState::default();
        true
    }
}
