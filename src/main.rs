use chrono::Datelike;
use iced::widget::{
    button, canvas, column, container, horizontal_space, image, row, stack, text, Column, Row,
};
use iced::{Alignment, Border, Color, ContentFit, Element, Length, Task, Theme};
use rfd::{AsyncFileDialog, FileDialog};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod media;
mod restore;
mod state;
mod ui;

use config::AppConfig;
use error::DECODE_FAILED_MESSAGE;
use media::decoder::{self, SelectedFile};
use media::download;
use restore::{GeminiClient, RestorationService, UnavailableService};
use state::data::{ImageFile, RestorationResult};
use state::session::{AppState, Session};
use ui::compare::Comparison;

const FEATURES: [&str; 4] = ["Ultra Sharp", "Colorize", "Face Enhance", "4K Upscale"];
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

const MUTED: Color = Color::from_rgb(0.58, 0.64, 0.72);
const ACCENT: Color = Color::from_rgb(0.38, 0.65, 0.98);
const PANEL: Color = Color::from_rgb(0.12, 0.16, 0.23);

/// Main application state
struct PhotoRestorer {
    /// Where we are in the upload -> restore -> compare flow
    session: Session,
    /// Backend that performs the restoration call
    service: Arc<dyn RestorationService>,
    /// Transient status line (download results)
    status: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Select Photo"
    SelectPhoto,
    /// Background decode of the picked file finished
    PhotoLoaded(Result<ImageFile, String>),
    /// User clicked "Enhance Now" (also retries after an error)
    Enhance,
    /// The restoration call resolved
    RestorationFinished(Result<RestorationResult, String>),
    /// Cancel / New Photo
    Reset,
    Download,
    /// Save finished; None when the dialog was dismissed
    DownloadFinished(Result<Option<PathBuf>, String>),
}

impl PhotoRestorer {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();
        if config.api_key().is_none() {
            warn!("No API key configured; restoration requests will fail until one is set");
        }

        let service: Arc<dyn RestorationService> = match GeminiClient::new(&config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Failed to create restoration client: {}", e);
                Arc::new(UnavailableService {
                    reason: e.to_string(),
                })
            }
        };

        info!("🎨 Photo Restorer ready (model {})", config.model);
        (Self::with_service(service), Task::none())
    }

    fn with_service(service: Arc<dyn RestorationService>) -> Self {
        PhotoRestorer {
            session: Session::new(),
            service,
            status: None,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectPhoto => {
                if !self.session.can_select() {
                    return Task::none();
                }

                // Show the native file picker
                let picked = FileDialog::new()
                    .set_title("Select a Photo")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                match picked {
                    Some(path) => self.select_path(path),
                    None => Task::none(),
                }
            }
            Message::PhotoLoaded(Ok(image)) => {
                self.session.file_loaded(image);
                Task::none()
            }
            Message::PhotoLoaded(Err(_)) => {
                self.session.decode_failed(DECODE_FAILED_MESSAGE);
                Task::none()
            }
            Message::Enhance => match self.session.begin_restoration() {
                Some(request) => Task::perform(
                    restore::run_restoration(self.service.clone(), request),
                    Message::RestorationFinished,
                ),
                None => Task::none(),
            },
            Message::RestorationFinished(Ok(restored)) => {
                self.session.restoration_succeeded(restored);
                Task::none()
            }
            Message::RestorationFinished(Err(message)) => {
                self.session.restoration_failed(message);
                Task::none()
            }
            Message::Reset => {
                if self.session.reset() {
                    self.status = None;
                }
                Task::none()
            }
            Message::Download => match self.session.restored() {
                Some(restored) => Task::perform(
                    save_restored(restored.data_url.clone()),
                    Message::DownloadFinished,
                ),
                None => Task::none(),
            },
            Message::DownloadFinished(result) => {
                self.status = match result {
                    Ok(Some(path)) => Some(format!("Saved to {}", path.display())),
                    Ok(None) => None,
                    Err(e) => Some(format!("Download failed: {}", e)),
                };
                Task::none()
            }
        }
    }

    /// Validate a picked path and start decoding it
    fn select_path(&mut self, path: PathBuf) -> Task<Message> {
        // A file we can't even stat counts as unreadable, not invalid
        let file = match SelectedFile::inspect(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                self.session.decode_failed(DECODE_FAILED_MESSAGE);
                return Task::none();
            }
        };

        match file.validate() {
            Ok(()) => {
                if !self.session.begin_decode() {
                    return Task::none();
                }
                info!("📷 Reading {}", file.path.display());
                Task::perform(load_photo(file), Message::PhotoLoaded)
            }
            Err(e) => {
                warn!("Rejected {}: {:?}", path.display(), e);
                self.session.reject_selection(e.to_string());
                Task::none()
            }
        }
    }

    /// Primary action label; a retry after an error keeps the same wording
    fn enhance_label(&self) -> &'static str {
        if self.session.is_processing() {
            "Enhancing..."
        } else {
            "Enhance Now"
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let body = match self.session.state() {
            AppState::Idle { error, decoding } => self.view_idle(error.as_deref(), *decoding),
            AppState::Preview { image } => self.view_preview(image, None),
            AppState::Processing { image } => self.view_preview(image, None),
            AppState::Error { image, message } => self.view_preview(image, Some(message.as_str())),
            AppState::Success { image, restored } => self.view_success(image, restored),
        };

        let content = column![
            view_header(),
            container(body)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .padding(24),
            text(format!(
                "© {} Gemini Photo Enhancer. Powered by Google Gemini.",
                chrono::Local::now().year()
            ))
            .size(12)
            .color(MUTED),
        ]
        .spacing(16)
        .padding(20)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_idle<'a>(&'a self, error: Option<&'a str>, decoding: bool) -> Element<'a, Message> {
        let pills = Row::with_children(FEATURES.iter().map(|feature| pill(feature, MUTED)))
            .spacing(8);

        let select_label = if decoding { "Loading..." } else { "Select Photo" };

        let mut content: Column<Message> = column![
            text("AI Photo Enhancer").size(44),
            text(
                "Transform old, blurry, and damaged photos into sharp, \
                 high-definition DSLR quality images with Google Gemini."
            )
            .size(16)
            .color(MUTED),
            button(text(select_label).size(18))
                .padding([12, 40])
                .on_press_maybe(self.session.can_select().then_some(Message::SelectPhoto)),
            text("Supported formats: JPG, PNG, WEBP").size(12).color(MUTED),
            pills,
        ]
        .spacing(20)
        .max_width(560.0)
        .align_x(Alignment::Center);

        if let Some(error) = error {
            content = content.push(error_box(error));
        }

        content.into()
    }

    fn view_preview<'a>(&'a self, image_file: &'a ImageFile, error: Option<&'a str>) -> Element<'a, Message> {
        let processing = self.session.is_processing();

        let picture = container(
            image(image_file.handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .width(Length::Fill)
        .height(Length::Fixed(420.0))
        .style(|_theme: &Theme| panel_style(PANEL));

        let mut viewer = stack![picture];
        if processing {
            viewer = viewer.push(
                container(
                    column![
                        text("Enhancing & Sharpening...").size(20),
                        text("Applying DSLR quality filters.").size(14).color(MUTED),
                    ]
                    .spacing(8)
                    .align_x(Alignment::Center),
                )
                .width(Length::Fill)
                .height(Length::Fixed(420.0))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(420.0))
                .style(|_theme: &Theme| panel_style(Color::from_rgba(0.0, 0.0, 0.0, 0.7))),
            );
        }


        let actions = row![
            button(text("Cancel"))
                .style(button::secondary)
                .padding(10)
                .width(Length::FillPortion(1))
                .on_press_maybe(self.session.can_cancel().then_some(Message::Reset)),
            button(text(self.enhance_label()))
                .padding(10)
                .width(Length::FillPortion(2))
                .on_press_maybe((!processing).then_some(Message::Enhance)),
        ]
        .spacing(12);

        let mut content = column![
            viewer,
            column![
                text(&image_file.name).size(14),
                text(image_file.size_label()).size(12).color(MUTED),
            ]
            .spacing(2),
        ]
        .spacing(16)
        .max_width(480.0);

        if let Some(error) = error {
            content = content.push(error_box(error));
        }

        content.push(actions).into()
    }

    fn view_success<'a>(
        &'a self,
        image_file: &'a ImageFile,
        restored: &'a RestorationResult,
    ) -> Element<'a, Message> {
        let viewer = canvas(Comparison::new(image_file, restored))
            .width(Length::Fill)
            .height(Length::Fixed(480.0));

        let actions = row![
            button(text("New Photo"))
                .style(button::secondary)
                .padding(10)
                .width(Length::Fill)
                .on_press(Message::Reset),
            button(text("Download"))
                .padding(10)
                .width(Length::Fill)
                .on_press(Message::Download),
        ]
        .spacing(16);

        let mut content = column![
            viewer,
            actions,
            text("Use the slider to compare the before and after results.")
                .size(14)
                .color(MUTED),
        ]
        .spacing(20)
        .max_width(720.0)
        .align_x(Alignment::Center);

        if let Some(status) = &self.status {
            content = content.push(text(status).size(12).color(MUTED));
        }

        content.into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn view_header<'a>() -> Element<'a, Message> {
    row![
        column![
            text("Gemini AI Enhancer").size(20),
            text("Restore & Sharpen").size(12).color(MUTED),
        ],
        horizontal_space(),
        pill("PRO Quality", ACCENT),
    ]
    .align_y(Alignment::Center)
    .padding([0, 8])
    .into()
}

fn pill<'a>(label: &'a str, color: Color) -> Element<'a, Message> {
    container(text(label).size(12).color(color))
        .padding([4, 12])
        .style(|_theme: &Theme| container::Style {
            background: Some(PANEL.into()),
            border: Border {
                color: Color::from_rgb(0.2, 0.25, 0.33),
                width: 1.0,
                radius: 12.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

fn error_box<'a>(message: &'a str) -> Element<'a, Message> {
    container(text(message).size(14).color(Color::from_rgb(1.0, 0.8, 0.8)))
        .padding(14)
        .width(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgba(0.94, 0.27, 0.27, 0.1).into()),
            border: Border {
                color: Color::from_rgba(0.94, 0.27, 0.27, 0.2),
                width: 1.0,
                radius: 10.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

fn panel_style(background: Color) -> container::Style {
    container::Style {
        background: Some(background.into()),
        border: Border {
            color: Color::from_rgb(0.2, 0.25, 0.33),
            width: 1.0,
            radius: 16.0.into(),
        },
        ..container::Style::default()
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_restorer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(
        "Gemini Photo Enhancer",
        PhotoRestorer::update,
        PhotoRestorer::view,
    )
    .theme(PhotoRestorer::theme)
    .centered()
    .run_with(PhotoRestorer::new)
}

/// Decode a validated photo in the background
async fn load_photo(selected: SelectedFile) -> Result<ImageFile, String> {
    decoder::load_image_file(selected).await.map_err(|e| {
        warn!("Failed to decode photo: {}", e);
        e.to_string()
    })
}

/// Ask where to save, then write the restored image there
async fn save_restored(data_url: String) -> Result<Option<PathBuf>, String> {
    let target = AsyncFileDialog::new()
        .set_title("Save Restored Photo")
        .set_file_name(download::default_filename())
        .add_filter("PNG image", &["png"])
        .save_file()
        .await;

    let Some(target) = target else {
        return Ok(None);
    };

    download::save_data_url(data_url, target.path().to_path_buf())
        .await
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestoreError;
    use crate::state::data::tests::png_bytes;
    use crate::state::data::DataUrl;
    use crate::ui::compare::SliderState;
    use async_trait::async_trait;
    use std::path::Path;

    struct NeverCalled;

    #[async_trait]
    impl RestorationService for NeverCalled {
        async fn restore(&self, _base64: &str, _mime_type: &str) -> Result<String, RestoreError> {
            Err(RestoreError::NoImage("not expected".to_string()))
        }
    }

    fn app() -> PhotoRestorer {
        PhotoRestorer::with_service(Arc::new(NeverCalled))
    }

    fn jpeg_file() -> ImageFile {
        let url = DataUrl::encode("image/jpeg", &png_bytes(8, 6));
        ImageFile::from_data_url(Path::new("family.jpg"), 2 * 1024 * 1024, url).unwrap()
    }

    #[test]
    fn test_non_image_selection_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut app = app();
        let _ = app.select_path(path);

        assert_eq!(app.session.state().name(), "idle");
        assert_eq!(app.session.error(), Some("Please select a valid image file."));
        assert!(app.session.can_select());
    }

    #[test]
    fn test_oversized_selection_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(decoder::MAX_UPLOAD_BYTES + 1).unwrap();

        let mut app = app();
        let _ = app.select_path(path);

        assert_eq!(app.session.state().name(), "idle");
        assert_eq!(
            app.session.error(),
            Some("Image is too large. Please choose an image under 10MB.")
        );
    }

    #[test]
    fn test_valid_selection_starts_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png_bytes(2, 2)).unwrap();

        let mut app = app();
        let _ = app.select_path(path);

        assert!(matches!(
            app.session.state(),
            AppState::Idle { decoding: true, error: None }
        ));
        assert!(!app.session.can_select());
    }

    #[test]
    fn test_missing_file_shows_generic_message() {
        let mut app = app();
        let _ = app.select_path(PathBuf::from("/nonexistent/dir/photo.jpg"));

        assert!(matches!(
            app.session.state(),
            AppState::Idle { decoding: false, .. }
        ));
        assert_eq!(app.session.error(), Some(DECODE_FAILED_MESSAGE));
        assert!(app.session.can_select());
    }

    #[test]
    fn test_decode_failure_shows_generic_message() {
        let mut app = app();
        app.session.begin_decode();
        let _ = app.update(Message::PhotoLoaded(Err("IO error: denied".to_string())));

        assert_eq!(app.session.state().name(), "idle");
        assert_eq!(app.session.error(), Some(DECODE_FAILED_MESSAGE));
    }

    #[test]
    fn test_restore_then_compare_then_reset() {
        let mut app = app();
        let _ = app.update(Message::PhotoLoaded(Ok(jpeg_file())));
        assert_eq!(app.session.state().name(), "preview");

        let _ = app.update(Message::Enhance);
        assert_eq!(app.session.state().name(), "processing");

        // Reset is refused while the request is in flight
        let _ = app.update(Message::Reset);
        assert_eq!(app.session.state().name(), "processing");

        let restored =
            RestorationResult::from_data_url(DataUrl::encode("image/png", &png_bytes(8, 6))).unwrap();
        let _ = app.update(Message::RestorationFinished(Ok(restored)));
        assert_eq!(app.session.state().name(), "success");
        assert!(app.session.image().is_some());
        assert!(app.session.restored().is_some());

        // A freshly mounted comparison starts centered and drags to the right edge
        let mut slider = SliderState::default();
        assert_eq!(slider.position(), 50.0);
        slider.press();
        slider.drag_to(10_000.0, 720.0);
        assert_eq!(slider.position(), 100.0);

        let name = download::default_filename();
        assert!(name.starts_with("restored-") && name.ends_with(".png"));

        let _ = app.update(Message::DownloadFinished(Ok(Some(PathBuf::from("/tmp/x.png")))));
        assert!(app.status.is_some());

        let _ = app.update(Message::Reset);
        assert_eq!(app.session.state().name(), "idle");
        assert!(app.session.image().is_none());
        assert!(app.session.restored().is_none());
        assert!(app.status.is_none());
    }

    #[test]
    fn test_failed_restoration_allows_retry() {
        let mut app = app();
        let _ = app.update(Message::PhotoLoaded(Ok(jpeg_file())));
        let _ = app.update(Message::Enhance);
        let _ = app.update(Message::RestorationFinished(Err("Quota exceeded".to_string())));

        assert_eq!(app.session.state().name(), "error");
        assert_eq!(app.session.error(), Some("Quota exceeded"));
        assert_eq!(app.session.image().unwrap().name, "family.jpg");
        assert_eq!(app.enhance_label(), "Enhance Now");

        let _ = app.update(Message::Enhance);
        assert_eq!(app.session.state().name(), "processing");
        assert!(app.session.error().is_none());
        assert_eq!(app.enhance_label(), "Enhancing...");
    }
}
