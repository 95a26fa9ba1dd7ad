use iced::widget::{column, container, scrollable, text, text_editor, Column};
use iced::{event, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod ocr;
mod state;
mod ui;

use config::Settings;
use ocr::{ConversionEvent, OcrEngine, TesseractEngine};
use state::conversion::Conversion;
use state::data::{ImageFile, IMAGE_EXTENSIONS};
use state::selection::SelectionManager;

/// Main application state
struct ImageToText {
    /// OCR settings, read once at startup
    settings: Settings,
    /// The OCR engine every job runs on
    engine: Arc<dyn OcrEngine>,
    /// Selected image and its preview
    selection: SelectionManager,
    /// Current conversion job and its result
    conversion: Conversion,
    /// Backing buffer for the read-only text output
    output: text_editor::Content,
    /// File loading problems, shown in the error banner
    load_error: Option<String>,
    /// Short confirmation under the result (e.g. after copying)
    notice: Option<String>,
    /// A file is being dragged over the window
    hovering: bool,
    /// Number of the most recent file load; older results are stale
    load_seq: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the browse button
    PickImage,
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// Drag enters (true) or leaves (false) the window
    FileHovered(bool),
    /// Background file read finished, tagged with its load number
    ImageLoaded(u64, Result<ImageFile, String>),
    /// User clicked the convert button
    Convert,
    /// Progress or result from the running conversion
    Conversion(ConversionEvent),
    /// User clicked the copy button
    CopyText,
    /// Selection/scroll inside the text output
    EditorAction(text_editor::Action),
}

impl ImageToText {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let engine: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::new(&settings));

        log::info!(
            "🎨 Image to Text ready (language: {}, workers: {})",
            settings.language,
            settings.workers
        );

        (Self::with_engine(settings, engine), Task::none())
    }

    /// Empty application state running jobs on `engine`
    fn with_engine(settings: Settings, engine: Arc<dyn OcrEngine>) -> Self {
        ImageToText {
            settings,
            engine,
            selection: SelectionManager::new(),
            conversion: Conversion::new(),
            output: text_editor::Content::new(),
            load_error: None,
            notice: None,
            hovering: false,
            load_seq: 0,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                if self.conversion.is_busy() {
                    return Task::none();
                }

                // Show the native file picker, limited to images
                let file = FileDialog::new()
                    .set_title("Select an Image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => self.load_image(path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => {
                self.hovering = false;
                if self.conversion.is_busy() {
                    log::warn!(
                        "⚠️  Ignoring dropped file while converting: {}",
                        path.display()
                    );
                    return Task::none();
                }
                self.load_image(path)
            }
            Message::FileHovered(hovering) => {
                self.hovering = hovering && !self.conversion.is_busy();
                Task::none()
            }
            Message::ImageLoaded(seq, _) if seq != self.load_seq => {
                log::debug!("Ignoring stale load #{} (latest is #{})", seq, self.load_seq);
                Task::none()
            }
            Message::ImageLoaded(_, Ok(file)) => {
                self.accept_image(file);
                Task::none()
            }
            Message::ImageLoaded(_, Err(error)) => {
                log::error!("❌ {}", error);
                self.load_error = Some(error);
                Task::none()
            }
            Message::Convert => {
                let has_image = self.selection.has_image();
                if let Err(e) = self.conversion.start(has_image) {
                    log::warn!("⚠️  Convert rejected: {}", e);
                    return Task::none();
                }

                let Some(file) = self.selection.file().cloned() else {
                    return Task::none();
                };

                self.output = text_editor::Content::new();
                self.load_error = None;
                self.notice = None;

                Task::run(
                    ocr::orchestrator::run(
                        Arc::clone(&self.engine),
                        self.settings.session_config(),
                        file,
                    ),
                    Message::Conversion,
                )
            }
            Message::Conversion(ConversionEvent::Progress(report)) => {
                self.conversion.apply(report);
                Task::none()
            }
            Message::Conversion(ConversionEvent::Finished(outcome)) => {
                self.conversion.finish(outcome);
                self.output = text_editor::Content::with_text(self.conversion.text());
                Task::none()
            }
            Message::CopyText => {
                let text = self.conversion.text().to_string();
                if text.is_empty() {
                    log::warn!("⚠️  Nothing to copy");
                    return Task::none();
                }

                log::info!("📋 Copied {} characters to clipboard", text.chars().count());
                self.notice = Some("Copied to clipboard!".to_string());
                iced::clipboard::write(text)
            }
            Message::EditorAction(action) => {
                // Read-only: allow selecting and scrolling, never editing
                if !action.is_edit() {
                    self.output.perform(action);
                }
                Task::none()
            }
        }
    }

    /// Make a freshly loaded file the current selection
    ///
    /// A new image invalidates the previous result. Files that finish loading
    /// while a conversion runs are discarded.
    fn accept_image(&mut self, file: ImageFile) {
        if self.conversion.is_busy() {
            log::warn!("⚠️  Discarding {} loaded during a conversion", file.name);
            return;
        }
        if self.selection.select(Some(file)) {
            self.conversion.reset();
            self.output = text_editor::Content::new();
            self.load_error = None;
            self.notice = None;
            log::debug!("{} live preview handle(s)", self.selection.live_previews());
        }
    }

    /// Start reading a picked or dropped file in the background
    fn load_image(&mut self, path: PathBuf) -> Task<Message> {
        self.load_seq += 1;
        let seq = self.load_seq;

        log::info!("📂 Loading #{} {}", seq, path.display());
        Task::perform(ImageFile::load(path), move |result| {
            Message::ImageLoaded(seq, result.map_err(|e| e.to_string()))
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let busy = self.conversion.is_busy();

        let mut content: Column<Message> = column![
            text("Image to Text").size(36),
            ui::panels::upload_area(self.selection.file(), self.hovering, !busy),
        ]
        .spacing(20)
        .padding(30)
        .align_x(Alignment::Center)
        .max_width(720.0);

        if let Some(preview) = self.selection.preview() {
            content = content.push(ui::panels::preview(preview));
        }

        content = content.push(ui::panels::action(&self.conversion, self.selection.has_image()));

        if let Some(error) = self.load_error.as_deref().or(self.conversion.error()) {
            content = content.push(ui::panels::error_banner(error));
        }

        if let Some(extracted) = self.conversion.extracted() {
            content = content.push(ui::panels::result(
                extracted,
                &self.output,
                self.notice.as_deref(),
            ));
        }

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// File drag and drop on the window
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered(true)),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FileHovered(false)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,image_to_text=info"),
    )
    .init();

    iced::application("Image to Text", ImageToText::update, ImageToText::view)
        .subscription(ImageToText::subscription)
        .theme(ImageToText::theme)
        .centered()
        .run_with(ImageToText::new)
}
