//! OCR engine interface
//!
//! The engine is an external collaborator: it creates a session for one
//! language, reports progress through a callback while it works, recognizes
//! one image, and must be terminated exactly once afterwards.

use std::sync::Arc;
use thiserror::Error;

use crate::state::data::ImageFile;

/// Shown when the engine fails without saying why
pub const FALLBACK_ERROR: &str = "Failed to extract text from image. Please try again.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Language model '{0}' is not installed")]
    LanguageMissing(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("{0}")]
    Recognition(String),
    #[error("OCR worker stopped unexpectedly: {0}")]
    Worker(String),
}

impl OcrError {
    /// Message for the error banner
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Engine phases, in the order the engine goes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnginePhase {
    LoadingEngine,
    Initializing,
    LoadingModel,
    Recognizing,
}

/// One progress event from the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub phase: EnginePhase,
    /// Fraction of the current phase, 0.0 to 1.0
    pub progress: f32,
}

impl ProgressReport {
    pub fn new(phase: EnginePhase, progress: f32) -> Self {
        Self { phase, progress }
    }

    /// Progress as a whole percentage, rounded to nearest and kept in 0..=100
    pub fn percent(&self) -> u8 {
        if !self.progress.is_finite() {
            return 0;
        }
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Callback the engine calls for every progress event
pub type ProgressSink = Arc<dyn Fn(ProgressReport) + Send + Sync>;

/// Parameters for one recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Language model identifier (e.g. "eng")
    pub language: String,
    /// Concurrency hint
    pub workers: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            workers: 1,
        }
    }
}

/// An OCR engine able to start recognition sessions
///
/// All calls block; run them on a blocking worker.
pub trait OcrEngine: Send + Sync {
    fn create_session(
        &self,
        config: &SessionConfig,
        progress: ProgressSink,
    ) -> Result<Box<dyn OcrSession>, OcrError>;
}

/// A live recognition session
pub trait OcrSession: Send {
    /// Recognize the text in one image
    fn recognize(&mut self, image: &ImageFile) -> Result<String, OcrError>;

    /// Release the session. Called exactly once per session, right before
    /// it is dropped.
    fn terminate(&mut self);
}

/// Terminates the wrapped session when dropped, whatever the exit path
pub struct SessionGuard {
    session: Box<dyn OcrSession>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn OcrSession>) -> Self {
        Self { session }
    }

    pub fn recognize(&mut self, image: &ImageFile) -> Result<String, OcrError> {
        self.session.recognize(image)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_nearest() {
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, 0.25).percent(), 25);
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, 0.904).percent(), 90);
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, 0.906).percent(), 91);
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, 0.999).percent(), 100);
    }

    #[test]
    fn test_percent_stays_in_range() {
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, -0.3).percent(), 0);
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, 1.7).percent(), 100);
        assert_eq!(ProgressReport::new(EnginePhase::Recognizing, f32::NAN).percent(), 0);
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(EnginePhase::LoadingEngine < EnginePhase::Initializing);
        assert!(EnginePhase::Initializing < EnginePhase::LoadingModel);
        assert!(EnginePhase::LoadingModel < EnginePhase::Recognizing);
    }

    #[test]
    fn test_user_message_passes_engine_text_through() {
        let error = OcrError::Recognition("network error".to_string());
        assert_eq!(error.user_message(), "network error");
    }

    #[test]
    fn test_user_message_falls_back_when_empty() {
        let error = OcrError::Recognition(String::new());
        assert_eq!(error.user_message(), FALLBACK_ERROR);
    }

    #[test]
    fn test_guard_terminates_once_after_repeated_use() {
        let engine = crate::ocr::mock::MockEngine::succeeding("hello");
        let sink: ProgressSink = Arc::new(|_: ProgressReport| {});
        let image = ImageFile::new("note.png", "image/png", vec![1]).unwrap();

        let session = engine.create_session(&SessionConfig::default(), sink).unwrap();
        let mut guard = SessionGuard::new(session);
        assert_eq!(guard.recognize(&image), Ok("hello".to_string()));
        assert_eq!(guard.recognize(&image), Ok("hello".to_string()));
        assert_eq!(engine.sessions_terminated(), 0);

        drop(guard);
        assert_eq!(engine.sessions_terminated(), 1);
    }
}
