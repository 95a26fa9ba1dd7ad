//! Scripted OCR engine for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::engine::{
    EnginePhase, OcrEngine, OcrError, OcrSession, ProgressReport, ProgressSink, SessionConfig,
};
use crate::state::data::ImageFile;

/// Replays a fixed list of progress events and returns a fixed outcome
pub struct MockEngine {
    /// Reported while the session is being created
    pub setup: Vec<ProgressReport>,
    /// Reported while recognizing
    pub recognition: Vec<ProgressReport>,
    /// Make session creation fail after `setup` was reported
    pub create_error: Option<OcrError>,
    pub outcome: Result<String, OcrError>,
    pub panic_on_recognize: bool,
    pub created: Arc<AtomicUsize>,
    pub terminated: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Goes through every phase and recognizes `text`
    pub fn succeeding(text: &str) -> Self {
        Self {
            setup: vec![
                ProgressReport::new(EnginePhase::LoadingEngine, 0.0),
                ProgressReport::new(EnginePhase::Initializing, 0.5),
                ProgressReport::new(EnginePhase::LoadingModel, 1.0),
            ],
            recognition: vec![
                ProgressReport::new(EnginePhase::Recognizing, 0.25),
                ProgressReport::new(EnginePhase::Recognizing, 0.9),
            ],
            create_error: None,
            outcome: Ok(text.to_string()),
            panic_on_recognize: false,
            created: Arc::new(AtomicUsize::new(0)),
            terminated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Session is created, recognition fails with `error`
    pub fn failing(error: OcrError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::succeeding("")
        }
    }

    /// Fails while loading the language model
    pub fn failing_at_model_load(message: &str) -> Self {
        Self {
            setup: vec![
                ProgressReport::new(EnginePhase::LoadingEngine, 1.0),
                ProgressReport::new(EnginePhase::Initializing, 1.0),
                ProgressReport::new(EnginePhase::LoadingModel, 0.0),
            ],
            create_error: Some(OcrError::Recognition(message.to_string())),
            ..Self::succeeding("")
        }
    }

    pub fn sessions_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn sessions_terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl OcrEngine for MockEngine {
    fn create_session(
        &self,
        _config: &SessionConfig,
        progress: ProgressSink,
    ) -> Result<Box<dyn OcrSession>, OcrError> {
        for report in &self.setup {
            progress(*report);
        }
        if let Some(error) = &self.create_error {
            return Err(error.clone());
        }

        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            recognition: self.recognition.clone(),
            outcome: self.outcome.clone(),
            panic_on_recognize: self.panic_on_recognize,
            progress,
            terminated: Arc::clone(&self.terminated),
        }))
    }
}

struct MockSession {
    recognition: Vec<ProgressReport>,
    outcome: Result<String, OcrError>,
    panic_on_recognize: bool,
    progress: ProgressSink,
    terminated: Arc<AtomicUsize>,
}

impl OcrSession for MockSession {
    fn recognize(&mut self, _image: &ImageFile) -> Result<String, OcrError> {
        for report in &self.recognition {
            (self.progress)(*report);
        }
        if self.panic_on_recognize {
            panic!("mock engine crashed");
        }
        self.outcome.clone()
    }

    fn terminate(&mut self) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
    }
}
