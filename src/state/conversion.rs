/// Conversion job state
///
/// Tracks the one OCR job the app can run at a time: its status, the
/// progress percentage, the extracted text and the error banner message.
/// All methods are plain synchronous state updates driven by UI messages;
/// the actual recognition runs in `ocr::orchestrator`.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::ocr::{EnginePhase, OcrError, ProgressReport};

/// Shown when convert is requested without an image
pub const NO_IMAGE_MESSAGE: &str = "Please select an image first.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImageSelected,
    #[error("A conversion is already running")]
    JobActive,
}

/// Status of the current job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobStatus {
    #[default]
    Idle,
    LoadingEngine,
    Initializing,
    LoadingModel,
    Recognizing(u8),
    Done,
    Failed(String),
}

impl JobStatus {
    /// True while the engine is working
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::LoadingEngine
                | JobStatus::Initializing
                | JobStatus::LoadingModel
                | JobStatus::Recognizing(_)
        )
    }

    fn from_report(report: &ProgressReport) -> Self {
        match report.phase {
            EnginePhase::LoadingEngine => JobStatus::LoadingEngine,
            EnginePhase::Initializing => JobStatus::Initializing,
            EnginePhase::LoadingModel => JobStatus::LoadingModel,
            EnginePhase::Recognizing => JobStatus::Recognizing(report.percent()),
        }
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub completed_at: DateTime<Local>,
}

/// The conversion job plus everything the UI derives from it
#[derive(Debug, Default)]
pub struct Conversion {
    status: JobStatus,
    /// Latest engine phase seen in the current job
    phase: Option<EnginePhase>,
    progress: u8,
    busy: bool,
    extracted: Option<ExtractedText>,
    error: Option<String>,
}

impl Conversion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Progress in percent, 0..=100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn extracted(&self) -> Option<&ExtractedText> {
        self.extracted.as_ref()
    }

    /// Extracted text, empty if there is none
    pub fn text(&self) -> &str {
        self.extracted.as_ref().map(|e| e.text.as_str()).unwrap_or("")
    }

    /// Message for the error banner
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the convert button should be enabled
    pub fn can_convert(&self, has_image: bool) -> bool {
        has_image && !self.busy
    }

    /// A new image invalidates previous results
    ///
    /// Does nothing to an active job.
    pub fn reset(&mut self) {
        if self.busy {
            log::warn!("⚠️  Ignoring reset while a conversion is running");
            return;
        }
        *self = Self::default();
    }

    /// Start a new job
    ///
    /// Without an image the error banner shows [`NO_IMAGE_MESSAGE`] and the job
    /// status is left alone. While a job is active the request is rejected and
    /// nothing changes.
    pub fn start(&mut self, has_image: bool) -> Result<(), ConvertError> {
        if self.busy {
            log::warn!("⚠️  Convert requested while a job is active");
            return Err(ConvertError::JobActive);
        }
        if !has_image {
            self.error = Some(ConvertError::NoImageSelected.to_string());
            return Err(ConvertError::NoImageSelected);
        }

        self.status = JobStatus::LoadingEngine;
        self.phase = None;
        self.progress = 0;
        self.busy = true;
        self.extracted = None;
        self.error = None;
        Ok(())
    }

    /// Apply one engine progress event
    ///
    /// Events outside a job, and events from a phase earlier than the current
    /// one, are dropped.
    pub fn apply(&mut self, report: ProgressReport) {
        if !self.busy {
            log::debug!("Dropping progress event outside a job: {:?}", report);
            return;
        }
        if self.phase.is_some_and(|phase| report.phase < phase) {
            log::debug!("Dropping out-of-order progress event: {:?}", report);
            return;
        }
        self.phase = Some(report.phase);

        let status = JobStatus::from_report(&report);
        if let JobStatus::Recognizing(percent) = status {
            // Never move backwards within a job
            self.progress = self.progress.max(percent);
            self.status = JobStatus::Recognizing(self.progress);
        } else {
            self.status = status;
        }
    }

    /// Settle the job with the engine's outcome
    pub fn finish(&mut self, outcome: Result<String, OcrError>) {
        match outcome {
            Ok(text) => {
                self.extracted = Some(ExtractedText {
                    text,
                    completed_at: Local::now(),
                });
                self.progress = 100;
                self.status = JobStatus::Done;
                self.error = None;
            }
            Err(e) => {
                let message = e.user_message();
                self.extracted = None;
                self.progress = 0;
                self.status = JobStatus::Failed(message.clone());
                self.error = Some(message);
            }
        }
        self.busy = false;
    }

    /// Label for the action button
    pub fn button_label(&self) -> String {
        match &self.status {
            JobStatus::LoadingEngine => "Loading OCR engine...".to_string(),
            JobStatus::Initializing => "Initializing...".to_string(),
            JobStatus::LoadingModel => "Loading language model...".to_string(),
            JobStatus::Recognizing(percent) => format!("Recognizing text... {}%", percent),
            JobStatus::Idle | JobStatus::Done | JobStatus::Failed(_) => {
                "Convert to Text".to_string()
            }
        }
    }
}
