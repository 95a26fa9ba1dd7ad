/// OCR module
///
/// - `engine.rs` - engine/session traits, phases and progress events
/// - `tesseract.rs` - the tesseract-backed engine
/// - `orchestrator.rs` - runs one job on a blocking worker and streams progress

pub mod engine;
pub mod orchestrator;
pub mod tesseract;

#[cfg(test)]
pub mod mock;

pub use engine::{EnginePhase, OcrEngine, OcrError, ProgressReport, SessionConfig};
pub use orchestrator::ConversionEvent;
pub use tesseract::TesseractEngine;
