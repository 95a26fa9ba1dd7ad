//! Runs one recognition job off the UI thread
//!
//! The engine works on a tokio blocking worker. Its progress callback pushes
//! into an unbounded channel which is drained, in order, into the returned
//! stream. Exactly one `Finished` event follows the last progress event.

use futures::channel::mpsc;
use futures::{SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

use super::engine::{
    OcrEngine, OcrError, ProgressReport, ProgressSink, SessionConfig, SessionGuard,
};
use crate::state::data::ImageFile;

/// Events produced by a conversion run
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    Progress(ProgressReport),
    Finished(Result<String, OcrError>),
}

/// Create a session, recognize `image`, release the session.
///
/// The session is terminated exactly once on every exit path, including
/// recognition errors and panics.
pub fn recognize_blocking(
    engine: &dyn OcrEngine,
    config: &SessionConfig,
    image: &ImageFile,
    progress: ProgressSink,
) -> Result<String, OcrError> {
    let session = engine.create_session(config, progress)?;
    let mut session = SessionGuard::new(session);
    session.recognize(image)
}

/// Start a conversion and stream its progress and result
pub fn run(
    engine: Arc<dyn OcrEngine>,
    config: SessionConfig,
    image: ImageFile,
) -> impl Stream<Item = ConversionEvent> {
    iced::stream::channel(100, move |mut output| async move {
        let (progress_tx, mut progress_rx) = mpsc::unbounded::<ProgressReport>();
        let started = Instant::now();

        log::info!("🔍 Converting {} ({})", image.name, config.language);

        let worker = tokio::task::spawn_blocking(move || {
            let sink: ProgressSink = Arc::new(move |report| {
                // Receiver only goes away if the UI dropped the task
                let _ = progress_tx.unbounded_send(report);
            });
            recognize_blocking(engine.as_ref(), &config, &image, sink)
        });

        // Ends once the worker has dropped every copy of the sink
        while let Some(report) = progress_rx.next().await {
            let _ = output.send(ConversionEvent::Progress(report)).await;
        }

        let outcome = match worker.await {
            Ok(outcome) => outcome,
            Err(e) => Err(OcrError::Worker(e.to_string())),
        };

        match &outcome {
            Ok(text) => log::info!(
                "✅ Recognized {} characters in {:.1}s",
                text.chars().count(),
                started.elapsed().as_secs_f32()
            ),
            Err(e) => log::error!("❌ Conversion failed: {}", e),
        }

        let _ = output.send(ConversionEvent::Finished(outcome)).await;
    })
}
