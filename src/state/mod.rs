/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The selected image and its preview handle (selection.rs)
/// - The conversion job, progress and extracted text (conversion.rs)

pub mod data;
pub mod selection;
pub mod conversion;
