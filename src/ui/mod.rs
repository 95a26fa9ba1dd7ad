/// UI building blocks
///
/// - `panels.rs` - upload area, preview, action button, error banner, result

pub mod panels;
