use std::sync::Arc;

use crate::config::Config;
use crate::critique::service::CritiqueService;
use crate::extraction::TextRecognizer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub critic: Arc<CritiqueService>,
    /// Set when image uploads are OCR'd instead of passed to the model as images.
    pub ocr: Option<Arc<dyn TextRecognizer>>,
    pub config: Config,
}
