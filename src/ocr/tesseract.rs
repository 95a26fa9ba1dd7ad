//! OCR engine backed by the system tesseract, via rusty-tesseract

use image::DynamicImage;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;

use super::engine::{
    EnginePhase, OcrEngine, OcrError, OcrSession, ProgressReport, ProgressSink, SessionConfig,
};
use crate::config::Settings;
use crate::state::data::ImageFile;

/// Images whose short side is below this get upscaled 4x
const SMALL_IMAGE: u32 = 100;
/// Images whose short side is below this get upscaled 2x
const MEDIUM_IMAGE: u32 = 200;

/// Tesseract engine configured from [`Settings`]
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    dpi: Option<i32>,
    psm: Option<i32>,
    oem: Option<i32>,
    upscale_small_images: bool,
}

impl TesseractEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            dpi: settings.dpi,
            psm: settings.psm,
            oem: settings.oem,
            upscale_small_images: settings.upscale_small_images,
        }
    }

    fn args(&self, config: &SessionConfig) -> Args {
        let mut config_variables = HashMap::new();
        // Keep interword spacing as printed (helps with receipts and tables)
        config_variables.insert("preserve_interword_spaces".to_string(), "1".to_string());

        Args {
            lang: config.language.clone(),
            config_variables,
            dpi: self.dpi,
            psm: self.psm,
            oem: self.oem,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn create_session(
        &self,
        config: &SessionConfig,
        progress: ProgressSink,
    ) -> Result<Box<dyn OcrSession>, OcrError> {
        progress(ProgressReport::new(EnginePhase::LoadingEngine, 0.0));
        let version = rusty_tesseract::get_tesseract_version()
            .map_err(|e| OcrError::EngineUnavailable(e.to_string()))?;
        log::info!("🔧 Using tesseract {}", version.lines().next().unwrap_or("").trim());
        progress(ProgressReport::new(EnginePhase::LoadingEngine, 1.0));

        progress(ProgressReport::new(EnginePhase::Initializing, 0.0));
        let args = self.args(config);
        if config.workers > 1 {
            // The CLI runs one process per image, so the hint has nothing to size
            log::debug!("Ignoring worker hint {} for tesseract", config.workers);
        }
        progress(ProgressReport::new(EnginePhase::Initializing, 1.0));

        progress(ProgressReport::new(EnginePhase::LoadingModel, 0.0));
        let languages = rusty_tesseract::get_tesseract_langs()
            .map_err(|e| OcrError::EngineUnavailable(e.to_string()))?;
        if !has_language(&languages, &config.language) {
            return Err(OcrError::LanguageMissing(config.language.clone()));
        }
        progress(ProgressReport::new(EnginePhase::LoadingModel, 1.0));

        Ok(Box::new(TesseractSession {
            args,
            upscale_small_images: self.upscale_small_images,
            progress,
        }))
    }
}

/// `lang` may combine models with '+', e.g. "eng+deu"
fn has_language(installed: &[String], lang: &str) -> bool {
    lang.split('+')
        .all(|wanted| installed.iter().any(|have| have.trim() == wanted))
}

struct TesseractSession {
    args: Args,
    upscale_small_images: bool,
    progress: ProgressSink,
}

impl TesseractSession {
    fn report(&self, fraction: f32) {
        (self.progress)(ProgressReport::new(EnginePhase::Recognizing, fraction));
    }
}

impl OcrSession for TesseractSession {
    fn recognize(&mut self, image: &ImageFile) -> Result<String, OcrError> {
        self.report(0.0);

        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|e| OcrError::Decode(e.to_string()))?;
        let prepared = if self.upscale_small_images {
            upscale_for_ocr(decoded)
        } else {
            decoded
        };
        let tess_image = Image::from_dynamic_image(&prepared)
            .map_err(|e| OcrError::Decode(e.to_string()))?;
        self.report(0.5);

        let text = rusty_tesseract::image_to_string(&tess_image, &self.args)
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        self.report(1.0);

        Ok(text.trim().to_string())
    }

    fn terminate(&mut self) {
        log::debug!("Tesseract session for '{}' terminated", self.args.lang);
    }
}

/// Tesseract works best with text at least 10-12 pixels tall
fn upscale_for_ocr(image: DynamicImage) -> DynamicImage {
    let factor = upscale_factor(image.width(), image.height());
    if factor == 1 {
        return image;
    }

    let (width, height) = (image.width() * factor, image.height() * factor);
    log::info!("Upscaling small image {}x to {}x{}", factor, width, height);
    image.resize(width, height, image::imageops::FilterType::Lanczos3)
}

fn upscale_factor(width: u32, height: u32) -> u32 {
    match width.min(height) {
        side if side < SMALL_IMAGE => 4,
        side if side < MEDIUM_IMAGE => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upscale_factor() {
        assert_eq!(upscale_factor(50, 400), 4);
        assert_eq!(upscale_factor(150, 400), 2);
        assert_eq!(upscale_factor(800, 600), 1);
    }

    #[test]
    fn test_upscale_small_image() {
        let image = DynamicImage::new_rgb8(40, 30);
        let scaled = upscale_for_ocr(image);
        assert_eq!((scaled.width(), scaled.height()), (160, 120));
    }

    #[test]
    fn test_has_language() {
        let installed = vec!["eng".to_string(), "deu".to_string(), "osd".to_string()];
        assert!(has_language(&installed, "eng"));
        assert!(has_language(&installed, "eng+deu"));
        assert!(!has_language(&installed, "fra"));
        assert!(!has_language(&installed, "eng+fra"));
    }

    #[test]
    fn test_args_follow_settings() {
        let settings = Settings {
            dpi: Some(300),
            psm: Some(6),
            ..Settings::default()
        };
        let engine = TesseractEngine::new(&settings);
        let args = engine.args(&settings.session_config());

        assert_eq!(args.lang, "eng");
        assert_eq!(args.dpi, Some(300));
        assert_eq!(args.psm, Some(6));
    }

    #[test]
    fn test_undecodable_bytes_are_decode_error() {
        let progress: ProgressSink = std::sync::Arc::new(|_| {});
        let mut session = TesseractSession {
            args: TesseractEngine::new(&Settings::default()).args(&SessionConfig::default()),
            upscale_small_images: true,
            progress,
        };
        let file = ImageFile::new("broken.png", "image/png", vec![0, 1, 2, 3]).unwrap();

        assert!(matches!(session.recognize(&file), Err(OcrError::Decode(_))));
    }
}
