use std::path::{Path, PathBuf};

use image::GrayImage;
pub use ocrs::{ImageSource, OcrEngine};
use ocrs::OcrEngineParams;
use rten::Model;
use tracing::debug;

use crate::error::{CardScanError, Result};

/// Layout hint passed to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Treat the region as one line of text
    SingleLine,
}

/// Text recognition capability used by field extraction
pub trait TextRecognizer {
    /// Recognize text in a binarized region.
    ///
    /// Only characters in `whitelist` may appear in the result.
    fn recognize(&self, region: &GrayImage, whitelist: &str, mode: LineMode) -> Result<String>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, region: &GrayImage, whitelist: &str, mode: LineMode) -> Result<String> {
        (**self).recognize(region, whitelist, mode)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, region: &GrayImage, whitelist: &str, mode: LineMode) -> Result<String> {
        (**self).recognize(region, whitelist, mode)
    }
}

/// Drop characters outside the whitelist and shape lines per `mode`.
///
/// Single-line mode joins recognized lines with a space, or with nothing
/// when space is not whitelisted.
pub fn restrict_text(raw: &str, whitelist: &str, mode: LineMode) -> String {
    let keep = |c: char| whitelist.contains(c);
    let separator = if whitelist.contains(' ') { " " } else { "" };
    match mode {
        LineMode::SingleLine => raw
            .lines()
            .map(|line| line.chars().filter(|c| keep(*c)).collect::<String>())
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(separator),
    }
}

/// Default location of the ocrs model files
pub fn default_model_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| CardScanError::OcrInit("neither HOME nor USERPROFILE is set".to_string()))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// [`TextRecognizer`] backed by the `ocrs` engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load detection and recognition models from `model_dir`
    pub fn from_model_dir(model_dir: &Path) -> Result<Self> {
        let detection_model_path = model_dir.join("text-detection.rten");
        let recognition_model_path = model_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            return Err(CardScanError::OcrInit(format!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            )));
        }

        let detection_model = Model::load_file(&detection_model_path)
            .map_err(|e| CardScanError::OcrInit(format!("failed to load detection model: {e}")))?;
        let recognition_model = Model::load_file(&recognition_model_path)
            .map_err(|e| CardScanError::OcrInit(format!("failed to load recognition model: {e}")))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| CardScanError::OcrInit(e.to_string()))?;

        debug!(model_dir = %model_dir.display(), "OCR engine initialized");
        Ok(Self { engine })
    }

    /// Load models from the standard cache location (`~/.cache/ocrs`)
    pub fn from_default_location() -> Result<Self> {
        Self::from_model_dir(&default_model_dir()?)
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, region: &GrayImage, whitelist: &str, mode: LineMode) -> Result<String> {
        let rgb = image::DynamicImage::ImageLuma8(region.clone()).to_rgb8();

        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| CardScanError::Ocr(e.to_string()))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| CardScanError::Ocr(e.to_string()))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|e| CardScanError::Ocr(e.to_string()))?;

        Ok(restrict_text(&text, whitelist, mode))
    }
}
