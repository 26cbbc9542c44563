use image::{DynamicImage, GenericImageView, GrayImage};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::detection::ocr::{LineMode, TextRecognizer};
use crate::detection::preprocessing;
use crate::models::FieldRegion;

/// Raw OCR output for one card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldText {
    pub name: String,
    pub set_number: String,
}

impl FieldText {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.set_number.is_empty()
    }
}

/// Binarized field crops ready for recognition.
///
/// A field is `None` when its region resolves to zero pixels on this card.
#[derive(Debug, Clone, Default)]
pub struct PreparedFields {
    pub name: Option<GrayImage>,
    pub set_number: Option<GrayImage>,
}

/// Crop a fractional region from a card, convert to grayscale and apply a
/// global Otsu threshold on the crop alone
pub fn binarize_field(card: &DynamicImage, region: &FieldRegion, invert: bool) -> Option<GrayImage> {
    let (width, height) = card.dimensions();
    let bbox = region.resolve(width, height)?;
    let crop = card.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
    let gray = preprocessing::to_grayscale(&crop);
    Some(preprocessing::otsu_threshold(&gray, invert))
}

/// Reads the name and set/number text of a cropped card
pub struct FieldExtractor<R> {
    config: ExtractionConfig,
    recognizer: R,
}

impl<R: TextRecognizer> FieldExtractor<R> {
    pub fn new(config: ExtractionConfig, recognizer: R) -> Self {
        Self { config, recognizer }
    }

    pub fn prepare(&self, card: &DynamicImage) -> PreparedFields {
        PreparedFields {
            name: binarize_field(card, &self.config.name_region, self.config.invert),
            set_number: binarize_field(card, &self.config.set_region, self.config.invert),
        }
    }

    /// Run OCR over prepared fields. Failures and missing fields yield empty strings.
    pub fn recognize(&self, fields: &PreparedFields) -> FieldText {
        FieldText {
            name: self.read_field("name", fields.name.as_ref(), &self.config.name_whitelist),
            set_number: self.read_field("set_number", fields.set_number.as_ref(), &self.config.set_whitelist),
        }
    }

    pub fn extract(&self, card: &DynamicImage) -> FieldText {
        self.recognize(&self.prepare(card))
    }

    fn read_field(&self, field: &str, image: Option<&GrayImage>, whitelist: &str) -> String {
        let Some(image) = image else {
            debug!(field, "field region is empty on this card");
            return String::new();
        };

        match self.recognizer.recognize(image, whitelist, LineMode::SingleLine) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(field, error = %e, "OCR failed, treating field as empty");
                String::new()
            }
        }
    }
}
