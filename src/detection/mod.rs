pub mod preprocessing;
pub mod contours;
pub mod cards;
pub mod fields;
pub mod ocr;

use image::{DynamicImage, GenericImageView, GrayImage};
use tracing::{debug, info};

use crate::config::DetectionConfig;
use crate::models::BoundingBox;

/// A bounding rectangle found in the screenshot and whether it passed the card filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub accepted: bool,
}

/// Intermediate products of one detection pass
#[derive(Debug, Clone)]
pub struct RegionAnalysis {
    pub binary: GrayImage,
    pub candidates: Vec<Candidate>,
}

impl RegionAnalysis {
    /// Accepted rectangles in contour-discovery order
    pub fn accepted(&self) -> Vec<BoundingBox> {
        self.candidates
            .iter()
            .filter(|c| c.accepted)
            .map(|c| c.bbox)
            .collect()
    }
}

/// Finds card-shaped regions in a screenshot
#[derive(Debug, Clone)]
pub struct RegionDetector {
    config: DetectionConfig,
}

impl RegionDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Card bounding boxes in contour-discovery order.
    ///
    /// The order is arbitrary but deterministic for a given input. No
    /// regions is an empty result, not an error.
    pub fn detect(&self, img: &DynamicImage) -> Vec<BoundingBox> {
        self.analyze(img).accepted()
    }

    /// Run detection and keep every candidate with its verdict
    pub fn analyze(&self, img: &DynamicImage) -> RegionAnalysis {
        let (width, height) = img.dimensions();
        debug!(width, height, threshold = ?self.config.threshold, "Detecting card regions");

        let gray = preprocessing::to_grayscale(img);
        let binary = preprocessing::binarize(&gray, &self.config.threshold);
        let rects = contours::external_bounding_rects(&binary);

        let mut candidates = Vec::with_capacity(rects.len());
        for (i, bbox) in rects.into_iter().enumerate() {
            let accepted = cards::is_card_shaped(&bbox, &self.config) && bbox.fits_within(width, height);
            debug!(
                contour = i + 1,
                x = bbox.x,
                y = bbox.y,
                w = bbox.width,
                h = bbox.height,
                aspect = bbox.aspect_ratio(),
                accepted,
                "Contour analysed"
            );
            candidates.push(Candidate { bbox, accepted });
        }

        let analysis = RegionAnalysis { binary, candidates };
        info!(
            contours = analysis.candidates.len(),
            cards = analysis.candidates.iter().filter(|c| c.accepted).count(),
            "Card region detection finished"
        );
        analysis
    }
}

impl Default for RegionDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}
