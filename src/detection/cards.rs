use crate::config::DetectionConfig;
use crate::models::BoundingBox;

/// Size and portrait-shape test for a candidate card rectangle.
///
/// All comparisons are strict: a box exactly at a bound is rejected.
pub fn is_card_shaped(bbox: &BoundingBox, config: &DetectionConfig) -> bool {
    let aspect = bbox.aspect_ratio();
    bbox.width > config.min_width
        && bbox.height > config.min_height
        && aspect > config.min_aspect_ratio
        && aspect < config.max_aspect_ratio
}
