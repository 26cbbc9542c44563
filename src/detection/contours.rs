use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};

use crate::models::BoundingBox;

/// Outer borders of the outermost foreground components of a binary image.
///
/// Borders nested inside holes of another component are skipped. Order is
/// raster-scan discovery order of each border's first pixel, so it is stable
/// for a given input.
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour<u32>> {
    find_contours::<u32>(binary)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect()
}

/// Axis-aligned bounding rectangle of a contour's points
pub fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for point in &contour.points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(BoundingBox::from_corners(min_x, min_y, max_x, max_y))
}

/// Bounding rectangles of every external contour, in discovery order
pub fn external_bounding_rects(binary: &GrayImage) -> Vec<BoundingBox> {
    find_external_contours(binary)
        .iter()
        .filter_map(bounding_rect)
        .collect()
}
