use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box spanning two inclusive corner coordinates
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// True if the box is non-empty and lies entirely inside an image of the given size
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }
}

/// A detected card: its box plus a copy of the pixels under it
#[derive(Debug, Clone)]
pub struct CardRegion {
    pub bbox: BoundingBox,
    pub image: DynamicImage,
}

impl CardRegion {
    /// Crop the region out of the source screenshot.
    ///
    /// Returns `None` when the box does not fit inside the source image.
    pub fn crop(source: &DynamicImage, bbox: BoundingBox) -> Option<Self> {
        let (width, height) = source.dimensions();
        if !bbox.fits_within(width, height) {
            return None;
        }

        Some(Self {
            bbox,
            image: source.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height),
        })
    }
}

/// Sub-rectangle of a card expressed as fractions of the card's height and width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRegion {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl FieldRegion {
    pub const fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self { top, bottom, left, right }
    }

    pub fn is_valid(&self) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.top)
            && in_unit(self.bottom)
            && in_unit(self.left)
            && in_unit(self.right)
            && self.top < self.bottom
            && self.left < self.right
    }

    /// Resolve the fractions against a parent of the given size.
    ///
    /// Offsets are truncated toward zero. Returns `None` if the resolved
    /// rectangle has no pixels (tiny parents).
    pub fn resolve(&self, parent_width: u32, parent_height: u32) -> Option<BoundingBox> {
        let w = parent_width as f64;
        let h = parent_height as f64;
        let x0 = (w * self.left) as u32;
        let x1 = ((w * self.right) as u32).min(parent_width);
        let y0 = (h * self.top) as u32;
        let y1 = ((h * self.bottom) as u32).min(parent_height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(BoundingBox::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// One catalogued card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub name: String,
    pub set_info: String,
    pub card_number: String,
    pub quantity: u32,
}

impl CardRecord {
    pub fn new(name: impl Into<String>, set_info: impl Into<String>, card_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_info: set_info.into(),
            card_number: card_number.into(),
            quantity: 1,
        }
    }
}

/// Records in detection order. No merging of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: Vec<CardRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CardRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, other: Collection) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRecord> {
        self.records.iter()
    }
}

impl From<Vec<CardRecord>> for Collection {
    fn from(records: Vec<CardRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a CardRecord;
    type IntoIter = std::slice::Iter<'a, CardRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
