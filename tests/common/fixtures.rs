use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use cardscan::{BoundingBox, LineMode, TextRecognizer};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([230, 230, 230]);
pub const CARD: Rgb<u8> = Rgb([40, 40, 40]);

/// Light screenshot with solid dark rectangles standing in for cards
pub fn screenshot(width: u32, height: u32, cards: &[BoundingBox]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    for card in cards {
        for y in card.y..card.y + card.height {
            for x in card.x..card.x + card.width {
                img.put_pixel(x, y, CARD);
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// Two 200x280 cards (aspect 0.714) well apart
pub fn two_card_layout() -> Vec<BoundingBox> {
    vec![BoundingBox::new(50, 60, 200, 280), BoundingBox::new(400, 120, 200, 280)]
}

pub fn two_card_screenshot() -> DynamicImage {
    screenshot(700, 500, &two_card_layout())
}

/// Saves an image as PNG inside `dir`
pub fn save_png(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

pub fn assert_box_near(actual: &BoundingBox, expected: &BoundingBox, tolerance: u32) {
    let close = |a: u32, b: u32| a.abs_diff(b) <= tolerance;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "box {actual:?} not within {tolerance}px of {expected:?}"
    );
}

/// Returns canned answers in call order; empty string once exhausted
pub struct ScriptedRecognizer {
    answers: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRecognizer {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Whitelists passed to each call
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, _region: &GrayImage, whitelist: &str, mode: LineMode) -> cardscan::Result<String> {
        assert_eq!(mode, LineMode::SingleLine);
        self.calls.borrow_mut().push(whitelist.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// Answers with a digest of the region's pixels, so output depends only on input
pub struct PixelDigestRecognizer;

impl TextRecognizer for PixelDigestRecognizer {
    fn recognize(&self, region: &GrayImage, _whitelist: &str, _mode: LineMode) -> cardscan::Result<String> {
        let foreground = region.pixels().filter(|p| p[0] > 0).count();
        Ok(format!("{}x{}/{}", region.width(), region.height(), foreground))
    }
}
