use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, GrayImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::detection::fields::{FieldExtractor, FieldText};
use crate::detection::ocr::TextRecognizer;
use crate::detection::{RegionAnalysis, RegionDetector};
use crate::error::{CardScanError, Result};
use crate::models::{CardRecord, CardRegion, Collection};
use crate::parser::parse_set_number;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

const ACCEPTED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const REJECTED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outcome of scanning one screenshot
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Source file, `None` for in-memory images
    pub source: Option<PathBuf>,
    /// Card regions accepted by the detector
    pub regions: usize,
    /// Accepted regions that produced no record
    pub skipped: usize,
    pub records: Collection,
}

/// Turn the raw field text of one card into a record.
///
/// Returns `None` when both fields are empty.
pub fn build_record(text: FieldText) -> Option<CardRecord> {
    if text.is_empty() {
        return None;
    }

    let parsed = parse_set_number(&text.set_number);
    Some(CardRecord::new(text.name, parsed.set_info, parsed.card_number))
}

/// Decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| CardScanError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Image files directly inside `dir`, sorted by file name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_err = |source| CardScanError::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Writes intermediate images for inspection
#[derive(Debug, Clone)]
struct DebugDump {
    dir: PathBuf,
}

impl DebugDump {
    /// Claim an output directory. It must be empty or not exist yet.
    fn prepare(output_dir: &Path) -> Result<Self> {
        let debug_err = |reason: String| CardScanError::Debug {
            path: output_dir.to_path_buf(),
            reason,
        };

        if output_dir.exists() {
            let entries = std::fs::read_dir(output_dir).map_err(|e| debug_err(e.to_string()))?;
            if entries.count() > 0 {
                return Err(debug_err("directory is not empty".to_string()));
            }
        } else {
            std::fs::create_dir_all(output_dir).map_err(|e| debug_err(e.to_string()))?;
        }

        Ok(Self {
            dir: output_dir.to_path_buf(),
        })
    }

    fn nested(&self, name: &str) -> Self {
        Self {
            dir: self.dir.join(name),
        }
    }

    fn save(&self, relative: &str, image: &DynamicImage) -> Result<()> {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CardScanError::Debug {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        image.save(&path).map_err(|e| CardScanError::Debug {
            path: path.clone(),
            reason: format!("failed to save debug image: {e}"),
        })?;
        debug!(path = %path.display(), "Debug image saved");
        Ok(())
    }

    fn save_gray(&self, relative: &str, image: &GrayImage) -> Result<()> {
        self.save(relative, &DynamicImage::ImageLuma8(image.clone()))
    }

    /// Screenshot with accepted boxes in green and rejected ones in red
    fn save_overlay(&self, relative: &str, source: &DynamicImage, analysis: &RegionAnalysis) -> Result<()> {
        let mut canvas = source.to_rgb8();
        for candidate in &analysis.candidates {
            let bbox = candidate.bbox;
            let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
            let color = if candidate.accepted {
                ACCEPTED_COLOR
            } else {
                REJECTED_COLOR
            };
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
        self.save(relative, &DynamicImage::ImageRgb8(canvas))
    }
}

/// Screenshot-to-records driver: detect, crop, read fields, parse
pub struct CardScanner<R> {
    detector: RegionDetector,
    extractor: FieldExtractor<R>,
    debug: Option<DebugDump>,
}

impl<R: TextRecognizer> CardScanner<R> {
    /// Build a scanner from a validated config.
    ///
    /// When debug output is configured, the directory must be empty or absent.
    pub fn new(config: &ScanConfig, recognizer: R) -> Result<Self> {
        config.validate()?;

        let debug = match &config.debug.output_dir {
            Some(dir) => Some(DebugDump::prepare(dir)?),
            None => None,
        };

        Ok(Self {
            detector: RegionDetector::new(config.detection.clone()),
            extractor: FieldExtractor::new(config.extraction.clone(), recognizer),
            debug,
        })
    }

    /// Scan an in-memory screenshot
    pub fn scan_image(&self, img: &DynamicImage) -> Result<ScanReport> {
        self.scan(img, None, self.debug.as_ref())
    }

    /// Load and scan one screenshot file
    pub fn scan_file(&self, path: &Path) -> Result<ScanReport> {
        self.scan_file_with(path, self.debug.as_ref())
    }

    fn scan_file_with(&self, path: &Path, dump: Option<&DebugDump>) -> Result<ScanReport> {
        info!(path = %path.display(), "Processing image");
        let img = load_image(path)?;
        let (width, height) = img.dimensions();
        debug!(width, height, "Image loaded");
        self.scan(&img, Some(path.to_path_buf()), dump)
    }

    /// Scan every image in a directory in file-name order.
    ///
    /// Any load failure aborts the batch.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<ScanReport>> {
        let images = list_images(dir)?;
        if images.is_empty() {
            warn!(dir = %dir.display(), "No image files found");
        }

        let mut reports = Vec::with_capacity(images.len());
        for path in &images {
            // Full file name, so a.png and a.jpg get separate directories
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let dump = self.debug.as_ref().map(|d| d.nested(&name));
            reports.push(self.scan_file_with(path, dump.as_ref())?);
        }
        Ok(reports)
    }

    /// Scan a file, or every image in a directory
    pub fn scan_path(&self, path: &Path) -> Result<Vec<ScanReport>> {
        if path.is_dir() {
            self.scan_directory(path)
        } else {
            Ok(vec![self.scan_file(path)?])
        }
    }

    fn scan(&self, img: &DynamicImage, source: Option<PathBuf>, dump: Option<&DebugDump>) -> Result<ScanReport> {
        let analysis = self.detector.analyze(img);
        let boxes = analysis.accepted();

        if let Some(dump) = dump {
            dump.save("00_input.png", img)?;
            dump.save_gray("01_threshold.png", &analysis.binary)?;
            dump.save_overlay("02_contours.png", img, &analysis)?;
        }

        if boxes.is_empty() {
            info!("No card regions detected with current parameters");
        }

        let mut records = Collection::new();
        let mut skipped = 0;

        for (i, bbox) in boxes.iter().enumerate() {
            let Some(card) = CardRegion::crop(img, *bbox) else {
                warn!(card = i + 1, ?bbox, "Card box outside image, skipping");
                skipped += 1;
                continue;
            };

            let fields = self.extractor.prepare(&card.image);

            if let Some(dump) = dump {
                let file = format!("{:02}.png", i + 1);
                dump.save(&format!("03_cards/{file}"), &card.image)?;
                if let Some(name) = &fields.name {
                    dump.save_gray(&format!("04_name_fields/{file}"), name)?;
                }
                if let Some(set_number) = &fields.set_number {
                    dump.save_gray(&format!("05_set_fields/{file}"), set_number)?;
                }
            }

            let text = self.extractor.recognize(&fields);
            match build_record(text) {
                Some(record) => {
                    info!(
                        card = i + 1,
                        name = %record.name,
                        set = %record.set_info,
                        number = %record.card_number,
                        "Card processed"
                    );
                    records.push(record);
                }
                None => {
                    debug!(card = i + 1, "No identifiable text within field regions");
                    skipped += 1;
                }
            }
        }

        Ok(ScanReport {
            source,
            regions: boxes.len(),
            skipped,
            records,
        })
    }
}

/// Concatenate the records of several reports in order
pub fn merge_records(reports: &[ScanReport]) -> Collection {
    let mut all = Collection::new();
    for report in reports {
        all.extend(report.records.clone());
    }
    all
}
