//! End-to-end tests for the screenshot-to-records pipeline.
//!
//! OCR is replaced by scripted recognizers so results are exact.

mod common;

use cardscan::config::NAME_WHITELIST;
use cardscan::pipeline::merge_records;
use image::GenericImageView;
use common::*;

#[test]
fn test_records_follow_detection_order() -> anyhow::Result<()> {
    let recognizer = ScriptedRecognizer::new(["Pikachu", "25/102", "Eevee", "SWSH"]);
    let scanner = CardScanner::new(&ScanConfig::default(), &recognizer)?;

    let report = scanner.scan_image(&two_card_screenshot())?;

    assert_eq!(report.regions, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        report.records.records(),
        &[
            CardRecord::new("Pikachu", "25/102", "25"),
            CardRecord::new("Eevee", "SWSH", "UNKNOWN_NUMBER"),
        ]
    );

    // Name first, then set/number, for each card
    assert_eq!(
        recognizer.calls(),
        vec![NAME_WHITELIST, SET_WHITELIST, NAME_WHITELIST, SET_WHITELIST]
    );
    Ok(())
}

#[test]
fn test_regions_without_text_are_skipped() -> anyhow::Result<()> {
    let recognizer = ScriptedRecognizer::new(["", "", "Mew", ""]);
    let scanner = CardScanner::new(&ScanConfig::default(), &recognizer)?;

    let report = scanner.scan_image(&two_card_screenshot())?;

    assert_eq!(report.regions, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.records.records(),
        &[CardRecord::new("Mew", "UNKNOWN_SET", "UNKNOWN_NUMBER")]
    );
    Ok(())
}

#[test]
fn test_no_cards_is_success_with_zero() -> anyhow::Result<()> {
    let recognizer = ScriptedRecognizer::new(Vec::<String>::new());
    let scanner = CardScanner::new(&ScanConfig::default(), &recognizer)?;

    let report = scanner.scan_image(&screenshot(300, 300, &[]))?;

    assert_eq!(report.regions, 0);
    assert!(report.records.is_empty());
    assert!(recognizer.calls().is_empty());
    Ok(())
}

#[test]
fn test_pipeline_is_idempotent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = save_png(dir.path(), "shot.png", &two_card_screenshot());
    let scanner = CardScanner::new(&ScanConfig::default(), PixelDigestRecognizer)?;

    let first = scanner.scan_file(&path)?;
    let second = scanner.scan_file(&path)?;

    assert_eq!(first.records.len(), 2);
    assert_eq!(first.records, second.records);
    Ok(())
}

#[test]
fn test_missing_image_is_load_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let scanner = CardScanner::new(&ScanConfig::default(), PixelDigestRecognizer)?;

    let result = scanner.scan_file(&dir.path().join("nope.png"));
    assert!(matches!(result, Err(CardScanError::ImageLoad { .. })));
    Ok(())
}

#[test]
fn test_undecodable_image_is_load_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png")?;
    let scanner = CardScanner::new(&ScanConfig::default(), PixelDigestRecognizer)?;

    assert!(matches!(scanner.scan_file(&path), Err(CardScanError::ImageLoad { .. })));
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = ScanConfig::default();
    config.detection.max_aspect_ratio = 0.5;
    let result = CardScanner::new(&config, PixelDigestRecognizer);
    assert!(matches!(result, Err(CardScanError::InvalidConfig(_))));
}

#[test]
fn test_directory_scan_in_file_name_order() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    save_png(input.path(), "b_second.png", &screenshot(400, 400, &[BoundingBox::new(50, 50, 200, 280)]));
    save_png(input.path(), "a_first.png", &two_card_screenshot());
    std::fs::write(input.path().join("readme.txt"), "not an image")?;

    let recognizer = ScriptedRecognizer::new(["One", "1/3", "Two", "2/3", "Three", "3/3"]);
    let scanner = CardScanner::new(&ScanConfig::default(), &recognizer)?;

    let reports = scanner.scan_path(input.path())?;
    assert_eq!(reports.len(), 2);
    assert!(reports[0].source.as_ref().unwrap().ends_with("a_first.png"));
    assert_eq!(reports[0].regions, 2);
    assert_eq!(reports[1].regions, 1);

    let names: Vec<String> = merge_records(&reports).iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["One", "Two", "Three"]);
    Ok(())
}

#[test]
fn test_debug_artifacts_written() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let debug = tempfile::tempdir()?;
    let debug_dir = debug.path().join("dump");
    save_png(input.path(), "shot.png", &two_card_screenshot());

    let mut config = ScanConfig::default();
    config.debug.output_dir = Some(debug_dir.clone());
    let scanner = CardScanner::new(&config, PixelDigestRecognizer)?;
    scanner.scan_path(input.path())?;

    let image_dir = debug_dir.join("shot.png");
    for file in [
        "00_input.png",
        "01_threshold.png",
        "02_contours.png",
        "03_cards/01.png",
        "03_cards/02.png",
        "04_name_fields/01.png",
        "05_set_fields/02.png",
    ] {
        assert!(image_dir.join(file).is_file(), "missing debug artifact {file}");
    }
    Ok(())
}

#[test]
fn test_debug_dirs_distinguish_extensions() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let debug = tempfile::tempdir()?;
    let debug_dir = debug.path().join("dump");
    save_png(input.path(), "a.png", &two_card_screenshot());
    screenshot(400, 400, &[BoundingBox::new(50, 50, 200, 280)]).save(input.path().join("a.jpg"))?;

    let mut config = ScanConfig::default();
    config.debug.output_dir = Some(debug_dir.clone());
    let scanner = CardScanner::new(&config, PixelDigestRecognizer)?;
    let reports = scanner.scan_path(input.path())?;
    assert_eq!(reports.len(), 2);

    let mut subdirs: Vec<String> = std::fs::read_dir(&debug_dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    subdirs.sort();
    assert_eq!(subdirs, vec!["a.jpg", "a.png"]);

    let jpg_input = image::open(debug_dir.join("a.jpg/00_input.png"))?;
    let png_input = image::open(debug_dir.join("a.png/00_input.png"))?;
    assert_eq!(jpg_input.dimensions(), (400, 400));
    assert_eq!(png_input.dimensions(), (700, 500));
    assert!(debug_dir.join("a.png/03_cards/02.png").is_file());
    Ok(())
}

#[test]
fn test_details_preset_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("details.csv");
    let config = ScanConfig::preset(Preset::Details);
    let recognizer = ScriptedRecognizer::new(["Snorlax", "A1 143/226", "Ditto", ""]);
    let scanner = CardScanner::new(&config, &recognizer)?;

    let report = scanner.scan_image(&two_card_screenshot())?;
    CollectionWriter::new(config.output.schema).write(&report.records, &output)?;

    let content = std::fs::read_to_string(&output)?;
    assert_eq!(
        content,
        "Card Name,Details\nSnorlax,A1 143/226\nDitto,UNKNOWN_SET\n"
    );
    Ok(())
}
