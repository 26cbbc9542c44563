use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cardscan::config::{OutputSchema, Preset, ScanConfig};
use cardscan::pipeline::merge_records;
use cardscan::{CardScanner, CollectionWriter, OcrsRecognizer};

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Detect trading cards in collection screenshots and catalogue them")]
struct Cli {
    /// Screenshot file, or a directory of screenshots
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output table
    #[arg(short, long, value_name = "FILE", default_value = "card_collection.csv")]
    output: PathBuf,

    /// Built-in parameter set to start from
    #[arg(long, value_enum, default_value_t = Preset::Collection)]
    preset: Preset,

    /// JSON config file; fields it sets override the preset
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding text-detection.rten and text-recognition.rten
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Save debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_tuning_hints(schema: OutputSchema) {
    println!("To improve detection and extraction:");
    println!("  1. Re-run with --debug-out DIR and inspect 01_threshold.png and 02_contours.png");
    println!("     (green = accepted card, red = rejected contour).");
    println!("  2. Adjust detection.min_width / min_height / min_aspect_ratio / max_aspect_ratio.");
    println!("  3. Adjust extraction.name_region / set_region using the 04_ and 05_ field crops.");
    if schema == OutputSchema::Full {
        println!("  4. Try --preset details for cards with a full-width details strip.");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let preset = ScanConfig::preset(args.preset);
    let mut config = match &args.config {
        Some(path) => ScanConfig::load_over(&preset, path)?,
        None => preset,
    };
    if let Some(dir) = args.debug_out {
        config.debug.output_dir = Some(dir);
    }

    let recognizer = match &args.models {
        Some(dir) => OcrsRecognizer::from_model_dir(dir)?,
        None => OcrsRecognizer::from_default_location()?,
    };

    let scanner = CardScanner::new(&config, recognizer)?;
    let reports = scanner.scan_path(&args.input)?;

    let regions: usize = reports.iter().map(|r| r.regions).sum();
    let collection = merge_records(&reports);

    let writer = CollectionWriter::new(config.output.schema);
    writer.write(&collection, &args.output)?;

    println!("\n=== Card Scan Results ===");
    println!("Images processed: {}", reports.len());
    println!("Card regions detected: {}", regions);
    println!("Cards catalogued: {}", collection.len());

    if collection.is_empty() {
        println!("\nNo cards were added to the collection.");
        print_tuning_hints(config.output.schema);
    } else {
        println!("Saved to {}", args.output.display());
    }

    Ok(())
}
