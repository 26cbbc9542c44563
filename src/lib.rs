pub mod collection;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;

pub use collection::{read_table, CollectionWriter, Table};
pub use config::{OutputSchema, Preset, ScanConfig, ThresholdMethod};
pub use detection::fields::{FieldExtractor, FieldText};
pub use detection::ocr::{LineMode, OcrsRecognizer, TextRecognizer};
pub use detection::RegionDetector;
pub use error::{CardScanError, Result};
pub use models::{BoundingBox, CardRecord, CardRegion, Collection, FieldRegion};
pub use parser::parse_set_number;
pub use pipeline::{CardScanner, ScanReport};
