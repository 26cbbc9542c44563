mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardscan for tests
pub use cardscan::config::{Preset, ScanConfig, SET_WHITELIST};
pub use cardscan::{
    BoundingBox, CardRecord, CardScanError, CardScanner, CollectionWriter, LineMode, OutputSchema,
    RegionDetector, TextRecognizer,
};
