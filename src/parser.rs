//! Splits the raw set/number OCR text into set descriptor and card number.

pub const UNKNOWN_SET: &str = "UNKNOWN_SET";
pub const UNKNOWN_NUMBER: &str = "UNKNOWN_NUMBER";

const SEPARATOR: char = '/';

/// Parsed set/number field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNumber {
    pub set_info: String,
    pub card_number: String,
}

/// Parse raw set/number text.
///
/// With a `/` present, the trimmed text before the first one is the card
/// number and the whole raw string is kept as the set descriptor, so
/// `"123/150"` stays intact. Without a separator the text is the set
/// descriptor. Missing parts fall back to the `UNKNOWN_*` sentinels.
pub fn parse_set_number(raw: &str) -> SetNumber {
    if let Some((number, _)) = raw.split_once(SEPARATOR) {
        return SetNumber {
            set_info: raw.to_string(),
            card_number: number.trim().to_string(),
        };
    }

    let set_info = if raw.is_empty() { UNKNOWN_SET } else { raw };
    SetNumber {
        set_info: set_info.to_string(),
        card_number: UNKNOWN_NUMBER.to_string(),
    }
}
