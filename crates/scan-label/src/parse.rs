//! Field extraction from OCR'd label text.
//!
//! Text is normalized line by line (whitespace runs collapsed, edges
//! trimmed), then each field tries its patterns in order and keeps the first
//! capture. Patterns are case-insensitive; separators between the field
//! keyword and the value may be `:`, `-`, or whitespace, including a line
//! break. Value captures never cross a line break.

use once_cell::sync::Lazy;
use regex::Regex;
use scan_types::ParsedLabel;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid pattern"));

static SERIAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bS/?N[:\s-]*([A-Za-z0-9-]{5,})\b",
        r"(?i)\bSerial(?: Number)?[:\s-]*([A-Za-z0-9-]{5,})\b",
    ])
});

static MODEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bModel(?: No\.?)?[:\s-]*([A-Za-z0-9 -]{2,})\b",
        r"(?i)\bProduct(?: Name)?[:\s-]*([A-Za-z0-9 -]{2,})\b",
    ])
});

static MANUFACTURER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bBrand[:\s-]*([A-Za-z0-9 -]{2,})\b",
        r"(?i)\bManufacturer[:\s-]*([A-Za-z0-9 -]{2,})\b",
    ])
});

static PART_NUMBER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bP/?N[:\s-]*([A-Za-z0-9-]{3,})\b",
        r"(?i)\bPart(?: Number)?[:\s-]*([A-Za-z0-9-]{3,})\b",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid pattern"))
        .collect()
}

fn normalize(text: &str) -> String {
    text.lines()
        .map(|line| WHITESPACE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_first(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Parse serial, model, manufacturer, and part number out of raw OCR text.
/// Fields that match nothing stay `None`; the normalized text is kept for
/// classification.
pub fn parse_label_text(text: &str) -> ParsedLabel {
    let normalized = normalize(text);
    ParsedLabel {
        serial: find_first(&SERIAL_PATTERNS, &normalized),
        model: find_first(&MODEL_PATTERNS, &normalized),
        manufacturer: find_first(&MANUFACTURER_PATTERNS, &normalized),
        part_number: find_first(&PART_NUMBER_PATTERNS, &normalized),
        raw_text: normalized,
    }
}
