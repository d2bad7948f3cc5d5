//! Label-text parsing and device classification.

mod classify;
mod parse;

pub use classify::classify;
pub use parse::parse_label_text;
pub use scan_types::{Classification, ItemType, ParsedLabel};
