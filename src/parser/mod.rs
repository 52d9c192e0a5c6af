//! Text segmentation and rule-driven field extraction.

pub mod extract;
pub mod segment;

pub use extract::{
    extract_artists, extract_node, extract_span, title_after_label, ElementRule, MarkupFieldPlan,
    NodeFields, SpanFields, TextFieldPlan, TextRule,
};
pub use segment::{segment, Segments, Span};

use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY年M月D日（曜）`, the anchor used by date-listed schedule pages
pub static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4}年\d{1,2}月\d{1,2}日（[月火水木金土日]）)").expect("valid date pattern")
});

/// Name patterns: 「…」, 『…』 and `X＆Y` / `X&Y` pairs
pub static ARTIST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"「([^」]+)」",
        r"『([^』]+)』",
        r"([^、。\n]+?)(?:＆|&)([^、。\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid artist pattern"))
    .collect()
});

/// Doors / curtain times, e.g. `【開場】18:30【開演】19:00`
pub static DOORS_START_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[【〖]開場[】〗]\s*(\d{1,2}[:：]\d{2})\s*[【〖]開演[】〗]\s*(\d{1,2}[:：]\d{2})")
        .expect("valid time pattern")
});
