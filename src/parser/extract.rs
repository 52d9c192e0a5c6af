use crate::constants::UNKNOWN_EVENT;
use crate::error::{Result, ScraperError};
use crate::parser::segment::Span;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Ordered regex fallback chain for one text field.
///
/// The first pattern that matches supplies its first capture group (or the
/// whole match when the pattern has no group); `default` otherwise.
#[derive(Debug, Clone)]
pub struct TextRule {
    pub patterns: Vec<Regex>,
    pub default: String,
}

impl TextRule {
    pub fn new(patterns: Vec<Regex>, default: &str) -> Self {
        Self {
            patterns,
            default: default.to_string(),
        }
    }

    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.capture(text)
            .map(str::to_string)
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Ordered element lookup chain for one markup field.
#[derive(Debug, Clone)]
pub struct ElementRule {
    candidates: Vec<Selector>,
    pub default: String,
}

impl ElementRule {
    pub fn new(selectors: &[&str], default: &str) -> Result<Self> {
        let candidates = selectors
            .iter()
            .map(|s| {
                Selector::parse(s).map_err(|e| ScraperError::Extraction {
                    message: format!("invalid selector '{s}': {e}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            candidates,
            default: default.to_string(),
        })
    }

    /// First candidate (in chain order) whose first match has non-blank text.
    pub fn find<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.candidates
            .iter()
            .filter_map(|sel| node.select(sel).next())
            .find(|el| !stripped_text(*el).is_empty())
    }

    pub fn text(&self, node: ElementRef<'_>) -> Option<String> {
        self.find(node).map(stripped_text)
    }

    pub fn apply(&self, node: ElementRef<'_>) -> String {
        self.text(node).unwrap_or_else(|| self.default.clone())
    }
}

/// Concatenation of the element's text nodes, each trimmed.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Field plan for plain-text spans anchored on a date label.
#[derive(Debug, Clone)]
pub struct TextFieldPlan {
    pub venue: TextRule,
    pub genre: TextRule,
    /// Literal markers that end the title (venue names, genre names, time markers)
    pub title_boundaries: Vec<String>,
    /// Two groups: doors time, start time
    pub time: Regex,
    pub artist_patterns: Vec<Regex>,
}

/// Raw (not yet normalized) fields pulled from one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanFields {
    pub date: String,
    pub title: String,
    pub venue: String,
    pub genre: String,
    pub time: String,
    pub artists: Vec<String>,
}

pub fn extract_span(span: &Span<'_>, plan: &TextFieldPlan) -> Result<SpanFields> {
    let title = title_after_label(span.text, span.label, plan.title_boundaries.as_slice())?;

    let time = plan
        .time
        .captures(span.text)
        .and_then(|caps| Some(format!("{}開場・{}開演", caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .unwrap_or_default();

    Ok(SpanFields {
        date: span.label.to_string(),
        title,
        venue: plan.venue.apply(span.text),
        genre: plan.genre.apply(span.text),
        time,
        artists: extract_artists(span.text, &plan.artist_patterns),
    })
}

/// Text between the end of `label` and the nearest following boundary marker.
///
/// Runs to the end of `text` when no marker follows; a blank result becomes
/// the untitled-event placeholder. Fails only if `label` is not in `text`.
pub fn title_after_label<S: AsRef<str>>(text: &str, label: &str, boundaries: &[S]) -> Result<String> {
    let start = text
        .find(label)
        .map(|pos| pos + label.len())
        .ok_or_else(|| ScraperError::MissingField(format!("date label '{label}' not in span")))?;
    let rest = &text[start..];

    let end = boundaries
        .iter()
        .filter_map(|marker| rest.find(marker.as_ref()))
        .min()
        .unwrap_or(rest.len());

    let title = rest[..end].trim();
    Ok(if title.is_empty() {
        UNKNOWN_EVENT.to_string()
    } else {
        title.to_string()
    })
}

/// Every captured group of every pattern, trimmed, blanks dropped, deduplicated.
///
/// Duplicates are removed by exact string equality; callers must not rely on
/// the resulting order.
pub fn extract_artists(text: &str, patterns: &[Regex]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .flat_map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Field plan for listing nodes (one event per markup node).
#[derive(Debug, Clone)]
pub struct MarkupFieldPlan {
    pub title: ElementRule,
    pub date: ElementRule,
    pub location: ElementRule,
    pub artists: ElementRule,
    pub price: ElementRule,
    pub link: Selector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFields {
    pub title: String,
    pub date: String,
    pub location: String,
    pub artists: Vec<String>,
    pub price: String,
    pub link_href: Option<String>,
}

pub fn extract_node(node: ElementRef<'_>, plan: &MarkupFieldPlan) -> Result<NodeFields> {
    if stripped_text(node).is_empty() {
        return Err(ScraperError::Extraction {
            message: format!("<{}> node has no text content", node.value().name()),
        });
    }

    let artists = plan
        .artists
        .find(node)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let link_href = node
        .select(&plan.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    Ok(NodeFields {
        title: plan.title.apply(node),
        date: plan.date.apply(node),
        location: plan.location.apply(node),
        artists,
        price: plan.price.apply(node),
        link_href,
    })
}
