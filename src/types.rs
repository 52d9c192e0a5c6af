use crate::constants::{GENRE_OTHER, SCALE_MID};
use serde::{Deserialize, Serialize};

/// A `{label, url}` pair attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Canonical catalog record.
///
/// Crawlers build events with `id` and `created_at` unset; both are filled once
/// when the event enters a catalog (see [`crate::merge`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    /// Deduplicated performer names. Order is not meaningful.
    pub artists: Vec<String>,
    pub price: String,
    pub scale: String,
    pub links: Vec<Link>,
    pub genre: String,
    pub region: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Event {
    /// The `(name, date)` pair used for duplicate detection
    pub fn identity(&self) -> (&str, &str) {
        (&self.name, &self.date)
    }
}

/// Lenient on-disk shape of a catalog entry.
///
/// Older catalog files (and hand-entered events) use `title`, `venue` and
/// `ticket_price` in place of the canonical keys, and may omit fields entirely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub venue: Option<String>,
    pub artists: Option<Vec<String>>,
    pub price: Option<String>,
    pub ticket_price: Option<String>,
    pub scale: Option<String>,
    pub links: Option<Vec<Link>>,
    pub genre: Option<String>,
    pub region: Option<String>,
    pub source: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.filter(|s| !s.is_empty()))
        .unwrap_or_default()
}

impl RawEvent {
    /// Fold legacy keys into the canonical shape and fill defaults.
    pub fn normalize(self) -> Event {
        Event {
            id: self.id,
            name: first_non_empty(self.name, self.title),
            date: self.date.unwrap_or_default(),
            time: self.time.unwrap_or_default(),
            location: first_non_empty(self.location, self.venue),
            artists: self.artists.unwrap_or_default(),
            price: first_non_empty(self.price, self.ticket_price),
            scale: self.scale.unwrap_or_else(|| SCALE_MID.to_string()),
            links: self.links.unwrap_or_default(),
            genre: self.genre.unwrap_or_else(|| GENRE_OTHER.to_string()),
            region: self.region.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            image: self.image,
            created_at: self.created_at,
        }
    }
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        raw.normalize()
    }
}
