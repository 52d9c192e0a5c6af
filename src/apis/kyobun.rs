use crate::app::ports::PageFetcher;
use crate::config::KyobunConfig;
use crate::constants::{
    DETAIL_LINK_LABEL, KYOBUN_SOURCE_NAME, PRICE_TBD, SAPPORO_API, SAPPORO_REGION, UNKNOWN_EVENT,
    UNKNOWN_VENUE,
};
use crate::error::{Result, ScraperError};
use crate::normalize::{normalize_genre, scale_from_venue, venue_location};
use crate::parser::extract::stripped_text;
use crate::parser::{
    extract_span, segment, SpanFields, TextFieldPlan, TextRule, ARTIST_PATTERNS, DATE_PATTERN,
    DOORS_START_PATTERN,
};
use crate::types::{Event, Link};
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

const VENUES: [&str; 3] = ["大ホール", "小ホール", "ギャラリー"];
const GENRES: [&str; 5] = ["音楽", "洋舞・邦舞", "展示", "オペラ", "演劇"];
const TIME_MARKERS: [&str; 4] = ["【開場】", "【開演】", "〖開場〗", "〖開演〗"];

static VENUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("(大ホール|小ホール|ギャラリー)").expect("valid venue pattern"));
static GENRE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(音楽|洋舞・邦舞|展示|オペラ|演劇|その他)").expect("valid genre pattern")
});
static DETAIL_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="k=detail"]"#).expect("valid selector"));

/// 札幌教育文化会館 monthly schedule: one plain-text page per month, events
/// anchored on `YYYY年M月D日（曜）` labels.
pub struct KyobunCrawler {
    base_url: String,
    plan: TextFieldPlan,
}

impl KyobunCrawler {
    pub fn new(config: &KyobunConfig) -> Self {
        let title_boundaries = VENUES
            .iter()
            .chain(GENRES.iter())
            .chain(TIME_MARKERS.iter())
            .map(|s| s.to_string())
            .collect();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plan: TextFieldPlan {
                venue: TextRule::new(vec![VENUE_PATTERN.clone()], UNKNOWN_VENUE),
                genre: TextRule::new(vec![GENRE_PATTERN.clone()], "その他"),
                title_boundaries,
                time: DOORS_START_PATTERN.clone(),
                artist_patterns: ARTIST_PATTERNS.clone(),
            },
        }
    }

    pub fn api_name(&self) -> &'static str {
        SAPPORO_API
    }

    /// `YYYYMM` for each of `months` periods, 30 days apart starting at `today`.
    ///
    /// Stops early at the first period past the last representable date.
    pub fn periods(months: u32, today: NaiveDate) -> Vec<String> {
        let mut periods = Vec::new();
        for i in 0..months {
            let day = Duration::try_days(30 * i64::from(i))
                .and_then(|offset| today.checked_add_signed(offset));
            match day {
                Some(day) => periods.push(day.format("%Y%m").to_string()),
                None => {
                    warn!(
                        "Period {} of {} is out of the calendar range; stopping there",
                        i + 1,
                        months
                    );
                    break;
                }
            }
        }
        periods
    }

    pub fn month_url(&self, year_month: &str) -> String {
        format!("{}/event_schedule.html?k=lst&ym={}", self.base_url, year_month)
    }

    #[instrument(skip(self, fetcher))]
    pub async fn produce_events(
        &self,
        fetcher: &dyn PageFetcher,
        months: u32,
        today: NaiveDate,
    ) -> Vec<Event> {
        let mut events = Vec::new();

        for year_month in Self::periods(months, today) {
            match self.scrape_month(fetcher, &year_month).await {
                Ok(month_events) => {
                    info!("Scraped {} events for {}", month_events.len(), year_month);
                    events.extend(month_events);
                }
                Err(e) => {
                    warn!("Error scraping {}: {}", year_month, e);
                    continue;
                }
            }
        }

        events
    }

    async fn scrape_month(&self, fetcher: &dyn PageFetcher, year_month: &str) -> Result<Vec<Event>> {
        let url = self.month_url(year_month);
        match fetcher.fetch(&url).await {
            Some(body) => self.parse_page(&body, &url),
            None => Ok(Vec::new()),
        }
    }

    /// Segment a schedule page by date and extract one event per segment.
    ///
    /// A span that fails extraction is logged and skipped.
    pub fn parse_page(&self, body: &str, page_url: &str) -> Result<Vec<Event>> {
        let document = Html::parse_document(body);
        let page_text: String = document.root_element().text().collect();
        let detail_links = collect_detail_links(&document, page_url)?;

        let segments = segment(&page_text, &DATE_PATTERN);
        debug!("Found {} date anchors on {}", segments.len(), page_url);

        let mut events = Vec::new();
        for (i, span) in segments.iter().enumerate() {
            match extract_span(&span, &self.plan) {
                Ok(fields) => {
                    let mut event = self.build_event(fields);
                    if let Some((title, url)) = detail_link_for(span.text, &detail_links) {
                        if event.name == UNKNOWN_EVENT {
                            event.name = title.to_string();
                        }
                        event.links.push(Link {
                            label: DETAIL_LINK_LABEL.to_string(),
                            url: url.to_string(),
                        });
                    }
                    events.push(event);
                }
                Err(e) => {
                    warn!("Error extracting event {}: {}", i, e);
                    metrics::counter!("scraper_extraction_failures_total", "source" => SAPPORO_API)
                        .increment(1);
                }
            }
        }

        metrics::counter!("scraper_events_extracted_total", "source" => SAPPORO_API)
            .increment(events.len() as u64);
        Ok(events)
    }

    pub fn build_event(&self, fields: SpanFields) -> Event {
        Event {
            id: None,
            name: fields.title,
            date: fields.date,
            time: fields.time,
            location: venue_location(KYOBUN_SOURCE_NAME, &fields.venue),
            artists: fields.artists,
            price: PRICE_TBD.to_string(),
            scale: scale_from_venue(&fields.venue).to_string(),
            links: Vec::new(),
            genre: normalize_genre(&fields.genre).to_string(),
            region: SAPPORO_REGION.to_string(),
            source: KYOBUN_SOURCE_NAME.to_string(),
            image: None,
            created_at: None,
        }
    }
}

/// `(anchor text, absolute url)` for every detail-page anchor on the page.
fn collect_detail_links(document: &Html, page_url: &str) -> Result<Vec<(String, String)>> {
    let base = Url::parse(page_url).map_err(|e| ScraperError::Extraction {
        message: format!("invalid page url '{page_url}': {e}"),
    })?;

    Ok(document
        .select(&DETAIL_LINK_SELECTOR)
        .filter_map(|a| {
            let text = stripped_text(a);
            let href = a.value().attr("href")?;
            let url = base.join(href).ok()?;
            (!text.is_empty()).then(|| (text, url.to_string()))
        })
        .collect())
}

/// First detail anchor whose text lies inside the span.
fn detail_link_for<'a>(span_text: &str, links: &'a [(String, String)]) -> Option<(&'a str, &'a str)> {
    links
        .iter()
        .find(|(text, _)| span_text.contains(text.as_str()))
        .map(|(text, url)| (text.as_str(), url.as_str()))
}
