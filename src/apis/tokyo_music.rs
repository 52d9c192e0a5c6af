use crate::app::ports::PageFetcher;
use crate::config::TokyoMusicConfig;
use crate::constants::{
    DETAIL_LINK_LABEL, PRICE_TBD, TOKYO_API, TOKYO_MUSIC_SOURCE_NAME, TOKYO_REGION, UNKNOWN_EVENT,
};
use crate::error::{Result, ScraperError};
use crate::normalize::{detect_genre, scale_from_artist_count};
use crate::parser::{extract_node, ElementRule, MarkupFieldPlan, NodeFields};
use crate::types::{Event, Link};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Extraction {
        message: format!("invalid selector '{css}': {e}"),
    })
}

/// How candidate event nodes are picked out of a page.
enum NodeMatch<'a> {
    /// Every element matching a CSS selector
    All(&'a Selector),
    /// Elements matching a selector that carry at least one class matching a pattern
    WithClass(&'a Selector, &'a Regex),
}

/// Tokyo listing pages: one event per markup node.
pub struct TokyoMusicCrawler {
    base_url: String,
    base: Url,
    live_house_sites: Vec<String>,
    plan: MarkupFieldPlan,
    listing_selector: Selector,
    live_house_selector: Selector,
    live_house_class: Regex,
}

impl TokyoMusicCrawler {
    pub fn new(config: &TokyoMusicConfig) -> Result<Self> {
        let plan = MarkupFieldPlan {
            title: ElementRule::new(&["h3", "h2", "a"], UNKNOWN_EVENT)?,
            date: ElementRule::new(&[".date", ".event-date"], "")?,
            location: ElementRule::new(&[".venue", ".location"], TOKYO_REGION)?,
            artists: ElementRule::new(&[".artists", ".performers"], "")?,
            price: ElementRule::new(&[".price", ".ticket-price"], PRICE_TBD)?,
            link: selector("a")?,
        };

        let base = Url::parse(&config.base_url).map_err(|e| {
            ScraperError::Config(format!("invalid base url '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            base,
            live_house_sites: config.live_house_sites.clone(),
            plan,
            listing_selector: selector("div.event-item")?,
            live_house_selector: selector("div, article")?,
            live_house_class: Regex::new("event|live|schedule").map_err(|e| {
                ScraperError::Config(format!("invalid live house class pattern: {e}"))
            })?,
        })
    }

    pub fn api_name(&self) -> &'static str {
        TOKYO_API
    }

    #[instrument(skip(self, fetcher))]
    pub async fn produce_events(&self, fetcher: &dyn PageFetcher) -> Vec<Event> {
        let mut events = self.scrape_listing(fetcher).await;
        events.extend(self.scrape_live_houses(fetcher).await);
        metrics::counter!("scraper_events_extracted_total", "source" => TOKYO_API)
            .increment(events.len() as u64);
        events
    }

    async fn scrape_listing(&self, fetcher: &dyn PageFetcher) -> Vec<Event> {
        let url = format!("{}/events", self.base_url);
        match fetcher.fetch(&url).await {
            Some(body) => self.parse_listing_page(&body),
            None => Vec::new(),
        }
    }

    async fn scrape_live_houses(&self, fetcher: &dyn PageFetcher) -> Vec<Event> {
        let mut events = Vec::new();
        for site_url in &self.live_house_sites {
            match fetcher.fetch(site_url).await {
                Some(body) => {
                    let site_events = self.parse_live_house_page(&body);
                    info!("Found {} events on {}", site_events.len(), site_url);
                    events.extend(site_events);
                }
                None => continue,
            }
        }
        events
    }

    /// `div.event-item` nodes of the main listing page.
    pub fn parse_listing_page(&self, body: &str) -> Vec<Event> {
        self.parse_nodes(body, NodeMatch::All(&self.listing_selector))
    }

    /// `div`/`article` nodes whose class mentions event, live or schedule.
    pub fn parse_live_house_page(&self, body: &str) -> Vec<Event> {
        self.parse_nodes(
            body,
            NodeMatch::WithClass(&self.live_house_selector, &self.live_house_class),
        )
    }

    fn parse_nodes(&self, body: &str, node_match: NodeMatch<'_>) -> Vec<Event> {
        let document = Html::parse_document(body);
        let nodes: Vec<ElementRef<'_>> = match node_match {
            NodeMatch::All(sel) => document.select(sel).collect(),
            NodeMatch::WithClass(sel, pattern) => document
                .select(sel)
                .filter(|el| el.value().classes().any(|c| pattern.is_match(c)))
                .collect(),
        };

        nodes
            .into_iter()
            .filter_map(|node| match extract_node(node, &self.plan) {
                Ok(fields) => Some(self.build_event(fields)),
                Err(e) => {
                    warn!("Error parsing event element: {}", e);
                    metrics::counter!("scraper_extraction_failures_total", "source" => TOKYO_API)
                        .increment(1);
                    None
                }
            })
            .collect()
    }

    /// `href` resolved against the base url; absolute hrefs pass through.
    fn absolute_url(&self, href: &str) -> Option<String> {
        match self.base.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("Dropping unresolvable link '{}': {}", href, e);
                None
            }
        }
    }

    pub fn build_event(&self, fields: NodeFields) -> Event {
        let links = fields
            .link_href
            .as_deref()
            .and_then(|href| self.absolute_url(href))
            .map(|url| Link {
                label: DETAIL_LINK_LABEL.to_string(),
                url,
            })
            .into_iter()
            .collect();

        Event {
            id: None,
            scale: scale_from_artist_count(fields.artists.len()).to_string(),
            genre: detect_genre(&fields.title, &fields.artists).to_string(),
            name: fields.title,
            date: fields.date,
            time: String::new(),
            location: fields.location,
            artists: fields.artists,
            price: fields.price,
            links,
            region: TOKYO_REGION.to_string(),
            source: TOKYO_MUSIC_SOURCE_NAME.to_string(),
            image: None,
            created_at: None,
        }
    }
}
