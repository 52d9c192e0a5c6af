pub mod kyobun;
pub mod tokyo_music;

use crate::app::ports::PageFetcher;
use crate::types::Event;
use chrono::NaiveDate;

pub use kyobun::KyobunCrawler;
pub use tokyo_music::TokyoMusicCrawler;

/// How far ahead a run looks.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeWindow {
    pub days: u32,
    pub today: NaiveDate,
}

impl ScrapeWindow {
    pub fn new(days: u32, today: NaiveDate) -> Self {
        Self { days, today }
    }

    pub fn from_today(days: u32) -> Self {
        Self::new(days, chrono::Local::now().date_naive())
    }

    /// Month-paged sources scrape at least one month.
    pub fn months(&self) -> u32 {
        (self.days / 30).max(1)
    }
}

/// One crawler per source family.
pub enum SourceAdapter {
    /// Plain-text schedule split on date anchors
    Kyobun(KyobunCrawler),
    /// Markup listings, one node per event
    TokyoMusic(TokyoMusicCrawler),
}

impl SourceAdapter {
    pub fn api_name(&self) -> &'static str {
        match self {
            SourceAdapter::Kyobun(c) => c.api_name(),
            SourceAdapter::TokyoMusic(c) => c.api_name(),
        }
    }

    /// Events discovered by this source, without ids or timestamps.
    ///
    /// Never fails: unreachable pages and unparseable units are logged and
    /// contribute nothing.
    pub async fn produce_events(&self, fetcher: &dyn PageFetcher, window: &ScrapeWindow) -> Vec<Event> {
        match self {
            SourceAdapter::Kyobun(c) => c.produce_events(fetcher, window.months(), window.today).await,
            SourceAdapter::TokyoMusic(c) => c.produce_events(fetcher).await,
        }
    }
}
