use crate::apis::ScrapeWindow;
use crate::app::ports::PageFetcher;
use crate::error::Result;
use crate::merge::{merge_events, stamp_run, timestamp_now, MergeDecision};
use crate::registry::SourceRegistry;
use crate::storage::CatalogStore;
use crate::types::Event;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, info_span, instrument, Instrument};

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// Events produced per source, in run order
    pub per_source: Vec<(String, usize)>,
    pub total_events: usize,
    pub accepted_events: usize,
    pub duplicate_events: usize,
    pub catalog_size: usize,
    pub decisions: Vec<MergeDecision>,
    pub output_file: PathBuf,
}

pub struct Pipeline<'a> {
    registry: &'a SourceRegistry,
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn CatalogStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        registry: &'a SourceRegistry,
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn CatalogStore,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
        }
    }

    /// Run every source in registry order and stamp the combined output with
    /// ids `1..=N` and a shared `createdAt`.
    pub async fn run_all_sources(&self, window: &ScrapeWindow) -> (Vec<Event>, Vec<(String, usize)>) {
        info!("Starting scraping for the next {} days...", window.days);
        let mut all_events = Vec::new();
        let mut per_source = Vec::new();

        for adapter in self.registry.iter() {
            let span = info_span!("source", api = adapter.api_name());
            let events = adapter
                .produce_events(self.fetcher, window)
                .instrument(span)
                .await;
            info!("Found {} events in {}", events.len(), adapter.api_name());
            per_source.push((adapter.api_name().to_string(), events.len()));
            all_events.extend(events);
        }

        stamp_run(&mut all_events, &timestamp_now());
        (all_events, per_source)
    }

    /// Load the catalog, scrape, merge, save.
    ///
    /// Only persistence errors escape; source failures are absorbed upstream.
    #[instrument(skip(self))]
    pub async fn run(&self, window: &ScrapeWindow, filename: &str) -> Result<PipelineResult> {
        info!("Starting scraping pipeline...");
        let existing = self.store.load(filename).await?;

        let (new_events, per_source) = self.run_all_sources(window).await;
        let total_events = new_events.len();

        let outcome = merge_events(new_events, &existing, &timestamp_now());
        let output_file = self.store.save(filename, &outcome.catalog).await?;

        info!(
            "Scraping pipeline completed. Total events: {}",
            outcome.catalog.len()
        );

        Ok(PipelineResult {
            per_source,
            total_events,
            accepted_events: outcome.accepted(),
            duplicate_events: outcome.duplicates(),
            catalog_size: outcome.catalog.len(),
            decisions: outcome.decisions,
            output_file,
        })
    }
}
