//! Catalog assembly: per-run id stamping and duplicate-dropping merge.
//!
//! Ids are assigned in two phases. Every event produced by a run is first
//! renumbered `1..=N` with one shared `createdAt` ([`stamp_run`]); the merge
//! then drops events whose `(name, date)` already exists in the catalog and
//! appends the rest with the ids they carry. Because the run renumbering does
//! not look at the existing catalog, repeated runs can append ids that collide
//! with older entries; [`merge_events`] only fills ids that are still missing.

use crate::types::Event;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// What happened to one incoming event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MergeDecision {
    /// Appended to the catalog under this id
    Accepted { id: u64 },
    /// Dropped: the catalog already has an event with the same name and date
    Duplicate { existing_id: Option<u64> },
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub catalog: Vec<Event>,
    /// One entry per incoming event, in input order
    pub decisions: Vec<MergeDecision>,
}

impl MergeOutcome {
    pub fn accepted(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, MergeDecision::Accepted { .. }))
            .count()
    }

    pub fn duplicates(&self) -> usize {
        self.decisions.len() - self.accepted()
    }
}

/// Local time in ISO-8601 with microseconds, e.g. `2025-06-01T09:30:00.123456`
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Renumber a run's combined output `1..=N` and give every event `created_at`.
pub fn stamp_run(events: &mut [Event], created_at: &str) {
    for (i, event) in events.iter_mut().enumerate() {
        event.id = Some(i as u64 + 1);
        event.created_at = Some(created_at.to_string());
    }
}

/// Append `new_events` to `existing`, dropping any whose `(name, date)` matches
/// an existing event exactly.
///
/// New events are compared against `existing` only, not against each other.
/// Events still lacking an id get `max(existing id) + 1` onwards, in input
/// order (duplicates included, before they are dropped); accepted events
/// still lacking `created_at` get `merged_at`. Existing entries are never
/// modified.
pub fn merge_events(mut new_events: Vec<Event>, existing: &[Event], merged_at: &str) -> MergeOutcome {
    let mut next_id = existing
        .iter()
        .map(|e| e.id.unwrap_or(0))
        .max()
        .map_or(1, |max| max + 1);

    for event in new_events.iter_mut().filter(|e| e.id.is_none()) {
        event.id = Some(next_id);
        next_id += 1;
    }

    let mut known: HashMap<(&str, &str), Option<u64>> = HashMap::new();
    for event in existing {
        known.entry(event.identity()).or_insert(event.id);
    }

    let mut catalog = existing.to_vec();
    let mut decisions = Vec::with_capacity(new_events.len());

    for mut event in new_events {
        let duplicate_of = known.get(&event.identity()).copied();
        if let Some(existing_id) = duplicate_of {
            debug!(name = %event.name, date = %event.date, "Dropping duplicate event");
            decisions.push(MergeDecision::Duplicate { existing_id });
            continue;
        }

        if event.created_at.is_none() {
            event.created_at = Some(merged_at.to_string());
        }
        // ids were filled above
        let id = event.id.unwrap_or_default();
        decisions.push(MergeDecision::Accepted { id });
        catalog.push(event);
    }

    let outcome = MergeOutcome { catalog, decisions };
    info!(
        "Merged {} new events ({} duplicates dropped); catalog now has {} events",
        outcome.accepted(),
        outcome.duplicates(),
        outcome.catalog.len()
    );
    metrics::counter!("scraper_events_accepted_total").increment(outcome.accepted() as u64);
    metrics::counter!("scraper_duplicates_dropped_total").increment(outcome.duplicates() as u64);
    outcome
}
