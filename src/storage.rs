use crate::error::Result;
use crate::types::{Event, RawEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Storage trait for persisting the event catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Existing catalog, or an empty one if nothing has been saved yet
    async fn load(&self, filename: &str) -> Result<Vec<Event>>;

    /// Replace the catalog and return where it was written
    async fn save(&self, filename: &str, events: &[Event]) -> Result<PathBuf>;
}

/// UTF-8 pretty-printed JSON array files under a data directory
pub struct JsonCatalogStore {
    data_dir: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn load(&self, filename: &str) -> Result<Vec<Event>> {
        let path = self.path_for(filename);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No existing events file found at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let raw: Vec<RawEvent> = serde_json::from_str(&content)?;
        let events: Vec<Event> = raw.into_iter().map(RawEvent::normalize).collect();
        info!("Loaded {} events from {}", events.len(), path.display());
        Ok(events)
    }

    async fn save(&self, filename: &str, events: &[Event]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.path_for(filename);
        let json = serde_json::to_string_pretty(events)?;
        tokio::fs::write(&path, json).await?;
        info!("Saved {} events to {}", events.len(), path.display());
        Ok(path)
    }
}

/// In-memory storage implementation for development/testing
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    catalogs: Arc<Mutex<HashMap<String, Vec<Event>>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(filename: &str, events: Vec<Event>) -> Self {
        let store = Self::new();
        store
            .catalogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(filename.to_string(), events);
        store
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self, filename: &str) -> Result<Vec<Event>> {
        let catalogs = self.catalogs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(catalogs.get(filename).cloned().unwrap_or_default())
    }

    async fn save(&self, filename: &str, events: &[Event]) -> Result<PathBuf> {
        let mut catalogs = self.catalogs.lock().unwrap_or_else(|e| e.into_inner());
        catalogs.insert(filename.to_string(), events.to_vec());
        debug!("Stored {} events under {}", events.len(), filename);
        Ok(PathBuf::from(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GENRE_OTHER, SCALE_MID};
    use crate::error::ScraperError;
    use crate::types::Link;
    use tempfile::tempdir;

    fn sample() -> Event {
        Event {
            id: Some(1),
            name: "札幌ジャズナイト".into(),
            date: "2024年5月1日（水）".into(),
            time: "18:30開場・19:00開演".into(),
            location: "札幌教育文化会館 小ホール".into(),
            artists: vec!["Trio K".into()],
            price: "要確認".into(),
            scale: SCALE_MID.into(),
            links: vec![Link {
                label: "詳細情報".into(),
                url: "https://example.com/1".into(),
            }],
            genre: GENRE_OTHER.into(),
            region: "札幌".into(),
            source: "札幌教育文化会館".into(),
            image: None,
            created_at: Some("2024-04-01T10:00:00.000000".into()),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path());
        assert!(store.load("events.json").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path().join("nested/data"));

        let path = store.save("events.json", &[sample()]).await.unwrap();
        assert_eq!(path, dir.path().join("nested/data/events.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("札幌ジャズナイト"), "non-ASCII should be written unescaped");
        assert!(text.contains("\"createdAt\""));

        let loaded = store.load("events.json").await.unwrap();
        assert_eq!(loaded, vec![sample()]);
    }

    #[tokio::test]
    async fn test_load_accepts_legacy_records() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("events.json"),
            r#"[{"id": 2, "title": "Old Show", "date": "4/1", "venue": "Hall"}]"#,
        )
        .unwrap();

        let loaded = JsonCatalogStore::new(dir.path()).load("events.json").await.unwrap();
        assert_eq!(loaded[0].name, "Old Show");
        assert_eq!(loaded[0].location, "Hall");
        assert_eq!(loaded[0].genre, GENRE_OTHER);
    }

    #[tokio::test]
    async fn test_malformed_catalog_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("events.json"), "{not json").unwrap();
        let err = JsonCatalogStore::new(dir.path()).load("events.json").await.unwrap_err();
        assert!(matches!(err, ScraperError::Json(_)));
    }

    #[tokio::test]
    async fn test_save_into_unwritable_location_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // data dir path runs through a regular file
        let store = JsonCatalogStore::new(blocker.join("data"));
        assert!(matches!(
            store.save("events.json", &[sample()]).await,
            Err(ScraperError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store_survives_poisoned_lock() {
        let store = InMemoryCatalogStore::with_catalog("events.json", vec![sample()]);
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.catalogs.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.catalogs.is_poisoned());

        assert_eq!(store.load("events.json").await.unwrap(), vec![sample()]);
        store.save("other.json", &[sample()]).await.unwrap();
        assert_eq!(store.load("other.json").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryCatalogStore::with_catalog("events.json", vec![sample()]);
        assert_eq!(store.load("events.json").await.unwrap().len(), 1);
        assert!(store.load("other.json").await.unwrap().is_empty());
        store.save("other.json", &[]).await.unwrap();
        assert!(store.load("other.json").await.unwrap().is_empty());
    }
}
