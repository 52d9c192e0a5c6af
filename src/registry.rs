use crate::apis::{KyobunCrawler, SourceAdapter, TokyoMusicCrawler};
use crate::config::Config;
use crate::constants::{SAPPORO_API, TOKYO_API};
use crate::error::Result;
use tracing::warn;

/// Factory function mapping a source id to its crawler
pub fn create_adapter(api_name: &str, config: &Config) -> Result<Option<SourceAdapter>> {
    let adapter = match api_name {
        SAPPORO_API => Some(SourceAdapter::Kyobun(KyobunCrawler::new(&config.sources.sapporo))),
        TOKYO_API => Some(SourceAdapter::TokyoMusic(TokyoMusicCrawler::new(
            &config.sources.tokyo,
        )?)),
        _ => None,
    };
    Ok(adapter)
}

/// Ordered set of crawlers for one run.
pub struct SourceRegistry {
    adapters: Vec<SourceAdapter>,
}

impl SourceRegistry {
    /// Crawlers for `names`, in the given order. Unknown and repeated names are
    /// skipped with a warning.
    pub fn from_names<S: AsRef<str>>(names: &[S], config: &Config) -> Result<Self> {
        let mut adapters: Vec<SourceAdapter> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if adapters.iter().any(|a| a.api_name() == name) {
                warn!("Source '{}' listed twice; ignoring repeat", name);
                continue;
            }
            match create_adapter(name, config)? {
                Some(adapter) => adapters.push(adapter),
                None => warn!("Unknown source specified: {}", name),
            }
        }
        Ok(Self { adapters })
    }

    /// Crawlers for every source enabled in the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_names(config.sources.enabled.as_slice(), config)
    }

    pub fn get(&self, api_name: &str) -> Option<&SourceAdapter> {
        self.adapters.iter().find(|a| a.api_name() == api_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceAdapter> {
        self.adapters.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.api_name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
