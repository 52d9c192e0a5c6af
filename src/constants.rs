/// Source identifiers and the fixed output vocabulary shared by every crawler.

// Source identifiers (used in CLI and config)
pub const SAPPORO_API: &str = "sapporo";
pub const TOKYO_API: &str = "tokyo";

// Display names written into `Event::source`
pub const KYOBUN_SOURCE_NAME: &str = "札幌教育文化会館";
pub const TOKYO_MUSIC_SOURCE_NAME: &str = "Tokyo Music Scraper";

// Regions
pub const SAPPORO_REGION: &str = "札幌";
pub const TOKYO_REGION: &str = "東京";

// Scale vocabulary
pub const SCALE_LARGE: &str = "大規模";
pub const SCALE_MID: &str = "中規模";
pub const SCALE_SMALL: &str = "小規模";

// Genre vocabulary
pub const GENRE_OTHER: &str = "その他";
pub const GENRE_CLASSICAL: &str = "クラシック";
pub const GENRE_DANCE: &str = "ダンス";
pub const GENRE_EXHIBITION: &str = "展示";
pub const GENRE_THEATER: &str = "演劇";
pub const GENRE_ROCK: &str = "ロック";
pub const GENRE_JAZZ: &str = "ジャズ";
pub const GENRE_EDM: &str = "EDM";
pub const GENRE_POP: &str = "ポップ";

// Placeholders
pub const UNKNOWN_EVENT: &str = "不明なイベント";
pub const UNKNOWN_VENUE: &str = "不明";
pub const PRICE_TBD: &str = "要確認";
pub const DETAIL_LINK_LABEL: &str = "詳細情報";

/// Get all supported source identifiers in their declared run order
pub fn get_supported_apis() -> Vec<&'static str> {
    vec![SAPPORO_API, TOKYO_API]
}
