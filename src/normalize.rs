//! Field normalization into the fixed catalog vocabulary.
//!
//! Every function here is total: unknown input falls into a default bucket,
//! never an error and never an empty string.

use crate::constants::*;

/// Scale from a hall/room keyword, for venue-based sources.
pub fn scale_from_venue(venue: &str) -> &'static str {
    match venue {
        "大ホール" => SCALE_LARGE,
        "小ホール" => SCALE_MID,
        "ギャラリー" => SCALE_SMALL,
        _ => SCALE_MID,
    }
}

/// Scale from the number of billed artists, for listing-based sources.
pub fn scale_from_artist_count(count: usize) -> &'static str {
    if count > 5 {
        SCALE_LARGE
    } else if count > 2 {
        SCALE_MID
    } else {
        SCALE_SMALL
    }
}

/// Map a venue's own genre label onto the catalog genres.
pub fn normalize_genre(raw: &str) -> &'static str {
    match raw.trim() {
        "音楽" | "オペラ" => GENRE_CLASSICAL,
        "洋舞・邦舞" => GENRE_DANCE,
        "展示" => GENRE_EXHIBITION,
        "演劇" => GENRE_THEATER,
        _ => GENRE_OTHER,
    }
}

// Checked in order; first hit wins.
const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    (GENRE_ROCK, &["rock", "ロック"]),
    (GENRE_JAZZ, &["jazz", "ジャズ"]),
    (GENRE_CLASSICAL, &["classical", "クラシック", "classic"]),
    (GENRE_EDM, &["edm", "electronic", "エレクトロ"]),
];

/// Guess a music genre from an event title and its artists.
pub fn detect_genre(title: &str, artists: &[String]) -> &'static str {
    let title = title.to_lowercase();
    let artists = artists.join(" ").to_lowercase();

    GENRE_KEYWORDS
        .iter()
        .find(|(_, words)| {
            words
                .iter()
                .any(|w| title.contains(w) || artists.contains(w))
        })
        .map(|(genre, _)| *genre)
        .unwrap_or(GENRE_POP)
}

/// `"<hall> <room>"`, or just the hall when the room is blank.
pub fn venue_location(hall: &str, room: &str) -> String {
    let room = room.trim();
    if room.is_empty() {
        hall.to_string()
    } else {
        format!("{hall} {room}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_from_venue() {
        assert_eq!(scale_from_venue("大ホール"), SCALE_LARGE);
        assert_eq!(scale_from_venue("小ホール"), SCALE_MID);
        assert_eq!(scale_from_venue("ギャラリー"), SCALE_SMALL);
        assert_eq!(scale_from_venue("不明"), SCALE_MID);
        assert_eq!(scale_from_venue(""), SCALE_MID);
    }

    #[test]
    fn test_scale_from_artist_count_thresholds() {
        assert_eq!(scale_from_artist_count(0), SCALE_SMALL);
        assert_eq!(scale_from_artist_count(2), SCALE_SMALL);
        assert_eq!(scale_from_artist_count(3), SCALE_MID);
        assert_eq!(scale_from_artist_count(5), SCALE_MID);
        assert_eq!(scale_from_artist_count(6), SCALE_LARGE);
    }

    #[test]
    fn test_genre_table() {
        assert_eq!(normalize_genre("音楽"), GENRE_CLASSICAL);
        assert_eq!(normalize_genre("オペラ"), GENRE_CLASSICAL);
        assert_eq!(normalize_genre("洋舞・邦舞"), GENRE_DANCE);
        assert_eq!(normalize_genre("展示"), GENRE_EXHIBITION);
        assert_eq!(normalize_genre("演劇"), GENRE_THEATER);
        assert_eq!(normalize_genre("その他"), GENRE_OTHER);
        assert_eq!(normalize_genre("落語"), GENRE_OTHER);
        assert_eq!(normalize_genre(""), GENRE_OTHER);
    }

    #[test]
    fn test_detect_genre_priority() {
        let none: Vec<String> = vec![];
        assert_eq!(detect_genre("Jazz & Rock Session", &none), GENRE_ROCK);
        assert_eq!(detect_genre("Blue Note NIGHT", &["JAZZ trio".into()]), GENRE_JAZZ);
        assert_eq!(detect_genre("クラシック名曲選", &none), GENRE_CLASSICAL);
        assert_eq!(detect_genre("Warehouse", &["EDM Crew".into()]), GENRE_EDM);
        assert_eq!(detect_genre("Idol Festival", &none), GENRE_POP);
    }

    #[test]
    fn test_normalizers_are_total() {
        let inputs = ["", " ", "???", "大ホール音楽", "\u{3000}", "rock"];
        for input in inputs {
            assert!(!scale_from_venue(input).is_empty());
            assert!(!normalize_genre(input).is_empty());
            assert!(!detect_genre(input, &[input.to_string()]).is_empty());
        }
    }

    #[test]
    fn test_venue_location() {
        assert_eq!(venue_location(KYOBUN_SOURCE_NAME, "大ホール"), "札幌教育文化会館 大ホール");
        assert_eq!(venue_location(KYOBUN_SOURCE_NAME, " "), KYOBUN_SOURCE_NAME);
    }
}
