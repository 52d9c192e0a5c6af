use regex::Regex;
use std::ops::Range;

/// One date-anchored slice of page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    /// The matched date text, e.g. `2024年5月1日（水）`
    pub label: &'a str,
    /// Page text from the start of this date up to the next date (or end of text).
    /// Always begins with `label`.
    pub text: &'a str,
}

/// Date-anchored partition of a page, with match positions computed upfront so
/// the spans can be walked any number of times.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    page: &'a str,
    // (label range, span range) per date occurrence
    bounds: Vec<(Range<usize>, Range<usize>)>,
}

/// Split `page` at every non-overlapping match of `date_pattern`.
///
/// If the pattern has a capture group, group 1 is the label; otherwise the
/// whole match is.
pub fn segment<'a>(page: &'a str, date_pattern: &Regex) -> Segments<'a> {
    let matches: Vec<(usize, Range<usize>)> = date_pattern
        .captures_iter(page)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1).unwrap_or(whole);
            Some((whole.start(), label.range()))
        })
        .collect();

    let bounds = matches
        .iter()
        .enumerate()
        .map(|(i, (start, label))| {
            let end = matches.get(i + 1).map_or(page.len(), |(next, _)| *next);
            (label.clone(), *start..end)
        })
        .collect();

    Segments { page, bounds }
}

impl<'a> Segments<'a> {
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Text before the first date; the whole page when there are no dates.
    pub fn preamble(&self) -> &'a str {
        match self.bounds.first() {
            Some((_, span)) => &self.page[..span.start],
            None => self.page,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Span<'a>> + '_ {
        let page = self.page;
        self.bounds.iter().map(move |(label, span)| Span {
            label: &page[label.clone()],
            text: &page[span.clone()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DATE_PATTERN;

    #[test]
    fn test_no_dates_yields_no_spans() {
        let page = "公演情報はありません\n休館日のお知らせ";
        let segments = segment(page, &DATE_PATTERN);
        assert!(segments.is_empty());
        assert_eq!(segments.iter().count(), 0);
        assert_eq!(segments.preamble(), page);
    }

    #[test]
    fn test_spans_cover_text_between_dates() {
        let page = "2024年5月1日（水）大ホール 公演A\n2024年5月3日（金）小ホール 公演B";
        let segments = segment(page, &DATE_PATTERN);
        let spans: Vec<_> = segments.iter().collect();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, "2024年5月1日（水）");
        assert_eq!(spans[0].text, "2024年5月1日（水）大ホール 公演A\n");
        assert_eq!(spans[1].label, "2024年5月3日（金）");
        assert_eq!(spans[1].text, "2024年5月3日（金）小ホール 公演B");
    }

    #[test]
    fn test_preamble_and_spans_reconstruct_page() {
        let page = "イベントスケジュール\n2024年6月1日（土）ギャラリー 写真展\n2024年6月2日（日）大ホール\n2024年6月9日（日）演劇 劇団X";
        let segments = segment(page, &DATE_PATTERN);
        assert_eq!(segments.len(), 3);

        let rebuilt: String = std::iter::once(segments.preamble())
            .chain(segments.iter().map(|s| s.text))
            .collect();
        assert_eq!(rebuilt, page);
    }

    #[test]
    fn test_page_starting_with_date_has_empty_preamble() {
        let page = "2024年7月7日（日）大ホール\n音楽";
        let segments = segment(page, &DATE_PATTERN);
        assert_eq!(segments.preamble(), "");
        let joined: String = segments.iter().map(|s| s.text).collect();
        assert_eq!(joined, page);
    }

    #[test]
    fn test_segments_are_restartable() {
        let page = "2024年5月1日（水）A 2024年5月2日（木）B";
        let segments = segment(page, &DATE_PATTERN);
        let first: Vec<_> = segments.iter().collect();
        let second: Vec<_> = segments.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pattern_without_group_uses_whole_match() {
        let pattern = Regex::new(r"\d{1,2}/\d{1,2}").unwrap();
        let segments = segment("5/1 foo 5/2 bar", &pattern);
        let labels: Vec<_> = segments.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["5/1", "5/2"]);
    }
}
