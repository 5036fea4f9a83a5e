//! Filter/sort engine and category extraction
//!
//! Pure functions over an album snapshot. Nothing here touches the store, so
//! the same code serves the HTTP list endpoint, the live feed and the tests.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::album::{split_tags, strip_wrapping_quotes, Album};

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "All";

/// Sort direction on start date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Desc,
    Asc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desc" => Ok(SortOrder::Desc),
            "asc" => Ok(SortOrder::Asc),
            other => Err(format!("Invalid sort order: {} (expected asc or desc)", other)),
        }
    }
}

/// Selected category chip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategorySelection {
    #[default]
    All,
    /// Substring match against the cleaned category field
    Tag(String),
}

impl From<&str> for CategorySelection {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            CategorySelection::All
        } else {
            CategorySelection::Tag(value.to_string())
        }
    }
}

impl CategorySelection {
    fn matches(&self, category: &str) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Tag(tag) => strip_wrapping_quotes(category).contains(tag.as_str()),
        }
    }
}

/// Search predicate
///
/// `name` and `participants` match case-insensitively. A date field matches
/// any verbatim substring as long as it is written as a date, that is, it
/// starts with a four-digit year. Ranges and other loose forms such as
/// `2023/08/19-22` stay searchable, while free text left in a date column
/// does not. Absent fields never match.
pub fn matches_search(album: &Album, search_term: &str) -> bool {
    let r = &album.record;
    let folded = search_term.to_lowercase();
    let date_matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|d| d.contains(search_term) && starts_with_year(d))
    };

    r.name.to_lowercase().contains(&folded)
        || r.participants.to_lowercase().contains(&folded)
        || date_matches(&r.start_date)
        || date_matches(&r.end_date)
}

fn starts_with_year(date: &str) -> bool {
    date.trim_start()
        .as_bytes()
        .get(..4)
        .is_some_and(|year| year.iter().all(u8::is_ascii_digit))
}

/// Parse an album date into a millisecond timestamp
///
/// `/` separators are normalised to `-` first. Accepts a full date, a date
/// with time, a year-month or a bare year; anything else is invalid.
pub fn parse_album_date(raw: &str) -> Option<i64> {
    let s = raw.trim().replace('/', "-");
    if s.is_empty() {
        return None;
    }

    let datetime = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
                .ok()
                .filter(|_| s.len() == 7)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            (s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()))
                .then(|| NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1))
                .flatten()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Some(datetime.and_utc().timestamp_millis())
}

/// Invalid dates sort after valid ones regardless of direction
fn compare_start_dates(a: Option<i64>, b: Option<i64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match order {
            SortOrder::Desc => b.cmp(&a),
            SortOrder::Asc => a.cmp(&b),
        },
    }
}

/// Filter and order a snapshot for display
///
/// The input is left untouched. The sort is stable, so albums with equal or
/// invalid dates keep their snapshot order.
pub fn filter_and_sort(
    albums: &[Album],
    search_term: &str,
    category: &CategorySelection,
    order: SortOrder,
) -> Vec<Album> {
    let mut keyed: Vec<(Option<i64>, &Album)> = albums
        .iter()
        .filter(|album| matches_search(album, search_term))
        .filter(|album| category.matches(&album.record.category))
        .map(|album| {
            let ts = album.record.start_date.as_deref().and_then(parse_album_date);
            (ts, album)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_start_dates(*a, *b, order));
    keyed.into_iter().map(|(_, album)| album.clone()).collect()
}

/// Distinct tags across all albums, in code-point order
pub fn extract_categories(albums: &[Album]) -> Vec<String> {
    albums
        .iter()
        .flat_map(|album| split_tags(&album.record.category))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::AlbumRecord;

    fn album(id: &str, name: &str, category: &str, start: Option<&str>) -> Album {
        Album::new(
            id,
            AlbumRecord {
                name: name.to_string(),
                category: category.to_string(),
                start_date: start.map(str::to_string),
                ..Default::default()
            },
        )
    }

    fn ids(albums: &[Album]) -> Vec<&str> {
        albums.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_invalid_dates_sort_last_both_directions() {
        let albums = vec![
            album("mar", "a", "", Some("2024/03/01")),
            album("bad", "b", "", Some("invalid")),
            album("old", "c", "", Some("2023/01/01")),
        ];

        let desc = filter_and_sort(&albums, "", &CategorySelection::All, SortOrder::Desc);
        assert_eq!(ids(&desc), vec!["mar", "old", "bad"]);

        let asc = filter_and_sort(&albums, "", &CategorySelection::All, SortOrder::Asc);
        assert_eq!(ids(&asc), vec!["old", "mar", "bad"]);
    }

    #[test]
    fn test_invalid_dates_keep_input_order() {
        let albums = vec![
            album("x1", "a", "", None),
            album("ok", "b", "", Some("2020-05-05")),
            album("x2", "c", "", Some("")),
            album("x3", "d", "", Some("soon")),
        ];
        let out = filter_and_sort(&albums, "", &CategorySelection::All, SortOrder::Asc);
        assert_eq!(ids(&out), vec!["ok", "x1", "x2", "x3"]);
    }

    #[test]
    fn test_parse_album_date_separators() {
        assert_eq!(parse_album_date("2024/01/02"), parse_album_date("2024-01-02"));
        assert!(parse_album_date("2024/01/02").is_some());
        assert!(parse_album_date("2024/3/5").is_some());
        assert!(parse_album_date("2024/02").is_some());
        assert!(parse_album_date("2024").is_some());
        assert_eq!(parse_album_date("invalid"), None);
        assert_eq!(parse_album_date("2024/13/01"), None);
        assert_eq!(parse_album_date("柴山"), None);
    }

    #[test]
    fn test_search_name_and_participants_only_for_text() {
        let mut by_participant = album("p", "溪頭之旅", "", Some("2024/03/16"));
        by_participant.record.participants = "柴山小隊".to_string();
        let mut by_date = album("d", "other", "", Some("柴山"));
        by_date.record.end_date = Some("2024/01/01".to_string());
        let albums = vec![
            album("n", "探訪柴山秘境", "", Some("2024/03/02")),
            by_participant,
            by_date,
            album("none", "Trip", "", None),
        ];

        let out = filter_and_sort(&albums, "柴山", &CategorySelection::All, SortOrder::Desc);
        let mut got = ids(&out);
        got.sort();
        assert_eq!(got, vec!["n", "p"]);

        let out = filter_and_sort(&albums, "2024/01", &CategorySelection::All, SortOrder::Desc);
        assert_eq!(ids(&out), vec!["d"]);

        let out = filter_and_sort(&albums, "TRIP", &CategorySelection::All, SortOrder::Desc);
        assert_eq!(ids(&out), vec!["none"]);
    }

    #[test]
    fn test_search_dates_are_case_sensitive_and_absent_never_match() {
        let mut a = album("a", "x", "", Some("2024-03-01T10:00"));
        a.record.end_date = None;
        let albums = vec![a];

        assert_eq!(filter_and_sort(&albums, "T10", &CategorySelection::All, SortOrder::Desc).len(), 1);
        assert!(filter_and_sort(&albums, "t10", &CategorySelection::All, SortOrder::Desc).is_empty());
        assert!(filter_and_sort(&albums, "2025", &CategorySelection::All, SortOrder::Desc).is_empty());
    }

    #[test]
    fn test_search_finds_loose_date_text() {
        let mut range = album("r", "x", "", Some("2023/08/19-22"));
        range.record.end_date = Some("sometime in 2023".to_string());
        let albums = vec![range, album("t", "y", "", Some("上學期"))];

        assert_eq!(ids(&filter_and_sort(&albums, "2023", &CategorySelection::All, SortOrder::Desc)), vec!["r"]);
        assert_eq!(ids(&filter_and_sort(&albums, "19-22", &CategorySelection::All, SortOrder::Desc)), vec!["r"]);
        assert!(filter_and_sort(&albums, "sometime", &CategorySelection::All, SortOrder::Desc).is_empty());
        assert!(filter_and_sort(&albums, "學期", &CategorySelection::All, SortOrder::Desc).is_empty());
    }

    #[test]
    fn test_category_substring_after_quote_strip() {
        let albums = vec![
            album("q", "a", "\"國內旅遊, 爬山\"", Some("2024/03/24")),
            album("r", "b", "單車", Some("2024/03/25")),
        ];
        let selection = CategorySelection::from("爬山");
        let out = filter_and_sort(&albums, "", &selection, SortOrder::Desc);
        assert_eq!(ids(&out), vec!["q"]);

        // substring, not exact tag match
        let out = filter_and_sort(&albums, "", &CategorySelection::from("旅"), SortOrder::Desc);
        assert_eq!(ids(&out), vec!["q"]);
    }

    #[test]
    fn test_all_selection_passes_everything() {
        assert_eq!(CategorySelection::from("All"), CategorySelection::All);
        let albums = vec![album("a", "a", "", None), album("b", "b", "X", None)];
        assert_eq!(filter_and_sort(&albums, "", &CategorySelection::All, SortOrder::Desc).len(), 2);
    }

    #[test]
    fn test_filter_and_sort_is_pure() {
        let albums = vec![
            album("1", "a", "A", Some("2020/01/01")),
            album("2", "b", "B", Some("2022/01/01")),
            album("3", "c", "A", Some("bad")),
        ];
        let before = albums.clone();
        let first = filter_and_sort(&albums, "", &CategorySelection::from("A"), SortOrder::Desc);
        let second = filter_and_sort(&albums, "", &CategorySelection::from("A"), SortOrder::Desc);
        assert_eq!(first, second);
        assert_eq!(albums, before);
    }

    #[test]
    fn test_extract_categories_sorted_distinct() {
        let albums = vec![
            album("1", "a", "A, B", None),
            album("2", "b", "B, C", None),
            album("3", "c", "", None),
        ];
        assert_eq!(extract_categories(&albums), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_extract_categories_strips_quotes() {
        let albums = vec![
            album("1", "a", "\"國內旅遊, 爬山\"", None),
            album("2", "b", "單車,國內旅遊", None),
        ];
        assert_eq!(extract_categories(&albums), vec!["單車", "國內旅遊", "爬山"]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("up".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
