use crate::format;
use crate::model::HistoryRecord;
use crate::palette::{ColorStrategy, HexColor};
use serde::Serialize;
use std::collections::HashMap;
use time::UtcOffset;

pub const NO_TITLE: &str = "N/A";
pub const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleCount {
    pub title: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreSlice {
    pub genre: String,
    pub count: u64,
    pub color: HexColor,
}

impl GenreSlice {
    pub fn share_percent(&self, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.count as f64 * 100.0 / total as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub search_count: usize,
    pub most_recent: Option<HistoryRecord>,
    pub last_searched_date: Option<String>,
    pub most_searched_title: String,
    pub genre_distribution: Vec<GenreSlice>,
}

impl StatsSummary {
    pub fn empty() -> Self {
        Self {
            search_count: 0,
            most_recent: None,
            last_searched_date: None,
            most_searched_title: NO_TITLE.to_string(),
            genre_distribution: Vec::new(),
        }
    }

    pub fn genre_total(&self) -> u64 {
        self.genre_distribution.iter().map(|slice| slice.count).sum()
    }
}

/// Counts each distinct key, keeping the order in which keys were first seen.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(&'a str, u64)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, u64)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&slot) => counts[slot].1 = counts[slot].1.saturating_add(1),
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// Exact, case-sensitive title counts in first-seen order.
pub fn count_by_title(records: &[HistoryRecord]) -> Vec<TitleCount> {
    tally(records.iter().map(|record| record.title.as_str()))
        .into_iter()
        .map(|(title, count)| TitleCount {
            title: title.to_string(),
            count,
        })
        .collect()
}

/// Ties go to the title seen first in `records`, so for tied counts the
/// result depends on the order the store returned the rows in.
pub fn most_searched_title(records: &[HistoryRecord]) -> String {
    let mut best: Option<TitleCount> = None;
    for candidate in count_by_title(records) {
        if best
            .as_ref()
            .is_none_or(|current| candidate.count > current.count)
        {
            best = Some(candidate);
        }
    }
    best.map(|entry| entry.title)
        .unwrap_or_else(|| NO_TITLE.to_string())
}

pub fn genre_distribution(
    records: &[HistoryRecord],
    colors: &mut dyn ColorStrategy,
) -> Vec<GenreSlice> {
    tally(records.iter().map(HistoryRecord::genre_label))
        .into_iter()
        .map(|(genre, count)| GenreSlice {
            genre: genre.to_string(),
            count,
            color: colors.color_for(genre),
        })
        .collect()
}

/// Record with the latest `created_at`; the first one wins on equal timestamps.
pub fn most_recent(records: &[HistoryRecord]) -> Option<&HistoryRecord> {
    let mut best: Option<&HistoryRecord> = None;
    for record in records {
        if best.is_none_or(|current| record.created_at > current.created_at) {
            best = Some(record);
        }
    }
    best
}

pub fn summarize(
    records: &[HistoryRecord],
    colors: &mut dyn ColorStrategy,
    offset: UtcOffset,
) -> StatsSummary {
    let Some(latest) = most_recent(records) else {
        return StatsSummary::empty();
    };

    StatsSummary {
        search_count: records.len(),
        last_searched_date: Some(format::short_date(latest.created_at, offset)),
        most_recent: Some(latest.clone()),
        most_searched_title: most_searched_title(records),
        genre_distribution: genre_distribution(records, colors),
    }
}
