use std::str::FromStr;

use crate::error::ExtractError;

/// Default number of historical rows considered by the aggregator.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Classified sections in fixed order.
    #[default]
    Sections,
    /// One row per page holding that page's lines.
    RawPages,
}

/// 1-based set of PDF pages to read, parsed from `1-3,5`. Held as sorted,
/// non-overlapping inclusive ranges so wide ranges cost nothing to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    ranges: Vec<(u32, u32)>,
}

impl PageSelection {
    fn from_ranges(mut ranges: Vec<(u32, u32)>) -> Self {
        ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Self { ranges: merged }
    }

    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.ranges
            .binary_search_by(|&(start, end)| {
                if end < page {
                    std::cmp::Ordering::Less
                } else if start > page {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Number of selected pages.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(start, end)| u64::from(end - start) + 1)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

fn parse_page_number(raw: &str, what: &str) -> Result<u32, String> {
    let page = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid {what}: '{}'", raw.trim()))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = ExtractError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_selection(raw).map_err(ExtractError::InvalidPageSelection)
    }
}

fn parse_selection(raw: &str) -> Result<PageSelection, String> {
    let mut ranges = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_number(start, "page range start")?;
                let end = parse_page_number(end, "page range end")?;
                if end < start {
                    return Err(format!("invalid range '{token}': end is before start"));
                }
                ranges.push((start, end));
            }
            None => {
                let page = parse_page_number(token, "page number")?;
                ranges.push((page, page));
            }
        }
    }

    if ranges.is_empty() {
        return Err("page selection cannot be empty".to_string());
    }

    Ok(PageSelection::from_ranges(ranges))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub mode: ReportMode,
    pub history_window: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            mode: ReportMode::Sections,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtractOptions, PageSelection, ReportMode};
    use std::str::FromStr;

    #[test]
    fn parse_page_selection_range_and_single() {
        let selection = PageSelection::from_str("1-3,5").expect("selection should parse");
        assert_eq!(selection.len(), 4);
        assert!(selection.contains(2));
        assert!(selection.contains(5));
        assert!(!selection.contains(4));
    }

    #[test]
    fn wide_ranges_are_stored_as_bounds() {
        let selection = PageSelection::from_str("1-4294967295").expect("selection should parse");
        assert_eq!(selection.len(), u64::from(u32::MAX));
        assert!(selection.contains(1));
        assert!(selection.contains(u32::MAX));
        assert!(!selection.contains(0));
    }

    #[test]
    fn overlapping_and_adjacent_ranges_merge() {
        let selection = PageSelection::from_str("5-8,1-3,4,7-10,20").expect("selection should parse");
        assert_eq!(selection.len(), 11);
        assert!(selection.contains(4));
        assert!(selection.contains(10));
        assert!(!selection.contains(11));
        assert!(selection.contains(20));
        assert!(!selection.contains(19));
    }

    #[test]
    fn reject_reversed_and_zero_pages() {
        let err = PageSelection::from_str("3-1").expect_err("reversed range should fail");
        assert!(err.to_string().contains("end is before start"));
        let err = PageSelection::from_str("0").expect_err("page zero should fail");
        assert!(err.to_string().contains("1-based"));
        assert!(PageSelection::from_str(" , ").is_err());
    }

    #[test]
    fn defaults_to_sections_with_five_row_window() {
        let options = ExtractOptions::default();
        assert_eq!(options.mode, ReportMode::Sections);
        assert_eq!(options.history_window, 5);
        assert!(options.pages.is_none());
    }
}
