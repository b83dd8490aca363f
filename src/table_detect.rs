use crate::model::{Page, PageText, Table};
use crate::table_parse::{is_blank_row, split_line_into_cells};

pub(crate) const OVERVIEW_MARKER: &str = "Current Reading";
pub(crate) const HISTORY_MARKER: &str = "Period";

const MIN_TABLE_COLS: usize = 2;
const MIN_TABLE_ROWS: usize = 2;

/// Tables the aggregator reads from, located across all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillTables {
    pub overview: Option<Table>,
    /// Historical rows with the header row already removed.
    pub historical: Option<Table>,
}

fn detect_tables_in_text(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current_rows: Table = Vec::new();

    let flush_current = |rows: &mut Table, tables: &mut Vec<Table>| {
        if rows.len() >= MIN_TABLE_ROWS {
            tables.push(std::mem::take(rows));
        } else {
            rows.clear();
        }
    };

    for line in text.lines() {
        let cells = split_line_into_cells(line);
        if cells.len() >= MIN_TABLE_COLS {
            current_rows.push(cells);
        } else {
            flush_current(&mut current_rows, &mut tables);
        }
    }

    flush_current(&mut current_rows, &mut tables);
    tables
}

/// Builds a [`Page`] from decoded page text: lines verbatim, plus every run of
/// column-aligned lines as a table.
#[must_use]
pub fn page_from_text(page: &PageText) -> Page {
    Page {
        page_number: page.page_number,
        lines: page.text.lines().map(str::to_string).collect(),
        tables: detect_tables_in_text(&page.text),
    }
}

/// Drops rows whose cells are all empty or whitespace-only.
#[must_use]
pub fn clean_table(table: &[Vec<String>]) -> Table {
    table
        .iter()
        .filter(|row| !is_blank_row(row))
        .cloned()
        .collect()
}

fn table_mentions(table: &[Vec<String>], marker: &str) -> bool {
    table.iter().flatten().any(|cell| cell.contains(marker))
}

/// First cleaned table, in page order, whose contents mention `marker`.
#[must_use]
pub fn find_table_with_marker(pages: &[Page], marker: &str) -> Option<Table> {
    pages
        .iter()
        .flat_map(|page| page.tables.iter())
        .map(|table| clean_table(table))
        .find(|table| table_mentions(table, marker))
}

#[must_use]
pub fn locate_tables(pages: &[Page]) -> BillTables {
    let overview = find_table_with_marker(pages, OVERVIEW_MARKER);
    let historical = find_table_with_marker(pages, HISTORY_MARKER)
        .map(|table| table.into_iter().skip(1).collect::<Table>());

    if overview.is_none() {
        tracing::debug!(marker = OVERVIEW_MARKER, "consumption overview table not found");
    }
    if historical.is_none() {
        tracing::debug!(marker = HISTORY_MARKER, "historical consumption table not found");
    }

    BillTables {
        overview,
        historical,
    }
}
