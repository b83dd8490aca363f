/// Splits a layout-preserving line into cells. A tab or a run of two or more
/// spaces separates cells; single spaces stay inside a cell.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    fn flush(current: &mut String, cells: &mut Vec<String>) {
        if !current.trim().is_empty() {
            cells.push(current.trim().to_string());
        }
        current.clear();
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch == '\t' {
            flush(&mut current, &mut cells);
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                flush(&mut current, &mut cells);
            } else {
                current.push(' ');
            }
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }
    flush(&mut current, &mut cells);

    cells
}

/// Splits on every whitespace run.
pub(crate) fn split_whitespace_cells(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Pads a row with empty trailing cells up to `width`. Longer rows are kept.
pub(crate) fn pad_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}

pub(crate) fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Parses an integer after stripping thousands separators.
pub(crate) fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}
