use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::Document;
use lopdf::Object;
use lopdf::content::Content;

use crate::classifier::TRIGGERS;
use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_detect::{HISTORY_MARKER, OVERVIEW_MARKER};
use crate::table_parse::split_line_into_cells;

const LOW_SCORE_THRESHOLD: i64 = 80;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(rest);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if encoding.is_some_and(|name| {
        let lower = name.to_ascii_lowercase();
        lower.contains("identity-h") || lower.contains("ucs2") || lower.contains("utf16")
    }) {
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Bill fonts without an explicit encoding are Latin text; 1252 covers
        // the accented capitals used in section titles.
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

fn mentions_known_marker(line: &str) -> bool {
    TRIGGERS.iter().any(|(trigger, _)| line.contains(trigger))
        || line.contains(OVERVIEW_MARKER)
        || line.contains(HISTORY_MARKER)
}

fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    let mut marker_lines = 0_i64;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        non_empty_lines += 1;
        if split_line_into_cells(line).len() >= 2 {
            multi_cell_lines += 1;
        }
        if mentions_known_marker(line) {
            marker_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    marker_lines * 100 + multi_cell_lines * 50 + non_empty_lines - broken_penalty
}

fn choose_best_text(candidates: &[String]) -> String {
    candidates
        .iter()
        .max_by_key(|text| extraction_quality_score(text))
        .cloned()
        .unwrap_or_default()
}

fn extract_text_from_page_content(document: &Document, page_id: lopdf::ObjectId) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&decode_pdf_bytes(encoding, bytes));
                }
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                }
                // Large negative kerning in TJ arrays is a visual word gap.
                Object::Integer(value) if *value < -100 => text.push(' '),
                Object::Real(value) if *value < -100.0 => text.push(' '),
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current_encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|font_name| encodings.get(font_name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn read_document_pages(
    document: &Document,
    extracted_text: Option<String>,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ExtractError> {
    let pages_map = document.get_pages();

    let (extracted_pages, extracted_whole) = match extracted_text {
        Some(text) => {
            let pages = split_text_into_pages(&text);
            if pages.len() == pages_map.len() {
                (Some(pages), None)
            } else {
                (None, Some(text))
            }
        }
        None => (None, None),
    };

    let mut pages = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        if page_selection.is_some_and(|selection| !selection.contains(*page_no)) {
            continue;
        }

        let mut candidates = Vec::new();
        if let Some(text) = extracted_pages
            .as_ref()
            .and_then(|all| all.get(index).cloned())
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        if let Some(text) = extract_text_from_page_content(document, *page_id) {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        let local_best_score = candidates
            .iter()
            .map(|text| extraction_quality_score(text))
            .max()
            .unwrap_or(i64::MIN / 4);
        if index == 0
            && local_best_score < LOW_SCORE_THRESHOLD
            && let Some(text) = extracted_whole
                .as_ref()
                .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }

        let text = choose_best_text(&candidates);
        tracing::debug!(
            page = *page_no,
            candidates = candidates.len(),
            chars = text.len(),
            "selected page text"
        );

        pages.push(PageText {
            page_number: *page_no,
            text,
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(pages)
}

pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ExtractError> {
    let document = Document::load(input_pdf)?;
    let extracted = pdf_extract::extract_text(input_pdf)
        .inspect_err(|error| tracing::debug!(%error, "pdf-extract could not read document"))
        .ok();
    read_document_pages(&document, extracted, page_selection)
}

pub(crate) fn read_pdf_pages_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    let extracted = pdf_extract::extract_text_from_mem(input_pdf)
        .inspect_err(|error| tracing::debug!(%error, "pdf-extract could not read document"))
        .ok();
    read_document_pages(&document, extracted, page_selection)
}
