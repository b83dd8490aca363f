mod aggregate;
mod classifier;
pub mod clipboard;
mod csv_out;
pub mod download;
mod error;
pub mod github;
mod model;
mod options;
mod pdf_reader;
pub mod pipeline;
mod records;
mod report;
mod table_detect;
mod table_parse;
mod warning;

use std::path::Path;

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::pdf_reader::{read_pdf_pages, read_pdf_pages_from_bytes};
use crate::warning::WarningCode;

pub use aggregate::{current_energy_used, mean_rounded, recent_consumption, summarize_values};
pub use classifier::{ClassifiedSections, ClassifierState, classify_lines, trigger_for};
pub use error::{ClipboardError, ExtractError, SyncError, TransportError};
pub use model::{
    Amount, ConsumptionRecord, ConsumptionSummary, Page, PageText, Section, Table, UploadTarget,
};
pub use options::{DEFAULT_HISTORY_WINDOW, ExtractOptions, PageSelection, ReportMode};
pub use records::{ParsedRow, TableSchema, consumption_records, schema_for};
pub use report::BillReport;
pub use table_detect::{BillTables, clean_table, find_table_with_marker, locate_tables, page_from_text};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

/// Everything derived from one bill, before it is written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillExtraction {
    pub sections: ClassifiedSections,
    pub tables: BillTables,
    pub report: BillReport,
    pub summary: Option<ConsumptionSummary>,
    pub warnings: Vec<ExtractWarning>,
}

impl BillExtraction {
    #[must_use]
    pub fn historical_records(&self) -> Vec<ConsumptionRecord> {
        consumption_records(&self.report.historical_consumption)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub page_count: usize,
    pub row_count: usize,
    pub summary: Option<ConsumptionSummary>,
    pub warnings: Vec<ExtractWarning>,
}

/// Classifies, parses and aggregates already-decoded pages.
#[must_use]
pub fn extract_bill(pages: &[Page], options: &ExtractOptions) -> BillExtraction {
    let mut warnings = Vec::new();

    let sections = classify_lines(
        pages
            .iter()
            .flat_map(|page| page.lines.iter().map(String::as_str)),
    );
    if sections.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoSectionsDetected,
            "no section trigger found; report will only contain section headers",
        ));
    }

    let tables = locate_tables(pages);
    let report = BillReport::build(&sections, &tables, &mut warnings);
    let summary = aggregate::summarize(&tables, options.history_window, &mut warnings);

    if let Some(summary) = &summary {
        tracing::info!(
            current = ?summary.current_energy_used,
            recent = ?summary.recent_values,
            average = %summary.average,
            samples = summary.sample_count,
            "consumption summary computed"
        );
    }

    BillExtraction {
        sections,
        tables,
        report,
        summary,
        warnings,
    }
}

fn report_rows(pages: &[Page], extraction: &BillExtraction, options: &ExtractOptions) -> Vec<Vec<String>> {
    match options.mode {
        ReportMode::Sections => extraction.report.to_rows(),
        ReportMode::RawPages => report::raw_page_rows(pages),
    }
}

fn convert_pages(
    page_texts: &[PageText],
    options: &ExtractOptions,
) -> (Vec<Vec<String>>, ConversionReport) {
    let pages = page_texts.iter().map(page_from_text).collect::<Vec<_>>();
    let extraction = extract_bill(&pages, options);
    let rows = report_rows(&pages, &extraction, options);

    for warning in &extraction.warnings {
        warning.log();
    }

    let report = ConversionReport {
        page_count: pages.len(),
        row_count: rows.len(),
        summary: extraction.summary,
        warnings: extraction.warnings,
    };
    (rows, report)
}

/// Reads `input_pdf` and writes the report CSV to `output_csv`, replacing it.
pub fn convert_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ConversionReport, ExtractError> {
    let page_texts = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let (rows, report) = convert_pages(&page_texts, options);
    write_csv(output_csv, &rows)?;
    tracing::info!(
        path = %output_csv.display(),
        rows = report.row_count,
        pages = report.page_count,
        "CSV written"
    );
    Ok(report)
}

pub fn convert_pdf_bytes_to_csv_string(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<(String, ConversionReport), ExtractError> {
    let page_texts = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    let (rows, report) = convert_pages(&page_texts, options);
    let csv = write_csv_to_string(&rows)?;
    Ok((csv, report))
}
