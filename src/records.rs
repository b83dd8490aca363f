use crate::model::{Amount, ConsumptionRecord, Section};
use crate::table_parse::{is_blank_row, pad_row, parse_integer, split_whitespace_cells};
use crate::warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Integer,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumericField {
    index: usize,
    kind: FieldKind,
    required: bool,
}

impl NumericField {
    fn accepts(self, cell: &str) -> bool {
        if cell.trim().is_empty() {
            return !self.required;
        }
        match self.kind {
            FieldKind::Integer => parse_integer(cell).is_some(),
            FieldKind::Amount => Amount::parse(cell).is_some(),
        }
    }
}

/// Positional column layout of a tabular section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub section: Section,
    pub headers: &'static [&'static str],
    numeric: &'static [NumericField],
}

impl TableSchema {
    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

pub const ENERGY_COSTS: TableSchema = TableSchema {
    section: Section::EnergyCosts,
    headers: &["Concept", "EnergyCostMXN"],
    numeric: &[NumericField {
        index: 1,
        kind: FieldKind::Amount,
        required: false,
    }],
};

pub const HISTORICAL_CONSUMPTION: TableSchema = TableSchema {
    section: Section::HistoricalConsumption,
    headers: &["Period", "ConsumptionKWh", "AmountDueMXN", "PaymentMadeMXN"],
    numeric: &[
        NumericField {
            index: 1,
            kind: FieldKind::Integer,
            required: true,
        },
        NumericField {
            index: 2,
            kind: FieldKind::Amount,
            required: false,
        },
        NumericField {
            index: 3,
            kind: FieldKind::Amount,
            required: false,
        },
    ],
};

pub const PAYMENT_HISTORY: TableSchema = TableSchema {
    section: Section::PaymentHistory,
    headers: &["Period", "AmountDueMXN", "PaymentMadeMXN"],
    numeric: &[
        NumericField {
            index: 1,
            kind: FieldKind::Amount,
            required: false,
        },
        NumericField {
            index: 2,
            kind: FieldKind::Amount,
            required: false,
        },
    ],
};

#[must_use]
pub fn schema_for(section: Section) -> Option<&'static TableSchema> {
    match section {
        Section::EnergyCosts => Some(&ENERGY_COSTS),
        Section::HistoricalConsumption => Some(&HISTORICAL_CONSUMPTION),
        Section::PaymentHistory => Some(&PAYMENT_HISTORY),
        Section::GeneralInfo | Section::Unclassified => None,
    }
}

/// A row mapped onto a schema. Rows that fail numeric parsing keep their cells
/// for the report but are left out of any aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub cells: Vec<String>,
    pub numeric_ok: bool,
}

/// Splits bucket lines on whitespace runs, skipping blank lines.
#[must_use]
pub fn rows_from_lines(lines: &[String]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|line| split_whitespace_cells(line))
        .filter(|cells| !cells.is_empty())
        .collect()
}

pub fn parse_rows<I>(
    schema: &TableSchema,
    rows: I,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<ParsedRow>
where
    I: IntoIterator<Item = Vec<String>>,
{
    rows.into_iter()
        .filter(|row| !is_blank_row(row))
        .enumerate()
        .map(|(index, row)| {
            let cells = pad_row(row, schema.width());
            let failed = schema
                .numeric
                .iter()
                .filter(|field| !field.accepts(&cells[field.index]))
                .map(|field| schema.headers[field.index])
                .collect::<Vec<_>>();

            if !failed.is_empty() {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::RowParseFailed,
                        format!(
                            "row kept verbatim; could not parse {}: {:?}",
                            failed.join(", "),
                            cells
                        ),
                    )
                    .with_section(schema.section)
                    .with_row(index + 1),
                );
            }

            ParsedRow {
                cells,
                numeric_ok: failed.is_empty(),
            }
        })
        .collect()
}

impl ConsumptionRecord {
    /// Builds a record from a historical row laid out as
    /// `[Period, ConsumptionKWh, AmountDueMXN, PaymentMadeMXN]`.
    #[must_use]
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let amount = |index: usize| cells.get(index).and_then(|cell| Amount::parse(cell));
        Some(Self {
            period: cells.first()?.clone(),
            consumption_kwh: parse_integer(cells.get(1)?)?,
            amount_due_mxn: amount(2),
            payment_made_mxn: amount(3),
        })
    }
}

#[must_use]
pub fn consumption_records(rows: &[ParsedRow]) -> Vec<ConsumptionRecord> {
    rows.iter()
        .filter(|row| row.numeric_ok)
        .filter_map(|row| ConsumptionRecord::from_cells(&row.cells))
        .collect()
}
