use crate::model::{Amount, ConsumptionSummary};
use crate::table_detect::BillTables;
use crate::table_parse::parse_integer;
use crate::warning::{ExtractWarning, WarningCode};

pub(crate) const ENERGY_USED_MARKER: &str = "Energy Used (kWh)";

/// Last cell of the first overview row mentioning the energy-used marker.
#[must_use]
pub fn current_energy_used(overview: &[Vec<String>]) -> Option<i64> {
    let row = overview
        .iter()
        .find(|row| row.iter().any(|cell| cell.contains(ENERGY_USED_MARKER)))?;
    let value = row.last().and_then(|cell| parse_integer(cell));
    if value.is_none() {
        tracing::debug!(row = ?row, "energy used row has no integer in its last cell");
    }
    value
}

/// Second-column values of the first `window` rows. The window is cut before
/// unparseable rows are skipped, so a bad row still uses up a slot.
#[must_use]
pub fn recent_consumption(historical: &[Vec<String>], window: usize) -> Vec<i64> {
    historical
        .iter()
        .take(window)
        .filter_map(|row| row.get(1).and_then(|cell| parse_integer(cell)))
        .collect()
}

/// Arithmetic mean rounded half-up (away from zero) to two decimal places.
#[must_use]
pub fn mean_rounded(values: &[i64]) -> Option<Amount> {
    if values.is_empty() {
        return None;
    }

    let count = i128::try_from(values.len()).ok()?;
    let sum = values.iter().copied().map(i128::from).sum::<i128>();
    let scaled = sum.checked_mul(100)?;
    let rounded = (scaled.abs() * 2 + count) / (count * 2);
    let hundredths = i64::try_from(if scaled < 0 { -rounded } else { rounded }).ok()?;
    Some(Amount::from_hundredths(hundredths))
}

#[must_use]
pub fn summarize_values(current: Option<i64>, recent: Vec<i64>) -> Option<ConsumptionSummary> {
    let samples = current.into_iter().chain(recent.iter().copied()).collect::<Vec<_>>();
    let average = mean_rounded(&samples)?;
    Some(ConsumptionSummary {
        current_energy_used: current,
        sample_count: samples.len(),
        recent_values: recent,
        average,
    })
}

pub fn summarize(
    tables: &BillTables,
    window: usize,
    warnings: &mut Vec<ExtractWarning>,
) -> Option<ConsumptionSummary> {
    let current = tables.overview.as_deref().and_then(current_energy_used);
    let recent = tables
        .historical
        .as_deref()
        .map(|rows| recent_consumption(rows, window))
        .unwrap_or_default();

    let summary = summarize_values(current, recent);
    if summary.is_none() {
        warnings.push(ExtractWarning::new(
            WarningCode::AggregationSkipped,
            "no current or historical consumption values; summary skipped",
        ));
    }
    summary
}
