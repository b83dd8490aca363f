use crate::classifier::ClassifiedSections;
use crate::model::{Page, Section};
use crate::records::{
    ENERGY_COSTS, HISTORICAL_CONSUMPTION, PAYMENT_HISTORY, ParsedRow, TableSchema, parse_rows,
    rows_from_lines, schema_for,
};
use crate::table_detect::BillTables;
use crate::warning::ExtractWarning;

/// Section contents ready for CSV emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillReport {
    pub general_info: Vec<String>,
    pub energy_costs: Vec<ParsedRow>,
    pub historical_consumption: Vec<ParsedRow>,
    pub payment_history: Vec<ParsedRow>,
}

impl BillReport {
    /// Parses classified buckets into schema rows. Historical rows come from
    /// the historical table when one was found, otherwise from the bucket.
    pub fn build(
        sections: &ClassifiedSections,
        tables: &BillTables,
        warnings: &mut Vec<ExtractWarning>,
    ) -> Self {
        let bucket_rows = |schema: &TableSchema, warnings: &mut Vec<ExtractWarning>| {
            parse_rows(
                schema,
                rows_from_lines(sections.lines(schema.section)),
                warnings,
            )
        };

        let historical_consumption = match &tables.historical {
            Some(rows) => parse_rows(&HISTORICAL_CONSUMPTION, rows.iter().cloned(), warnings),
            None => bucket_rows(&HISTORICAL_CONSUMPTION, warnings),
        };

        Self {
            general_info: sections.lines(Section::GeneralInfo).to_vec(),
            energy_costs: bucket_rows(&ENERGY_COSTS, warnings),
            historical_consumption,
            payment_history: bucket_rows(&PAYMENT_HISTORY, warnings),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.general_info.is_empty()
            && self.energy_costs.is_empty()
            && self.historical_consumption.is_empty()
            && self.payment_history.is_empty()
    }

    #[must_use]
    pub fn data_row_count(&self) -> usize {
        self.general_info.len()
            + self.energy_costs.len()
            + self.historical_consumption.len()
            + self.payment_history.len()
    }

    fn parsed_rows(&self, section: Section) -> &[ParsedRow] {
        match section {
            Section::EnergyCosts => self.energy_costs.as_slice(),
            Section::HistoricalConsumption => self.historical_consumption.as_slice(),
            Section::PaymentHistory => self.payment_history.as_slice(),
            Section::GeneralInfo | Section::Unclassified => &[],
        }
    }

    /// CSV records in fixed section order. Column headers are only written for
    /// sections that have rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.data_row_count() + 8);
        for section in Section::REPORTED {
            out.push(vec![section.label().to_string(), String::new()]);

            if section == Section::GeneralInfo {
                out.extend(self.general_info.iter().map(|line| vec![line.clone()]));
                continue;
            }

            let rows = self.parsed_rows(section);
            if let Some(schema) = schema_for(section)
                && !rows.is_empty()
            {
                out.push(schema.headers.iter().map(|header| (*header).to_string()).collect());
                out.extend(rows.iter().map(|row| row.cells.clone()));
            }
        }
        out
    }
}

/// One record per page holding that page's lines.
#[must_use]
pub fn raw_page_rows(pages: &[Page]) -> Vec<Vec<String>> {
    pages.iter().map(|page| page.lines.clone()).collect()
}
