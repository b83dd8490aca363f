use std::fmt::{Display, Formatter};

/// Decoded text of a single PDF page, before any line or table processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Rows of cells. Absent cells are carried as empty strings.
pub type Table = Vec<Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub page_number: u32,
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    GeneralInfo,
    EnergyCosts,
    HistoricalConsumption,
    PaymentHistory,
    Unclassified,
}

impl Section {
    /// Report order. `Unclassified` is never emitted.
    pub const REPORTED: [Section; 4] = [
        Section::GeneralInfo,
        Section::EnergyCosts,
        Section::HistoricalConsumption,
        Section::PaymentHistory,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralInfo => "General Information",
            Self::EnergyCosts => "Energy Costs",
            Self::HistoricalConsumption => "Historical Consumption",
            Self::PaymentHistory => "Payment History",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-point MXN amount held as integer hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Parses `1,234.56`, `$ 80`, `-12.5` and similar. Digits past the second
    /// decimal place round half-up.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw
            .chars()
            .filter(|ch| !matches!(ch, ',' | '$') && !ch.is_whitespace())
            .collect::<String>();
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|byte| byte.is_ascii_digit())
            || !fraction.bytes().all(|byte| byte.is_ascii_digit())
        {
            return None;
        }

        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().ok()?
        };
        let mut fraction_digits = fraction.bytes().map(|byte| i64::from(byte - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().is_some_and(|digit| digit >= 5);

        let mut value = whole_value
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths)?;
        if round_up {
            value = value.checked_add(1)?;
        }

        Some(Self(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionRecord {
    pub period: String,
    pub consumption_kwh: i64,
    pub amount_due_mxn: Option<Amount>,
    pub payment_made_mxn: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionSummary {
    pub current_energy_used: Option<i64>,
    pub recent_values: Vec<i64>,
    pub average: Amount,
    pub sample_count: usize,
}

impl ConsumptionSummary {
    /// One-line text handed to the clipboard.
    #[must_use]
    pub fn headline(&self, customer_name: &str) -> String {
        format!(
            "{customer_name} - Average consumption from the last {} = {}",
            self.sample_count, self.average
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub repository: String,
    pub branch: String,
    pub remote_path: String,
    pub existing_content_hash: Option<String>,
}
