use crate::model::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    RowParseFailed,
    AggregationSkipped,
    ClipboardUnavailable,
    NoSectionsDetected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    pub section: Option<Section>,
    pub row: Option<usize>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            section: None,
            row: None,
        }
    }

    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Emits the warning through `tracing` with its context fields attached.
    pub fn log(&self) {
        tracing::warn!(
            code = ?self.code,
            section = ?self.section,
            row = ?self.row,
            "{}",
            self.message
        );
    }
}
