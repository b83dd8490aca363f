use std::path::Path;

use csv::WriterBuilder;

use crate::error::ExtractError;

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.flexible(true);
    builder
}

/// Writes `rows` to `path`, replacing any existing file.
pub(crate) fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<(), ExtractError> {
    let mut writer = writer_builder().from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv_to_string(rows: &[Vec<String>]) -> Result<String, ExtractError> {
    let mut writer = writer_builder().from_writer(Vec::<u8>::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOutput(format!("not valid UTF-8: {error}")))
}
