//! The JSON report export.

use std::io::Write;

use crate::Error;

use super::FinancialReport;

/// Render a report as pretty-printed JSON with camelCase keys.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the report cannot be
/// serialized.
pub fn json_string(report: &FinancialReport) -> Result<String, Error> {
    serde_json::to_string_pretty(report)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Write a report as JSON.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the report cannot be
/// serialized and [Error::IoError] if it cannot be written.
pub fn write_json<W: Write>(report: &FinancialReport, mut writer: W) -> Result<(), Error> {
    let json = json_string(report)?;

    writer
        .write_all(json.as_bytes())
        .map_err(|error| Error::IoError(error.to_string()))
}
