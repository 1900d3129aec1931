use anyhow::{Context, Result};
use tracing::debug;
use crate::core::{FieldValue, RawFlashRecord};

/// Parse flash records from CSV text.
///
/// Columns are located by header name, so order does not matter:
/// - latitude: flash_latitude, latitude, lat
/// - longitude: flash_longitude, longitude, lon, lng
/// - start time: flash_start_time, start_time, time, timestamp
/// - observe time: flash_observe_time, observe_time, observe, duration
///
/// Values are kept as text; validation happens in [`crate::core::normalize`].
pub fn parse_csv(data: &[u8]) -> Result<Vec<RawFlashRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = rdr.headers().context("Failed to read CSV header")?;
    let columns = detect_columns(headers)?;

    let mut records = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", row + 1))?;
        let field = |idx: usize| FieldValue::Text(record.get(idx).unwrap_or("").to_string());

        records.push(RawFlashRecord {
            flash_longitude: field(columns.longitude),
            flash_latitude: field(columns.latitude),
            flash_start_time: field(columns.start_time),
            flash_observe_time: field(columns.observe_time),
        });
    }

    debug!("CSV parsed: {} records", records.len());
    Ok(records)
}

struct Columns {
    latitude: usize,
    longitude: usize,
    start_time: usize,
    observe_time: usize,
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<Columns> {
    Ok(Columns {
        latitude: find_column(headers, &["flash_latitude", "latitude", "lat"])?,
        longitude: find_column(headers, &["flash_longitude", "longitude", "lon", "lng"])?,
        start_time: find_column(headers, &["flash_start_time", "start_time", "time", "timestamp"])?,
        observe_time: find_column(headers, &["flash_observe_time", "observe_time", "observe", "duration"])?,
    })
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}
