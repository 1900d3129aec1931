use anyhow::{Context, Result};
use crate::core::RawFlashRecord;

/// Parse the JSON array served by the data endpoint.
///
/// Every value may be a string (as produced by a CSV-to-JSON export) or a number.
pub fn parse_json(data: &[u8]) -> Result<Vec<RawFlashRecord>> {
    serde_json::from_slice(data).context("Failed to parse flash records JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;

    #[test]
    fn test_parse_json_records() {
        let json = r#"[
            {"flash_latitude": "2.8195734", "flash_longitude": "34.484116",
             "flash_start_time": "2018-03-04 09:24:30.274144", "flash_observe_time": "93"},
            {"flash_latitude": -1.5, "flash_longitude": 20.25,
             "flash_start_time": "2018-03-04 09:25:24", "flash_observe_time": -0.5}
        ]"#;
        let records = parse_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].flash_observe_time, FieldValue::Text("93".to_string()));
        assert_eq!(records[1].flash_observe_time, FieldValue::Number(-0.5));
    }

    #[test]
    fn test_parse_json_rejects_missing_field() {
        let json = r#"[{"flash_latitude": 1, "flash_longitude": 2, "flash_start_time": "x"}]"#;
        assert!(parse_json(json.as_bytes()).is_err());
    }
}
