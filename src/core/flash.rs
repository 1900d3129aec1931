use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::core::time::{parse_start_text, tai93_to_utc, whole_second_millis, StartTimeFormat};
use crate::error::FlashError;

/// A field the data provider may send either as a JSON number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric value, if any. Text is trimmed and parsed; non-finite results are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(v) => *v,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Text form, for error messages
    pub fn display(&self) -> String {
        match self {
            FieldValue::Number(v) => v.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

/// One flash as handed over by the data provider, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFlashRecord {
    pub flash_longitude: FieldValue,
    pub flash_latitude: FieldValue,
    pub flash_start_time: FieldValue,
    pub flash_observe_time: FieldValue,
}

impl RawFlashRecord {
    /// Validate and convert into a [`FlashEvent`].
    ///
    /// `index` is the record's position in the provider's list and only
    /// appears in errors.
    pub fn parse(&self, index: usize, format: StartTimeFormat) -> Result<FlashEvent, FlashError> {
        let longitude = self.flash_longitude.as_f64()
            .ok_or(FlashError::InvalidCoordinate { index, field: "longitude" })?;
        let latitude = self.flash_latitude.as_f64()
            .ok_or(FlashError::InvalidCoordinate { index, field: "latitude" })?;

        let timestamp_millis = match (format, &self.flash_start_time) {
            (StartTimeFormat::Text, FieldValue::Text(s)) => parse_start_text(s),
            (StartTimeFormat::Text, FieldValue::Number(_)) => None,
            (StartTimeFormat::Tai93, field) => field.as_f64()
                .and_then(tai93_to_utc)
                .map(whole_second_millis),
        }
        .ok_or_else(|| FlashError::InvalidStartTime {
            index,
            value: self.flash_start_time.display(),
        })?;

        let observe = self.flash_observe_time.as_f64()
            .ok_or_else(|| FlashError::InvalidObserveTime {
                index,
                value: self.flash_observe_time.display(),
            })?;

        Ok(FlashEvent::new(longitude, latitude, observe, timestamp_millis))
    }
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
}

/// A single lightning flash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlashEvent {
    /// Longitude in degrees
    pub longitude: f64,

    /// Latitude in degrees
    pub latitude: f64,

    /// Observed duration in seconds, never negative. Drives the point glow.
    pub observe_seconds: f64,

    /// Flash start time, epoch milliseconds (UTC)
    pub timestamp_millis: i64,
}

impl FlashEvent {
    /// Create a new flash event. A negative observe duration is stored as its magnitude.
    pub fn new(longitude: f64, latitude: f64, observe_seconds: f64, timestamp_millis: i64) -> Self {
        Self {
            longitude,
            latitude,
            observe_seconds: observe_seconds.abs(),
            timestamp_millis,
        }
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition {
            longitude: self.longitude,
            latitude: self.latitude,
        }
    }

    /// Start time as a UTC instant
    pub fn start_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_millis).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lon: FieldValue, lat: FieldValue, start: FieldValue, observe: FieldValue) -> RawFlashRecord {
        RawFlashRecord {
            flash_longitude: lon,
            flash_latitude: lat,
            flash_start_time: start,
            flash_observe_time: observe,
        }
    }

    #[test]
    fn test_parse_text_record() {
        let raw = record("34.484116".into(), "2.8195734".into(), "2018-03-04 09:24:30.274144".into(), "-93".into());
        let event = raw.parse(0, StartTimeFormat::Text).unwrap();

        assert_eq!(event.timestamp_millis, 1_520_155_470_000);
        assert_eq!(event.observe_seconds, 93.0);
        assert!((event.longitude - 34.484116).abs() < 1e-9);
        assert!((event.latitude - 2.8195734).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tai93_record() {
        let raw = record(FieldValue::Number(10.0), FieldValue::Number(20.0), FieldValue::Number(825845071.2741437), FieldValue::Number(0.5));
        let event = raw.parse(3, StartTimeFormat::Tai93).unwrap();
        assert_eq!(event.timestamp_millis, 1_520_155_470_000);
        assert_eq!(event.observe_seconds, 0.5);
    }

    #[test]
    fn test_parse_errors_carry_index() {
        let bad_time = record(FieldValue::Number(1.0), FieldValue::Number(2.0), "yesterday".into(), "1".into());
        assert_eq!(
            bad_time.parse(7, StartTimeFormat::Text),
            Err(FlashError::InvalidStartTime { index: 7, value: "yesterday".to_string() })
        );

        let bad_observe = record(FieldValue::Number(1.0), FieldValue::Number(2.0), "2019-03-04 00:00:00".into(), "abc".into());
        let err = bad_observe.parse(2, StartTimeFormat::Text).unwrap_err();
        assert!(matches!(err, FlashError::InvalidObserveTime { index: 2, .. }));

        let bad_lat = record(FieldValue::Number(1.0), "NaN".into(), "2019-03-04 00:00:00".into(), "1".into());
        let err = bad_lat.parse(4, StartTimeFormat::Text).unwrap_err();
        assert_eq!(err, FlashError::InvalidCoordinate { index: 4, field: "latitude" });
        assert_eq!(err.index(), 4);
    }

    #[test]
    fn test_numeric_start_time_needs_tai93() {
        let raw = record(FieldValue::Number(1.0), FieldValue::Number(2.0), FieldValue::Number(825845071.0), "1".into());
        assert!(raw.parse(0, StartTimeFormat::Text).is_err());
    }

    #[test]
    fn test_deserialize_mixed_fields() {
        let json = r#"{"flash_longitude": "34.5", "flash_latitude": 2.8,
                       "flash_start_time": "2019-03-04 00:00:01", "flash_observe_time": 12}"#;
        let raw: RawFlashRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.flash_longitude, FieldValue::Text("34.5".to_string()));
        assert_eq!(raw.flash_observe_time, FieldValue::Number(12.0));
    }

    #[test]
    fn test_start_time() {
        let event = FlashEvent::new(0.0, 0.0, 1.0, 1_551_657_600_000);
        assert_eq!(event.start_time().to_rfc3339(), "2019-03-04T00:00:00+00:00");
    }
}
