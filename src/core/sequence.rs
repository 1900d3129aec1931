use std::ops::Range;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use crate::core::flash::{FlashEvent, RawFlashRecord};
use crate::core::time::StartTimeFormat;
use crate::error::FlashError;

/// What to do with a record whose fields do not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedPolicy {
    /// Drop the record and log a warning
    #[default]
    Skip,
    /// Fail the whole load on the first bad record
    Strict,
}

/// Options for [`normalize`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub time_format: StartTimeFormat,
    pub policy: MalformedPolicy,
}

/// Flash events ordered by start time.
///
/// Built once per data load and never mutated afterwards. Events with the
/// same timestamp keep the order the provider delivered them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSequence {
    events: Vec<FlashEvent>,
}

impl EventSequence {
    /// Sort `events` by start time (stable) and wrap them
    pub fn from_events(mut events: Vec<FlashEvent>) -> Self {
        events.sort_by_key(|e| e.timestamp_millis);
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlashEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlashEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[FlashEvent] {
        &self.events
    }

    /// The run of events sharing the timestamp of the event at `start`.
    ///
    /// Empty when `start` is out of bounds.
    pub fn run_at(&self, start: usize) -> Range<usize> {
        let Some(first) = self.events.get(start) else {
            return start..start;
        };
        let len = self.events[start..]
            .iter()
            .take_while(|e| e.timestamp_millis == first.timestamp_millis)
            .count();
        start..start + len
    }

    /// Number of distinct timestamps, i.e. ticks per playback loop
    pub fn group_count(&self) -> usize {
        let mut count = 0;
        let mut start = 0;
        while start < self.events.len() {
            start = self.run_at(start).end;
            count += 1;
        }
        count
    }

    /// First and last start time
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => Some((first.start_time(), last.start_time())),
            _ => None,
        }
    }

    /// `[start time, observe seconds]` pairs for the scatter chart
    pub fn chart_points(&self) -> Vec<[f64; 2]> {
        self.events
            .iter()
            .map(|e| [e.timestamp_millis as f64, e.observe_seconds])
            .collect()
    }
}

impl<'a> IntoIterator for &'a EventSequence {
    type Item = &'a FlashEvent;
    type IntoIter = std::slice::Iter<'a, FlashEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Parse raw provider records into an ordered [`EventSequence`]
pub fn normalize(records: &[RawFlashRecord], options: NormalizeOptions) -> Result<EventSequence, FlashError> {
    let mut events = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        match record.parse(index, options.time_format) {
            Ok(event) => events.push(event),
            Err(e) => match options.policy {
                MalformedPolicy::Strict => return Err(e),
                MalformedPolicy::Skip => {
                    warn!("Skipping malformed flash record: {}", e);
                    skipped += 1;
                }
            },
        }
    }

    let sequence = EventSequence::from_events(events);
    info!(
        "Normalized {} flash events ({} skipped, {} distinct timestamps)",
        sequence.len(),
        skipped,
        sequence.group_count()
    );
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flash::FieldValue;

    fn raw(start: &str, observe: &str, lon: f64) -> RawFlashRecord {
        RawFlashRecord {
            flash_longitude: FieldValue::Number(lon),
            flash_latitude: FieldValue::Number(0.0),
            flash_start_time: start.into(),
            flash_observe_time: observe.into(),
        }
    }

    #[test]
    fn test_normalize_sorts_stably() {
        let records = vec![
            raw("2019-03-04 00:00:02", "1", 1.0),
            raw("2019-03-04 00:00:01.900", "1", 2.0),
            raw("2019-03-04 00:00:01", "1", 3.0),
            raw("2019-03-04 00:00:02", "1", 4.0),
            raw("2019-03-04 00:00:00", "1", 5.0),
        ];
        let seq = normalize(&records, NormalizeOptions::default()).unwrap();

        let lons: Vec<f64> = seq.iter().map(|e| e.longitude).collect();
        // 00:00:01.900 truncates to 00:00:01 and stays ahead of the later record
        assert_eq!(lons, vec![5.0, 2.0, 3.0, 1.0, 4.0]);

        assert!(seq.as_slice().windows(2).all(|w| w[0].timestamp_millis <= w[1].timestamp_millis));
    }

    #[test]
    fn test_skip_policy_drops_bad_records() {
        let records = vec![
            raw("2019-03-04 00:00:01", "1", 1.0),
            raw("garbage", "1", 2.0),
            raw("2019-03-04 00:00:00", "oops", 3.0),
            raw("2019-03-04 00:00:00", "-4.5", 4.0),
        ];
        let seq = normalize(&records, NormalizeOptions::default()).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().longitude, 4.0);
        assert_eq!(seq.get(0).unwrap().observe_seconds, 4.5);
    }

    #[test]
    fn test_skip_policy_drops_out_of_range_tai93() {
        let tai93 = |start: f64, lon: f64| RawFlashRecord {
            flash_longitude: FieldValue::Number(lon),
            flash_latitude: FieldValue::Number(0.0),
            flash_start_time: FieldValue::Number(start),
            flash_observe_time: FieldValue::Number(1.0),
        };
        let records = vec![
            tai93(1e19, 1.0),
            tai93(-1e19, 2.0),
            RawFlashRecord {
                flash_start_time: "1e19".into(),
                ..tai93(0.0, 4.0)
            },
            tai93(825845071.2741437, 3.0),
        ];
        let options = NormalizeOptions {
            time_format: StartTimeFormat::Tai93,
            ..Default::default()
        };

        let seq = normalize(&records, options).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.get(0).unwrap().longitude, 3.0);

        let strict = NormalizeOptions {
            policy: MalformedPolicy::Strict,
            ..options
        };
        assert_eq!(normalize(&records, strict).unwrap_err().index(), 0);
    }

    #[test]
    fn test_strict_policy_fails_on_first_bad_record() {
        let records = vec![
            raw("2019-03-04 00:00:01", "1", 1.0),
            raw("garbage", "1", 2.0),
            raw("2019-03-04 00:00:00", "oops", 3.0),
        ];
        let options = NormalizeOptions {
            policy: MalformedPolicy::Strict,
            ..Default::default()
        };
        let err = normalize(&records, options).unwrap_err();
        assert_eq!(err.index(), 1);
    }

    #[test]
    fn test_runs_and_groups() {
        let seq = EventSequence::from_events(vec![
            FlashEvent::new(0.0, 0.0, 1.0, 100),
            FlashEvent::new(1.0, 0.0, 1.0, 100),
            FlashEvent::new(2.0, 0.0, 1.0, 200),
            FlashEvent::new(3.0, 0.0, 1.0, 300),
            FlashEvent::new(4.0, 0.0, 1.0, 300),
            FlashEvent::new(5.0, 0.0, 1.0, 300),
        ]);

        assert_eq!(seq.run_at(0), 0..2);
        assert_eq!(seq.run_at(1), 1..2);
        assert_eq!(seq.run_at(2), 2..3);
        assert_eq!(seq.run_at(3), 3..6);
        assert_eq!(seq.run_at(6), 6..6);
        assert_eq!(seq.group_count(), 3);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = normalize(&[], NormalizeOptions::default()).unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.group_count(), 0);
        assert!(seq.time_range().is_none());
        assert!(seq.chart_points().is_empty());
    }

    #[test]
    fn test_chart_points_and_range() {
        let seq = EventSequence::from_events(vec![
            FlashEvent::new(0.0, 0.0, -2.0, 2_000),
            FlashEvent::new(0.0, 0.0, 3.0, 1_000),
        ]);
        assert_eq!(seq.chart_points(), vec![[1_000.0, 3.0], [2_000.0, 2.0]]);

        let (start, end) = seq.time_range().unwrap();
        assert_eq!(start.timestamp_millis(), 1_000);
        assert_eq!(end.timestamp_millis(), 2_000);
    }
}
