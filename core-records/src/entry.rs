//! Generic transport representation of one measurement.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{RecordType, RecordUnit, RecordValue};

/// One measurement as it crosses the bridge.
///
/// Serializes to `{value, startTime, endTime, unit, recordType}` with the
/// unit and record type encoded as their protocol ordinals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    pub value: RecordValue,
    pub start_time: DateTime<Utc>,
    /// Equal to `start_time` for instant records
    pub end_time: DateTime<Utc>,
    pub unit: RecordUnit,
    pub record_type: RecordType,
}

impl RecordEntry {
    /// Duration covered by the entry, zero for instant records.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_serializes_camel_case_with_ordinals() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let entry = RecordEntry {
            value: RecordValue::Integer(1200),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            unit: RecordUnit::Count,
            record_type: RecordType::Steps,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["value"], 1200);
        assert_eq!(json["unit"], 2);
        assert_eq!(json["recordType"], 9);
        assert_eq!(json["startTime"], "2024-03-01T08:00:00Z");
        assert_eq!(json["endTime"], "2024-03-01T08:30:00Z");
        assert_eq!(entry.duration().num_minutes(), 30);
    }

    #[test]
    fn test_pressure_entry_serializes_as_string() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let entry = RecordEntry {
            value: RecordValue::Pressure {
                systolic: 120.0,
                diastolic: 80.0,
            },
            start_time: start,
            end_time: start,
            unit: RecordUnit::MillimeterOfMercury,
            record_type: RecordType::BloodPressure,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["value"], "120/80");
        assert_eq!(entry.duration(), chrono::Duration::zero());
    }
}
