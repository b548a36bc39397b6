//! Record Marshaler
//!
//! Converts between platform records and [`RecordEntry`] values using the
//! descriptor table. Writes are parsed and validated completely before a
//! platform record is constructed, so a failed call never yields a partial
//! record.

use bridge_traits::records::PlatformRecord;
use chrono::{DateTime, Utc};

use crate::entry::RecordEntry;
use crate::error::{RecordError, Result};
use crate::registry::{descriptor, DecodeFailure, DIASTOLIC_RANGE, SYSTOLIC_RANGE};
use crate::types::{RecordType, RecordValue, Temporality, ValueRange, ValueShape};

/// Parse a raw transport string into the value shape of `record_type`.
///
/// # Errors
///
/// Returns [`RecordError::ValueParse`] when the string does not match the
/// shape or the parsed value falls outside the kind's valid range.
pub fn parse_value(record_type: RecordType, raw: &str) -> Result<RecordValue> {
    let descriptor = descriptor(record_type);
    let trimmed = raw.trim();
    let fail = |reason: String| RecordError::ValueParse {
        record_type,
        raw: raw.to_string(),
        reason,
    };

    match descriptor.shape {
        ValueShape::Decimal => {
            let value = parse_finite(trimmed).map_err(&fail)?;
            check_range(value, descriptor.range).map_err(&fail)?;
            Ok(RecordValue::Number(value))
        }
        ValueShape::Integer => {
            let value = parse_integer(trimmed).map_err(&fail)?;
            check_range(value as f64, descriptor.range).map_err(&fail)?;
            Ok(RecordValue::Integer(value))
        }
        ValueShape::Text => {
            if trimmed.is_empty() {
                return Err(fail("value is empty".to_string()));
            }
            Ok(RecordValue::Text(trimmed.to_string()))
        }
        ValueShape::Pressure => {
            let (systolic, diastolic) = trimmed
                .split_once('/')
                .ok_or_else(|| fail("expected <systolic>/<diastolic>".to_string()))?;
            let systolic = parse_finite(systolic.trim()).map_err(&fail)?;
            let diastolic = parse_finite(diastolic.trim()).map_err(&fail)?;
            check_range(systolic, Some(SYSTOLIC_RANGE))
                .map_err(|reason| fail(format!("systolic {}", reason)))?;
            check_range(diastolic, Some(DIASTOLIC_RANGE))
                .map_err(|reason| fail(format!("diastolic {}", reason)))?;
            if systolic <= diastolic {
                return Err(fail("systolic must exceed diastolic".to_string()));
            }
            Ok(RecordValue::Pressure {
                systolic,
                diastolic,
            })
        }
    }
}

/// Check a write's time bounds against the temporality of `record_type` and
/// return the effective `(start, end)` pair.
///
/// Instant records take `start` as the sample time when `end` is absent.
/// Interval records need an `end` strictly after `start`.
pub fn validate_time_range(
    record_type: RecordType,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let fail = |reason: &str| RecordError::InvalidTimeRange {
        record_type,
        reason: reason.to_string(),
    };

    match (descriptor(record_type).temporality, end) {
        (Temporality::Instant, None) => Ok((start, start)),
        (Temporality::Instant, Some(end)) if end == start => Ok((start, end)),
        (Temporality::Instant, Some(_)) => {
            Err(fail("instant records need end time equal to start time"))
        }
        (Temporality::Interval, None) => Err(fail("end time is required")),
        (Temporality::Interval, Some(end)) if end > start => Ok((start, end)),
        (Temporality::Interval, Some(_)) => Err(fail("end time must be after start time")),
    }
}

/// Build a platform record from a raw transport value.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use core_records::{to_platform_record, RecordType};
///
/// let now = Utc::now();
/// let record = to_platform_record(RecordType::Weight, "72.5", now, None).unwrap();
/// assert_eq!(record.start_time(), now);
///
/// assert!(to_platform_record(RecordType::Weight, "not-a-number", now, None).is_err());
/// ```
pub fn to_platform_record(
    record_type: RecordType,
    raw_value: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<PlatformRecord> {
    let value = parse_value(record_type, raw_value)?;
    let (start, end) = validate_time_range(record_type, start, end)?;

    (descriptor(record_type).encode)(&value, start, end).ok_or_else(|| {
        RecordError::MalformedRecord {
            record_type,
            reason: format!("value {} does not fit the record shape", value),
        }
    })
}

/// Convert one platform record into a [`RecordEntry`] of `record_type`.
pub fn to_record_entry(record_type: RecordType, record: &PlatformRecord) -> Result<RecordEntry> {
    let descriptor = descriptor(record_type);
    if record.kind() != descriptor.platform_kind {
        return Err(RecordError::RecordKindMismatch {
            expected: descriptor.platform_kind,
            found: record.kind(),
        });
    }

    let value = (descriptor.decode)(record).map_err(|failure| match failure {
        DecodeFailure::KindMismatch => RecordError::RecordKindMismatch {
            expected: descriptor.platform_kind,
            found: record.kind(),
        },
        DecodeFailure::Malformed(reason) => RecordError::MalformedRecord {
            record_type,
            reason: reason.to_string(),
        },
    })?;

    Ok(RecordEntry {
        value,
        start_time: record.start_time(),
        end_time: record.end_time(),
        unit: descriptor.unit,
        record_type,
    })
}

/// Convert a batch of platform records, failing on the first bad record.
pub fn to_record_entries(
    record_type: RecordType,
    records: &[PlatformRecord],
) -> Result<Vec<RecordEntry>> {
    records
        .iter()
        .map(|record| to_record_entry(record_type, record))
        .collect()
}

fn parse_finite(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| "not a decimal number".to_string())?;
    if !value.is_finite() {
        return Err("value must be finite".to_string());
    }
    Ok(value)
}

/// Accepts plain integers and integral decimals such as `"72.0"`.
fn parse_integer(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    let value = parse_finite(raw).map_err(|_| "not an integer".to_string())?;
    if value.fract() != 0.0 {
        return Err("value must be a whole number".to_string());
    }
    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err("value out of integer range".to_string());
    }
    Ok(value as i64)
}

fn check_range(value: f64, range: Option<ValueRange>) -> std::result::Result<(), String> {
    match range {
        Some(range) if !range.contains(value) => Err(format!(
            "value {} outside [{}, {}]",
            value, range.min, range.max
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordUnit;
    use bridge_traits::records::{PlatformRecordKind, RecordMetadata};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_value(RecordType::Weight, " 72.5 ").unwrap(),
            RecordValue::Number(72.5)
        );
        assert!(matches!(
            parse_value(RecordType::Weight, "not-a-number"),
            Err(RecordError::ValueParse { .. })
        ));
        assert!(parse_value(RecordType::Weight, "NaN").is_err());
        assert!(parse_value(RecordType::Weight, "inf").is_err());
    }

    #[test]
    fn test_parse_integer_accepts_integral_decimal() {
        assert_eq!(
            parse_value(RecordType::HeartRate, "72.0").unwrap(),
            RecordValue::Integer(72)
        );
        assert_eq!(
            parse_value(RecordType::Steps, "1500").unwrap(),
            RecordValue::Integer(1500)
        );
        assert!(parse_value(RecordType::Steps, "12.5").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(parse_value(RecordType::Height, "4.2").is_err());
        assert!(parse_value(RecordType::BodyFat, "101").is_err());
        assert!(parse_value(RecordType::Steps, "0").is_err());
        assert!(parse_value(RecordType::HeartRate, "400").is_err());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(
            parse_value(RecordType::ActivitySession, "  RUNNING ").unwrap(),
            RecordValue::Text("RUNNING".to_string())
        );
        assert!(parse_value(RecordType::ActivityEvent, "   ").is_err());
    }

    #[test]
    fn test_parse_pressure() {
        assert_eq!(
            parse_value(RecordType::BloodPressure, "120/80").unwrap(),
            RecordValue::Pressure {
                systolic: 120.0,
                diastolic: 80.0
            }
        );
        assert!(parse_value(RecordType::BloodPressure, "120").is_err());
        assert!(parse_value(RecordType::BloodPressure, "80/120").is_err());
        assert!(parse_value(RecordType::BloodPressure, "abc/80").is_err());
    }

    #[test]
    fn test_instant_time_range() {
        let s = start();
        assert_eq!(
            validate_time_range(RecordType::Weight, s, None).unwrap(),
            (s, s)
        );
        assert!(validate_time_range(RecordType::Weight, s, Some(s)).is_ok());
        assert!(matches!(
            validate_time_range(RecordType::Weight, s, Some(s + Duration::minutes(1))),
            Err(RecordError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn test_interval_time_range() {
        let s = start();
        let e = s + Duration::minutes(10);
        assert_eq!(
            validate_time_range(RecordType::Steps, s, Some(e)).unwrap(),
            (s, e)
        );
        assert!(validate_time_range(RecordType::Steps, s, Some(s)).is_err());
        assert!(validate_time_range(RecordType::Steps, e, Some(s)).is_err());
        assert!(validate_time_range(RecordType::Steps, s, None).is_err());
    }

    #[test]
    fn test_steps_write_then_read() {
        let s = start();
        let e = s + Duration::hours(1);
        let record = to_platform_record(RecordType::Steps, "4200", s, Some(e)).unwrap();
        assert_eq!(record.kind(), PlatformRecordKind::Steps);

        let entry = to_record_entry(RecordType::Steps, &record).unwrap();
        assert_eq!(entry.value, RecordValue::Integer(4200));
        assert_eq!(entry.start_time, s);
        assert_eq!(entry.end_time, e);
        assert_eq!(entry.unit, RecordUnit::Count);
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let record = PlatformRecord::Height {
            metadata: RecordMetadata::new(),
            time: start(),
            height_m: 1.8,
        };

        assert_eq!(
            to_record_entry(RecordType::Weight, &record),
            Err(RecordError::RecordKindMismatch {
                expected: PlatformRecordKind::Weight,
                found: PlatformRecordKind::Height,
            })
        );
    }

    #[test]
    fn test_batch_conversion_fails_on_first_bad_record() {
        let s = start();
        let good = to_platform_record(RecordType::Height, "1.75", s, None).unwrap();
        let bad = to_platform_record(RecordType::Weight, "70", s, None).unwrap();

        assert_eq!(
            to_record_entries(RecordType::Height, &[good.clone()])
                .unwrap()
                .len(),
            1
        );
        assert!(to_record_entries(RecordType::Height, &[good, bad]).is_err());
    }
}
