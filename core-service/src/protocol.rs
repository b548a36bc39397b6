//! # Bridge Protocol
//!
//! Method names and argument maps as the application layer sends them, and
//! the typed requests they decode into. Arguments are decoded exactly once,
//! here; the service only ever sees typed requests.
//!
//! ## Argument keys
//!
//! | Key               | Type                                   |
//! |-------------------|----------------------------------------|
//! | `permissionTypes` | list of operation ordinals             |
//! | `recordTypes`     | list of record ordinals or names       |
//! | `recordType`      | record ordinal or name                 |
//! | `value`           | number or string                       |
//! | `startTime`       | RFC 3339, naive ISO or epoch millis    |
//! | `endTime`         | RFC 3339, naive ISO or epoch millis    |

use bridge_traits::{records::TimeRange, Clock};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use core_auth::OperationType;
use core_records::RecordType;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::error::{CoreError, Result};

/// Methods the bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetPlatformVersionName,
    GetPlatformVersionCode,
    CheckAvailability,
    RequestPermissions,
    HasPermissions,
    ReadRecords,
    WriteRecords,
    GetTotalSteps,
    GetTotalActivitySession,
}

impl Method {
    /// Look up a method by its channel name. `requestAuthorization` is an
    /// alias of `requestPermissions`.
    pub fn parse(name: &str) -> Option<Self> {
        let method = match name {
            "getPlatformVersionName" => Method::GetPlatformVersionName,
            "getPlatformVersionCode" => Method::GetPlatformVersionCode,
            "checkHealthConnectAvailability" => Method::CheckAvailability,
            "requestPermissions" | "requestAuthorization" => Method::RequestPermissions,
            "hasPermissions" => Method::HasPermissions,
            "readRecords" => Method::ReadRecords,
            "writeRecords" => Method::WriteRecords,
            "getTotalSteps" => Method::GetTotalSteps,
            "getTotalActivitySession" => Method::GetTotalActivitySession,
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetPlatformVersionName => "getPlatformVersionName",
            Method::GetPlatformVersionCode => "getPlatformVersionCode",
            Method::CheckAvailability => "checkHealthConnectAvailability",
            Method::RequestPermissions => "requestPermissions",
            Method::HasPermissions => "hasPermissions",
            Method::ReadRecords => "readRecords",
            Method::WriteRecords => "writeRecords",
            Method::GetTotalSteps => "getTotalSteps",
            Method::GetTotalActivitySession => "getTotalActivitySession",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordTypeArg {
    Ordinal(i64),
    Name(String),
}

impl RecordTypeArg {
    fn resolve(&self) -> Result<RecordType> {
        let record_type = match self {
            RecordTypeArg::Ordinal(ordinal) => RecordType::from_ordinal(*ordinal)?,
            RecordTypeArg::Name(name) => RecordType::parse(name)?,
        };
        Ok(record_type)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TimeArg {
    Millis(i64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ValueArg {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl ValueArg {
    fn into_raw(self) -> String {
        match self {
            ValueArg::Integer(value) => value.to_string(),
            ValueArg::Number(value) => value.to_string(),
            ValueArg::Text(value) => value,
        }
    }
}

/// The argument map exactly as it arrives.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArgs {
    #[serde(default)]
    permission_types: Option<Vec<i64>>,
    #[serde(default)]
    record_types: Option<Vec<RecordTypeArg>>,
    #[serde(default)]
    record_type: Option<RecordTypeArg>,
    #[serde(default)]
    value: Option<ValueArg>,
    #[serde(default)]
    start_time: Option<TimeArg>,
    #[serde(default)]
    end_time: Option<TimeArg>,
}

impl RawArgs {
    fn from_value(args: &Value) -> Result<Self> {
        if args.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(args.clone())
            .map_err(|e| CoreError::invalid_argument("arguments", e.to_string()))
    }

    fn required_record_type(&self) -> Result<RecordType> {
        self.record_type
            .as_ref()
            .ok_or_else(|| CoreError::invalid_argument("recordType", "is required"))?
            .resolve()
    }
}

/// Clock readings and offset used to fill in and interpret times.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    pub now: DateTime<Utc>,
    /// Local midnight of the current day, in UTC
    pub start_of_day: DateTime<Utc>,
    /// Offset applied to timestamps that carry none
    pub offset: FixedOffset,
}

impl TimeContext {
    pub fn new(clock: &dyn Clock, offset: FixedOffset) -> Self {
        let now = clock.now();
        let start_of_day = now
            .with_timezone(&offset)
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| offset.from_local_datetime(&midnight).single())
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| clock.start_of_day());

        Self {
            now,
            start_of_day,
            offset,
        }
    }
}

/// Arguments of `requestPermissions` and `hasPermissions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsRequest {
    pub operations: Vec<OperationType>,
    pub record_types: Vec<RecordType>,
}

impl PermissionsRequest {
    /// Decode the request. Every ordinal must be known; none are dropped.
    pub fn decode(args: &Value) -> Result<Self> {
        let raw = RawArgs::from_value(args)?;

        let operations = raw
            .permission_types
            .unwrap_or_default()
            .into_iter()
            .map(OperationType::from_ordinal)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let record_types = raw
            .record_types
            .unwrap_or_default()
            .iter()
            .map(RecordTypeArg::resolve)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            operations,
            record_types,
        })
    }
}

/// Arguments of `readRecords`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub record_type: RecordType,
    pub range: TimeRange,
}

impl ReadRequest {
    pub fn decode(args: &Value, time: &TimeContext) -> Result<Self> {
        let raw = RawArgs::from_value(args)?;
        let record_type = raw.required_record_type()?;
        let range = decode_window(&raw, time)?;
        Ok(Self { record_type, range })
    }
}

/// Arguments of `writeRecords`.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub record_type: RecordType,
    /// Raw value, parsed by the marshaler
    pub value: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl WriteRequest {
    pub fn decode(args: &Value, time: &TimeContext) -> Result<Self> {
        let raw = RawArgs::from_value(args)?;
        let record_type = raw.required_record_type()?;
        let value = raw
            .value
            .clone()
            .ok_or_else(|| CoreError::invalid_argument("value", "is required"))?
            .into_raw();

        let start = match &raw.start_time {
            Some(arg) => parse_time("startTime", arg, time.offset)?,
            None => time.now,
        };
        let end = raw
            .end_time
            .as_ref()
            .map(|arg| parse_time("endTime", arg, time.offset))
            .transpose()?;

        Ok(Self {
            record_type,
            value,
            start,
            end,
        })
    }
}

/// Arguments of `getTotalSteps` and `getTotalActivitySession`.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsRequest {
    pub range: TimeRange,
}

impl TotalsRequest {
    pub fn decode(args: &Value, time: &TimeContext) -> Result<Self> {
        let raw = RawArgs::from_value(args)?;
        Ok(Self {
            range: decode_window(&raw, time)?,
        })
    }
}

fn decode_window(raw: &RawArgs, time: &TimeContext) -> Result<TimeRange> {
    let start = match &raw.start_time {
        Some(arg) => parse_time("startTime", arg, time.offset)?,
        None => time.start_of_day,
    };
    let end = match &raw.end_time {
        Some(arg) => parse_time("endTime", arg, time.offset)?,
        None => time.now,
    };

    if end < start {
        return Err(CoreError::invalid_argument(
            "endTime",
            "must not precede startTime",
        ));
    }
    Ok(TimeRange::between(start, end))
}

fn parse_time(argument: &str, arg: &TimeArg, offset: FixedOffset) -> Result<DateTime<Utc>> {
    match arg {
        TimeArg::Millis(millis) => from_millis(argument, *millis),
        TimeArg::Text(text) => parse_timestamp(text, offset).ok_or_else(|| {
            CoreError::invalid_argument(argument, format!("unrecognized time {:?}", text))
        }),
    }
}

fn from_millis(argument: &str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| CoreError::invalid_argument(argument, format!("{} is out of range", millis)))
}

/// Parse a timestamp string.
///
/// Accepts RFC 3339, naive ISO date-times and dates (read in `offset`), and
/// epoch milliseconds.
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use core_service::protocol::parse_timestamp;
///
/// let offset = FixedOffset::east_opt(7 * 3600).unwrap();
/// let expected = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
///
/// assert_eq!(parse_timestamp("2024-03-01T08:00:00+07:00", offset), Some(expected));
/// assert_eq!(parse_timestamp("2024-03-01T08:00:00", offset), Some(expected));
/// assert_eq!(parse_timestamp("1709254800000", offset), Some(expected));
/// assert_eq!(parse_timestamp("yesterday", offset), None);
/// ```
pub fn parse_timestamp(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });
    if let Some(naive) = naive {
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc));
    }

    text.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}
