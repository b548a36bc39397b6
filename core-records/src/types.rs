//! Record kinds, units and value shapes.
//!
//! Ordinals of [`RecordType`] and [`RecordUnit`] are part of the bridge
//! protocol: the application layer sends and receives them as plain
//! integers. New variants are appended, never inserted.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::{RecordError, Result};

// =============================================================================
// Record Types
// =============================================================================

/// Supported health record kinds, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "i64")]
pub enum RecordType {
    Weight = 0,
    ActiveCaloriesBurned = 1,
    ActivitySession = 2,
    BasalBodyTemperature = 3,
    BloodGlucose = 4,
    BloodPressure = 5,
    BodyFat = 6,
    HeartRate = 7,
    Height = 8,
    Steps = 9,
    Hydration = 10,
    ActiveEnergyBurned = 11,
    ActivityEvent = 12,
    ActivityLap = 13,
}

impl RecordType {
    /// Every record type, indexed by ordinal.
    pub const ALL: [RecordType; 14] = [
        RecordType::Weight,
        RecordType::ActiveCaloriesBurned,
        RecordType::ActivitySession,
        RecordType::BasalBodyTemperature,
        RecordType::BloodGlucose,
        RecordType::BloodPressure,
        RecordType::BodyFat,
        RecordType::HeartRate,
        RecordType::Height,
        RecordType::Steps,
        RecordType::Hydration,
        RecordType::ActiveEnergyBurned,
        RecordType::ActivityEvent,
        RecordType::ActivityLap,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Look up a record type by its protocol ordinal.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_records::RecordType;
    ///
    /// assert_eq!(RecordType::from_ordinal(9).unwrap(), RecordType::Steps);
    /// assert!(RecordType::from_ordinal(999).is_err());
    /// ```
    pub fn from_ordinal(ordinal: i64) -> Result<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| RecordError::UnknownRecordType(ordinal.to_string()))
    }

    /// Protocol name, e.g. `"BLOOD_PRESSURE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Weight => "WEIGHT",
            RecordType::ActiveCaloriesBurned => "ACTIVE_CALORIES_BURNED",
            RecordType::ActivitySession => "ACTIVITY_SESSION",
            RecordType::BasalBodyTemperature => "BASAL_BODY_TEMPERATURE",
            RecordType::BloodGlucose => "BLOOD_GLUCOSE",
            RecordType::BloodPressure => "BLOOD_PRESSURE",
            RecordType::BodyFat => "BODY_FAT",
            RecordType::HeartRate => "HEART_RATE",
            RecordType::Height => "HEIGHT",
            RecordType::Steps => "STEPS",
            RecordType::Hydration => "HYDRATION",
            RecordType::ActiveEnergyBurned => "ACTIVE_ENERGY_BURNED",
            RecordType::ActivityEvent => "ACTIVITY_EVENT",
            RecordType::ActivityLap => "ACTIVITY_LAP",
        }
    }

    /// Parse a protocol name, case-insensitively.
    ///
    /// ```
    /// use core_records::RecordType;
    ///
    /// assert_eq!(RecordType::parse("weight").unwrap(), RecordType::Weight);
    /// assert!(RecordType::parse("SLEEP").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let upper = name.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|record_type| record_type.as_str() == upper)
            .ok_or_else(|| RecordError::UnknownRecordType(name.to_string()))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RecordType> for u32 {
    fn from(record_type: RecordType) -> Self {
        record_type.ordinal()
    }
}

impl TryFrom<i64> for RecordType {
    type Error = RecordError;

    fn try_from(ordinal: i64) -> Result<Self> {
        Self::from_ordinal(ordinal)
    }
}

// =============================================================================
// Units
// =============================================================================

/// Measurement units, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "i64")]
pub enum RecordUnit {
    BeatsPerMinute = 0,
    Calories = 1,
    Count = 2,
    DegreeCelsius = 3,
    Grams = 4,
    Kilograms = 5,
    Meters = 6,
    MilligramPerDeciliter = 7,
    MillimeterOfMercury = 8,
    Milliseconds = 9,
    Minutes = 10,
    NoUnit = 11,
    Percentage = 12,
    Siemens = 13,
    UnknownUnit = 14,
    Liter = 15,
    StringType = 16,
}

impl RecordUnit {
    pub const ALL: [RecordUnit; 17] = [
        RecordUnit::BeatsPerMinute,
        RecordUnit::Calories,
        RecordUnit::Count,
        RecordUnit::DegreeCelsius,
        RecordUnit::Grams,
        RecordUnit::Kilograms,
        RecordUnit::Meters,
        RecordUnit::MilligramPerDeciliter,
        RecordUnit::MillimeterOfMercury,
        RecordUnit::Milliseconds,
        RecordUnit::Minutes,
        RecordUnit::NoUnit,
        RecordUnit::Percentage,
        RecordUnit::Siemens,
        RecordUnit::UnknownUnit,
        RecordUnit::Liter,
        RecordUnit::StringType,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Short symbol for display, e.g. `"kg"`.
    pub fn symbol(&self) -> &'static str {
        match self {
            RecordUnit::BeatsPerMinute => "bpm",
            RecordUnit::Calories => "kcal",
            RecordUnit::Count => "count",
            RecordUnit::DegreeCelsius => "°C",
            RecordUnit::Grams => "g",
            RecordUnit::Kilograms => "kg",
            RecordUnit::Meters => "m",
            RecordUnit::MilligramPerDeciliter => "mg/dL",
            RecordUnit::MillimeterOfMercury => "mmHg",
            RecordUnit::Milliseconds => "ms",
            RecordUnit::Minutes => "min",
            RecordUnit::NoUnit => "",
            RecordUnit::Percentage => "%",
            RecordUnit::Siemens => "S",
            RecordUnit::UnknownUnit => "?",
            RecordUnit::Liter => "L",
            RecordUnit::StringType => "",
        }
    }
}

impl From<RecordUnit> for u32 {
    fn from(unit: RecordUnit) -> Self {
        unit.ordinal()
    }
}

impl TryFrom<i64> for RecordUnit {
    type Error = String;

    fn try_from(ordinal: i64) -> std::result::Result<Self, String> {
        Self::from_ordinal(ordinal).ok_or_else(|| format!("unknown unit ordinal {}", ordinal))
    }
}

// =============================================================================
// Value Shapes
// =============================================================================

/// How a record's principal value is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Finite floating point number
    Decimal,
    /// Whole number; integral decimals such as `"72.0"` are accepted
    Integer,
    /// Free text such as an activity type
    Text,
    /// Systolic/diastolic pair written as `"120/80"`
    Pressure,
}

impl ValueShape {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueShape::Decimal | ValueShape::Integer)
    }
}

/// Whether a record has one timestamp or a start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporality {
    Instant,
    Interval,
}

/// Inclusive bounds a value must fall within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// =============================================================================
// Values
// =============================================================================

/// Principal value of a record, shaped per [`ValueShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Pressure { systolic: f64, diastolic: f64 },
}

impl RecordValue {
    /// Numeric view of the value; `None` for text and pressure values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RecordValue::Number(value) => Some(*value),
            RecordValue::Integer(value) => Some(*value as f64),
            RecordValue::Text(_) | RecordValue::Pressure { .. } => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RecordValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Number(value) => write!(f, "{}", value),
            RecordValue::Integer(value) => write!(f, "{}", value),
            RecordValue::Text(value) => write!(f, "{}", value),
            RecordValue::Pressure {
                systolic,
                diastolic,
            } => write!(f, "{}/{}", systolic, diastolic),
        }
    }
}

// Numbers cross the bridge as numbers, everything else as strings.
impl Serialize for RecordValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RecordValue::Number(value) => serializer.serialize_f64(*value),
            RecordValue::Integer(value) => serializer.serialize_i64(*value),
            RecordValue::Text(value) => serializer.serialize_str(value),
            RecordValue::Pressure { .. } => serializer.serialize_str(&self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_ordinals_are_stable() {
        assert_eq!(RecordType::Weight.ordinal(), 0);
        assert_eq!(RecordType::ActivitySession.ordinal(), 2);
        assert_eq!(RecordType::HeartRate.ordinal(), 7);
        assert_eq!(RecordType::Steps.ordinal(), 9);
        assert_eq!(RecordType::Hydration.ordinal(), 10);
        assert_eq!(RecordType::ActivityLap.ordinal(), 13);

        for (index, record_type) in RecordType::ALL.iter().enumerate() {
            assert_eq!(record_type.ordinal() as usize, index);
        }
    }

    #[test]
    fn test_record_type_from_ordinal_rejects_out_of_range() {
        assert_eq!(
            RecordType::from_ordinal(14),
            Err(RecordError::UnknownRecordType("14".to_string()))
        );
        assert!(RecordType::from_ordinal(-1).is_err());
        assert!(RecordType::from_ordinal(999).is_err());
    }

    #[test]
    fn test_record_type_parse_names() {
        assert_eq!(RecordType::parse("HEIGHT").unwrap(), RecordType::Height);
        assert_eq!(
            RecordType::parse(" blood_pressure ").unwrap(),
            RecordType::BloodPressure
        );
        assert!(RecordType::parse("").is_err());
    }

    #[test]
    fn test_record_type_serializes_as_ordinal() {
        let json = serde_json::to_string(&RecordType::BodyFat).unwrap();
        assert_eq!(json, "6");

        let back: RecordType = serde_json::from_str("8").unwrap();
        assert_eq!(back, RecordType::Height);

        assert!(serde_json::from_str::<RecordType>("42").is_err());
    }

    #[test]
    fn test_unit_ordinals_are_stable() {
        assert_eq!(RecordUnit::BeatsPerMinute.ordinal(), 0);
        assert_eq!(RecordUnit::Kilograms.ordinal(), 5);
        assert_eq!(RecordUnit::Liter.ordinal(), 15);
        assert_eq!(RecordUnit::StringType.ordinal(), 16);
        assert_eq!(RecordUnit::from_ordinal(17), None);
    }

    #[test]
    fn test_record_value_serialization() {
        assert_eq!(
            serde_json::to_value(RecordValue::Number(72.5)).unwrap(),
            serde_json::json!(72.5)
        );
        assert_eq!(
            serde_json::to_value(RecordValue::Integer(1200)).unwrap(),
            serde_json::json!(1200)
        );
        assert_eq!(
            serde_json::to_value(RecordValue::Pressure {
                systolic: 120.0,
                diastolic: 80.0
            })
            .unwrap(),
            serde_json::json!("120/80")
        );
    }

    #[test]
    fn test_value_range_is_inclusive() {
        let range = ValueRange::new(0.0, 100.0);
        assert!(range.contains(0.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(100.1));
        assert!(!range.contains(f64::NAN));
    }
}
