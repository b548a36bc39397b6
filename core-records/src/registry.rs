//! Record Type Registry
//!
//! One descriptor per [`RecordType`], indexed by ordinal. Each descriptor
//! carries the value shape, unit, temporality, platform kind and valid range
//! of its record type, plus the pair of functions that move a value between
//! the generic representation and the platform record.

use bridge_traits::records::{HeartRateSample, PlatformRecord, PlatformRecordKind, RecordMetadata};
use chrono::{DateTime, Utc};

use crate::types::{RecordType, RecordUnit, RecordValue, Temporality, ValueRange, ValueShape};

/// Why a platform record could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DecodeFailure {
    KindMismatch,
    Malformed(&'static str),
}

type DecodeFn = fn(&PlatformRecord) -> Result<RecordValue, DecodeFailure>;
type EncodeFn = fn(&RecordValue, DateTime<Utc>, DateTime<Utc>) -> Option<PlatformRecord>;

/// Static description of one record type.
pub struct RecordDescriptor {
    pub record_type: RecordType,
    pub shape: ValueShape,
    pub unit: RecordUnit,
    pub temporality: Temporality,
    pub platform_kind: PlatformRecordKind,
    /// Bounds enforced on write; `None` for text values
    pub range: Option<ValueRange>,
    pub(crate) decode: DecodeFn,
    pub(crate) encode: EncodeFn,
}

impl std::fmt::Debug for RecordDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("record_type", &self.record_type)
            .field("shape", &self.shape)
            .field("unit", &self.unit)
            .field("temporality", &self.temporality)
            .field("platform_kind", &self.platform_kind)
            .field("range", &self.range)
            .finish()
    }
}

/// Systolic bounds in mmHg.
pub const SYSTOLIC_RANGE: ValueRange = ValueRange::new(20.0, 200.0);
/// Diastolic bounds in mmHg.
pub const DIASTOLIC_RANGE: ValueRange = ValueRange::new(10.0, 180.0);

static REGISTRY: [RecordDescriptor; 14] = [
    RecordDescriptor {
        record_type: RecordType::Weight,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Kilograms,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::Weight,
        range: Some(ValueRange::new(0.0, 1000.0)),
        decode: decode_weight,
        encode: encode_weight,
    },
    RecordDescriptor {
        record_type: RecordType::ActiveCaloriesBurned,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Calories,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::ActiveCaloriesBurned,
        range: Some(ValueRange::new(0.0, 1_000_000.0)),
        decode: decode_active_calories,
        encode: encode_active_calories,
    },
    RecordDescriptor {
        record_type: RecordType::ActivitySession,
        shape: ValueShape::Text,
        unit: RecordUnit::StringType,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::ActivitySession,
        range: None,
        decode: decode_activity_session,
        encode: encode_activity_session,
    },
    RecordDescriptor {
        record_type: RecordType::BasalBodyTemperature,
        shape: ValueShape::Decimal,
        unit: RecordUnit::DegreeCelsius,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::BasalBodyTemperature,
        range: Some(ValueRange::new(0.0, 100.0)),
        decode: decode_basal_body_temperature,
        encode: encode_basal_body_temperature,
    },
    RecordDescriptor {
        record_type: RecordType::BloodGlucose,
        shape: ValueShape::Decimal,
        unit: RecordUnit::MilligramPerDeciliter,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::BloodGlucose,
        range: Some(ValueRange::new(0.0, 900.0)),
        decode: decode_blood_glucose,
        encode: encode_blood_glucose,
    },
    RecordDescriptor {
        record_type: RecordType::BloodPressure,
        shape: ValueShape::Pressure,
        unit: RecordUnit::MillimeterOfMercury,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::BloodPressure,
        // Each side is checked against SYSTOLIC_RANGE and DIASTOLIC_RANGE
        range: None,
        decode: decode_blood_pressure,
        encode: encode_blood_pressure,
    },
    RecordDescriptor {
        record_type: RecordType::BodyFat,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Percentage,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::BodyFat,
        range: Some(ValueRange::new(0.0, 100.0)),
        decode: decode_body_fat,
        encode: encode_body_fat,
    },
    RecordDescriptor {
        record_type: RecordType::HeartRate,
        shape: ValueShape::Integer,
        unit: RecordUnit::BeatsPerMinute,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::HeartRateSeries,
        range: Some(ValueRange::new(1.0, 300.0)),
        decode: decode_heart_rate,
        encode: encode_heart_rate,
    },
    RecordDescriptor {
        record_type: RecordType::Height,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Meters,
        temporality: Temporality::Instant,
        platform_kind: PlatformRecordKind::Height,
        range: Some(ValueRange::new(0.0, 3.0)),
        decode: decode_height,
        encode: encode_height,
    },
    RecordDescriptor {
        record_type: RecordType::Steps,
        shape: ValueShape::Integer,
        unit: RecordUnit::Count,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::Steps,
        range: Some(ValueRange::new(1.0, 1_000_000.0)),
        decode: decode_steps,
        encode: encode_steps,
    },
    RecordDescriptor {
        record_type: RecordType::Hydration,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Liter,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::Hydration,
        range: Some(ValueRange::new(0.0, 100.0)),
        decode: decode_hydration,
        encode: encode_hydration,
    },
    RecordDescriptor {
        record_type: RecordType::ActiveEnergyBurned,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Calories,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::ActiveEnergyBurned,
        range: Some(ValueRange::new(0.0, 1_000_000.0)),
        decode: decode_active_energy,
        encode: encode_active_energy,
    },
    RecordDescriptor {
        record_type: RecordType::ActivityEvent,
        shape: ValueShape::Text,
        unit: RecordUnit::StringType,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::ActivityEvent,
        range: None,
        decode: decode_activity_event,
        encode: encode_activity_event,
    },
    RecordDescriptor {
        record_type: RecordType::ActivityLap,
        shape: ValueShape::Decimal,
        unit: RecordUnit::Meters,
        temporality: Temporality::Interval,
        platform_kind: PlatformRecordKind::ActivityLap,
        range: Some(ValueRange::new(0.0, 1_000_000.0)),
        decode: decode_activity_lap,
        encode: encode_activity_lap,
    },
];

/// Descriptor for a record type. Total over the enumeration.
pub fn descriptor(record_type: RecordType) -> &'static RecordDescriptor {
    &REGISTRY[record_type.ordinal() as usize]
}

/// All descriptors in ordinal order.
pub fn descriptors() -> &'static [RecordDescriptor] {
    &REGISTRY
}

pub fn unit_of(record_type: RecordType) -> RecordUnit {
    descriptor(record_type).unit
}

pub fn shape_of(record_type: RecordType) -> ValueShape {
    descriptor(record_type).shape
}

pub fn temporality_of(record_type: RecordType) -> Temporality {
    descriptor(record_type).temporality
}

pub fn platform_kind_of(record_type: RecordType) -> PlatformRecordKind {
    descriptor(record_type).platform_kind
}

/// Reverse lookup from a platform kind to the record type that owns it.
pub fn record_type_for_kind(kind: PlatformRecordKind) -> RecordType {
    match kind {
        PlatformRecordKind::Weight => RecordType::Weight,
        PlatformRecordKind::ActiveCaloriesBurned => RecordType::ActiveCaloriesBurned,
        PlatformRecordKind::ActivitySession => RecordType::ActivitySession,
        PlatformRecordKind::BasalBodyTemperature => RecordType::BasalBodyTemperature,
        PlatformRecordKind::BloodGlucose => RecordType::BloodGlucose,
        PlatformRecordKind::BloodPressure => RecordType::BloodPressure,
        PlatformRecordKind::BodyFat => RecordType::BodyFat,
        PlatformRecordKind::HeartRateSeries => RecordType::HeartRate,
        PlatformRecordKind::Height => RecordType::Height,
        PlatformRecordKind::Steps => RecordType::Steps,
        PlatformRecordKind::Hydration => RecordType::Hydration,
        PlatformRecordKind::ActiveEnergyBurned => RecordType::ActiveEnergyBurned,
        PlatformRecordKind::ActivityEvent => RecordType::ActivityEvent,
        PlatformRecordKind::ActivityLap => RecordType::ActivityLap,
    }
}

// -----------------------------------------------------------------------------
// Decoders
// -----------------------------------------------------------------------------

fn decode_weight(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::Weight { weight_kg, .. } => Ok(RecordValue::Number(*weight_kg)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_active_calories(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::ActiveCaloriesBurned { energy_kcal, .. } => {
            Ok(RecordValue::Number(*energy_kcal))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_activity_session(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::ActivitySession { activity_type, .. } => {
            Ok(RecordValue::Text(activity_type.clone()))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_basal_body_temperature(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::BasalBodyTemperature {
            temperature_celsius,
            ..
        } => Ok(RecordValue::Number(*temperature_celsius)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_blood_glucose(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::BloodGlucose {
            level_mg_per_dl, ..
        } => Ok(RecordValue::Number(*level_mg_per_dl)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_blood_pressure(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::BloodPressure {
            systolic_mmhg,
            diastolic_mmhg,
            ..
        } => Ok(RecordValue::Pressure {
            systolic: *systolic_mmhg,
            diastolic: *diastolic_mmhg,
        }),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_body_fat(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::BodyFat { percentage, .. } => Ok(RecordValue::Number(*percentage)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

/// A series collapses to the rounded mean of its samples.
fn decode_heart_rate(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::HeartRateSeries { samples, .. } => {
            if samples.is_empty() {
                return Err(DecodeFailure::Malformed("heart rate series has no samples"));
            }
            let total: i128 = samples
                .iter()
                .map(|sample| i128::from(sample.beats_per_minute))
                .sum();
            let mean = total as f64 / samples.len() as f64;
            Ok(RecordValue::Integer(mean.round() as i64))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_height(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::Height { height_m, .. } => Ok(RecordValue::Number(*height_m)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_steps(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::Steps { count, .. } => Ok(RecordValue::Integer(*count)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_hydration(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::Hydration { volume_liters, .. } => {
            Ok(RecordValue::Number(*volume_liters))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_active_energy(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::ActiveEnergyBurned { energy_kcal, .. } => {
            Ok(RecordValue::Number(*energy_kcal))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_activity_event(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::ActivityEvent { event_type, .. } => {
            Ok(RecordValue::Text(event_type.clone()))
        }
        _ => Err(DecodeFailure::KindMismatch),
    }
}

fn decode_activity_lap(record: &PlatformRecord) -> Result<RecordValue, DecodeFailure> {
    match record {
        PlatformRecord::ActivityLap { length_m, .. } => Ok(RecordValue::Number(*length_m)),
        _ => Err(DecodeFailure::KindMismatch),
    }
}

// -----------------------------------------------------------------------------
// Encoders
//
// Values arrive already parsed and range-checked; a shape mismatch yields
// `None` instead of a record.
// -----------------------------------------------------------------------------

fn encode_weight(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(weight_kg) => Some(PlatformRecord::Weight {
            metadata: RecordMetadata::new(),
            time: start,
            weight_kg: *weight_kg,
        }),
        _ => None,
    }
}

fn encode_active_calories(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(energy_kcal) => Some(PlatformRecord::ActiveCaloriesBurned {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            energy_kcal: *energy_kcal,
        }),
        _ => None,
    }
}

fn encode_activity_session(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Text(activity_type) => Some(PlatformRecord::ActivitySession {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            activity_type: activity_type.clone(),
            title: None,
        }),
        _ => None,
    }
}

fn encode_basal_body_temperature(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(temperature_celsius) => Some(PlatformRecord::BasalBodyTemperature {
            metadata: RecordMetadata::new(),
            time: start,
            temperature_celsius: *temperature_celsius,
        }),
        _ => None,
    }
}

fn encode_blood_glucose(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(level_mg_per_dl) => Some(PlatformRecord::BloodGlucose {
            metadata: RecordMetadata::new(),
            time: start,
            level_mg_per_dl: *level_mg_per_dl,
        }),
        _ => None,
    }
}

fn encode_blood_pressure(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Pressure {
            systolic,
            diastolic,
        } => Some(PlatformRecord::BloodPressure {
            metadata: RecordMetadata::new(),
            time: start,
            systolic_mmhg: *systolic,
            diastolic_mmhg: *diastolic,
        }),
        _ => None,
    }
}

fn encode_body_fat(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(percentage) => Some(PlatformRecord::BodyFat {
            metadata: RecordMetadata::new(),
            time: start,
            percentage: *percentage,
        }),
        _ => None,
    }
}

/// Writes a single-sample series stamped at the interval start.
fn encode_heart_rate(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Integer(beats_per_minute) => Some(PlatformRecord::HeartRateSeries {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            samples: vec![HeartRateSample {
                time: start,
                beats_per_minute: *beats_per_minute,
            }],
        }),
        _ => None,
    }
}

fn encode_height(
    value: &RecordValue,
    start: DateTime<Utc>,
    _end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(height_m) => Some(PlatformRecord::Height {
            metadata: RecordMetadata::new(),
            time: start,
            height_m: *height_m,
        }),
        _ => None,
    }
}

fn encode_steps(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Integer(count) => Some(PlatformRecord::Steps {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            count: *count,
        }),
        _ => None,
    }
}

fn encode_hydration(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(volume_liters) => Some(PlatformRecord::Hydration {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            volume_liters: *volume_liters,
        }),
        _ => None,
    }
}

fn encode_active_energy(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(energy_kcal) => Some(PlatformRecord::ActiveEnergyBurned {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            energy_kcal: *energy_kcal,
        }),
        _ => None,
    }
}

fn encode_activity_event(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Text(event_type) => Some(PlatformRecord::ActivityEvent {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            event_type: event_type.clone(),
        }),
        _ => None,
    }
}

fn encode_activity_lap(
    value: &RecordValue,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<PlatformRecord> {
    match value {
        RecordValue::Number(length_m) => Some(PlatformRecord::ActivityLap {
            metadata: RecordMetadata::new(),
            start_time: start,
            end_time: end,
            length_m: *length_m,
        }),
        _ => None,
    }
}
