//! Platform-native health records
//!
//! Typed model of the records the platform health store persists. These
//! mirror the shapes of the Health Connect record classes closely enough that
//! a host adapter can convert one-to-one, while staying free of any
//! platform SDK types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Record classes known to the platform store.
///
/// Each kind owns exactly one read and one write permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlatformRecordKind {
    Weight,
    ActiveCaloriesBurned,
    ActivitySession,
    BasalBodyTemperature,
    BloodGlucose,
    BloodPressure,
    BodyFat,
    HeartRateSeries,
    Height,
    Steps,
    Hydration,
    ActiveEnergyBurned,
    ActivityEvent,
    ActivityLap,
}

impl PlatformRecordKind {
    /// Every kind, in declaration order.
    pub const ALL: [PlatformRecordKind; 14] = [
        PlatformRecordKind::Weight,
        PlatformRecordKind::ActiveCaloriesBurned,
        PlatformRecordKind::ActivitySession,
        PlatformRecordKind::BasalBodyTemperature,
        PlatformRecordKind::BloodGlucose,
        PlatformRecordKind::BloodPressure,
        PlatformRecordKind::BodyFat,
        PlatformRecordKind::HeartRateSeries,
        PlatformRecordKind::Height,
        PlatformRecordKind::Steps,
        PlatformRecordKind::Hydration,
        PlatformRecordKind::ActiveEnergyBurned,
        PlatformRecordKind::ActivityEvent,
        PlatformRecordKind::ActivityLap,
    ];

    /// Suffix used by the platform's permission strings (`READ_<suffix>`).
    pub fn permission_suffix(&self) -> &'static str {
        match self {
            PlatformRecordKind::Weight => "WEIGHT",
            PlatformRecordKind::ActiveCaloriesBurned => "ACTIVE_CALORIES_BURNED",
            PlatformRecordKind::ActivitySession => "ACTIVITY_SESSION",
            PlatformRecordKind::BasalBodyTemperature => "BASAL_BODY_TEMPERATURE",
            PlatformRecordKind::BloodGlucose => "BLOOD_GLUCOSE",
            PlatformRecordKind::BloodPressure => "BLOOD_PRESSURE",
            PlatformRecordKind::BodyFat => "BODY_FAT",
            PlatformRecordKind::HeartRateSeries => "HEART_RATE",
            PlatformRecordKind::Height => "HEIGHT",
            PlatformRecordKind::Steps => "STEPS",
            PlatformRecordKind::Hydration => "HYDRATION",
            PlatformRecordKind::ActiveEnergyBurned => "ACTIVE_ENERGY_BURNED",
            PlatformRecordKind::ActivityEvent => "ACTIVITY_EVENT",
            PlatformRecordKind::ActivityLap => "ACTIVITY_LAP",
        }
    }

    /// Parse a kind back from its permission suffix.
    pub fn from_permission_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.permission_suffix() == suffix)
    }
}

impl fmt::Display for PlatformRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.permission_suffix())
    }
}

/// Metadata attached to every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Platform-unique record identifier
    pub id: Uuid,
    /// Package that wrote the record, when known
    pub data_origin: Option<String>,
}

impl RecordMetadata {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            data_origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.data_origin = Some(origin.into());
        self
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A single heart-rate measurement inside a series record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub time: DateTime<Utc>,
    pub beats_per_minute: i64,
}

/// A record as the platform store holds it.
///
/// Instant records carry a single `time`; interval records carry
/// `start_time` and `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PlatformRecord {
    Weight {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        weight_kg: f64,
    },
    ActiveCaloriesBurned {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        energy_kcal: f64,
    },
    ActivitySession {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        activity_type: String,
        title: Option<String>,
    },
    BasalBodyTemperature {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        temperature_celsius: f64,
    },
    BloodGlucose {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        level_mg_per_dl: f64,
    },
    BloodPressure {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        systolic_mmhg: f64,
        diastolic_mmhg: f64,
    },
    BodyFat {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        percentage: f64,
    },
    HeartRateSeries {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        samples: Vec<HeartRateSample>,
    },
    Height {
        metadata: RecordMetadata,
        time: DateTime<Utc>,
        height_m: f64,
    },
    Steps {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        count: i64,
    },
    Hydration {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        volume_liters: f64,
    },
    ActiveEnergyBurned {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        energy_kcal: f64,
    },
    ActivityEvent {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        event_type: String,
    },
    ActivityLap {
        metadata: RecordMetadata,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        length_m: f64,
    },
}

impl PlatformRecord {
    pub fn kind(&self) -> PlatformRecordKind {
        match self {
            PlatformRecord::Weight { .. } => PlatformRecordKind::Weight,
            PlatformRecord::ActiveCaloriesBurned { .. } => PlatformRecordKind::ActiveCaloriesBurned,
            PlatformRecord::ActivitySession { .. } => PlatformRecordKind::ActivitySession,
            PlatformRecord::BasalBodyTemperature { .. } => PlatformRecordKind::BasalBodyTemperature,
            PlatformRecord::BloodGlucose { .. } => PlatformRecordKind::BloodGlucose,
            PlatformRecord::BloodPressure { .. } => PlatformRecordKind::BloodPressure,
            PlatformRecord::BodyFat { .. } => PlatformRecordKind::BodyFat,
            PlatformRecord::HeartRateSeries { .. } => PlatformRecordKind::HeartRateSeries,
            PlatformRecord::Height { .. } => PlatformRecordKind::Height,
            PlatformRecord::Steps { .. } => PlatformRecordKind::Steps,
            PlatformRecord::Hydration { .. } => PlatformRecordKind::Hydration,
            PlatformRecord::ActiveEnergyBurned { .. } => PlatformRecordKind::ActiveEnergyBurned,
            PlatformRecord::ActivityEvent { .. } => PlatformRecordKind::ActivityEvent,
            PlatformRecord::ActivityLap { .. } => PlatformRecordKind::ActivityLap,
        }
    }

    pub fn metadata(&self) -> &RecordMetadata {
        match self {
            PlatformRecord::Weight { metadata, .. }
            | PlatformRecord::ActiveCaloriesBurned { metadata, .. }
            | PlatformRecord::ActivitySession { metadata, .. }
            | PlatformRecord::BasalBodyTemperature { metadata, .. }
            | PlatformRecord::BloodGlucose { metadata, .. }
            | PlatformRecord::BloodPressure { metadata, .. }
            | PlatformRecord::BodyFat { metadata, .. }
            | PlatformRecord::HeartRateSeries { metadata, .. }
            | PlatformRecord::Height { metadata, .. }
            | PlatformRecord::Steps { metadata, .. }
            | PlatformRecord::Hydration { metadata, .. }
            | PlatformRecord::ActiveEnergyBurned { metadata, .. }
            | PlatformRecord::ActivityEvent { metadata, .. }
            | PlatformRecord::ActivityLap { metadata, .. } => metadata,
        }
    }

    /// Start of the record; the sample time for instant records.
    pub fn start_time(&self) -> DateTime<Utc> {
        match self {
            PlatformRecord::Weight { time, .. }
            | PlatformRecord::BasalBodyTemperature { time, .. }
            | PlatformRecord::BloodGlucose { time, .. }
            | PlatformRecord::BloodPressure { time, .. }
            | PlatformRecord::BodyFat { time, .. }
            | PlatformRecord::Height { time, .. } => *time,
            PlatformRecord::ActiveCaloriesBurned { start_time, .. }
            | PlatformRecord::ActivitySession { start_time, .. }
            | PlatformRecord::HeartRateSeries { start_time, .. }
            | PlatformRecord::Steps { start_time, .. }
            | PlatformRecord::Hydration { start_time, .. }
            | PlatformRecord::ActiveEnergyBurned { start_time, .. }
            | PlatformRecord::ActivityEvent { start_time, .. }
            | PlatformRecord::ActivityLap { start_time, .. } => *start_time,
        }
    }

    /// End of the record; equal to [`start_time`](Self::start_time) for instant records.
    pub fn end_time(&self) -> DateTime<Utc> {
        match self {
            PlatformRecord::ActiveCaloriesBurned { end_time, .. }
            | PlatformRecord::ActivitySession { end_time, .. }
            | PlatformRecord::HeartRateSeries { end_time, .. }
            | PlatformRecord::Steps { end_time, .. }
            | PlatformRecord::Hydration { end_time, .. }
            | PlatformRecord::ActiveEnergyBurned { end_time, .. }
            | PlatformRecord::ActivityEvent { end_time, .. }
            | PlatformRecord::ActivityLap { end_time, .. } => *end_time,
            _ => self.start_time(),
        }
    }
}

/// Closed time window used to filter store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether a record spanning `[start, end]` falls within the window.
    ///
    /// Instant records match when their sample time is inside the window;
    /// interval records match when they overlap it.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Outcome of an insert call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResult {
    /// Identifiers assigned to the inserted records, in input order
    pub record_ids: Vec<String>,
}

impl InsertResult {
    pub fn is_empty(&self) -> bool {
        self.record_ids.is_empty()
    }
}
