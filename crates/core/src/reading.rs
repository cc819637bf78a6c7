//! Readings and ordered single-patient series.
//!
//! The engine never sorts. A [`ReadingSeries`] can only be built from a slice whose timestamps
//! are non-decreasing, so every detector downstream may rely on ascending order (and on binary
//! search for window lookups).

use crate::error::{AlertError, AlertResult};
use bpa_types::{BloodPressure, PatientId};
use chrono::{DateTime, Utc};
use std::ops::Range;

/// One timestamped systolic/diastolic measurement for a patient.
///
/// Pressure values are stored exactly as supplied. Non-positive values are rejected by the
/// classifier rather than here, so a collaborator can hand over a faithful copy of its input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    patient_id: PatientId,
    timestamp: DateTime<Utc>,
    systolic: i32,
    diastolic: i32,
}

impl Reading {
    pub fn new(
        patient_id: PatientId,
        timestamp: DateTime<Utc>,
        systolic: i32,
        diastolic: i32,
    ) -> Self {
        Self {
            patient_id,
            timestamp,
            systolic,
            diastolic,
        }
    }

    pub fn from_pressure(
        patient_id: PatientId,
        timestamp: DateTime<Utc>,
        pressure: BloodPressure,
    ) -> Self {
        Self::new(patient_id, timestamp, pressure.systolic, pressure.diastolic)
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn systolic(&self) -> i32 {
        self.systolic
    }

    pub fn diastolic(&self) -> i32 {
        self.diastolic
    }

    pub fn pressure(&self) -> BloodPressure {
        BloodPressure::new(self.systolic, self.diastolic)
    }
}

/// A borrowed, timestamp-ordered view over one patient's readings.
#[derive(Clone, Copy, Debug)]
pub struct ReadingSeries<'a> {
    readings: &'a [Reading],
}

impl<'a> ReadingSeries<'a> {
    /// Wraps `readings` after checking that timestamps never decrease.
    ///
    /// Equal timestamps are allowed and keep their supplied order.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::InvalidInputOrder`] with the index of the first reading that is
    /// earlier than its predecessor.
    pub fn new(readings: &'a [Reading]) -> AlertResult<Self> {
        if let Some(pos) = readings
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(AlertError::InvalidInputOrder { index: pos + 1 });
        }
        Ok(Self { readings })
    }

    /// Like [`ReadingSeries::new`], additionally requiring every reading to belong to `patient_id`.
    pub fn for_patient(readings: &'a [Reading], patient_id: &PatientId) -> AlertResult<Self> {
        if let Some(index) = readings.iter().position(|r| r.patient_id != *patient_id) {
            return Err(AlertError::MixedPatients {
                index,
                expected: patient_id.to_string(),
                found: readings[index].patient_id.to_string(),
            });
        }
        Self::new(readings)
    }

    pub fn readings(&self) -> &'a [Reading] {
        self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Index range of the readings with `start <= timestamp`, and `timestamp < end` when an
    /// end is given.
    pub fn index_range(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Range<usize> {
        let lo = self.readings.partition_point(|r| r.timestamp < start);
        let hi = match end {
            Some(end) => self.readings.partition_point(|r| r.timestamp < end),
            None => self.readings.len(),
        };
        lo..hi.max(lo)
    }

    /// Readings with `start <= timestamp`, and `timestamp < end` when an end is given.
    pub fn between(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ReadingSeries<'a> {
        ReadingSeries {
            readings: &self.readings[self.index_range(start, end)],
        }
    }

    /// Readings with `timestamp >= start`.
    pub fn since(&self, start: DateTime<Utc>) -> ReadingSeries<'a> {
        self.between(start, None)
    }
}
