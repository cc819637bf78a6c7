use crate::timestamp::parse_timestamp;
use crate::{ReadingsError, ReadingsResult};
use bpa_core::Reading;
use bpa_types::{BloodPressure, PatientId};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ReadingRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "TimeStamp")]
    timestamp: String,
    #[serde(rename = "BloodPressure")]
    blood_pressure: String,
}

/// All readings of a CSV export, sorted by timestamp.
///
/// Rows for different patients may be interleaved. Sorting is stable, so readings sharing a
/// timestamp keep their file order.
#[derive(Debug, Clone, Default)]
pub struct ReadingLog {
    readings: Vec<Reading>,
}

impl ReadingLog {
    /// Parses a CSV document with a header row.
    ///
    /// Column order does not matter and extra columns are ignored. Surrounding whitespace in
    /// cells is trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first row that cannot be decoded, with its 1-based data row number.
    pub fn from_reader<R: Read>(reader: R) -> ReadingsResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut readings = Vec::new();
        for (i, result) in csv_reader.deserialize::<ReadingRow>().enumerate() {
            let row = i + 1;
            let record = result?;
            readings.push(row_to_reading(row, record)?);
        }

        Ok(Self::from_readings(readings))
    }

    /// Opens and parses a CSV file.
    pub fn from_path(path: &Path) -> ReadingsResult<Self> {
        let file = std::fs::File::open(path)?;
        let log = Self::from_reader(std::io::BufReader::new(file))?;
        if log.is_empty() {
            tracing::warn!("reading log {} contains no readings", path.display());
        }
        Ok(log)
    }

    /// Wraps readings from another source, sorting them by timestamp.
    pub fn from_readings(mut readings: Vec<Reading>) -> Self {
        let sorted = readings
            .windows(2)
            .all(|pair| pair[0].timestamp() <= pair[1].timestamp());
        if !sorted {
            tracing::warn!("reading log was not in timestamp order; sorting");
            readings.sort_by_key(Reading::timestamp);
        }
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct patient ids in order of first appearance.
    pub fn patient_ids(&self) -> Vec<PatientId> {
        let mut seen = HashSet::new();
        self.readings
            .iter()
            .map(Reading::patient_id)
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}

fn row_to_reading(row: usize, record: ReadingRow) -> ReadingsResult<Reading> {
    let patient_id = PatientId::new(&record.id)
        .map_err(|source| ReadingsError::InvalidPatientId { row, source })?;

    let timestamp =
        parse_timestamp(&record.timestamp).ok_or_else(|| ReadingsError::InvalidTimestamp {
            row,
            value: record.timestamp.clone(),
        })?;

    let pressure: BloodPressure = record
        .blood_pressure
        .parse()
        .map_err(|source| ReadingsError::InvalidPressure { row, source })?;

    Ok(Reading::from_pressure(patient_id, timestamp, pressure))
}
