//! Validated value types shared by the blood pressure alert crates.
//!
//! These types sit at the boundary between raw input (CSV cells, CLI arguments) and the alert
//! engine. Once constructed they are guaranteed to be well-formed, so the engine never has to
//! re-check identifier shape or pressure syntax.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating a [`PatientId`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatientIdError {
    /// The input was empty or contained only whitespace
    #[error("patient id cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing a [`BloodPressure`] from its `SYS/DIA` form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PressureError {
    #[error("blood pressure must be written as SYS/DIA, got: '{0}'")]
    Malformed(String),
    #[error("blood pressure component is not an integer: '{0}'")]
    NotANumber(String),
}

/// Identifier of the patient a reading belongs to.
///
/// The identifier is trimmed of leading and trailing whitespace during construction and must
/// contain at least one character afterwards. Its content is otherwise opaque: numeric ids from
/// a spreadsheet export and UUIDs from a record system are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new `PatientId` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`PatientIdError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, PatientIdError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatientIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PatientId {
    type Err = PatientIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A systolic/diastolic pair as written on a cuff display, e.g. `185/115`.
///
/// Parsing only checks syntax. Whether the values are physiologically plausible is decided by
/// the alert engine, which rejects non-positive values at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: i32,
    pub diastolic: i32,
}

impl BloodPressure {
    pub fn new(systolic: i32, diastolic: i32) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = PressureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (systolic, diastolic) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| PressureError::Malformed(s.to_owned()))?;

        let parse = |part: &str| {
            let part = part.trim();
            part.parse::<i32>()
                .map_err(|_| PressureError::NotANumber(part.to_owned()))
        };

        Ok(Self::new(parse(systolic)?, parse(diastolic)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_id_is_trimmed() {
        let id = PatientId::new("  42 ").expect("valid id");
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn patient_id_rejects_blank_input() {
        assert_eq!(PatientId::new("   "), Err(PatientIdError::Empty));
        assert_eq!("".parse::<PatientId>(), Err(PatientIdError::Empty));
    }

    #[test]
    fn patient_id_deserialisation_validates() {
        let id: PatientId = serde_json::from_str("\" 7 \"").expect("deserialise");
        assert_eq!(id.as_str(), "7");

        let err = serde_json::from_str::<PatientId>("\"  \"").expect_err("should reject blank");
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn parses_blood_pressure_with_whitespace() {
        let bp: BloodPressure = " 185 / 115 ".parse().expect("parse pressure");
        assert_eq!(bp, BloodPressure::new(185, 115));
        assert_eq!(bp.to_string(), "185/115");
    }

    #[test]
    fn keeps_non_positive_values_for_later_validation() {
        let bp: BloodPressure = "0/-5".parse().expect("syntax is valid");
        assert_eq!(bp, BloodPressure::new(0, -5));
    }

    #[test]
    fn rejects_malformed_blood_pressure() {
        let err = "185-115".parse::<BloodPressure>().expect_err("no separator");
        assert!(matches!(err, PressureError::Malformed(s) if s == "185-115"));

        let err = "abc/90".parse::<BloodPressure>().expect_err("not a number");
        assert!(matches!(err, PressureError::NotANumber(s) if s == "abc"));

        let err = "140/".parse::<BloodPressure>().expect_err("missing diastolic");
        assert!(matches!(err, PressureError::NotANumber(s) if s.is_empty()));
    }
}
