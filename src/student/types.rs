//! Student record types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

/// Status assigned when the caller omits one or sends a blank value.
pub const DEFAULT_STATUS: &str = "active";

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Server-generated identifier.
    pub id: Uuid,
    /// Trimmed, non-empty name.
    pub name: String,
    /// Age, always positive.
    pub age: Age,
    /// Trimmed, non-empty course.
    pub course: String,
    /// Trimmed, non-empty year of study.
    pub year: String,
    /// Enrollment status.
    #[serde(default = "default_status")]
    pub status: String,
    /// Creation time in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A validated student that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub age: Age,
    pub course: String,
    pub year: String,
    pub status: String,
}

impl NewStudent {
    /// Assign a fresh id and the current time.
    pub fn into_student(self) -> Student {
        let now = OffsetDateTime::now_utc();
        // Stored with millisecond precision.
        let created_at = now
            .replace_millisecond(now.millisecond())
            .unwrap_or(now);

        Student {
            id: Uuid::new_v4(),
            name: self.name,
            age: self.age,
            course: self.course,
            year: self.year,
            status: self.status,
            created_at,
        }
    }
}

/// A strictly positive, finite age.
///
/// Whole values serialize as JSON integers so `20` round-trips as `20`
/// rather than `20.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Age(f64);

impl Age {
    /// Accepts only finite values greater than zero.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Age(value))
    }

    fn as_whole(self) -> Option<u64> {
        // 2^53: beyond this f64 can no longer represent every integer.
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        (self.0.fract() == 0.0 && self.0 <= MAX_EXACT).then_some(self.0 as u64)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(whole) => serializer.serialize_u64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Age {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Age::new(value)
            .ok_or_else(|| serde::de::Error::custom(format!("age must be positive, got {value}")))
    }
}
