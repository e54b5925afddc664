//! Time index and timestamp handling.
//!
//! Time steps are naive wall-clock timestamps (the input tables carry no zone).
//! The index is the sorted set of distinct demand times plus one "extended"
//! step appended after the last one, which only exists to hold each storage
//! unit's terminal energy level.

use crate::error::{GridError, GridResult};
use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a timestamp as written by the upstream table exports.
///
/// Accepts RFC 3339 (the offset is dropped after conversion to UTC),
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM`.
pub fn parse_timestamp(value: &str) -> GridResult<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    for format in TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    Err(GridError::Parse(format!(
        "unrecognized timestamp '{}'; use RFC3339 or 'YYYY-MM-DD HH:MM:SS'",
        value
    )))
}

/// Serde adapter writing `YYYY-MM-DD HH:MM:SS` and reading any format
/// accepted by [`parse_timestamp`].
pub mod timestamp {
    use super::parse_timestamp;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format("%Y-%m-%d %H:%M:%S"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Ordered time steps of one optimization horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeIndex {
    steps: Vec<NaiveDateTime>,
    extended: Vec<NaiveDateTime>,
    delta_t_hours: f64,
}

impl TimeIndex {
    /// Build the index from arbitrary (possibly repeated, unsorted) times.
    pub fn from_times<I>(times: I, delta_t_hours: f64) -> GridResult<Self>
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        if !(delta_t_hours.is_finite() && delta_t_hours > 0.0) {
            return Err(GridError::Validation(format!(
                "time step length must be positive, got {} h",
                delta_t_hours
            )));
        }
        let steps: Vec<NaiveDateTime> = times.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let last = *steps
            .last()
            .ok_or_else(|| GridError::Validation("demand series contains no time steps".into()))?;
        let end = Duration::try_milliseconds((delta_t_hours * 3_600_000.0).round() as i64)
            .and_then(|step| last.checked_add_signed(step))
            .ok_or_else(|| {
                GridError::Validation(format!(
                    "time step of {} h runs past the representable date range",
                    delta_t_hours
                ))
            })?;
        let mut extended = steps.clone();
        extended.push(end);
        Ok(Self {
            steps,
            extended,
            delta_t_hours,
        })
    }

    /// Time steps of the horizon.
    pub fn steps(&self) -> &[NaiveDateTime] {
        &self.steps
    }

    /// Time steps plus the trailing step that holds terminal storage levels.
    pub fn extended(&self) -> &[NaiveDateTime] {
        &self.extended
    }

    /// Step length Δt in hours.
    pub fn delta_t_hours(&self) -> f64 {
        self.delta_t_hours
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of `time` in the (non-extended) index.
    pub fn position(&self, time: &NaiveDateTime) -> Option<usize> {
        self.steps.binary_search(time).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn index_sorts_and_dedups_times() {
        let index = TimeIndex::from_times(vec![at(2), at(0), at(1), at(0)], 1.0).unwrap();
        assert_eq!(index.steps(), &[at(0), at(1), at(2)]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.position(&at(1)), Some(1));
        assert_eq!(index.position(&at(5)), None);
    }

    #[test]
    fn extended_index_appends_one_step() {
        let index = TimeIndex::from_times(vec![at(0), at(1)], 1.0).unwrap();
        assert_eq!(index.extended(), &[at(0), at(1), at(2)]);

        let half = TimeIndex::from_times(vec![at(0)], 0.5).unwrap();
        assert_eq!(half.extended()[1], at(0) + Duration::minutes(30));
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = TimeIndex::from_times(Vec::new(), 1.0).unwrap_err();
        assert!(matches!(err, GridError::Validation(_)));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        assert!(TimeIndex::from_times(vec![at(0)], 0.0).is_err());
        assert!(TimeIndex::from_times(vec![at(0)], -1.0).is_err());
    }

    #[test]
    fn oversized_step_is_rejected() {
        let err = TimeIndex::from_times(vec![at(0)], 1e10).unwrap_err();
        assert!(matches!(err, GridError::Validation(_)));
        assert!(TimeIndex::from_times(vec![at(0)], 1e300).is_err());
    }

    #[test]
    fn parses_common_timestamp_layouts() {
        assert_eq!(parse_timestamp("2023-01-01 05:00:00").unwrap(), at(5));
        assert_eq!(parse_timestamp("2023-01-01T05:00:00").unwrap(), at(5));
        assert_eq!(parse_timestamp("2023-01-01T05:00:00Z").unwrap(), at(5));
        assert_eq!(parse_timestamp(" 2023-01-01 05:00 ").unwrap(), at(5));
        assert!(parse_timestamp("yesterday").is_err());
    }
}
