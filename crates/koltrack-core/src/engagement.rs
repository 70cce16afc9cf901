//! Engagement time series for a tracked post.
//!
//! Each tracked post carries an append-ordered log of point-in-time
//! engagement snapshots. The log is stored as one JSON document and is
//! always read and rewritten in full — there are no partial updates, so
//! concurrent writers resolve as last-writer-wins at the storage layer.

use chrono::{DateTime, FixedOffset, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Storage schema version written for observation logs.
const SCHEMA_VERSION: u32 = 1;

/// Fixed Hong Kong offset (+08:00).
///
/// Observation timestamps are recorded in Hong Kong civil time because the
/// dashboard displays them without further conversion. Hong Kong observes
/// no DST, so a fixed offset is exact.
#[must_use]
pub fn hong_kong_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset")
}

/// Current wall-clock time in the fixed Hong Kong offset.
#[must_use]
pub fn now_hong_kong() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&hong_kong_offset())
}

/// One timestamped engagement snapshot for a tracked post.
///
/// `likes` and `views` default to zero when absent from stored JSON; older
/// records did not always carry both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub views: u64,
}

/// Counts taken from the newest observation of a log.
///
/// An empty log yields the all-zero placeholder. Aggregate totals rely on
/// this: a post with no observations contributes zero rather than being
/// excluded from the sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatestCounts {
    pub likes: u64,
    pub views: u64,
}

/// Append-ordered observation history for one post.
///
/// Observations are kept in arrival order. An append whose timestamp
/// precedes the current tail is legal and is NOT sorted into place; no
/// de-duplication is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationLog {
    observations: Vec<Observation>,
}

impl ObservationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Appends an observation to the end of the log. Always succeeds.
    pub fn append(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Counts from the last-appended observation, or the zero placeholder
    /// for an empty log.
    #[must_use]
    pub fn latest(&self) -> LatestCounts {
        self.observations
            .last()
            .map(|o| LatestCounts {
                likes: o.likes,
                views: o.views,
            })
            .unwrap_or_default()
    }

    /// The last-appended observation, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// The full ordered sequence.
    #[must_use]
    pub fn all(&self) -> &[Observation] {
        &self.observations
    }

    /// Removes the observation at `index`, shifting later entries down.
    ///
    /// Returns `false` without modifying the log when `index` is out of
    /// range. Position removal is the only edit the owning post exposes;
    /// everything else is append-only.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.observations.len() {
            return false;
        }
        self.observations.remove(index);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[derive(Serialize)]
struct StoredLog<'a> {
    v: u32,
    observations: &'a [Observation],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLogIn {
    Versioned {
        v: u32,
        observations: Vec<Observation>,
    },
    // Bare arrays predate the versioned wrapper; accepted on read and
    // rewritten in wrapped form on the next full write.
    Legacy(Vec<Observation>),
}

impl Serialize for ObservationLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredLog {
            v: SCHEMA_VERSION,
            observations: &self.observations,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObservationLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StoredLogIn::deserialize(deserializer)? {
            StoredLogIn::Versioned {
                v: SCHEMA_VERSION,
                observations,
            }
            | StoredLogIn::Legacy(observations) => Ok(Self { observations }),
            StoredLogIn::Versioned { v, .. } => Err(D::Error::custom(format!(
                "unsupported observation log version {v}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(rfc3339: &str, likes: u64, views: u64) -> Observation {
        Observation {
            date: DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp"),
            likes,
            views,
        }
    }

    #[test]
    fn latest_on_empty_log_is_the_zero_placeholder() {
        let log = ObservationLog::new();
        assert_eq!(log.latest(), LatestCounts { likes: 0, views: 0 });
        assert!(log.last().is_none());
    }

    #[test]
    fn latest_is_the_last_appended_regardless_of_timestamp() {
        let mut log = ObservationLog::new();
        log.append(obs("2024-08-02T10:00:00+08:00", 1000, 5000));
        // Earlier timestamp appended later: stays at the tail, unsorted.
        log.append(obs("2024-07-01T10:00:00+08:00", 1500, 7500));

        assert_eq!(
            log.latest(),
            LatestCounts {
                likes: 1500,
                views: 7500
            }
        );
        assert_eq!(log.all().len(), 2);
        assert_eq!(log.all()[1].likes, 1500);
    }

    #[test]
    fn remove_at_drops_exactly_one_element() {
        let mut log = ObservationLog::from_observations(vec![
            obs("2024-08-01T00:00:00+08:00", 1, 10),
            obs("2024-08-02T00:00:00+08:00", 2, 20),
            obs("2024-08-03T00:00:00+08:00", 3, 30),
        ]);
        assert!(log.remove_at(1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.all()[1].likes, 3);
    }

    #[test]
    fn remove_at_out_of_range_is_a_no_op() {
        let mut log = ObservationLog::from_observations(vec![obs(
            "2024-08-01T00:00:00+08:00",
            1,
            10,
        )]);
        assert!(!log.remove_at(1));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn serializes_in_versioned_form() {
        let log = ObservationLog::from_observations(vec![obs(
            "2024-08-01T09:30:00+08:00",
            1000,
            5000,
        )]);
        let value = serde_json::to_value(&log).expect("serialize");
        assert_eq!(value["v"], 1);
        assert_eq!(value["observations"][0]["likes"], 1000);
        assert_eq!(value["observations"][0]["views"], 5000);
    }

    #[test]
    fn versioned_form_round_trips() {
        let log = ObservationLog::from_observations(vec![
            obs("2024-08-01T09:30:00+08:00", 1000, 5000),
            obs("2024-08-26T21:15:00+08:00", 1500, 7500),
        ]);
        let value = serde_json::to_value(&log).expect("serialize");
        let parsed: ObservationLog = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, log);
    }

    #[test]
    fn legacy_bare_array_is_accepted() {
        let raw = serde_json::json!([
            { "date": "2023-08-02T00:00:00+08:00", "likes": 1000, "views": 5000 },
            { "date": "2023-08-26T00:00:00+08:00", "likes": 1500, "views": 7500 }
        ]);
        let parsed: ObservationLog = serde_json::from_value(raw).expect("legacy parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.latest(),
            LatestCounts {
                likes: 1500,
                views: 7500
            }
        );
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let raw = serde_json::json!([{ "date": "2023-08-02T00:00:00+08:00" }]);
        let parsed: ObservationLog = serde_json::from_value(raw).expect("parse");
        assert_eq!(parsed.latest(), LatestCounts { likes: 0, views: 0 });
    }

    #[test]
    fn unknown_version_is_rejected() {
        let raw = serde_json::json!({ "v": 2, "observations": [] });
        let result = serde_json::from_value::<ObservationLog>(raw);
        assert!(result.is_err(), "expected version-2 log to be rejected");
    }

    #[test]
    fn hong_kong_offset_is_plus_eight() {
        assert_eq!(hong_kong_offset().local_minus_utc(), 8 * 3600);
    }
}
