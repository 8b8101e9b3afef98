//! Point-in-time state reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// UTC timestamp carried by state snapshots.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Every property of one thing, read at `taken_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub name: String,
    pub taken_at: Timestamp,
    pub properties: BTreeMap<String, Value>,
}

impl StateSnapshot {
    /// Snapshot taken now.
    pub fn new(name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            taken_at: now(),
            properties,
        }
    }

    /// Whether the property values differ from `previous`, ignoring timestamps.
    #[must_use]
    pub fn differs_from(&self, previous: &BTreeMap<String, Value>) -> bool {
        &self.properties != previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(power: bool) -> BTreeMap<String, Value> {
        BTreeMap::from([("power".to_string(), Value::Boolean(power))])
    }

    #[test]
    fn should_stamp_snapshot_with_current_utc_time() {
        let before = Utc::now();
        let snapshot = StateSnapshot::new("tank", properties(false));
        assert!(snapshot.taken_at >= before);
        assert!(snapshot.taken_at <= Utc::now());
    }

    #[test]
    fn should_compare_properties_only() {
        let snapshot = StateSnapshot::new("tank", properties(true));
        assert!(!snapshot.differs_from(&properties(true)));
        assert!(snapshot.differs_from(&properties(false)));
    }

    #[test]
    fn should_serialize_properties_as_json_object() {
        let snapshot = StateSnapshot::new("tank", properties(true));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["name"], "tank");
        assert_eq!(json["properties"]["power"], true);
        assert!(json["taken_at"].is_string());
    }
}
