//! Data Model
//!
//! Wire types exchanged with the Home Dashboard API. All entities are owned
//! by the server; the client only ever holds read-only copies.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A trackable household item with an optional cleaning schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Appliance {
    pub id: i64,
    pub name: String,
    /// `None` means the appliance is unscheduled
    pub cleaning_interval_days: Option<u32>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Appliance {
    /// Whether the appliance has a recurring cleaning interval
    pub fn is_scheduled(&self) -> bool {
        self.cleaning_interval_days.is_some()
    }
}

/// One scheduled cleaning occurrence for an appliance
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub appliance_id: i64,
    pub due_date: NaiveDate,
    pub completed: bool,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A task is overdue when it is still open and its due date,
    /// taken at midnight UTC, lies strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && due_instant(self.due_date) < now
    }

    /// `completed_at` must be present exactly when `completed` is set
    pub fn is_consistent(&self) -> bool {
        self.completed == self.completed_at.is_some()
    }
}

/// A due task joined with its owning appliance, as listed on the dashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DueTask {
    pub id: i64,
    pub due_date: NaiveDate,
    pub completed: bool,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
    pub appliance: Appliance,
}

/// A single room temperature measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemperatureReading {
    pub id: i64,
    #[serde(with = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    pub value_c: f64,
    pub room: String,
}

/// Server-computed read projection backing the dashboard view
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub due_tasks: Vec<DueTask>,
    #[serde(default)]
    pub recent_temps: Vec<TemperatureReading>,
    /// Keyed by room; `BTreeMap` keeps iteration in sorted room order
    #[serde(default)]
    pub recent_temps_by_room: BTreeMap<String, Vec<TemperatureReading>>,
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppliance {
    pub name: String,
    pub cleaning_interval_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntervalUpdate {
    pub cleaning_interval_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskCompletion {
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReading {
    pub value_c: f64,
    pub room: String,
}

/// Count of rows removed by a bulk delete or clear
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deleted {
    pub deleted: u64,
}

/// The instant a due date starts counting as passed
fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Timestamp codec tolerant of naive server output.
///
/// Values carrying an offset are parsed as RFC 3339; naive ISO-8601
/// date-times are taken to be UTC. Output is always RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(due: &str, completed: bool) -> Task {
        Task {
            id: 1,
            appliance_id: 1,
            due_date: due.parse().unwrap(),
            completed,
            completed_at: completed.then(|| Utc.with_ymd_and_hms(2023, 1, 2, 8, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_decode_appliance_naive_timestamp() {
        let json = r#"{"id": 3, "name": "Dishwasher", "cleaning_interval_days": 30,
                       "created_at": "2024-05-01T09:30:00.123456"}"#;
        let appliance: Appliance = serde_json::from_str(json).unwrap();
        assert_eq!(appliance.cleaning_interval_days, Some(30));
        assert_eq!(
            appliance.created_at.timestamp(),
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn test_decode_unscheduled_appliance_with_offset() {
        let json = r#"{"id": 4, "name": "Washer", "cleaning_interval_days": null,
                       "created_at": "2024-05-01T11:30:00+02:00"}"#;
        let appliance: Appliance = serde_json::from_str(json).unwrap();
        assert!(!appliance.is_scheduled());
        assert_eq!(appliance.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_decode_task_and_consistency() {
        let json = r#"{"id": 9, "appliance_id": 3, "due_date": "2023-01-01",
                       "completed": true, "completed_at": "2023-01-02T08:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.is_consistent());

        let open: Task = serde_json::from_str(
            r#"{"id": 10, "appliance_id": 3, "due_date": "2023-01-08", "completed": false, "completed_at": null}"#,
        )
        .unwrap();
        assert!(open.is_consistent());
        assert_eq!(open.completed_at, None);
    }

    #[test]
    fn test_inconsistent_task_detected() {
        let mut t = task("2023-01-01", false);
        t.completed_at = Some(Utc::now());
        assert!(!t.is_consistent());
    }

    #[test]
    fn test_task_overdue() {
        let now = Utc.with_ymd_and_hms(2023, 3, 1, 12, 0, 0).unwrap();
        assert!(task("2023-01-01", false).is_overdue(now));
        assert!(!task("2023-01-01", true).is_overdue(now));
        assert!(!task("2023-04-01", false).is_overdue(now));
    }

    #[test]
    fn test_due_today_is_overdue_after_midnight_utc() {
        let midnight = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
        assert!(!task("2023-03-01", false).is_overdue(midnight));
        assert!(task("2023-03-01", false).is_overdue(midnight + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_decode_dashboard_snapshot() {
        let json = r#"{
            "due_tasks": [{
                "id": 1, "due_date": "2023-01-01", "completed": false, "completed_at": null,
                "appliance": {"id": 1, "name": "Cat Fountain", "cleaning_interval_days": 7,
                              "created_at": "2022-12-25T00:00:00"}
            }],
            "recent_temps": [],
            "recent_temps_by_room": {
                "office": [{"id": 2, "recorded_at": "2023-01-01T10:00:00", "value_c": 18.7, "room": "office"}],
                "living": [{"id": 1, "recorded_at": "2023-01-01T09:00:00", "value_c": 20.1, "room": "living"}]
            }
        }"#;
        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.due_tasks[0].appliance.name, "Cat Fountain");
        let rooms: Vec<&str> = snapshot.recent_temps_by_room.keys().map(String::as_str).collect();
        assert_eq!(rooms, vec!["living", "office"]);
    }

    #[test]
    fn test_null_interval_is_serialized() {
        let body = serde_json::to_value(IntervalUpdate {
            cleaning_interval_days: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "cleaning_interval_days": null }));
    }

    #[test]
    fn test_rejects_garbage_timestamp() {
        let json = r#"{"id": 1, "recorded_at": "yesterday", "value_c": 1.0, "room": "x"}"#;
        assert!(serde_json::from_str::<TemperatureReading>(json).is_err());
    }
}
