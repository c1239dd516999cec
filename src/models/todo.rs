use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            updated_at: None,
        }
    }
}

/// Result of `TodoStore::complete` for a todo that exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Completed(Todo),
    AlreadyCompleted(Todo),
}

/// Result of `TodoStore::update`: the todo after the change plus the text it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub previous: String,
    pub todo: Todo,
}

/// Parse an RFC 3339 timestamp, falling back to a naive ISO-8601 local time
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] DateTime<Utc>);

            let wrapped = Option::<Wrapper>::deserialize(deserializer)?;
            Ok(wrapped.map(|Wrapper(ts)| ts))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_new_todo_is_pending() {
        let todo = Todo::new(1, "Write docs");
        assert_eq!(todo.id, 1);
        assert_eq!(todo.description, "Write docs");
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
        assert!(todo.updated_at.is_none());
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let todo = Todo::new(3, "牛乳を買う");
        let json = serde_json::to_string(&todo).unwrap();

        assert!(json.contains("\"牛乳を買う\""));
        assert!(!json.contains("completed_at"));
        assert!(!json.contains("updated_at"));
    }

    #[test]
    fn test_deserialize_legacy_record() {
        // offset のない古い形式 + completed 欠落
        let json = r#"{
            "id": 4,
            "description": "Legacy",
            "created_at": "2024-03-01T09:15:30.123456",
            "completed_at": null
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();

        assert_eq!(todo.id, 4);
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
        let local = todo.created_at.with_timezone(&Local);
        assert_eq!(local.year(), 2024);
        assert_eq!(local.hour(), 9);
        assert_eq!(local.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-10T12:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-10T21:00:00+09:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let json = r#"{"id": 1, "description": "x", "completed": false, "created_at": "soon"}"#;
        assert!(serde_json::from_str::<Todo>(json).is_err());
    }
}
