//! Mapping between Teamwork's v1 JSON payloads and model records.
//!
//! The API speaks kebab-case (`todo-list-id`, `creator-firstname`); models
//! use the field names of their descriptors.

use serde::Serialize;
use serde_json::Value as JsonValue;
use teamwork_model::{json_to_record, json_to_value, Record, Value};

use crate::models::Log;

/// The first of `keys` holding something other than null.
fn pick(json: &JsonValue, keys: &[&str]) -> Value {
    keys.iter()
        .filter_map(|key| json.get(*key))
        .find(|value| !value.is_null())
        .cloned()
        .map(json_to_value)
        .unwrap_or_default()
}

/// Insert `value` unless it is undefined.
fn put(record: &mut Record, key: &str, value: Value) {
    if !value.is_undefined() {
        record.insert(key.to_string(), value);
    }
}

/// A nested record, or undefined when it would have no id.
fn nested(fields: Record) -> Value {
    match fields.get("id") {
        Some(id) if !id.is_undefined() && !id.is_null() => Value::Map(fields),
        _ => Value::Undefined,
    }
}

/// `"12,34"` names several people; keep the first.
fn first_id(value: Value) -> Value {
    match value {
        Value::String(s) => match s.split(',').next().map(str::trim) {
            Some(first) if !first.is_empty() => Value::from(first),
            _ => Value::Undefined,
        },
        other => other,
    }
}

pub fn project_record(json: &JsonValue) -> Record {
    json_to_record(json.clone())
}

pub fn tasklist_record(json: &JsonValue) -> Record {
    let mut record = Record::new();
    put(&mut record, "id", pick(json, &["id"]));
    put(&mut record, "name", pick(json, &["name"]));
    put(&mut record, "description", pick(json, &["description"]));
    put(&mut record, "domain", pick(json, &["domain"]));
    put(&mut record, "complete", pick(json, &["complete"]));
    put(&mut record, "private", pick(json, &["private"]));
    put(
        &mut record,
        "uncompletedCount",
        pick(json, &["uncompleted-count", "uncompletedCount"]),
    );

    let mut project = Record::new();
    put(&mut project, "id", pick(json, &["projectId", "project-id"]));
    put(&mut project, "name", pick(json, &["projectName", "project-name"]));
    put(&mut record, "project", nested(project));
    record
}

pub fn person_record(json: &JsonValue) -> Record {
    let mut record = Record::new();
    put(&mut record, "id", pick(json, &["id"]));
    put(&mut record, "firstName", pick(json, &["first-name", "firstName"]));
    put(&mut record, "lastName", pick(json, &["last-name", "lastName"]));
    put(&mut record, "avatar", pick(json, &["avatar-url", "avatar"]));
    put(&mut record, "username", pick(json, &["user-name", "username"]));
    record
}

pub fn task_record(json: &JsonValue) -> Record {
    let mut record = Record::new();
    put(&mut record, "id", pick(json, &["id"]));
    put(&mut record, "title", pick(json, &["title", "content"]));
    put(&mut record, "description", pick(json, &["description"]));
    put(&mut record, "status", pick(json, &["status"]));
    put(&mut record, "priority", pick(json, &["priority"]));
    put(&mut record, "progress", pick(json, &["progress"]));
    put(&mut record, "tags", pick(json, &["tags"]));

    let mut tasklist = Record::new();
    put(&mut tasklist, "id", pick(json, &["todo-list-id"]));
    put(&mut tasklist, "name", pick(json, &["todo-list-name"]));
    put(&mut record, "tasklist", nested(tasklist));

    let mut project = Record::new();
    put(&mut project, "id", pick(json, &["project-id"]));
    put(&mut project, "name", pick(json, &["project-name"]));
    put(&mut record, "project", nested(project));

    let mut author = Record::new();
    put(&mut author, "id", pick(json, &["creator-id"]));
    put(&mut author, "firstName", pick(json, &["creator-firstname"]));
    put(&mut author, "lastName", pick(json, &["creator-lastname"]));
    put(&mut record, "author", nested(author));

    let mut assigned = Record::new();
    put(&mut assigned, "id", first_id(pick(json, &["responsible-party-id"])));
    put(
        &mut assigned,
        "firstName",
        pick(json, &["responsible-party-firstname"]),
    );
    put(
        &mut assigned,
        "lastName",
        pick(json, &["responsible-party-lastname"]),
    );
    put(&mut record, "assigned", nested(assigned));
    record
}

pub fn log_record(json: &JsonValue) -> Record {
    let mut record = Record::new();
    put(&mut record, "id", pick(json, &["id"]));
    put(&mut record, "minutes", pick(json, &["minutes"]));
    put(&mut record, "hours", pick(json, &["hours"]));
    put(&mut record, "description", pick(json, &["description"]));
    put(&mut record, "date", pick(json, &["date"]));
    put(&mut record, "isBilled", pick(json, &["isbillable", "isBilled"]));

    let mut author = Record::new();
    put(&mut author, "id", pick(json, &["person-id"]));
    put(&mut author, "firstName", pick(json, &["person-first-name"]));
    put(&mut author, "lastName", pick(json, &["person-last-name"]));
    put(&mut record, "author", nested(author));

    let mut task = Record::new();
    put(&mut task, "id", pick(json, &["todo-item-id"]));
    put(&mut task, "title", pick(json, &["todo-item-name"]));
    put(&mut record, "task", nested(task));
    record
}

/// Body of `POST /tasks/{id}/time_entries.json`.
#[derive(Debug, Serialize)]
pub struct TimeEntryBody {
    #[serde(rename = "time-entry")]
    pub entry: TimeEntry,
}

#[derive(Debug, Serialize)]
pub struct TimeEntry {
    pub description: String,
    #[serde(rename = "person-id", skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    /// `YYYYMMDD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub hours: String,
    pub minutes: String,
    pub isbillable: bool,
}

impl TimeEntryBody {
    pub fn from_log(log: &Log) -> Self {
        let date = log.date().copied().unwrap_or_else(chrono::Utc::now);
        Self {
            entry: TimeEntry {
                description: log.description().unwrap_or_default().to_string(),
                person_id: log.author().and_then(|a| a.id()).map(|id| id.to_string()),
                date: date.format("%Y%m%d").to_string(),
                time: date.format("%H:%M").to_string(),
                hours: log.hours().to_string(),
                minutes: log.minutes().to_string(),
                isbillable: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Person, Task, Tasklist};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use teamwork_model::ModelType;

    #[test]
    fn tasklist_from_api() {
        let json = json!({
            "id": "101",
            "name": "Sprint 4",
            "complete": false,
            "uncompleted-count": "3",
            "projectId": "9",
            "projectName": "Website"
        });

        let tasklist = Tasklist::from_record(tasklist_record(&json)).unwrap();
        assert_eq!(tasklist.id(), Some(101));
        assert_eq!(tasklist.uncompleted_count(), 3);
        assert_eq!(tasklist.project().unwrap().id(), Some(9));
    }

    #[test]
    fn task_from_api_uses_content_and_first_responsible_party() {
        let json = json!({
            "id": 5,
            "content": "Fix bug",
            "progress": 20,
            "priority": "",
            "todo-list-id": 101,
            "todo-list-name": "Sprint 4",
            "creator-id": "1",
            "creator-firstname": "Ada",
            "creator-lastname": "Lovelace",
            "responsible-party-id": "2,3",
            "responsible-party-firstname": "Grace",
            "responsible-party-lastname": "Hopper"
        });

        let task = Task::from_record(task_record(&json)).unwrap();
        assert_eq!(task.title(), "Fix bug");
        assert_eq!(task.priority(), None);
        assert_eq!(task.tasklist().unwrap().name(), "Sprint 4");
        assert_eq!(task.author().unwrap().initialed(), "Ada L.");
        assert_eq!(task.assigned().unwrap().id(), Some(2));
        assert!(task.project().is_none());
    }

    #[test]
    fn person_from_profile() {
        let json = json!({
            "id": "7",
            "first-name": "Grace",
            "last-name": "Hopper",
            "user-name": "grace"
        });
        let person = Person::from_record(person_record(&json)).unwrap();
        assert_eq!(person.name(), "Grace Hopper");
    }

    #[test]
    fn time_entry_body_shape() {
        let author = Person::from_record(person_record(&json!({
            "id": 7, "first-name": "Grace", "last-name": "Hopper"
        })))
        .unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 6, 9, 5, 0).unwrap();
        let log = Log::create(95, start, Some(&author), Some("Review")).unwrap();

        let body = serde_json::to_value(TimeEntryBody::from_log(&log)).unwrap();
        assert_eq!(
            body,
            json!({
                "time-entry": {
                    "description": "Review",
                    "person-id": "7",
                    "date": "20240506",
                    "time": "09:05",
                    "hours": "1",
                    "minutes": "35",
                    "isbillable": false
                }
            })
        );
    }
}
