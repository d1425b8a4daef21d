//! The remote service seam.

use serde::{Deserialize, Serialize};
use teamwork_config::{ConfigError, Serializer};
use teamwork_model::{json_to_value, value_to_json, Taggable};

use crate::error::Error;
use crate::models::{Log, Person, Project, Task, Tasklist};

/// Registered type name of [`Session`].
pub const SESSION_TYPE: &str = "Session";

/// Credentials for an authenticated installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub installation: String,
}

impl Session {
    pub fn new(token: impl Into<String>, installation: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            installation: installation.into(),
        }
    }

    /// Persists the session as its plain serde form.
    pub fn serializer() -> Serializer {
        Serializer::typed::<Session>(
            |session| {
                serde_json::to_value(session)
                    .map(json_to_value)
                    .map_err(|e| ConfigError::Serialize {
                        name: SESSION_TYPE.to_string(),
                        message: e.to_string(),
                    })
            },
            |payload| {
                let json = value_to_json(&payload)?;
                serde_json::from_value(json).map_err(|e| ConfigError::Deserialize {
                    name: SESSION_TYPE.to_string(),
                    message: e.to_string(),
                })
            },
        )
    }
}

impl Taggable for Session {
    fn type_name(&self) -> &str {
        SESSION_TYPE
    }
}

/// Everything the CLI asks of Teamwork.
pub trait RemoteService {
    /// Exchange credentials for a session on `installation`.
    fn login(&mut self, email: &str, password: &str, installation: &str)
        -> Result<Session, Error>;

    /// The authenticated user.
    fn profile(&self) -> Result<Person, Error>;

    fn projects(&self) -> Result<Vec<Project>, Error>;

    fn tasklists(&self, project_id: i64) -> Result<Vec<Tasklist>, Error>;

    fn tasks(&self, tasklist_id: i64) -> Result<Vec<Task>, Error>;

    fn task(&self, id: i64) -> Result<Task, Error>;

    fn logs(&self, task_id: i64) -> Result<Vec<Log>, Error>;

    /// Record time against a task. Returns the entry with its new id.
    fn log_time(&mut self, task_id: i64, log: &Log) -> Result<Log, Error>;

    fn delete_log(&mut self, log_id: i64) -> Result<(), Error>;
}
