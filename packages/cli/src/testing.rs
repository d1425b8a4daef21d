//! An in-memory [`RemoteService`] with a small seeded installation.

use std::collections::BTreeMap;

use teamwork_api::{Error, Log, Person, Project, RemoteService, Session, Task, Tasklist};
use teamwork_model::{record, ModelType, Record};

pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "fake-token";

#[derive(Debug)]
pub struct FakeRemote {
    session: Option<Session>,
    profile: Record,
    projects: Vec<Record>,
    tasklists: Vec<Record>,
    tasks: Vec<Record>,
    logs: BTreeMap<i64, (i64, Log)>,
    next_log_id: i64,
}

impl FakeRemote {
    /// One project (#1) holding one tasklist (#101) with tasks #5 and #6.
    pub fn new() -> Self {
        Self {
            session: None,
            profile: record! { "id" => 7, "firstName" => "Ada", "lastName" => "Lovelace" },
            projects: vec![
                record! { "id" => 1, "name" => "Website" },
                record! { "id" => 2, "name" => "Mobile" },
            ],
            tasklists: vec![record! {
                "id" => 101,
                "name" => "Sprint",
                "uncompletedCount" => 2,
                "project" => record! { "id" => 1, "name" => "Website" },
            }],
            tasks: vec![
                record! { "id" => 5, "title" => "Fix bug", "progress" => 50, "tasklist" => record! { "id" => 101 } },
                record! { "id" => 6, "title" => "Write docs", "tasklist" => record! { "id" => 101 } },
            ],
            logs: BTreeMap::new(),
            next_log_id: 1000,
        }
    }

    /// The session handed out by the last successful login.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Logs currently stored, oldest first.
    pub fn logged(&self) -> Vec<&Log> {
        self.logs.values().map(|(_, log)| log).collect()
    }

    fn build<T: ModelType>(record: &Record) -> Result<T, Error> {
        T::from_record(record.clone()).map_err(|source| Error::Model {
            model: T::DESCRIPTOR.name(),
            source,
        })
    }

    fn task_record(&self, id: i64) -> Option<&Record> {
        self.tasks
            .iter()
            .find(|task| task.get("id").and_then(|v| v.as_i64()) == Some(id))
    }
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_id(record: &Record, key: &str) -> Option<i64> {
    record.get(key)?.as_map()?.get("id")?.as_i64()
}

impl RemoteService for FakeRemote {
    fn login(&mut self, email: &str, password: &str, installation: &str) -> Result<Session, Error> {
        if password != PASSWORD {
            return Err(Error::Login {
                email: email.to_string(),
            });
        }
        let session = Session::new(TOKEN, installation);
        self.session = Some(session.clone());
        Ok(session)
    }

    fn profile(&self) -> Result<Person, Error> {
        Self::build(&self.profile)
    }

    fn projects(&self) -> Result<Vec<Project>, Error> {
        self.projects.iter().map(Self::build).collect()
    }

    fn tasklists(&self, project_id: i64) -> Result<Vec<Tasklist>, Error> {
        self.tasklists
            .iter()
            .filter(|list| parent_id(list, "project") == Some(project_id))
            .map(Self::build)
            .collect()
    }

    fn tasks(&self, tasklist_id: i64) -> Result<Vec<Task>, Error> {
        self.tasks
            .iter()
            .filter(|task| parent_id(task, "tasklist") == Some(tasklist_id))
            .map(Self::build)
            .collect()
    }

    fn task(&self, id: i64) -> Result<Task, Error> {
        let record = self.task_record(id).ok_or_else(|| Error::NotFound {
            resource: format!("Task #{}", id),
        })?;
        Self::build(record)
    }

    fn logs(&self, task_id: i64) -> Result<Vec<Log>, Error> {
        Ok(self
            .logs
            .values()
            .filter(|(task, _)| *task == task_id)
            .map(|(_, log)| log.clone())
            .collect())
    }

    fn log_time(&mut self, task_id: i64, log: &Log) -> Result<Log, Error> {
        let task = self.task(task_id)?;
        let id = self.next_log_id;
        self.next_log_id += 1;
        let logged = log.with_id(id).with_task(&task);
        self.logs.insert(id, (task_id, logged.clone()));
        Ok(logged)
    }

    fn delete_log(&mut self, log_id: i64) -> Result<(), Error> {
        self.logs
            .remove(&log_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                resource: format!("Time log #{}", log_id),
            })
    }
}
