//! The persisted CLI state: a [`ConfigStore`] checkpointed to a
//! [`DocumentStore`].

use std::sync::Arc;

use teamwork_api::{Installation, Person, Project, Session, Task, Tasklist};
use teamwork_config::{ConfigError, ConfigStore, TypeRegistry};
use teamwork_json_store::DocumentStore;
use teamwork_model::{Taggable, Value};

use crate::actions::{self, ActionLog, ACTIONS_KEY};
use crate::error::CliError;

pub const AUTH_KEY: &str = "auth";
pub const INSTALLATION_KEY: &str = "installation";
pub const USER_KEY: &str = "user";
pub const PROJECT_KEY: &str = "project";
pub const TASKLIST_KEY: &str = "tasklist";
pub const TASK_KEY: &str = "task";

/// Keys dropped by `tw clear`.
pub const SELECTION_KEYS: [&str; 3] = [PROJECT_KEY, TASKLIST_KEY, TASK_KEY];

/// Every type the CLI persists: domain models, the session and the action
/// history.
pub fn registry() -> Result<TypeRegistry, ConfigError> {
    let mut registry = teamwork_api::registry()?;
    actions::register(&mut registry)?;
    Ok(registry)
}

pub struct State<D> {
    document: D,
    config: ConfigStore,
}

impl<D: DocumentStore> State<D> {
    /// Read the saved document. A missing one gives an empty config.
    pub fn load(document: D, registry: Arc<TypeRegistry>) -> Result<Self, CliError> {
        let config = match document.load()? {
            Some(json) => ConfigStore::from_json(registry, json)?,
            None => ConfigStore::new(registry),
        };
        tracing::debug!(keys = config.values().len(), "loaded config");
        Ok(Self { document, config })
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Pack the config and write it out.
    pub fn save(&mut self) -> Result<(), CliError> {
        let json = self.config.to_json()?;
        self.document.save(&json)?;
        tracing::debug!("saved config");
        Ok(())
    }

    /// Delete the saved document and empty the config.
    pub fn reset(&mut self) -> Result<bool, CliError> {
        self.config.clear();
        Ok(self.document.delete()?)
    }

    fn current<T: Taggable + Clone>(&self, key: &str) -> Option<T> {
        self.config.get_as::<T>(key).cloned()
    }

    pub fn session(&self) -> Option<Session> {
        self.current(AUTH_KEY)
    }

    pub fn require_session(&self) -> Result<Session, CliError> {
        self.session().ok_or(CliError::NotLoggedIn)
    }

    pub fn installation(&self) -> Option<Installation> {
        self.current(INSTALLATION_KEY)
    }

    pub fn user(&self) -> Option<Person> {
        self.current(USER_KEY)
    }

    pub fn project(&self) -> Option<Project> {
        self.current(PROJECT_KEY)
    }

    pub fn tasklist(&self) -> Option<Tasklist> {
        self.current(TASKLIST_KEY)
    }

    pub fn task(&self) -> Option<Task> {
        self.current(TASK_KEY)
    }

    pub fn actions(&self) -> ActionLog {
        self.current(ACTIONS_KEY).unwrap_or_default()
    }

    pub fn set_actions(&mut self, actions: ActionLog) {
        self.put(ACTIONS_KEY, actions);
    }

    /// Store `value` as a typed instance under `key`.
    pub fn put<T: Taggable>(&mut self, key: &str, value: T) {
        self.config.set(key, Value::instance(value));
    }

    /// Select a project, forgetting the tasklist and task under the old one.
    pub fn select_project(&mut self, project: Project) {
        self.put(PROJECT_KEY, project);
        self.config.remove(TASKLIST_KEY);
        self.config.remove(TASK_KEY);
    }

    pub fn select_tasklist(&mut self, tasklist: Tasklist) {
        self.put(TASKLIST_KEY, tasklist);
        self.config.remove(TASK_KEY);
    }

    pub fn select_task(&mut self, task: Task) {
        self.put(TASK_KEY, task);
    }

    /// Drop the current selections; authentication stays.
    pub fn clear_selections(&mut self) {
        for key in SELECTION_KEYS {
            self.config.remove(key);
        }
    }
}
