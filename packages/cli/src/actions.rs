//! Undoable history of the time logged from this machine.
//!
//! Both stacks are persisted in the config under [`ACTIONS_KEY`] as a
//! registered `Actions` instance, so `tw undo` works across invocations.

use teamwork_api::{format_duration, Log, RemoteService, Task};
use teamwork_config::{ConfigError, TypeEntry, TypeRegistry};
use teamwork_model::{record, Instance, Record, Taggable, Value};

use crate::error::CliError;

/// Oldest entries are dropped past this many.
pub const MAX_COMMIT_LOG_SIZE: usize = 15;

pub const ACTIONS_KEY: &str = "actions";

const ACTIONS_TYPE: &str = "Actions";
const LOG_ACTION_TYPE: &str = "LogAction";

/// Time logged against a task.
#[derive(Clone, Debug, PartialEq)]
pub struct LogAction {
    pub task: Task,
    pub log: Log,
}

impl LogAction {
    pub fn new(task: Task, log: Log) -> Self {
        Self { task, log }
    }

    fn task_id(&self) -> Result<i64, CliError> {
        self.task
            .id()
            .ok_or_else(|| CliError::usage("The logged task has no id"))
    }

    fn undo(&self, remote: &mut dyn RemoteService) -> Result<(), CliError> {
        let id = self
            .log
            .id()
            .ok_or_else(|| CliError::usage("The time log was never saved"))?;
        remote.delete_log(id)?;
        Ok(())
    }

    /// Log the same time again. The server hands out a new id.
    fn redo(&self, remote: &mut dyn RemoteService) -> Result<LogAction, CliError> {
        let log = remote.log_time(self.task_id()?, &self.log)?;
        Ok(LogAction::new(self.task.clone(), log))
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on {}",
            format_duration(self.log.total_minutes()),
            self.task
        )
    }
}

impl Taggable for LogAction {
    fn type_name(&self) -> &str {
        LOG_ACTION_TYPE
    }

    fn properties(&self) -> Record {
        record! {
            "task" => Value::instance(self.task.clone()),
            "log" => Value::instance(self.log.clone()),
        }
    }
}

fn revive_log_action(mut data: Record) -> Result<Instance, ConfigError> {
    let missing = |field: &str| ConfigError::Deserialize {
        name: LOG_ACTION_TYPE.to_string(),
        message: format!("missing {}", field),
    };
    let task = data
        .shift_remove("task")
        .and_then(|v| v.downcast_ref::<Task>().cloned())
        .ok_or_else(|| missing("task"))?;
    let log = data
        .shift_remove("log")
        .and_then(|v| v.downcast_ref::<Log>().cloned())
        .ok_or_else(|| missing("log"))?;
    Ok(Instance::new(LogAction::new(task, log)))
}

/// Commit and redo stacks, newest last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionLog {
    commit_log: Vec<LogAction>,
    redo_log: Vec<LogAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed action. Clears the redo stack.
    pub fn push(&mut self, action: LogAction) {
        self.redo_log.clear();
        self.commit(action);
    }

    fn commit(&mut self, action: LogAction) {
        self.commit_log.push(action);
        if self.commit_log.len() > MAX_COMMIT_LOG_SIZE {
            let overflow = self.commit_log.len() - MAX_COMMIT_LOG_SIZE;
            self.commit_log.drain(..overflow);
        }
    }

    /// Revert the newest action and move it to the redo stack.
    ///
    /// The action stays put if the remote call fails.
    pub fn undo(&mut self, remote: &mut dyn RemoteService) -> Result<LogAction, CliError> {
        let action = self.commit_log.pop().ok_or(CliError::NothingToUndo)?;
        if let Err(e) = action.undo(remote) {
            self.commit_log.push(action);
            return Err(e);
        }
        self.redo_log.push(action.clone());
        Ok(action)
    }

    /// Reapply the newest undone action.
    pub fn redo(&mut self, remote: &mut dyn RemoteService) -> Result<LogAction, CliError> {
        let action = self.redo_log.pop().ok_or(CliError::NothingToRedo)?;
        match action.redo(remote) {
            Ok(done) => {
                self.commit(done.clone());
                Ok(done)
            }
            Err(e) => {
                self.redo_log.push(action);
                Err(e)
            }
        }
    }

    pub fn commits(&self) -> &[LogAction] {
        &self.commit_log
    }

    pub fn redos(&self) -> &[LogAction] {
        &self.redo_log
    }

    pub fn is_empty(&self) -> bool {
        self.commit_log.is_empty() && self.redo_log.is_empty()
    }
}

impl Taggable for ActionLog {
    fn type_name(&self) -> &str {
        ACTIONS_TYPE
    }

    fn properties(&self) -> Record {
        let instances = |actions: &[LogAction]| -> Vec<Value> {
            actions.iter().cloned().map(Value::instance).collect()
        };
        record! {
            "commitLog" => instances(&self.commit_log),
            "redoLog" => instances(&self.redo_log),
        }
    }
}

fn revive_actions(mut data: Record) -> Result<Instance, ConfigError> {
    let mut stack = |key: &str| -> Result<Vec<LogAction>, ConfigError> {
        match data.shift_remove(key) {
            None | Some(Value::Undefined) | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.downcast_ref::<LogAction>().cloned().ok_or_else(|| {
                        ConfigError::Deserialize {
                            name: ACTIONS_TYPE.to_string(),
                            message: format!("{} holds a {}", key, item.kind()),
                        }
                    })
                })
                .collect(),
            Some(other) => Err(ConfigError::Deserialize {
                name: ACTIONS_TYPE.to_string(),
                message: format!("{} must be an array, found {}", key, other.kind()),
            }),
        }
    };
    let commit_log = stack("commitLog")?;
    let redo_log = stack("redoLog")?;
    Ok(Instance::new(ActionLog {
        commit_log,
        redo_log,
    }))
}

/// Make the history types known to `registry`.
pub fn register(registry: &mut TypeRegistry) -> Result<(), ConfigError> {
    registry
        .register(LOG_ACTION_TYPE, TypeEntry::constructor(revive_log_action))?
        .register(ACTIONS_TYPE, TypeEntry::constructor(revive_actions))?;
    Ok(())
}
