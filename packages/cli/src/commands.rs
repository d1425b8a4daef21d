//! Command implementations.
//!
//! Each command reads and writes the [`State`] and talks to Teamwork only
//! through [`RemoteService`]. The config is written back after any command
//! that changes it, including one that fails part way.

use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use serde_json::Value as JsonValue;

use teamwork_api::{
    extract_task_ids, normalize_installation_url, parse_duration, validate_email, Installation,
    Log, RemoteService, Task,
};
use teamwork_config::ConfigError;
use teamwork_json_store::DocumentStore;
use teamwork_model::{json_to_value, value_to_json};

use crate::actions::LogAction;
use crate::cli::{Command, ConfigCommand};
use crate::commit::expand_commit_message;
use crate::error::CliError;
use crate::output::Report;
use crate::state::{State, AUTH_KEY, INSTALLATION_KEY, USER_KEY};

pub fn execute<D: DocumentStore>(
    command: Command,
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
) -> Result<Report, CliError> {
    tracing::debug!(mutates = command.mutates(), "executing command");
    let mutates = command.mutates();

    let result = match command {
        Command::Status => status(state),
        Command::Login {
            installation,
            email,
            password,
        } => login(state, remote, &installation, &email, password.as_deref()),
        Command::Projects { select } => projects(state, remote, select),
        Command::Tasklists { select } => tasklists(state, remote, select),
        Command::Tasks { select } => tasks(state, remote, select),
        Command::Log {
            task,
            duration,
            message,
        } => log_time(state, remote, task, &duration, message.as_deref()),
        Command::Logs { task } => logs(state, remote, task),
        Command::Expand { message, file } => {
            expand(state, remote, message.as_deref(), file.as_deref())
        }
        Command::Undo => undo(state, remote),
        Command::Redo => redo(state, remote),
        Command::Clear => clear(state),
        Command::Reset => reset(state),
        Command::Config { action } => config(state, action),
    };

    if mutates {
        state.save()?;
    }
    result
}

fn status<D: DocumentStore>(state: &State<D>) -> Result<Report, CliError> {
    let report = Report::new().heading("Teamwork");
    let Some(session) = state.session() else {
        return Ok(report
            .text("Not logged in.")
            .hint("Run `tw login --installation <url> --email <email>` to start."));
    };

    let none = || "none".to_string();
    let installation = state
        .installation()
        .map(|i| i.to_string())
        .unwrap_or(session.installation);
    let mut report = report
        .text(format!("Installation: {}", installation))
        .text(format!(
            "User:         {}",
            state.user().map(|u| u.name().to_string()).unwrap_or_else(none)
        ))
        .text(format!(
            "Project:      {}",
            state.project().map(|p| p.to_string()).unwrap_or_else(none)
        ))
        .text(format!(
            "Tasklist:     {}",
            state.tasklist().map(|t| t.to_string()).unwrap_or_else(none)
        ))
        .text(format!(
            "Task:         {}",
            state.task().map(|t| t.to_string()).unwrap_or_else(none)
        ));

    if let Some(last) = state.actions().commits().last() {
        report = report.text(format!("Last log:     {}", last));
    }
    Ok(report)
}

fn login<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
    installation: &str,
    email: &str,
    password: Option<&str>,
) -> Result<Report, CliError> {
    let email = validate_email(email)?;
    let password = password.ok_or_else(|| CliError::usage("Missing password"))?;
    let url = normalize_installation_url(installation)?;

    let session = remote.login(email, password, &url)?;
    let user = remote.profile()?;
    let installation = Installation::from_url(&url)?;

    let switched = state
        .installation()
        .is_some_and(|previous| previous.url() != installation.url());
    if switched {
        state.clear_selections();
        state.config_mut().remove(crate::actions::ACTIONS_KEY);
    }

    let done = format!("Logged in as {} on {}", user.name(), installation);
    state.put(AUTH_KEY, session);
    state.put(INSTALLATION_KEY, installation);
    state.put(USER_KEY, user);
    Ok(Report::new().done(done))
}

/// Shared shape of the three listing commands.
fn pick<T: std::fmt::Display>(
    heading: &str,
    what: &'static str,
    items: Vec<T>,
    id_of: impl Fn(&T) -> Option<i64>,
    current: Option<i64>,
    select: Option<i64>,
    on_select: impl FnOnce(T),
) -> Result<Report, CliError> {
    if let Some(id) = select {
        let item = items
            .into_iter()
            .find(|item| id_of(item) == Some(id))
            .ok_or(CliError::UnknownId { what, id })?;
        let done = format!("Selected {} {}", what, item);
        on_select(item);
        return Ok(Report::new().done(done));
    }

    if items.is_empty() {
        return Ok(Report::new().text(format!("No {}s.", what)));
    }
    Ok(items.iter().fold(Report::new().heading(heading), |report, item| {
        let is_current = current.is_some() && id_of(item) == current;
        report.item(is_current, item.to_string())
    }))
}

fn projects<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
    select: Option<i64>,
) -> Result<Report, CliError> {
    state.require_session()?;
    let projects = remote.projects()?;
    let current = state.project().and_then(|p| p.id());
    pick(
        "Projects",
        "project",
        projects,
        |p| p.id(),
        current,
        select,
        |p| state.select_project(p),
    )
}

fn tasklists<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
    select: Option<i64>,
) -> Result<Report, CliError> {
    state.require_session()?;
    let project = state
        .project()
        .ok_or(CliError::NoSelection { what: "project" })?;
    let project_id = project
        .id()
        .ok_or(CliError::NoSelection { what: "project" })?;

    let tasklists = remote.tasklists(project_id)?;
    let current = state.tasklist().and_then(|t| t.id());
    pick(
        &format!("Tasklists in {}", project),
        "tasklist",
        tasklists,
        |t| t.id(),
        current,
        select,
        |t| state.select_tasklist(t),
    )
}

fn tasks<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
    select: Option<i64>,
) -> Result<Report, CliError> {
    state.require_session()?;
    let tasklist = state
        .tasklist()
        .ok_or(CliError::NoSelection { what: "tasklist" })?;
    let tasklist_id = tasklist
        .id()
        .ok_or(CliError::NoSelection { what: "tasklist" })?;

    let tasks = remote.tasks(tasklist_id)?;
    let current = state.task().and_then(|t| t.id());
    pick(
        &format!("Tasks in {}", tasklist),
        "task",
        tasks,
        |t| t.id(),
        current,
        select,
        |t| state.select_task(t),
    )
}

fn current_task_id<D: DocumentStore>(state: &State<D>) -> Result<i64, CliError> {
    state
        .task()
        .and_then(|t| t.id())
        .ok_or(CliError::NoSelection { what: "task" })
}

fn log_time<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
    task: Option<i64>,
    duration: &str,
    message: Option<&str>,
) -> Result<Report, CliError> {
    state.require_session()?;
    let minutes = parse_duration(duration)?;

    let (description, referenced) = match message {
        Some(message) => {
            let (rewritten, ids) = extract_task_ids(message);
            (Some(rewritten), ids)
        }
        None => (None, Vec::new()),
    };

    let task_ids: Vec<i64> = match task {
        Some(id) => vec![id],
        None if !referenced.is_empty() => referenced,
        None => vec![current_task_id(state)?],
    };

    let offset = Duration::try_minutes(minutes)
        .and_then(|length| Utc::now().checked_sub_signed(length))
        .ok_or_else(|| CliError::usage(format!("Duration \"{}\" is too long", duration)))?;

    let log = Log::create(
        minutes,
        offset,
        state.user().as_ref(),
        description.as_deref(),
    )?;

    let mut report = Report::new();
    for id in task_ids {
        let task = remote.task(id)?;
        let logged = remote.log_time(id, &log)?;
        let action = LogAction::new(task, logged);
        report = report.done(format!("Logged {}", action));

        let mut actions = state.actions();
        actions.push(action);
        state.set_actions(actions);
    }
    Ok(report)
}

fn logs<D: DocumentStore>(
    state: &State<D>,
    remote: &mut dyn RemoteService,
    task: Option<i64>,
) -> Result<Report, CliError> {
    state.require_session()?;
    let id = match task {
        Some(id) => id,
        None => current_task_id(state)?,
    };
    let task: Task = remote.task(id)?;
    let logs = remote.logs(id)?;

    let report = Report::new().heading(format!("Time logged on {}", task));
    if logs.is_empty() {
        return Ok(report.text("No time logged."));
    }
    let total = logs
        .iter()
        .fold(0i64, |total, log| total.saturating_add(log.total_minutes()));
    Ok(logs
        .iter()
        .fold(report, |report, log| report.text(log.to_string()))
        .text(format!(
            "Total: {}",
            teamwork_api::format_duration(total)
        )))
}

fn expand<D: DocumentStore>(
    state: &State<D>,
    remote: &dyn RemoteService,
    message: Option<&str>,
    file: Option<&Path>,
) -> Result<Report, CliError> {
    let session = state.require_session()?;
    let installation = match state.installation() {
        Some(installation) => installation,
        None => Installation::from_url(&session.installation)?,
    };

    match (message, file) {
        (Some(message), None) => Ok(Report::new().text(expand_commit_message(
            remote,
            &installation,
            message,
        )?)),
        (None, Some(path)) => {
            let original = fs::read_to_string(path)?;
            let expanded = expand_commit_message(remote, &installation, &original)?;
            fs::write(path, expanded)?;
            tracing::debug!(path = %path.display(), "expanded commit message");
            Ok(Report::new())
        }
        _ => Err(CliError::usage("Pass either --message or --file")),
    }
}

fn undo<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
) -> Result<Report, CliError> {
    state.require_session()?;
    let mut actions = state.actions();
    let action = actions.undo(remote)?;
    state.set_actions(actions);
    Ok(Report::new().done(format!("Removed {}", action)))
}

fn redo<D: DocumentStore>(
    state: &mut State<D>,
    remote: &mut dyn RemoteService,
) -> Result<Report, CliError> {
    state.require_session()?;
    let mut actions = state.actions();
    let action = actions.redo(remote)?;
    state.set_actions(actions);
    Ok(Report::new().done(format!("Logged {}", action)))
}

fn clear<D: DocumentStore>(state: &mut State<D>) -> Result<Report, CliError> {
    state.clear_selections();
    Ok(Report::new().done("Cleared the current project, tasklist and task"))
}

fn reset<D: DocumentStore>(state: &mut State<D>) -> Result<Report, CliError> {
    if state.reset()? {
        Ok(Report::new().done("Removed all settings"))
    } else {
        Ok(Report::new().text("Nothing to reset."))
    }
}

fn config<D: DocumentStore>(
    state: &mut State<D>,
    action: ConfigCommand,
) -> Result<Report, CliError> {
    match action {
        ConfigCommand::Get { key } => {
            let value = state
                .config()
                .get_path(&key)
                .ok_or_else(|| CliError::usage(format!("No config value at \"{}\"", key)))?;
            let packed = state.config().pack(&value)?;
            let json = value_to_json(&packed).map_err(ConfigError::from)?;
            Ok(Report::new().json(json))
        }
        ConfigCommand::Set { key, value } => {
            if key.is_empty() || key.contains('/') {
                return Err(CliError::usage(format!("Invalid config key \"{}\"", key)));
            }
            let json = serde_json::from_str(&value).unwrap_or(JsonValue::String(value));
            let value = state.config().unpack(json_to_value(json))?;
            state.config_mut().set(key.as_str(), value);
            Ok(Report::new().done(format!("Set {}", key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::output::Line;
    use crate::state::registry;
    use crate::testing::{FakeRemote, PASSWORD};
    use teamwork_json_store::InMemoryStore;

    fn fresh() -> (State<InMemoryStore>, FakeRemote) {
        let state = State::load(InMemoryStore::new(), Arc::new(registry().unwrap())).unwrap();
        (state, FakeRemote::new())
    }

    fn run(
        state: &mut State<InMemoryStore>,
        remote: &mut FakeRemote,
        command: Command,
    ) -> Result<String, CliError> {
        execute(command, state, remote).map(|report| report.plain())
    }

    fn logged_in() -> (State<InMemoryStore>, FakeRemote) {
        let (mut state, mut remote) = fresh();
        run(
            &mut state,
            &mut remote,
            Command::Login {
                installation: "acme.teamwork.com".into(),
                email: "ada@example.com".into(),
                password: Some(PASSWORD.into()),
            },
        )
        .unwrap();
        (state, remote)
    }

    fn select_task(state: &mut State<InMemoryStore>, remote: &mut FakeRemote) {
        run(state, remote, Command::Projects { select: Some(1) }).unwrap();
        run(state, remote, Command::Tasklists { select: Some(101) }).unwrap();
        run(state, remote, Command::Tasks { select: Some(5) }).unwrap();
    }

    #[test]
    fn login_persists_session_installation_and_user() {
        let (state, remote) = logged_in();
        assert_eq!(state.session().as_ref(), remote.session());
        assert_eq!(state.session().unwrap().installation, "https://acme.teamwork.com");
        assert_eq!(state.installation().unwrap().name(), "acme");
        assert_eq!(state.user().unwrap().name(), "Ada Lovelace");

        let saved = state.document().document().unwrap();
        assert_eq!(saved["auth"]["className"], "Session");
        assert_eq!(saved["user"]["className"], "Person");
        assert_eq!(state.document().saves(), 1);
    }

    #[test]
    fn login_rejects_bad_input() {
        let (mut state, mut remote) = fresh();
        let err = run(
            &mut state,
            &mut remote,
            Command::Login {
                installation: "acme.teamwork.com".into(),
                email: "not-an-email".into(),
                password: Some(PASSWORD.into()),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email \"not-an-email\".");

        let err = run(
            &mut state,
            &mut remote,
            Command::Login {
                installation: "acme.teamwork.com".into(),
                email: "ada@example.com".into(),
                password: Some("wrong".into()),
            },
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Login failed"));
        assert!(state.session().is_none());
    }

    #[test]
    fn commands_need_a_session() {
        let (mut state, mut remote) = fresh();
        let err = run(&mut state, &mut remote, Command::Projects { select: None }).unwrap_err();
        assert!(matches!(err, CliError::NotLoggedIn));
    }

    #[test]
    fn status_when_logged_out() {
        let (mut state, mut remote) = fresh();
        let out = run(&mut state, &mut remote, Command::Status).unwrap();
        assert!(out.contains("Not logged in."));
        assert_eq!(state.document().saves(), 0);
    }

    #[test]
    fn listing_marks_the_selection() {
        let (mut state, mut remote) = logged_in();
        run(&mut state, &mut remote, Command::Projects { select: Some(2) }).unwrap();

        let report = execute(Command::Projects { select: None }, &mut state, &mut remote).unwrap();
        assert_eq!(
            report.lines()[1..],
            [
                Line::Item {
                    current: false,
                    text: "[#1] Website".into()
                },
                Line::Item {
                    current: true,
                    text: "[#2] Mobile".into()
                },
            ]
        );
    }

    #[test]
    fn selecting_an_unknown_id_fails() {
        let (mut state, mut remote) = logged_in();
        let err = run(&mut state, &mut remote, Command::Projects { select: Some(9) }).unwrap_err();
        assert_eq!(err.to_string(), "No project with id 9.");
    }

    #[test]
    fn tasklists_need_a_project() {
        let (mut state, mut remote) = logged_in();
        let err = run(&mut state, &mut remote, Command::Tasklists { select: None }).unwrap_err();
        assert!(matches!(err, CliError::NoSelection { what: "project" }));
    }

    #[test]
    fn status_shows_selections() {
        let (mut state, mut remote) = logged_in();
        select_task(&mut state, &mut remote);

        let out = run(&mut state, &mut remote, Command::Status).unwrap();
        assert!(out.contains("acme (acme.teamwork.com)"));
        assert!(out.contains("[#1] Website"));
        assert!(out.contains("[#101] Sprint"));
        assert!(out.contains("[#5] Fix bug (50%)"));
    }

    #[test]
    fn log_to_the_current_task_then_undo_and_redo() {
        let (mut state, mut remote) = logged_in();
        select_task(&mut state, &mut remote);

        let out = run(
            &mut state,
            &mut remote,
            Command::Log {
                task: None,
                duration: "1h30m".into(),
                message: Some("Reviewed".into()),
            },
        )
        .unwrap();
        assert_eq!(out, "✔ Logged 1h 30m on [#5] Fix bug (50%)");
        assert_eq!(remote.logged().len(), 1);
        assert_eq!(remote.logged()[0].author().unwrap().name(), "Ada Lovelace");
        assert_eq!(state.actions().commits().len(), 1);

        run(&mut state, &mut remote, Command::Undo).unwrap();
        assert!(remote.logged().is_empty());

        run(&mut state, &mut remote, Command::Redo).unwrap();
        assert_eq!(remote.logged().len(), 1);

        let err = run(&mut state, &mut remote, Command::Redo).unwrap_err();
        assert_eq!(err.to_string(), "Nothing to redo.");
    }

    #[test]
    fn log_to_tasks_named_in_the_message() {
        let (mut state, mut remote) = logged_in();
        run(
            &mut state,
            &mut remote,
            Command::Log {
                task: None,
                duration: "45m".into(),
                message: Some("Fixed #5 and https://acme.teamwork.com/tasks/6".into()),
            },
        )
        .unwrap();

        let logged = remote.logged();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].description(), Some("Fixed #5 and #6"));
        assert_eq!(logged[1].task().unwrap().id(), Some(6));
        assert_eq!(state.actions().commits().len(), 2);
    }

    #[test]
    fn log_without_any_task_fails() {
        let (mut state, mut remote) = logged_in();
        let err = run(
            &mut state,
            &mut remote,
            Command::Log {
                task: None,
                duration: "45m".into(),
                message: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NoSelection { what: "task" }));
    }

    #[test]
    fn log_rejects_a_bad_duration() {
        let (mut state, mut remote) = logged_in();
        let err = run(
            &mut state,
            &mut remote,
            Command::Log {
                task: Some(5),
                duration: "soon".into(),
                message: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid duration \"soon\".");
        assert!(remote.logged().is_empty());
    }

    #[test]
    fn log_rejects_an_overlong_duration() {
        let (mut state, mut remote) = logged_in();
        for duration in ["10000000000h", "9999999999999999999h 5m"] {
            let err = run(
                &mut state,
                &mut remote,
                Command::Log {
                    task: Some(5),
                    duration: duration.into(),
                    message: None,
                },
            )
            .unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid duration \"{}\".", duration));
        }
        assert!(remote.logged().is_empty());
        assert!(state.actions().is_empty());
    }

    #[test]
    fn log_ignores_out_of_range_references() {
        let (mut state, mut remote) = logged_in();
        let err = run(
            &mut state,
            &mut remote,
            Command::Log {
                task: None,
                duration: "30m".into(),
                message: Some("See #18446744073709551615".into()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NoSelection { what: "task" }));
        assert!(remote.logged().is_empty());
    }

    #[test]
    fn logs_lists_entries_with_total() {
        let (mut state, mut remote) = logged_in();
        for duration in ["30m", "1h"] {
            run(
                &mut state,
                &mut remote,
                Command::Log {
                    task: Some(6),
                    duration: duration.into(),
                    message: None,
                },
            )
            .unwrap();
        }

        let out = run(&mut state, &mut remote, Command::Logs { task: Some(6) }).unwrap();
        assert!(out.starts_with("Time logged on [#6] Write docs"));
        assert!(out.contains("Ada L. logged 30m"));
        assert!(out.ends_with("Total: 1h 30m"));
    }

    #[test]
    fn expand_a_message() {
        let (mut state, mut remote) = logged_in();
        let out = run(
            &mut state,
            &mut remote,
            Command::Expand {
                message: Some("Fix https://acme.teamwork.com/tasks/5.json".into()),
                file: None,
            },
        )
        .unwrap();
        assert_eq!(
            out,
            "Fix #5\n[#5] Fix bug (50%)\nhttps://acme.teamwork.com/tasks/5"
        );
    }

    #[test]
    fn expand_a_message_file_in_place() {
        let (mut state, mut remote) = logged_in();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("COMMIT_EDITMSG");
        fs::write(&path, "Docs for #6\n\n# Please enter the commit message\n").unwrap();

        run(
            &mut state,
            &mut remote,
            Command::Expand {
                message: None,
                file: Some(path.clone()),
            },
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Docs for #6\n\n\n[#6] Write docs (0%)\nhttps://acme.teamwork.com/tasks/6\n\n\
             # Please enter the commit message\n"
        );
        assert_eq!(state.document().saves(), 1);
    }

    #[test]
    fn expand_reports_a_missing_task() {
        let (mut state, mut remote) = logged_in();
        let err = run(
            &mut state,
            &mut remote,
            Command::Expand {
                message: Some("Fixes #404".into()),
                file: None,
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Task #404 not found in acme (acme.teamwork.com)."
        );
    }

    #[test]
    fn clear_keeps_login() {
        let (mut state, mut remote) = logged_in();
        select_task(&mut state, &mut remote);

        run(&mut state, &mut remote, Command::Clear).unwrap();
        let saved = state.document().document().unwrap();
        assert!(saved.get("project").is_none());
        assert!(saved.get("task").is_none());
        assert!(saved.get("auth").is_some());
    }

    #[test]
    fn reset_deletes_everything() {
        let (mut state, mut remote) = logged_in();
        let out = run(&mut state, &mut remote, Command::Reset).unwrap();
        assert_eq!(out, "✔ Removed all settings");
        assert!(state.document().document().is_none());
        assert!(state.session().is_none());

        let out = run(&mut state, &mut remote, Command::Reset).unwrap();
        assert_eq!(out, "Nothing to reset.");
    }

    #[test]
    fn config_get_and_set() {
        let (mut state, mut remote) = logged_in();
        run(
            &mut state,
            &mut remote,
            Command::Config {
                action: ConfigCommand::Set {
                    key: "since".into(),
                    value: r#"{"className": "Date", "serialized": "2024-03-01T09:30:00Z"}"#.into(),
                },
            },
        )
        .unwrap();
        assert!(state
            .config()
            .get_as::<chrono::DateTime<Utc>>("since")
            .is_some());

        run(
            &mut state,
            &mut remote,
            Command::Config {
                action: ConfigCommand::Set {
                    key: "editor".into(),
                    value: "vim".into(),
                },
            },
        )
        .unwrap();

        let report = execute(
            Command::Config {
                action: ConfigCommand::Get {
                    key: "user/firstName".into(),
                },
            },
            &mut state,
            &mut remote,
        )
        .unwrap();
        assert_eq!(report.lines(), [Line::Json(serde_json::json!("Ada"))]);

        let out = run(
            &mut state,
            &mut remote,
            Command::Config {
                action: ConfigCommand::Get {
                    key: "editor".into(),
                },
            },
        )
        .unwrap();
        assert_eq!(out, "\"vim\"");
    }

    #[test]
    fn config_set_rejects_unknown_types() {
        let (mut state, mut remote) = fresh();
        let err = run(
            &mut state,
            &mut remote,
            Command::Config {
                action: ConfigCommand::Set {
                    key: "thing".into(),
                    value: r#"{"className": "Nope"}"#.into(),
                },
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown model Nope.");
    }
}
