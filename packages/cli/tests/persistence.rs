use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use teamwork_cli::commands::execute;
use teamwork_cli::state::registry;
use teamwork_cli::testing::{FakeRemote, PASSWORD};
use teamwork_cli::{CliError, Command, State};
use teamwork_json_store::JsonFileStore;

fn open(path: &Path) -> Result<State<JsonFileStore>, CliError> {
    State::load(JsonFileStore::new(path), Arc::new(registry().unwrap()))
}

/// One `tw` invocation: load, run, save.
fn invoke(path: &Path, remote: &mut FakeRemote, command: Command) -> Result<String, CliError> {
    let mut state = open(path)?;
    execute(command, &mut state, remote).map(|report| report.plain())
}

fn login(path: &Path, remote: &mut FakeRemote) {
    invoke(
        path,
        remote,
        Command::Login {
            installation: "https://acme.teamwork.com".into(),
            email: "ada@example.com".into(),
            password: Some(PASSWORD.into()),
        },
    )
    .unwrap();
}

#[test]
fn test_missing_file_is_an_empty_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");

    let mut remote = FakeRemote::new();
    let out = invoke(&path, &mut remote, Command::Status).unwrap();
    assert!(out.contains("Not logged in."));
    assert!(!path.exists());
}

#[test]
fn test_selections_survive_between_invocations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");
    let mut remote = FakeRemote::new();

    login(&path, &mut remote);
    invoke(&path, &mut remote, Command::Projects { select: Some(1) }).unwrap();
    invoke(&path, &mut remote, Command::Tasklists { select: Some(101) }).unwrap();
    invoke(&path, &mut remote, Command::Tasks { select: Some(5) }).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["task"]["className"], "Task");
    assert_eq!(json["task"]["title"], "Fix bug");
    assert_eq!(json["tasklist"]["title"], "Sprint");
    assert!(text.contains("\n  \"auth\""));

    let state = open(&path).unwrap();
    assert_eq!(state.task().unwrap().id(), Some(5));
    assert_eq!(state.tasklist().unwrap().title(), Some("Sprint"));
    assert_eq!(state.user().unwrap().initialed(), "Ada L.");
}

#[test]
fn test_undo_works_in_a_later_invocation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");
    let mut remote = FakeRemote::new();

    login(&path, &mut remote);
    invoke(
        &path,
        &mut remote,
        Command::Log {
            task: Some(5),
            duration: "2h".into(),
            message: Some("Pairing".into()),
        },
    )
    .unwrap();
    assert_eq!(remote.logged().len(), 1);

    let out = invoke(&path, &mut remote, Command::Undo).unwrap();
    assert_eq!(out, "✔ Removed 2h on [#5] Fix bug (50%)");
    assert!(remote.logged().is_empty());

    let err = invoke(&path, &mut remote, Command::Undo).unwrap_err();
    assert_eq!(err.to_string(), "Nothing to undo.");

    invoke(&path, &mut remote, Command::Redo).unwrap();
    assert_eq!(remote.logged()[0].description(), Some("Pairing"));
}

#[test]
fn test_reset_removes_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");
    let mut remote = FakeRemote::new();

    login(&path, &mut remote);
    assert!(path.exists());

    invoke(&path, &mut remote, Command::Reset).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_corrupted_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");
    fs::write(&path, "{ not json").unwrap();

    let err = open(&path).err().unwrap();
    assert!(matches!(err, CliError::Store(_)));
}

#[test]
fn test_unregistered_type_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".teamworkrc");
    fs::write(&path, r#"{"project": {"className": "Milestone", "id": 1}}"#).unwrap();

    let err = open(&path).err().unwrap();
    assert_eq!(err.to_string(), "Unknown model Milestone.");
}
