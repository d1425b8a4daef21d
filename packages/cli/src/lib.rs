//! tw - Teamwork from the command line
//!
//! The binary is a thin shell over [`run`]: it parses [`Args`], sets up
//! logging and prints the returned [`Report`]. Everything persistent lives
//! in one JSON document (`~/.teamworkrc` by default) read into a
//! [`teamwork_config::ConfigStore`] at startup and written back after any
//! command that changes it.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod commit;
pub mod error;
pub mod output;
pub mod state;
pub mod testing;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use teamwork_api::HttpTeamworkApi;
use teamwork_json_store::JsonFileStore;

pub use cli::{Args, Command, ConfigCommand};
pub use error::CliError;
pub use output::Report;
pub use state::State;

/// Run one command against the real Teamwork API.
pub fn run(args: Args) -> Result<Report, CliError> {
    let document = match args.config {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::open_default()?,
    };
    tracing::debug!(path = %document.path().display(), "using config file");

    let registry = Arc::new(state::registry()?);
    let mut state = State::load(document, registry)?;

    let mut remote = match state.session() {
        Some(session) => HttpTeamworkApi::with_session(&session)?,
        None => HttpTeamworkApi::new()?,
    };

    let command = match args.command {
        Command::Login {
            installation,
            email,
            password: None,
        } => Command::Login {
            password: Some(prompt_password(&email)?),
            installation,
            email,
        },
        command => command,
    };

    commands::execute(command, &mut state, &mut remote)
}

fn prompt_password(email: &str) -> Result<String, CliError> {
    eprint!("Password for {}: ", email);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::usage("Missing password"));
    }
    Ok(password)
}
