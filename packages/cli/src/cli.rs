use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tw - Teamwork from the command line
#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file to use instead of ~/.teamworkrc
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the installation, user and current selections
    Status,

    /// Log in to a Teamwork installation
    Login {
        /// Installation URL, e.g. acme.teamwork.com
        #[arg(long)]
        installation: String,

        #[arg(long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// List projects, or select one
    Projects {
        #[arg(long, value_name = "ID")]
        select: Option<i64>,
    },

    /// List the tasklists of the current project, or select one
    Tasklists {
        #[arg(long, value_name = "ID")]
        select: Option<i64>,
    },

    /// List the tasks of the current tasklist, or select one
    Tasks {
        #[arg(long, value_name = "ID")]
        select: Option<i64>,
    },

    /// Log time against a task
    ///
    /// Without --task, time goes to the tasks referenced in the message
    /// (#123 or a task URL), or else to the current task.
    Log {
        #[arg(long, value_name = "ID")]
        task: Option<i64>,

        /// e.g. 1h30m, 45m, 1.5h
        #[arg(short, long)]
        duration: String,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show the time logged on a task
    Logs {
        /// Defaults to the current task
        #[arg(long, value_name = "ID")]
        task: Option<i64>,
    },

    /// Add the titles and links of referenced tasks to a commit message
    ///
    /// Meant for a git `commit-msg` hook: `tw expand --file "$1"`.
    Expand {
        /// Print the expanded message
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        message: Option<String>,

        /// Expand a message file in place
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Remove the most recent time log made with tw
    Undo,

    /// Log the most recently undone entry again
    Redo,

    /// Forget the current project, tasklist and task
    Clear,

    /// Delete the config file, logging out
    Reset,

    /// Read or write raw config values
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

impl Command {
    /// Whether the config needs writing back afterwards.
    pub fn mutates(&self) -> bool {
        match self {
            Command::Status | Command::Logs { .. } | Command::Expand { .. } | Command::Reset => {
                false
            }
            Command::Projects { select }
            | Command::Tasklists { select }
            | Command::Tasks { select } => select.is_some(),
            Command::Config { action } => matches!(action, ConfigCommand::Set { .. }),
            _ => true,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Print the value at a key, or a slash-separated path into it
    Get { key: String },

    /// Store a JSON value (bare words are stored as strings)
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_with_global_flags() {
        let args =
            Args::try_parse_from(["tw", "log", "-d", "1h30m", "-m", "Fix #5", "--verbose"]).unwrap();
        assert!(args.verbose);
        assert_eq!(
            args.command,
            Command::Log {
                task: None,
                duration: "1h30m".to_string(),
                message: Some("Fix #5".to_string()),
            }
        );
    }

    #[test]
    fn log_needs_a_duration() {
        assert!(Args::try_parse_from(["tw", "log", "--task", "5"]).is_err());
    }

    #[test]
    fn listing_does_not_mutate() {
        assert!(!Command::Projects { select: None }.mutates());
        assert!(Command::Projects { select: Some(1) }.mutates());
        assert!(Command::Undo.mutates());
    }

    #[test]
    fn expand_takes_a_message_or_a_file() {
        let args = Args::try_parse_from(["tw", "expand", "--file", ".git/COMMIT_EDITMSG"]).unwrap();
        assert_eq!(
            args.command,
            Command::Expand {
                message: None,
                file: Some(PathBuf::from(".git/COMMIT_EDITMSG")),
            }
        );
        assert!(!args.command.mutates());

        assert!(Args::try_parse_from(["tw", "expand"]).is_err());
        assert!(Args::try_parse_from(["tw", "expand", "--message", "x", "--file", "y"]).is_err());
    }

    #[test]
    fn config_set_takes_key_and_value() {
        let args = Args::try_parse_from(["tw", "config", "set", "editor", "\"vim\""]).unwrap();
        assert_eq!(
            args.command,
            Command::Config {
                action: ConfigCommand::Set {
                    key: "editor".to_string(),
                    value: "\"vim\"".to_string(),
                }
            }
        );
    }
}
