//! Teamwork domain layer
//!
//! Everything the CLI knows about Teamwork itself:
//! - `models`: Company, Person, Project, Tasklist, Task, Tag, Log and
//!   Installation, built from descriptors
//! - `parse`: Validation of installation URLs, emails, durations and task
//!   references
//! - `RemoteService`: The operations the CLI needs from Teamwork
//! - `HttpTeamworkApi`: A blocking HTTP implementation of `RemoteService`
//!
//! `registry()` returns a type registry holding every model, so any of them
//! can be kept in the config store.

pub mod blocking;
pub mod error;
pub mod models;
pub mod parse;
pub mod remote;
pub mod types;
pub mod wire;

pub use blocking::HttpTeamworkApi;
pub use error::Error;
pub use models::{
    format_duration, registry, Company, Installation, Log, Person, Project, Tag, Task, Tasklist,
};
pub use parse::{
    extract_task_ids, normalize_installation_url, parse_duration, parse_installation,
    validate_email, MAX_DURATION_MINUTES,
};
pub use remote::{RemoteService, Session, SESSION_TYPE};
pub use types::{HttpRequest, HttpResponse, Method};
