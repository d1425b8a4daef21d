//! Validation and parsing of user input.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::Error;

lazy_static! {
    static ref INSTALLATION: Regex = Regex::new(r"^(?:https?://)?(\w+)\.teamwork\.com").unwrap();
    static ref DURATION: Regex =
        Regex::new(r"(?i)^(?:(\d+(?:\.\d+)?)\s*h)?\s*(?:(\d+)\s*m)?$").unwrap();
    static ref TASK_REFERENCE: Regex =
        Regex::new(r"#(\d+)|(?:https?://)?\w+\.teamwork\.com/tasks/(\d+)(?:\.json)?").unwrap();
}

/// The installation name of a Teamwork URL: `acme` for
/// `https://acme.teamwork.com`.
pub fn parse_installation(url: &str) -> Result<String, Error> {
    INSTALLATION
        .captures(url.trim())
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| Error::Parse(format!("Invalid installation URL: {}", url)))
}

/// `https://<name>.teamwork.com`
pub fn normalize_installation_url(url: &str) -> Result<String, Error> {
    parse_installation(url).map(|name| format!("https://{}.teamwork.com", name))
}

pub fn validate_email(email: &str) -> Result<&str, Error> {
    if email.contains('@') {
        Ok(email)
    } else {
        Err(Error::Validation(format!("Invalid email \"{}\".", email)))
    }
}

/// Longest duration accepted: a leap year of full days.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60 * 366;

/// Minutes in a duration such as `2h`, `30m`, `1h30m` or `1.5h`.
///
/// Anything over [`MAX_DURATION_MINUTES`] is rejected.
pub fn parse_duration(text: &str) -> Result<i64, Error> {
    let invalid = || Error::Parse(format!("Invalid duration \"{}\".", text));

    let captures = DURATION.captures(text.trim()).ok_or_else(invalid)?;
    if captures.get(1).is_none() && captures.get(2).is_none() {
        return Err(invalid());
    }

    let hours: f64 = match captures.get(1) {
        Some(hours) => hours.as_str().parse().map_err(|_| invalid())?,
        None => 0.0,
    };
    let minutes: i64 = match captures.get(2) {
        Some(minutes) => minutes.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };

    let hour_minutes = (hours * 60.0).round();
    if !hour_minutes.is_finite() || hour_minutes > MAX_DURATION_MINUTES as f64 {
        return Err(invalid());
    }

    match (hour_minutes as i64).checked_add(minutes) {
        Some(total) if total > 0 && total <= MAX_DURATION_MINUTES => Ok(total),
        _ => Err(invalid()),
    }
}

/// Find task references (`#123` or a task URL) in a message.
///
/// Returns the message with every URL rewritten to `#<id>`, and the ids in
/// first-seen order without duplicates. A reference whose id does not fit
/// an `i64` is left as written.
pub fn extract_task_ids(message: &str) -> (String, Vec<i64>) {
    let mut ids = Vec::new();
    let rewritten = TASK_REFERENCE.replace_all(message, |captures: &Captures| {
        let digits = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map_or("", |m| m.as_str());
        match digits.parse::<i64>() {
            Ok(id) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                format!("#{}", id)
            }
            Err(_) => captures[0].to_string(),
        }
    });
    (rewritten.into_owned(), ids)
}
