//! Commit message expansion for `commit-msg` hooks.

use teamwork_api::{extract_task_ids, Installation, RemoteService, Task};

use crate::error::CliError;

/// First line of the comment block git appends to an edited message.
pub const COMMIT_TEMPLATE_MARKER: &str = "# Please enter the commit";

/// Rewrite task references to `#<id>` and add an index of the referenced
/// tasks, each one's title followed by its URL.
///
/// The index goes before git's comment block when there is one, otherwise
/// at the end. A message without references comes back unchanged.
pub fn expand_commit_message(
    remote: &dyn RemoteService,
    installation: &Installation,
    message: &str,
) -> Result<String, CliError> {
    let (mut message, ids) = extract_task_ids(message);
    if ids.is_empty() {
        return Ok(message);
    }

    let tasks = ids
        .into_iter()
        .map(|id| {
            remote.task(id).map_err(|e| {
                if e.is_not_found() {
                    CliError::TaskNotFound {
                        id,
                        installation: installation.to_string(),
                    }
                } else {
                    e.into()
                }
            })
        })
        .collect::<Result<Vec<Task>, CliError>>()?;

    let index = tasks
        .iter()
        .map(|task| format!("{}\n{}", task, task.url(installation)))
        .collect::<Vec<_>>()
        .join("\n\n");
    let index = format!("\n{}", index);

    match message.find(COMMIT_TEMPLATE_MARKER) {
        Some(at) => message.insert_str(at, &format!("{}\n\n", index)),
        None => message.push_str(&index),
    }
    Ok(message)
}
