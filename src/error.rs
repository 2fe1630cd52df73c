//! Errors returned by the task store and its storage backends

use thiserror::Error;

use crate::task::TaskId;

#[derive(Debug, Error)]
pub enum TaskError {
    /// No task has this id
    #[error("no task with id {0}")]
    NotFound(TaskId),

    /// The persisted blob could not be parsed
    #[error("unable to parse the stored tasks: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The tasks could not be turned into a blob
    #[error("unable to serialize the tasks: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The storage backend refused to read or write
    #[error("storage error: {0}")]
    Storage(String),

    /// Tasks must have a non-blank name
    #[error("a task name cannot be empty")]
    EmptyName,
}

impl TaskError {
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TaskError::Storage(msg.into())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
