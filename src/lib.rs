//! This crate keeps track of study tasks.
//!
//! Tasks have a due date (and optionally a due time), a priority and a category. They are persisted as a whole in a key-value [`storage`] after every change.
//!
//! The [`query`] module derives what a user interface displays: overdue tasks, filtered and sorted lists, per-category progress.
//! The [`reminder`] module sends a single notification for every pending task that is about to be due.
//!
//! These pieces can be used on their own, or together in a [`Tracker`](tracker::Tracker), that reacts to user events and periodically sweeps for reminders.

pub mod config;
pub mod error;
pub use error::{TaskError, TaskResult};
pub mod task;
pub use task::{Priority, Status, Task, TaskFields, TaskId};
pub mod clock;
pub mod storage;
pub mod store;
pub use store::TaskStore;
pub mod query;
pub mod notifier;
pub mod reminder;
pub use reminder::ReminderScheduler;
pub mod view;
pub mod tracker;
pub use tracker::Tracker;
