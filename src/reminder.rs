//! Reminders for tasks that are about to be due
//!
//! A pending task with a due time is "armed" until it triggers a reminder. After that, it will not trigger another one until its reminder state is reset (see [`ReminderScheduler::forget`]).

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::config::{self, REMINDER_WINDOW};
use crate::notifier::{Notification, Notifier};
use crate::task::{Task, TaskId};


/// Tracks which tasks have already been reminded of, and decides which ones should be now
#[derive(Clone, Debug)]
pub struct ReminderScheduler {
    notified: HashSet<TaskId>,
    window: chrono::Duration,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderScheduler {
    pub fn new() -> Self {
        let window = match chrono::Duration::from_std(REMINDER_WINDOW) {
            Ok(window) => window,
            Err(_) => chrono::Duration::minutes(15),
        };
        Self::with_window(window)
    }

    /// Use a custom lookahead instead of [`REMINDER_WINDOW`]
    pub fn with_window(window: chrono::Duration) -> Self {
        Self { notified: HashSet::new(), window }
    }

    pub fn window(&self) -> chrono::Duration {
        self.window
    }

    /// Whether this task has already triggered its reminder
    pub fn is_notified(&self, id: &TaskId) -> bool {
        self.notified.contains(id)
    }

    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }

    /// Re-arm a task, so that it can trigger a reminder again
    pub fn forget(&mut self, id: &TaskId) {
        if self.notified.remove(id) {
            log::debug!("Reminder for task {} is armed again", id);
        }
    }

    /// Re-arm every task
    pub fn forget_all(&mut self) {
        self.notified.clear();
    }

    /// Whether `task` should trigger its reminder at `now`.
    ///
    /// It must be pending, have a due time, not have been reminded of yet, and be due within the window (strictly in the future).
    pub fn is_due_for_reminder(&self, task: &Task, now: NaiveDateTime) -> bool {
        if task.completed() || self.is_notified(task.id()) {
            return false;
        }
        let due = match task.due_instant() {
            None => return false,
            Some(due) => due,
        };

        let remaining = due - now;
        remaining > chrono::Duration::zero() && remaining <= self.window
    }

    /// Check every task, and notify about those that are due soon.
    ///
    /// Nothing happens (and nothing is recorded) unless the notifier has been granted the permission.
    /// Returns the number of notifications that have been sent.
    pub fn sweep<N: Notifier + ?Sized>(&mut self, tasks: &[Task], now: NaiveDateTime, notifier: &mut N) -> usize {
        if !notifier.permission().is_granted() {
            log::debug!("Notifications are not allowed, skipping the reminder sweep");
            return 0;
        }

        let mut sent = 0;
        for task in tasks {
            if !self.is_due_for_reminder(task, now) {
                continue;
            }

            log::info!("Task {} ({}) is due soon, sending a reminder", task.id(), task.name());
            notifier.notify(reminder_for(task));
            self.notified.insert(task.id().clone());
            sent += 1;
        }
        sent
    }
}

/// Build the notification that reminds the user of `task`
pub fn reminder_for(task: &Task) -> Notification {
    let due_time = match task.due_time() {
        // Seconds of older `HH:MM:SS` records are dropped, like in the due instant
        Some(time) => time.format("%H:%M").to_string(),
        None => String::new(),
    };

    Notification {
        title: config::read_setting(&config::NOTIFICATION_TITLE),
        body: format!("{} ({}) is due at {}! Priority: {}", task.name(), task.category(), due_time, task.priority()),
        icon_url: config::read_setting(&config::NOTIFICATION_ICON),
        task_id: task.id().clone(),
    }
}
