//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The key under which the whole task collection is persisted
pub const STORAGE_KEY: &str = "studyTasks";

/// How long before its due instant a task may trigger its reminder
pub const REMINDER_WINDOW: std::time::Duration = std::time::Duration::from_secs(15 * 60);

/// Delay between two reminder sweeps
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

/// The group name used for tasks that have no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// The folder the `study-reminders` binary stores its data into, unless told otherwise
pub const DEFAULT_DATA_FOLDER: &str = "study-tracker-data";

/// Title of every reminder notification.
/// Feel free to override it when initing this library.
pub static NOTIFICATION_TITLE: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("🚨 Study Reminder: Due Soon!".to_string())));

/// Icon attached to every reminder notification.
/// Feel free to override it when initing this library.
pub static NOTIFICATION_ICON: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("https://cdn-icons-png.flaticon.com/512/3208/3208726.png".to_string())));

/// Returns the current value of a overridable setting.
///
/// A poisoned lock still holds a valid string, so it is read anyway
pub(crate) fn read_setting(setting: &Lazy<Arc<Mutex<String>>>) -> String {
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_window_is_fifteen_minutes() {
        assert_eq!(REMINDER_WINDOW.as_millis(), 900_000);
        assert!(SWEEP_INTERVAL < REMINDER_WINDOW);
    }

    #[test]
    fn settings_are_readable() {
        assert!(read_setting(&NOTIFICATION_TITLE).contains("Study Reminder"));
        assert!(read_setting(&NOTIFICATION_ICON).starts_with("https://"));
    }
}
