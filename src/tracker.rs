//! This module ties the task store, the reminders and the presentation filters together
//!
//! A [`Tracker`] reacts to the events a user interface emits (creations, edits, completions, filter changes),
//! persists every change as soon as it is applied, and periodically sweeps tasks for reminders.

use std::time::Duration;

use crate::clock::Clock;
use crate::config::SWEEP_INTERVAL;
use crate::error::TaskResult;
use crate::notifier::{Notifier, Permission};
use crate::query::{self, CategoryFilter, PriorityFilter};
use crate::reminder::ReminderScheduler;
use crate::storage::KeyValueStorage;
use crate::store::TaskStore;
use crate::task::{Status, TaskFields, TaskId};
use crate::view::{self, Filters, RenderModel};


/// A task tracker, with its own tasks, reminder state, clock and notifier.
///
/// Several trackers can live side by side, they share nothing.
pub struct Tracker<S, C, N>
where
    S: KeyValueStorage,
    C: Clock,
    N: Notifier,
{
    store: TaskStore<S>,
    reminders: ReminderScheduler,
    clock: C,
    notifier: N,
    filters: Filters,
    sweep_interval: Duration,
}

impl<S, C, N> Tracker<S, C, N>
where
    S: KeyValueStorage,
    C: Clock,
    N: Notifier,
{
    /// Create a tracker, loading its tasks from `storage`
    pub fn new(storage: S, clock: C, notifier: N) -> Self {
        let mut tracker = Self {
            store: TaskStore::load(storage),
            reminders: ReminderScheduler::new(),
            clock,
            notifier,
            filters: Filters::default(),
            sweep_interval: SWEEP_INTERVAL,
        };
        tracker.reconcile_filters();
        tracker
    }

    /// Use a custom reminder scheduler (e.g. with another window)
    pub fn with_reminders(mut self, reminders: ReminderScheduler) -> Self {
        self.reminders = reminders;
        self
    }

    /// Override the delay between two reminder sweeps
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn store(&self) -> &TaskStore<S>            { &self.store     }
    pub fn reminders(&self) -> &ReminderScheduler   { &self.reminders }
    pub fn clock(&self) -> &C                       { &self.clock     }
    pub fn notifier(&self) -> &N                    { &self.notifier  }
    pub fn notifier_mut(&mut self) -> &mut N        { &mut self.notifier }
    pub fn filters(&self) -> &Filters               { &self.filters   }

    /// Ask for the notification permission.
    ///
    /// This does not sweep for reminders, the first sweep happens one interval after [`Tracker::run_reminders`] has started.
    pub async fn start(&mut self) -> Permission {
        let permission = self.notifier.request_permission().await;
        log::info!("Notification permission: {:?}", permission);
        permission
    }

    /// Create a task and persist it. Returns its id
    pub fn create(&mut self, fields: TaskFields) -> TaskResult<TaskId> {
        let now = self.clock.now();
        let id = self.store.create(fields, now)?.id().clone();
        self.after_mutation();
        Ok(id)
    }

    /// Edit a task and persist it. Its reminder is armed again
    pub fn update(&mut self, id: &TaskId, fields: TaskFields) -> TaskResult<()> {
        self.store.update(id, fields)?;
        self.reminders.forget(id);
        self.after_mutation();
        Ok(())
    }

    /// Set the status of a task and persist it. Its reminder is armed again
    pub fn set_status(&mut self, id: &TaskId, status: Status) -> TaskResult<()> {
        self.store.set_status(id, status)?;
        self.reminders.forget(id);
        self.after_mutation();
        Ok(())
    }

    /// Flip the status of a task (see [`Tracker::set_status`]). Returns its new status
    pub fn toggle_status(&mut self, id: &TaskId) -> TaskResult<Status> {
        let new_status = self.store.toggle_status(id)?;
        self.reminders.forget(id);
        self.after_mutation();
        Ok(new_status)
    }

    pub fn set_priority_filter(&mut self, priority: PriorityFilter) {
        self.filters.priority = priority;
    }

    /// Select a category. Unknown categories fall back to "all"
    pub fn set_category_filter(&mut self, category: CategoryFilter) {
        self.filters.category = category;
        self.reconcile_filters();
    }

    fn after_mutation(&mut self) {
        self.store.save();
        self.reconcile_filters();
    }

    fn reconcile_filters(&mut self) {
        let options = query::distinct_categories(self.store.tasks());
        self.filters.category = query::reconcile_category_filter(&self.filters.category, &options);
    }

    /// What should currently be displayed
    pub fn render(&self) -> RenderModel {
        view::render(self.store.tasks(), &self.filters, self.clock.now())
    }

    /// Check every task once for reminders. Returns the number of notifications sent
    pub fn sweep_reminders(&mut self) -> usize {
        let now = self.clock.now();
        self.reminders.sweep(self.store.tasks(), now, &mut self.notifier)
    }

    /// Sweep for reminders forever, once per sweep interval.
    ///
    /// The first sweep happens one interval after this is called, not immediately.
    pub async fn run_reminders(&mut self) {
        log::info!("Sweeping for reminders every {:?}", self.sweep_interval);
        let start = tokio::time::Instant::now() + self.sweep_interval;
        let mut interval = tokio::time::interval_at(start, self.sweep_interval);

        loop {
            interval.tick().await;
            let sent = self.sweep_reminders();
            log::debug!("Reminder sweep done, {} notification(s) sent", sent);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use crate::clock::ManualClock;
    use crate::config::STORAGE_KEY;
    use crate::error::TaskError;
    use crate::notifier::MemoryNotifier;
    use crate::query::Filter;
    use crate::storage::MemoryStorage;
    use crate::task::Priority;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(16, 0, 0).unwrap()
    }

    fn tracker() -> Tracker<MemoryStorage, ManualClock, MemoryNotifier> {
        Tracker::new(MemoryStorage::new(), ManualClock::new(start()), MemoryNotifier::new(Permission::Granted))
    }

    fn due_at(name: &str, category: &str, hour: u32, minute: u32) -> TaskFields {
        TaskFields::new(name, start().date())
            .with_category(category)
            .with_due_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
            .with_priority(Priority::High)
    }

    #[test]
    fn mutations_are_written_through() {
        let mut tracker = tracker();
        let id = tracker.create(due_at("Read Ch.3", "Biology", 18, 0)).unwrap();

        let stored = tracker.store().storage().get(STORAGE_KEY).unwrap();
        assert!(stored.contains("Read Ch.3"));

        tracker.set_status(&id, Status::Completed).unwrap();
        let stored = tracker.store().storage().get(STORAGE_KEY).unwrap();
        assert!(stored.contains("completed"));
    }

    #[test]
    fn unknown_ids_do_not_touch_the_storage() {
        let mut tracker = tracker();
        let err = tracker.set_status(&TaskId::from("missing"), Status::Completed).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
        assert_eq!(tracker.store().storage().get(STORAGE_KEY), None);
    }

    #[test]
    fn editing_rearms_only_the_edited_task() {
        let mut tracker = tracker();
        let a = tracker.create(due_at("A", "Math", 16, 5)).unwrap();
        let b = tracker.create(due_at("B", "Math", 16, 6)).unwrap();
        assert_eq!(tracker.sweep_reminders(), 2);

        tracker.update(&a, due_at("A, revised", "Math", 16, 10)).unwrap();
        assert!(!tracker.reminders().is_notified(&a));
        assert!(tracker.reminders().is_notified(&b));

        // Creating a task does not rearm the others
        tracker.create(due_at("C", "Math", 20, 0)).unwrap();
        assert!(tracker.reminders().is_notified(&b));

        assert_eq!(tracker.sweep_reminders(), 1);
        assert_eq!(tracker.notifier().received().len(), 3);
    }

    #[test]
    fn status_changes_rearm_the_task() {
        let mut tracker = tracker();
        let id = tracker.create(due_at("A", "Math", 16, 5)).unwrap();
        assert_eq!(tracker.sweep_reminders(), 1);

        assert_eq!(tracker.toggle_status(&id).unwrap(), Status::Completed);
        assert_eq!(tracker.sweep_reminders(), 0);
        assert_eq!(tracker.toggle_status(&id).unwrap(), Status::Pending);
        assert_eq!(tracker.sweep_reminders(), 1);
    }

    #[test]
    fn category_filter_follows_the_available_categories() {
        let mut tracker = tracker();
        let id = tracker.create(due_at("A", "History", 18, 0)).unwrap();
        tracker.create(due_at("B", "Math", 18, 0)).unwrap();

        tracker.set_category_filter(Filter::Only("History".to_string()));
        assert_eq!(tracker.filters().category, Filter::Only("History".to_string()));
        assert_eq!(tracker.render().visible_tasks.len(), 1);

        tracker.update(&id, due_at("A", "Math", 18, 0)).unwrap();
        assert_eq!(tracker.filters().category, Filter::All);

        tracker.set_category_filter(Filter::Only("Geography".to_string()));
        assert_eq!(tracker.filters().category, Filter::All);

        tracker.set_priority_filter(Filter::Only(Priority::Low));
        assert!(tracker.render().is_empty());
    }

    #[test]
    fn overdue_follows_the_clock() {
        let mut tracker = tracker();
        tracker.create(due_at("A", "Math", 18, 0)).unwrap();
        assert!(!tracker.render().visible_tasks[0].overdue);

        tracker.clock().advance(chrono::Duration::hours(8));
        assert!(tracker.render().visible_tasks[0].overdue);
    }

    #[tokio::test]
    async fn start_only_asks_for_permission() {
        let notifier = MemoryNotifier::answering(Permission::Granted);
        let mut tracker = Tracker::new(MemoryStorage::new(), ManualClock::new(start()), notifier);
        tracker.create(due_at("A", "Math", 16, 5)).unwrap();

        assert_eq!(tracker.start().await, Permission::Granted);
        assert_eq!(tracker.notifier().permission_requests(), 1);
        assert!(tracker.notifier().received().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recurring_sweeps_notify_once() {
        let mut tracker = tracker();
        tracker.create(due_at("A", "Math", 16, 10)).unwrap();

        // Sweeps at 30s, 60s and 90s
        let outcome = tokio::time::timeout(Duration::from_secs(95), tracker.run_reminders()).await;
        assert!(outcome.is_err());
        assert_eq!(tracker.notifier().received().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_sweep_before_the_first_interval() {
        let mut tracker = tracker();
        tracker.create(due_at("A", "Math", 16, 10)).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(29), tracker.run_reminders()).await;
        assert!(outcome.is_err());
        assert!(tracker.notifier().received().is_empty());
    }
}
