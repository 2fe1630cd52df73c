//! This module provides the owner of the task collection

use chrono::NaiveDateTime;

use crate::config::STORAGE_KEY;
use crate::error::{TaskError, TaskResult};
use crate::storage::KeyValueStorage;
use crate::task::{Status, Task, TaskFields, TaskId};


/// The authoritative, ordered collection of tasks, and the storage it is persisted into.
///
/// Mutations do not persist by themselves, call [`TaskStore::save`] afterwards.
#[derive(Debug)]
pub struct TaskStore<S: KeyValueStorage> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: KeyValueStorage> TaskStore<S> {
    /// Initialize a store from the content of its storage.
    ///
    /// This never fails: missing or malformed data results in an empty store, and unreadable records are left out.
    pub fn load(storage: S) -> Self {
        let tasks = match Self::read_tasks(&storage) {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!("Invalid stored tasks: {}. Starting with an empty list", err);
                Vec::new()
            },
        };
        log::debug!("Loaded {} tasks", tasks.len());

        Self { storage, tasks }
    }

    /// Records that cannot be read are skipped, so that a single bad record does not hide the others
    fn read_tasks(storage: &S) -> TaskResult<Vec<Task>> {
        let blob = match storage.get(STORAGE_KEY) {
            None => return Ok(Vec::new()),
            Some(blob) => blob,
        };
        let records: Vec<serde_json::Value> = serde_json::from_str(&blob).map_err(TaskError::Deserialization)?;

        let mut tasks = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Task>(record) {
                Ok(task) => tasks.push(task),
                Err(err) => log::warn!("Skipping invalid stored task #{}: {}", index, err),
            }
        }
        Ok(tasks)
    }

    /// Write the whole collection to the storage, overwriting any previous content
    pub fn save(&mut self) {
        if let Err(err) = self.try_save() {
            log::warn!("Unable to save tasks: {}", err);
        }
    }

    /// Same as [`TaskStore::save`], but reports failures to the caller
    pub fn try_save(&mut self) -> TaskResult<()> {
        let blob = serde_json::to_string(&self.tasks).map_err(TaskError::Serialization)?;
        self.storage.set(STORAGE_KEY, blob)
    }

    /// Returns the current tasks, in creation order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> TaskResult<&mut Task> {
        self.tasks.iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append a new pending task.
    ///
    /// Its id is derived from `now` (in milliseconds), and is bumped until no other task uses it.
    pub fn create(&mut self, fields: TaskFields, now: NaiveDateTime) -> TaskResult<&Task> {
        let fields = fields.validated()?;
        let id = self.fresh_id(now);
        log::info!("Creating task {} ({})", id, fields.name);

        self.tasks.push(Task::new(id, fields));
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    fn fresh_id(&self, now: NaiveDateTime) -> TaskId {
        let mut candidate = now.and_utc().timestamp_millis();
        loop {
            let id = TaskId::from(candidate.to_string());
            if self.get(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }

    /// Replace every field of a task, but its id and its status
    pub fn update(&mut self, id: &TaskId, fields: TaskFields) -> TaskResult<&Task> {
        let fields = fields.validated()?;
        let task = self.get_mut(id)?;
        log::info!("Updating task {}", id);
        task.apply(fields);
        Ok(&*task)
    }

    /// Change the status of a task, and nothing else
    pub fn set_status(&mut self, id: &TaskId, status: Status) -> TaskResult<()> {
        let task = self.get_mut(id)?;
        log::info!("Marking task {} as {}", id, status);
        task.set_status(status);
        Ok(())
    }

    /// Flip a task between pending and completed. Returns its new status
    pub fn toggle_status(&mut self, id: &TaskId) -> TaskResult<Status> {
        let new_status = self.get_mut(id)?.status().toggled();
        self.set_status(id, new_status)?;
        Ok(new_status)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveTime};
    use crate::storage::MemoryStorage;
    use crate::task::Priority;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    fn fields(name: &str) -> TaskFields {
        TaskFields::new(name, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap())
            .with_category("Biology")
            .with_due_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
            .with_priority(Priority::High)
    }

    #[test]
    fn load_missing_blob_is_empty() {
        let store = TaskStore::load(MemoryStorage::new());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn load_malformed_blob_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "{ definitely not json".to_string()).unwrap();
        let store = TaskStore::load(storage);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let mut store = TaskStore::load(MemoryStorage::new());
        store.create(fields("Read Ch.3"), now()).unwrap();
        let id = store.create(fields("Essay draft"), now()).unwrap().id().clone();
        store.set_status(&id, Status::Completed).unwrap();
        store.save();

        let reloaded = TaskStore::load(store.storage().clone());
        assert_eq!(reloaded.tasks(), store.tasks());
    }

    #[test]
    fn legacy_blob_is_normalized() {
        let mut storage = MemoryStorage::new();
        let legacy = r#"[{"id":"1","name":"Old task","category":"","dueDate":"2023-11-02","priority":"low"}]"#;
        storage.set(STORAGE_KEY, legacy.to_string()).unwrap();

        let store = TaskStore::load(storage);
        let task = &store.tasks()[0];
        assert_eq!(task.status(), Status::Pending);
        assert_eq!(task.due_time(), None);
    }

    #[test]
    fn blank_statuses_do_not_hide_other_tasks() {
        let mut storage = MemoryStorage::new();
        let blob = r#"[
            {"id":"1","name":"Good","category":"Math","dueDate":"2024-03-12","dueTime":"10:00","priority":"high","status":"completed"},
            {"id":"2","name":"Nulls","category":null,"dueDate":"2024-03-13","dueTime":null,"priority":"low","status":null},
            {"id":"3","name":"Blank","category":"","dueDate":"2024-03-14","dueTime":"","priority":"medium","status":""}
        ]"#;
        storage.set(STORAGE_KEY, blob.to_string()).unwrap();

        let store = TaskStore::load(storage);
        assert_eq!(store.tasks().len(), 3);
        assert_eq!(store.tasks()[0].status(), Status::Completed);
        assert_eq!(store.tasks()[1].status(), Status::Pending);
        assert_eq!(store.tasks()[1].category(), "");
        assert_eq!(store.tasks()[2].status(), Status::Pending);
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let mut storage = MemoryStorage::new();
        let blob = r#"[
            {"id":"1","name":"Good","dueDate":"2024-03-12","priority":"high"},
            {"id":"2","name":"Bad priority","dueDate":"2024-03-13","priority":"urgent"},
            {"id":"3","name":"Also good","dueDate":"2024-03-14","priority":"low"}
        ]"#;
        storage.set(STORAGE_KEY, blob.to_string()).unwrap();

        let store = TaskStore::load(storage);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn create_assigns_unique_time_derived_ids() {
        let mut store = TaskStore::load(MemoryStorage::new());
        let first = store.create(fields("A"), now()).unwrap().clone();
        let second = store.create(fields("B"), now()).unwrap().clone();

        assert_eq!(first.id().as_str(), now().and_utc().timestamp_millis().to_string());
        assert_ne!(first.id(), second.id());
        assert_eq!(first.status(), Status::Pending);
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn create_does_not_persist() {
        let mut store = TaskStore::load(MemoryStorage::new());
        store.create(fields("A"), now()).unwrap();
        assert_eq!(store.storage().get(STORAGE_KEY), None);
    }

    #[test]
    fn create_rejects_blank_names() {
        let mut store = TaskStore::load(MemoryStorage::new());
        assert!(matches!(store.create(fields("  "), now()), Err(TaskError::EmptyName)));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn update_keeps_id_and_status() {
        let mut store = TaskStore::load(MemoryStorage::new());
        let id = store.create(fields("A"), now()).unwrap().id().clone();
        store.set_status(&id, Status::Completed).unwrap();

        let new_fields = TaskFields::new("A, revised", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
            .with_priority(Priority::Low);
        let updated = store.update(&id, new_fields).unwrap();

        assert_eq!(updated.id(), &id);
        assert_eq!(updated.name(), "A, revised");
        assert_eq!(updated.category(), "");
        assert_eq!(updated.due_time(), None);
        assert_eq!(updated.status(), Status::Completed);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut store = TaskStore::load(MemoryStorage::new());
        store.create(fields("A"), now()).unwrap();
        let before = store.tasks().to_vec();

        let unknown = TaskId::from("nope");
        assert!(matches!(store.update(&unknown, fields("B")), Err(TaskError::NotFound(_))));
        assert!(matches!(store.set_status(&unknown, Status::Completed), Err(TaskError::NotFound(_))));
        assert_eq!(store.tasks(), &before[..]);
    }

    #[test]
    fn toggling_flips_the_status() {
        let mut store = TaskStore::load(MemoryStorage::new());
        let id = store.create(fields("A"), now()).unwrap().id().clone();
        assert_eq!(store.toggle_status(&id).unwrap(), Status::Completed);
        assert_eq!(store.toggle_status(&id).unwrap(), Status::Pending);
    }
}
