//! The persistent task list.

use crate::{
	error::StoreError,
	storage::Storage,
	subscribers::Subscribers,
	task::{Task, TaskId, TaskPatch},
};
use core::cell::RefCell;
use tracing::{instrument, trace, warn};

/// An ordered task list, written through to a [`Storage`] under one key as a JSON array.
///
/// Reads are served from an in-memory copy once the list was loaded.
/// Every mutation writes the complete list to storage, then notifies all [subscribers](`TaskStore::subscribe`)
/// synchronously with the new list before returning.
///
/// Mutations that don't find their target task are no-ops as far as the list is concerned,
/// but still persist and notify.
pub struct TaskStore<S: Storage> {
	storage: S,
	key: String,
	cache: RefCell<Option<Vec<Task>>>,
	subscribers: Subscribers<[Task]>,
}

impl<S: Storage> core::fmt::Debug for TaskStore<S> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("TaskStore")
			.field("key", &self.key)
			.field("cached", &self.cache.borrow().as_ref().map(Vec::len))
			.field("subscribers", &self.subscribers)
			.finish()
	}
}

impl<S: Storage> TaskStore<S> {
	pub fn new(storage: S, key: impl Into<String>) -> Self {
		Self {
			storage,
			key: key.into(),
			cache: RefCell::default(),
			subscribers: Subscribers::default(),
		}
	}

	#[must_use]
	pub fn key(&self) -> &str {
		&self.key
	}

	#[must_use]
	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Loads the task list.
	///
	/// A missing key is an empty list.
	///
	/// # Errors
	///
	/// Iff the storage can't be read or its value under this store's key isn't a valid task list.
	pub fn try_read_all(&self) -> Result<Vec<Task>, StoreError> {
		if let Some(tasks) = self.cache.borrow().as_ref() {
			return Ok(tasks.clone());
		}

		let tasks = match self.storage.get_item(&self.key)? {
			None => Vec::new(),
			Some(json) => serde_json::from_str::<Vec<Task>>(&json).map_err(|source| StoreError::Corrupt { key: self.key.clone(), source })?,
		};
		trace!(key = %self.key, count = tasks.len(), "Loaded task list from storage.");
		*self.cache.borrow_mut() = Some(tasks.clone());
		Ok(tasks)
	}

	/// Like [`try_read_all`](`TaskStore::try_read_all`), but falls back to an empty list on failure.
	///
	/// The unreadable value is left in storage until the next mutation overwrites it.
	#[must_use]
	pub fn read_all(&self) -> Vec<Task> {
		self.try_read_all().unwrap_or_else(|error| {
			warn!(key = %self.key, %error, "Falling back to an empty task list.");
			Vec::new()
		})
	}

	/// An id not used by any task currently in the list, greater than all of them.
	///
	/// # Errors
	///
	/// Iff the largest listed id is [`u64::MAX`].
	pub fn next_id(&self) -> Result<TaskId, StoreError> {
		match self.read_all().iter().map(|task| task.id).max() {
			None => Ok(TaskId(1)),
			Some(max) => max.next().ok_or(StoreError::IdsExhausted(max)),
		}
	}

	/// Appends `task`.
	///
	/// # Errors
	///
	/// Iff a task with the same id is already listed, or persisting fails.
	#[instrument(skip(self, task), fields(id = %task.id))]
	pub fn add(&self, task: Task) -> Result<(), StoreError> {
		let mut tasks = self.read_all();
		if tasks.iter().any(|existing| existing.id == task.id) {
			return Err(StoreError::DuplicateId(task.id));
		}
		if cfg!(feature = "dangerous-logging") {
			trace!(title = %task.title, "Adding task.");
		}
		tasks.push(task);
		self.commit(tasks)
	}

	/// Removes the task with `id`, if any.
	///
	/// # Errors
	///
	/// Iff persisting fails.
	#[instrument(skip(self))]
	pub fn delete(&self, id: TaskId) -> Result<(), StoreError> {
		let mut tasks = self.read_all();
		if let Some(index) = tasks.iter().position(|task| task.id == id) {
			tasks.remove(index);
		} else {
			trace!("No such task.");
		}
		self.commit(tasks)
	}

	/// Merges `patch` into the task with `id`, if any. Values are stored as given.
	///
	/// # Errors
	///
	/// Iff persisting fails.
	#[instrument(skip(self, patch))]
	pub fn edit(&self, id: TaskId, patch: TaskPatch) -> Result<(), StoreError> {
		if cfg!(feature = "dangerous-logging") {
			trace!(?patch, "Editing task.");
		}
		let mut tasks = self.read_all();
		match tasks.iter_mut().find(|task| task.id == id) {
			Some(task) => task.apply(patch),
			None => trace!("No such task."),
		}
		self.commit(tasks)
	}

	/// Flips the completion state of the task with `id`, if any.
	///
	/// # Errors
	///
	/// Iff persisting fails.
	#[instrument(skip(self))]
	pub fn toggle(&self, id: TaskId) -> Result<(), StoreError> {
		let mut tasks = self.read_all();
		match tasks.iter_mut().find(|task| task.id == id) {
			Some(task) => task.completed = !task.completed,
			None => trace!("No such task."),
		}
		self.commit(tasks)
	}

	/// Registers `handler` to be called with the complete list after each mutation.
	///
	/// All handlers are kept and called in registration order.
	pub fn subscribe(&self, handler: impl Fn(&[Task]) + 'static) {
		self.subscribers.subscribe(handler);
	}

	fn commit(&self, tasks: Vec<Task>) -> Result<(), StoreError> {
		let json = serde_json::to_string(&tasks).map_err(StoreError::Serialize)?;
		self.storage.set_item(&self.key, &json)?;
		*self.cache.borrow_mut() = Some(tasks.clone());

		trace!(count = tasks.len(), subscribers = self.subscribers.len(), "Notifying subscribers.");
		self.subscribers.emit(&tasks);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{error::StorageError, storage::MemoryStorage};
	use core::cell::Cell;
	use std::rc::Rc;

	const KEY: &str = "todo";

	fn store() -> TaskStore<MemoryStorage> {
		TaskStore::new(MemoryStorage::new(), KEY)
	}

	fn ids(tasks: &[Task]) -> Vec<u64> {
		tasks.iter().map(|task| task.id.0).collect()
	}

	#[test]
	fn missing_key_is_empty() {
		let store = store();
		assert!(store.try_read_all().unwrap().is_empty());
		assert!(store.storage().is_empty());
	}

	#[test]
	fn loads_existing_list() {
		let storage = MemoryStorage::new().with_item(KEY, r#"[{"id":3,"title":"a","completed":false},{"id":9,"title":"b","completed":true}]"#);
		let store = TaskStore::new(storage, KEY);
		assert_eq!(ids(&store.read_all()), [3, 9]);
		assert_eq!(store.next_id().unwrap(), TaskId(10));
	}

	#[test]
	fn corrupt_value_is_typed_error_with_fallback() {
		let storage = MemoryStorage::new().with_item(KEY, "{not json");
		let store = TaskStore::new(storage.clone(), KEY);
		assert!(matches!(store.try_read_all(), Err(StoreError::Corrupt { .. })));
		assert!(store.read_all().is_empty());

		store.add(Task::new(TaskId(1), "fresh")).unwrap();
		assert_eq!(storage.get_item(KEY).unwrap().as_deref(), Some(r#"[{"id":1,"title":"fresh","completed":false}]"#));
	}

	#[test]
	fn mutations_write_through() {
		let storage = MemoryStorage::new();
		let store = TaskStore::new(storage.clone(), KEY);
		store.add(Task::new(TaskId(1), "a")).unwrap();
		store.add(Task::new(TaskId(2), "b")).unwrap();
		store.toggle(TaskId(2)).unwrap();
		store.edit(TaskId(1), TaskPatch::title("A")).unwrap();
		store.delete(TaskId(2)).unwrap();

		let reloaded = TaskStore::new(storage, KEY);
		assert_eq!(reloaded.read_all(), [Task::new(TaskId(1), "A")]);
		assert_eq!(reloaded.read_all(), store.read_all());
	}

	#[test]
	fn toggle_twice_restores() {
		let store = store();
		store.add(Task::new(TaskId(1), "a")).unwrap();
		store.toggle(TaskId(1)).unwrap();
		assert!(store.read_all()[0].completed);
		store.toggle(TaskId(1)).unwrap();
		assert!(!store.read_all()[0].completed);
	}

	#[test]
	fn absent_ids_are_no_ops() {
		let store = store();
		store.add(Task::new(TaskId(1), "a")).unwrap();
		let before = store.read_all();

		store.delete(TaskId(42)).unwrap();
		store.toggle(TaskId(42)).unwrap();
		store.edit(TaskId(42), TaskPatch::title("x")).unwrap();
		assert_eq!(store.read_all(), before);
	}

	#[test]
	fn edit_stores_verbatim() {
		let store = store();
		store.add(Task::new(TaskId(1), "a")).unwrap();
		store.edit(TaskId(1), TaskPatch::title("  padded  ")).unwrap();
		assert_eq!(store.read_all()[0].title, "  padded  ");
	}

	#[test]
	fn duplicate_id_is_rejected() {
		let store = store();
		store.add(Task::new(TaskId(1), "a")).unwrap();
		assert!(matches!(store.add(Task::new(TaskId(1), "b")), Err(StoreError::DuplicateId(TaskId(1)))));
		assert_eq!(store.read_all().len(), 1);
	}

	#[test]
	fn delete_removes_only_first_match() {
		let storage = MemoryStorage::new().with_item(KEY, r#"[{"id":1,"title":"a"},{"id":1,"title":"b"}]"#);
		let store = TaskStore::new(storage, KEY);
		store.delete(TaskId(1)).unwrap();
		assert_eq!(store.read_all(), [Task::new(TaskId(1), "b")]);
	}

	#[test]
	fn every_subscriber_sees_each_mutation() {
		let store = store();
		let first = Rc::new(RefCell::new(Vec::new()));
		let second = Rc::new(Cell::new(0));
		{
			let first = first.clone();
			store.subscribe(move |tasks| first.borrow_mut().push(ids(tasks)));
		}
		{
			let second = second.clone();
			store.subscribe(move |_| second.set(second.get() + 1));
		}

		store.add(Task::new(TaskId(1), "a")).unwrap();
		store.add(Task::new(TaskId(2), "b")).unwrap();
		store.delete(TaskId(1)).unwrap();

		assert_eq!(*first.borrow(), [vec![1], vec![1, 2], vec![2]]);
		assert_eq!(second.get(), 3);
	}

	#[test]
	fn subscribers_may_read_back() {
		let store = Rc::new(store());
		let seen = Rc::new(Cell::new(0));
		{
			let weak = Rc::downgrade(&store);
			let seen = seen.clone();
			store.subscribe(move |tasks| {
				let store = weak.upgrade().unwrap();
				assert_eq!(store.read_all(), tasks);
				seen.set(tasks.len());
			});
		}
		store.add(Task::new(TaskId(1), "a")).unwrap();
		assert_eq!(seen.get(), 1);
	}

	struct ReadOnly;
	impl Storage for ReadOnly {
		fn get_item(&self, _: &str) -> Result<Option<String>, StorageError> {
			Ok(None)
		}

		fn set_item(&self, key: &str, _: &str) -> Result<(), StorageError> {
			Err(StorageError::Write {
				key: key.to_owned(),
				reason: "QuotaExceededError".to_owned(),
			})
		}
	}

	#[test]
	fn failed_write_changes_nothing() {
		let store = TaskStore::new(ReadOnly, KEY);
		let notified = Rc::new(Cell::new(false));
		{
			let notified = notified.clone();
			store.subscribe(move |_| notified.set(true));
		}

		assert!(matches!(store.add(Task::new(TaskId(1), "a")), Err(StoreError::Storage(StorageError::Write { .. }))));
		assert!(store.read_all().is_empty());
		assert!(!notified.get());
	}

	#[test]
	fn reads_are_cached() {
		let storage = MemoryStorage::new().with_item(KEY, r#"[{"id":1,"title":"a","completed":false}]"#);
		let store = TaskStore::new(storage.clone(), KEY);
		assert_eq!(store.read_all(), [Task::new(TaskId(1), "a")]);

		storage.set_item(KEY, r#"[{"id":5,"title":"elsewhere","completed":true}]"#).unwrap();
		assert_eq!(store.read_all(), [Task::new(TaskId(1), "a")]);

		store.add(Task::new(TaskId(2), "b")).unwrap();
		assert_eq!(
			storage.get_item(KEY).unwrap().as_deref(),
			Some(r#"[{"id":1,"title":"a","completed":false},{"id":2,"title":"b","completed":false}]"#)
		);
	}

	#[test]
	fn ids_can_run_out() {
		let storage = MemoryStorage::new().with_item(KEY, format!(r#"[{{"id":{},"title":"last"}}]"#, u64::MAX));
		let store = TaskStore::new(storage, KEY);
		assert!(matches!(store.next_id(), Err(StoreError::IdsExhausted(TaskId(u64::MAX)))));
	}
}
