//! Synchronous string key-value stores that a [`TaskStore`](`crate::store::TaskStore`) can persist into.

use crate::error::StorageError;
use core::cell::RefCell;
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::trace;

pub trait Storage {
	/// [`None`] if `key` was never written.
	///
	/// # Errors
	///
	/// Iff the backend refuses the read.
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// # Errors
	///
	/// Iff the backend refuses the write, for example because its quota is exceeded.
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Rc<S> {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		(**self).get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		(**self).set_item(key, value)
	}
}

/// The browser's [***localStorage***](https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage).
#[derive(Debug, Clone)]
pub struct LocalStorage {
	storage: web_sys::Storage,
}

impl LocalStorage {
	#[must_use]
	pub fn new(storage: web_sys::Storage) -> Self {
		Self { storage }
	}

	/// The current window's `localStorage`.
	///
	/// # Errors
	///
	/// Iff there is no window or it denies access, which browsers do for example for `file:` origins with strict settings.
	pub fn from_window(window: &web_sys::Window) -> Result<Self, StorageError> {
		match window.local_storage() {
			Ok(Some(storage)) => Ok(Self::new(storage)),
			Ok(None) => Err(StorageError::Unavailable("`window.localStorage` is `null`".to_owned())),
			Err(error) => Err(StorageError::Unavailable(format!("{:?}", error))),
		}
	}
}

impl Storage for LocalStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.storage.get_item(key).map_err(|error| StorageError::read(key, &error))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		trace!(key, len = value.len(), "Writing localStorage.");
		self.storage.set_item(key, value).map_err(|error| StorageError::write(key, &error))
	}
}

/// A [`Storage`] that lives only as long as the process (or page).
///
/// Clones share their contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
	items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.items.borrow_mut().insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.items.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.borrow().is_empty()
	}
}

impl Storage for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}
