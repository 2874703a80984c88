//! Putting it all together in a browser page.

use crate::{
	controller::Controller,
	error::AppError,
	filter::Filter,
	registry::{AppRegistry, Registration},
	storage::LocalStorage,
	store::TaskStore,
	view::DomView,
};
use core::cell::RefCell;
use std::{rc::Rc, sync::Once};
use tracing::{info, instrument};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
	/// The `localStorage` key the task list is stored under.
	pub storage_key: String,
	/// Where to mount the app. Falls back to `<body>` if nothing matches.
	pub mount_selector: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			storage_key: "todo".to_owned(),
			mount_selector: "#root".to_owned(),
		}
	}
}

impl AppConfig {
	#[must_use]
	pub fn storage_key(mut self, storage_key: impl Into<String>) -> Self {
		self.storage_key = storage_key.into();
		self
	}

	#[must_use]
	pub fn mount_selector(mut self, mount_selector: impl Into<String>) -> Self {
		self.mount_selector = mount_selector.into();
		self
	}
}

/// A mounted todo app.
///
/// Stays interactive until [unmounted](`TodoApp::unmount`) or dropped.
#[derive(Debug)]
pub struct TodoApp {
	controller: Rc<Controller<LocalStorage, DomView>>,
	_registration: Registration,
}

impl TodoApp {
	/// Mounts a new app according to `config` into the current document.
	///
	/// The initial filter is taken from the location hash.
	///
	/// # Errors
	///
	/// Iff `registry` is full, there is no usable `window`/`document`/`localStorage` or the DOM rejects an operation.
	#[instrument(skip(registry))]
	pub fn mount(registry: &Rc<AppRegistry>, config: &AppConfig) -> Result<Self, AppError> {
		let registration = registry.register()?;

		let window = web_sys::window().ok_or_else(|| AppError::Dom("No global `window`.".to_owned()))?;
		let document = window.document().ok_or_else(|| AppError::Dom("No `window.document`.".to_owned()))?;
		let parent: web_sys::Element = match document.query_selector(&config.mount_selector)? {
			Some(parent) => parent,
			None => document.body().ok_or_else(|| AppError::Dom("No `document.body`.".to_owned()))?.into(),
		};
		let storage = LocalStorage::from_window(&window)?;
		let filter = Filter::from_hash(&window.location().hash()?);

		let view = DomView::new(&document)?;
		view.mount(&parent)?;
		let controller = Controller::new(TaskStore::new(storage, config.storage_key.clone()), view, filter);
		info!(key = %config.storage_key, ?filter, "Mounted todo app.");

		Ok(Self {
			controller,
			_registration: registration,
		})
	}

	#[must_use]
	pub fn controller(&self) -> &Controller<LocalStorage, DomView> {
		&self.controller
	}

	/// Removes the app from the page and frees its registry slot.
	pub fn unmount(self) {
		self.controller.view().unmount();
	}
}

/// How many apps [`mount_app`] allows on one page.
pub const PAGE_INSTANCE_LIMIT: usize = 8;

thread_local! {
	static MOUNTED: RefCell<Vec<TodoApp>> = RefCell::default();
	static REGISTRY: Rc<AppRegistry> = AppRegistry::new(PAGE_INSTANCE_LIMIT);
}

/// Installs [`tracing_wasm`] as global default subscriber, unless another one is set already.
pub fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		// Embedders may have installed their own subscriber.
		let _ = tracing_wasm::try_set_as_global_default();
	});
}

/// Mounts a todo app that lives as long as the page.
///
/// `selector` and `storage_key` default to [`AppConfig::default`]'s.
/// At most [`PAGE_INSTANCE_LIMIT`] apps can be mounted this way.
///
/// # Errors
///
/// Iff mounting fails, as message string.
#[wasm_bindgen(js_name = mountApp)]
pub fn mount_app(selector: Option<String>, storage_key: Option<String>) -> Result<(), JsValue> {
	init_logging();

	let mut config = AppConfig::default();
	if let Some(selector) = selector {
		config = config.mount_selector(selector);
	}
	if let Some(storage_key) = storage_key {
		config = config.storage_key(storage_key);
	}

	let app = REGISTRY.with(|registry| TodoApp::mount(registry, &config))?;
	MOUNTED.with(|mounted| mounted.borrow_mut().push(app));
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_defaults_and_overrides() {
		let config = AppConfig::default();
		assert_eq!(config.storage_key, "todo");
		assert_eq!(config.mount_selector, "#root");

		let config = config.storage_key("hohoho").mount_selector("main");
		assert_eq!(
			config,
			AppConfig {
				storage_key: "hohoho".to_owned(),
				mount_selector: "main".to_owned(),
			}
		);
	}

	#[test]
	fn page_registry_has_page_limit() {
		REGISTRY.with(|registry| {
			assert_eq!(registry.limit(), PAGE_INSTANCE_LIMIT);
			let held: Vec<_> = (0..PAGE_INSTANCE_LIMIT).map(|_| registry.register().unwrap()).collect();
			assert!(matches!(registry.register(), Err(AppError::TooManyInstances { limit: PAGE_INSTANCE_LIMIT })));
			drop(held);
			assert_eq!(registry.live(), 0);
		});
	}
}
