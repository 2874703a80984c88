use crate::{
	filter::{remaining_count, Filter},
	storage::Storage,
	store::TaskStore,
	task::{normalize_title, Task, TaskId, TaskPatch},
	view::{Edit, Submission, TaskView},
};
use core::cell::Cell;
use std::rc::{Rc, Weak};
use tracing::{debug, error, instrument};

/// Connects a [`TaskStore`] to a [`TaskView`].
///
/// Store changes re-render the view, view gestures mutate the store.
/// Also owns the current [`Filter`].
pub struct Controller<S: Storage, V: TaskView> {
	store: TaskStore<S>,
	view: V,
	filter: Cell<Filter>,
}

impl<S: Storage, V: TaskView + core::fmt::Debug> core::fmt::Debug for Controller<S, V> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Controller")
			.field("store", &self.store)
			.field("view", &self.view)
			.field("filter", &self.filter.get())
			.finish()
	}
}

impl<S: Storage + 'static, V: TaskView + 'static> Controller<S, V> {
	/// Wires `store` and `view` together and renders the current list once.
	pub fn new(store: TaskStore<S>, view: V, filter: Filter) -> Rc<Self> {
		let this = Rc::new(Self {
			store,
			view,
			filter: Cell::new(filter),
		});
		Self::bind(&this);
		this.view.render_active_filter(filter);
		this.show(&this.store.read_all());
		this
	}

	fn bind(this: &Rc<Self>) {
		this.store.subscribe(with(this, |this, tasks: &[Task]| this.show(tasks)));
		this.view.on_submit(with(this, |this, submission: &Submission| {
			if this.submit(&submission.title) {
				this.view.clear_form();
			}
		}));
		this.view.on_toggle(with(this, |this, id: &TaskId| this.toggle(*id)));
		this.view.on_delete(with(this, |this, id: &TaskId| this.delete(*id)));
		this.view.on_edit(with(this, |this, edit: &Edit| this.edit(edit.id, &edit.title)));
		this.view.on_filter_change(with(this, |this, filter: &Filter| this.set_filter(*filter)));
	}

	#[must_use]
	pub fn store(&self) -> &TaskStore<S> {
		&self.store
	}

	#[must_use]
	pub fn view(&self) -> &V {
		&self.view
	}

	#[must_use]
	pub fn filter(&self) -> Filter {
		self.filter.get()
	}

	/// Adds a new task if `title` isn't blank.
	///
	/// Returns whether the task was added.
	#[instrument(skip(self, title))]
	pub fn submit(&self, title: &str) -> bool {
		let title = match normalize_title(title) {
			Some(title) => title,
			None => {
				debug!("Ignored blank title.");
				return false;
			}
		};

		let id = match self.store.next_id() {
			Ok(id) => id,
			Err(error) => {
				error!(%error, "Can't assign an id to the new task.");
				return false;
			}
		};
		match self.store.add(Task::new(id, title)) {
			Ok(()) => true,
			Err(error) => {
				error!(%error, "Failed to add task.");
				false
			}
		}
	}

	pub fn toggle(&self, id: TaskId) {
		if let Err(error) = self.store.toggle(id) {
			error!(%id, %error, "Failed to toggle task.");
		}
	}

	pub fn delete(&self, id: TaskId) {
		if let Err(error) = self.store.delete(id) {
			error!(%id, %error, "Failed to delete task.");
		}
	}

	/// Retitles the task with `id`. Blank titles are ignored.
	pub fn edit(&self, id: TaskId, title: &str) {
		let title = match normalize_title(title) {
			Some(title) => title,
			None => return debug!(%id, "Ignored blank title."),
		};
		if let Err(error) = self.store.edit(id, TaskPatch::title(title)) {
			error!(%id, %error, "Failed to edit task.");
		}
	}

	/// Switches the filter and re-renders from a fresh read.
	#[instrument(skip(self))]
	pub fn set_filter(&self, filter: Filter) {
		self.filter.set(filter);
		self.view.render_active_filter(filter);
		self.show(&self.store.read_all());
	}

	fn show(&self, tasks: &[Task]) {
		self.view.render(&self.filter.get().apply(tasks));
		self.view.render_counter(remaining_count(tasks));
	}
}

/// Adapts `handler` to hold `this` only weakly, so that store and view don't keep their controller alive.
fn with<T: 'static, A: ?Sized>(this: &Rc<T>, handler: impl Fn(&T, &A) + 'static) -> impl Fn(&A) + 'static {
	let this: Weak<T> = Rc::downgrade(this);
	move |argument| {
		if let Some(this) = this.upgrade() {
			handler(&this, argument)
		}
	}
}
