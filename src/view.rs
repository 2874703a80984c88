//! Rendering the task list and collecting user gestures.

use crate::{
	builder::{Listeners, NodeSpec, UiBuilder},
	filter::{counter_text, Filter},
	subscribers::Subscribers,
	task::{Task, TaskId},
};
use core::cell::RefCell;
use std::rc::Rc;
use tracing::{error, instrument, trace};
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};

const ACTIVE_FILTER_CLASS: &str = "filter__link--active";
const TITLE_FIELD: &str = "title";

/// The add-form's fields, keyed by their `name` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
	pub title: String,
}

/// An inline edit committed with Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	pub id: TaskId,
	/// Already trimmed.
	pub title: String,
}

/// The semantic gestures a [`TaskView`] reports.
#[derive(Debug, Default)]
pub struct ViewEvents {
	pub submit: Subscribers<Submission>,
	pub toggle: Subscribers<TaskId>,
	pub delete: Subscribers<TaskId>,
	pub edit: Subscribers<Edit>,
	pub filter_change: Subscribers<Filter>,
}

/// Displays (a subset of) the task list and reports user gestures.
///
/// Rendering can't fail from the caller's point of view. Implementations log what they can't display.
pub trait TaskView {
	/// Replaces the displayed list with `visible`, or an empty-state placeholder if there's nothing to show.
	fn render(&self, visible: &[Task]);
	fn render_counter(&self, remaining: usize);
	/// Marks exactly the control for `filter` as active.
	fn render_active_filter(&self, filter: Filter);
	/// Resets the add-form after a submission was accepted.
	fn clear_form(&self);
	fn events(&self) -> &ViewEvents;

	fn on_submit(&self, handler: impl Fn(&Submission) + 'static)
	where
		Self: Sized,
	{
		self.events().submit.subscribe(handler);
	}

	fn on_toggle(&self, handler: impl Fn(&TaskId) + 'static)
	where
		Self: Sized,
	{
		self.events().toggle.subscribe(handler);
	}

	fn on_delete(&self, handler: impl Fn(&TaskId) + 'static)
	where
		Self: Sized,
	{
		self.events().delete.subscribe(handler);
	}

	fn on_edit(&self, handler: impl Fn(&Edit) + 'static)
	where
		Self: Sized,
	{
		self.events().edit.subscribe(handler);
	}

	fn on_filter_change(&self, handler: impl Fn(&Filter) + 'static)
	where
		Self: Sized,
	{
		self.events().filter_change.subscribe(handler);
	}
}

/// A [`TaskView`] rendering into the DOM.
///
/// The page chrome (title, counter, filter links, add-form and list container) is built once.
/// Each [`render`](`TaskView::render`) tears down and rebuilds all list rows.
///
/// Filter links and changes of the document's location hash (e.g. Back/Forward) both report a filter change,
/// for as long as the view exists.
#[derive(Debug)]
pub struct DomView {
	builder: UiBuilder,
	root: web_sys::Element,
	list: web_sys::Element,
	counter: web_sys::Element,
	filter_links: Vec<(Filter, web_sys::Element)>,
	form: web_sys::HtmlFormElement,
	events: Rc<ViewEvents>,
	_chrome_listeners: Listeners,
	row_listeners: RefCell<Listeners>,
}

impl DomView {
	/// Builds the page chrome. It isn't attached anywhere until [`mount`](`DomView::mount`) is called.
	///
	/// # Errors
	///
	/// Iff the DOM rejects an operation.
	#[instrument(skip(document))]
	pub fn new(document: &web_sys::Document) -> Result<Self, JsValue> {
		let builder = UiBuilder::new(document.clone());
		let events = Rc::new(ViewEvents::default());
		let mut listeners = Listeners::new();

		let list = builder.build(NodeSpec::new("ul").attr("class", "list"), &mut listeners)?;
		let counter = builder.build(NodeSpec::new("div").attr("class", "counter").text(counter_text(0)), &mut listeners)?;

		let mut filter_links = Vec::with_capacity(Filter::ALL.len());
		for filter in Filter::ALL.iter().copied() {
			let events = events.clone();
			let link = builder.build(
				NodeSpec::new("a")
					.attr("href", filter.hash())
					.attr("class", "filter__link")
					.text(filter.label())
					.on("click", move |_| events.filter_change.emit(&filter)),
				&mut listeners,
			)?;
			filter_links.push((filter, link));
		}
		let filters = builder.build(
			NodeSpec::new("ul")
				.attr("class", "filter")
				.children(filter_links.iter().map(|(_, link)| NodeSpec::new("li").child(link.clone()))),
			&mut listeners,
		)?;

		let form = builder.build(
			NodeSpec::new("form")
				.attr("class", "add-form")
				.on("keydown", reset_on_escape)
				.on("submit", {
					let events = events.clone();
					move |event: web_sys::Event| submit(&event, &events)
				})
				.child(
					NodeSpec::new("input")
						.attr("name", TITLE_FIELD)
						.attr("type", "text")
						.attr("class", "add-form__input")
						.attr("autofocus", true)
						.attr("autocomplete", "off")
						.attr("placeholder", "What needs to be done?"),
				)
				.child(
					NodeSpec::new("button")
						.attr("class", "add-form__submit hidden")
						.attr("type", "submit")
						.text("Add task"),
				),
			&mut listeners,
		)?;

		if let Some(window) = document.default_view() {
			let events = events.clone();
			let location = window.location();
			listeners.listen(
				&window,
				"hashchange",
				Box::new(move |_: web_sys::Event| match location.hash() {
					Ok(hash) => events.filter_change.emit(&Filter::from_hash(&hash)),
					Err(error) => error!("Failed to read location hash: {:?}", error),
				}),
			)?;
		}

		let root = builder.build(
			NodeSpec::new("section")
				.attr("class", "app")
				.child(NodeSpec::new("h1").attr("class", "app__title").text("todo app"))
				.child(NodeSpec::new("div").attr("class", "app__tools").child(counter.clone()).child(filters))
				.child(form.clone())
				.child(NodeSpec::new("main").attr("class", "app__content").child(list.clone())),
			&mut listeners,
		)?;

		Ok(Self {
			builder,
			root,
			list,
			counter,
			filter_links,
			form: form.dyn_into()?,
			events,
			_chrome_listeners: listeners,
			row_listeners: RefCell::default(),
		})
	}

	/// Appends the page chrome to `parent`.
	///
	/// # Errors
	///
	/// Iff the DOM rejects the insertion.
	pub fn mount(&self, parent: &web_sys::Element) -> Result<(), JsValue> {
		parent.append_child(&self.root)?;
		Ok(())
	}

	/// Detaches the page chrome from its parent, if any.
	pub fn unmount(&self) {
		self.root.remove();
	}

	#[must_use]
	pub fn root(&self) -> &web_sys::Element {
		&self.root
	}

	fn build_row(&self, task: &Task, listeners: &mut Listeners) -> Result<web_sys::Element, JsValue> {
		let id = task.id;
		let class = if task.completed { "task task--completed" } else { "task" };

		let toggle = {
			let events = self.events.clone();
			move |_: web_sys::Event| events.toggle.emit(&id)
		};
		let delete = {
			let events = self.events.clone();
			move |_: web_sys::Event| events.delete.emit(&id)
		};
		let keydown = {
			let events = self.events.clone();
			move |event: web_sys::Event| edit_keydown(&event, id, &events)
		};
		let focusout = {
			let title = task.title.clone();
			move |event: web_sys::Event| {
				if let Some(target) = event.target().and_then(|target| target.dyn_into::<web_sys::HtmlElement>().ok()) {
					target.set_inner_text(&title);
				}
			}
		};

		self.builder.build(
			NodeSpec::new("li").attr("class", "list__item").child(
				NodeSpec::new("div")
					.attr("class", class)
					.child(
						NodeSpec::new("input")
							.attr("type", "checkbox")
							.attr("class", "task__checkbox")
							.attr("checked", task.completed)
							.on("change", toggle),
					)
					.child(
						NodeSpec::new("div")
							.attr("class", "task__title")
							.attr("contenteditable", true)
							.text(task.title.clone())
							.on("keydown", keydown)
							.on("focusout", focusout),
					)
					.child(NodeSpec::new("button").attr("class", "task__destroy").markup("&times;").on("click", delete)),
			),
			listeners,
		)
	}

	fn rebuild_list(&self, visible: &[Task]) -> Result<(), JsValue> {
		let mut listeners = self.row_listeners.borrow_mut();
		listeners.clear();
		while let Some(child) = self.list.first_child() {
			self.list.remove_child(&child)?;
		}

		if visible.is_empty() {
			let placeholder = self
				.builder
				.build(NodeSpec::new("div").attr("class", "not-found").text("Not found a task."), &mut listeners)?;
			self.list.append_child(&placeholder)?;
			return Ok(());
		}

		for task in visible {
			let row = self.build_row(task, &mut listeners)?;
			self.list.append_child(&row)?;
		}
		Ok(())
	}
}

impl TaskView for DomView {
	#[instrument(skip(self, visible), fields(count = visible.len()))]
	fn render(&self, visible: &[Task]) {
		if let Err(error) = self.rebuild_list(visible) {
			error!("Failed to render task list: {:?}", error);
		}
	}

	fn render_counter(&self, remaining: usize) {
		self.counter.set_text_content(Some(&counter_text(remaining)));
	}

	fn render_active_filter(&self, active: Filter) {
		trace!(?active, "Marking active filter.");
		for (filter, link) in &self.filter_links {
			if let Err(error) = link.class_list().toggle_with_force(ACTIVE_FILTER_CLASS, *filter == active) {
				error!("Failed to mark filter link: {:?}", error);
			}
		}
	}

	fn clear_form(&self) {
		self.form.reset();
	}

	fn events(&self) -> &ViewEvents {
		&self.events
	}
}

fn reset_on_escape(event: web_sys::Event) {
	let is_escape = event.dyn_ref::<web_sys::KeyboardEvent>().map_or(false, |event| event.key() == "Escape");
	if !is_escape {
		return;
	}
	if let Some(form) = event.current_target().and_then(|target| target.dyn_into::<web_sys::HtmlFormElement>().ok()) {
		form.reset();
	}
}

fn submit(event: &web_sys::Event, events: &ViewEvents) {
	event.prevent_default();

	let form = event
		.current_target()
		.and_then(|target| target.dyn_into::<web_sys::HtmlFormElement>().ok())
		.expect_throw("todo-dom: `submit` listener not on a form.");
	let title = match web_sys::FormData::new_with_form(&form) {
		Ok(data) => data.get(TITLE_FIELD).as_string().unwrap_or_default(),
		Err(error) => return error!("Failed to read form data: {:?}", error),
	};

	if cfg!(feature = "dangerous-logging") {
		trace!(%title, "Form submitted.");
	} else {
		trace!(len = title.len(), "Form submitted.");
	}
	events.submit.emit(&Submission { title });
}

/// Escape cancels, Enter commits. Both leave the title region, which restores the last known title on its own.
fn edit_keydown(event: &web_sys::Event, id: TaskId, events: &ViewEvents) {
	let key = match event.dyn_ref::<web_sys::KeyboardEvent>() {
		Some(event) => event.key(),
		None => return,
	};
	let target = match event.target().and_then(|target| target.dyn_into::<web_sys::HtmlElement>().ok()) {
		Some(target) => target,
		None => return,
	};

	match key.as_str() {
		"Escape" => {
			if let Err(error) = target.blur() {
				error!("Failed to leave title: {:?}", error);
			}
		}
		"Enter" => {
			event.prevent_default();
			let title = target.inner_text().trim().to_owned();
			if let Err(error) = target.blur() {
				error!("Failed to leave title: {:?}", error);
			}
			events.edit.emit(&Edit { id, title });
		}
		_ => (),
	}
}
