//! Declarative construction of small DOM element trees.
//!
//! A [`NodeSpec`] describes one element: its tag, inner markup or text, attributes, event handlers and children.
//! [`UiBuilder::build`] turns it into a live [`web_sys::Element`] in one go.
//! Children are either [already live](`Child::Live`) and appended as they are,
//! or [further specifications](`Child::Spec`) that are built recursively first.

use js_sys::Function;
use std::borrow::Cow;
use tracing::{error, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// An event handler. Receives the triggering event.
pub type Handler = Box<dyn FnMut(web_sys::Event)>;

/// The value of an element attribute.
///
/// Falsy values, [`AttrValue::Flag(false)`] and empty text, are skipped when building,
/// which makes conditional attributes like `checked` straightforward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
	Text(Cow<'static, str>),
	/// Set as empty attribute if `true`.
	Flag(bool),
}

impl AttrValue {
	/// The value to set, or [`None`] if this attribute is skipped.
	#[must_use]
	pub fn as_attribute(&self) -> Option<&str> {
		match self {
			Self::Text(text) if text.is_empty() => None,
			Self::Text(text) => Some(text),
			Self::Flag(true) => Some(""),
			Self::Flag(false) => None,
		}
	}
}

impl From<&'static str> for AttrValue {
	fn from(text: &'static str) -> Self {
		Self::Text(Cow::Borrowed(text))
	}
}

impl From<String> for AttrValue {
	fn from(text: String) -> Self {
		Self::Text(Cow::Owned(text))
	}
}

impl From<bool> for AttrValue {
	fn from(flag: bool) -> Self {
		Self::Flag(flag)
	}
}

#[derive(Debug)]
enum Content {
	/// Interpreted as HTML. Not escaped!
	Markup(Cow<'static, str>),
	Text(Cow<'static, str>),
}

/// Declarative description of one element.
pub struct NodeSpec {
	tag: Cow<'static, str>,
	content: Option<Content>,
	attrs: Vec<(&'static str, AttrValue)>,
	events: Vec<(&'static str, Handler)>,
	children: Vec<Child>,
	container: Option<web_sys::Element>,
}

impl core::fmt::Debug for NodeSpec {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("NodeSpec")
			.field("tag", &self.tag)
			.field("content", &self.content)
			.field("attrs", &self.attrs)
			.field("events", &self.events.iter().map(|(name, _)| name).collect::<Vec<_>>())
			.field("children", &self.children)
			.field("container", &self.container)
			.finish()
	}
}

/// A child of a [`NodeSpec`].
#[derive(Debug)]
pub enum Child {
	Live(web_sys::Element),
	Spec(NodeSpec),
}

impl From<web_sys::Element> for Child {
	fn from(element: web_sys::Element) -> Self {
		Self::Live(element)
	}
}

impl From<NodeSpec> for Child {
	fn from(spec: NodeSpec) -> Self {
		Self::Spec(spec)
	}
}

impl NodeSpec {
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		Self {
			tag: tag.into(),
			content: None,
			attrs: Vec::new(),
			events: Vec::new(),
			children: Vec::new(),
			container: None,
		}
	}

	/// Sets the element's inner HTML. Overwrites any earlier [`markup`](`NodeSpec::markup`) or [`text`](`NodeSpec::text`).
	///
	/// **`markup` is not escaped.** Use [`text`](`NodeSpec::text`) for user content.
	#[must_use]
	pub fn markup(mut self, markup: impl Into<Cow<'static, str>>) -> Self {
		self.content = Some(Content::Markup(markup.into()));
		self
	}

	/// Sets the element's text content. Overwrites any earlier [`markup`](`NodeSpec::markup`) or [`text`](`NodeSpec::text`).
	#[must_use]
	pub fn text(mut self, text: impl Into<Cow<'static, str>>) -> Self {
		self.content = Some(Content::Text(text.into()));
		self
	}

	#[must_use]
	pub fn attr(mut self, name: &'static str, value: impl Into<AttrValue>) -> Self {
		self.attrs.push((name, value.into()));
		self
	}

	#[must_use]
	pub fn on(mut self, event: &'static str, handler: impl FnMut(web_sys::Event) + 'static) -> Self {
		self.events.push((event, Box::new(handler)));
		self
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<Child>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
		self.children.extend(children.into_iter().map(Into::into));
		self
	}

	/// When built as [`Child::Spec`], append the result to `container` instead of the parent element.
	#[must_use]
	pub fn mount_into(mut self, container: web_sys::Element) -> Self {
		self.container = Some(container);
		self
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}
}

/// A registered event listener. Removed from its target when dropped.
pub struct EventListener {
	target: web_sys::EventTarget,
	event: &'static str,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl core::fmt::Debug for EventListener {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("EventListener").field("target", &self.target).field("event", &self.event).finish_non_exhaustive()
	}
}

impl Drop for EventListener {
	fn drop(&mut self) {
		if let Err(error) = self.target.remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref::<Function>()) {
			error!("Failed to remove {:?} event listener: {:?}", self.event, error);
		}
	}
}

/// Keeps the event listeners of built elements alive.
///
/// Dropping or [clearing](`Listeners::clear`) this detaches all of them.
/// This is safe to do from inside one of the handlers.
#[derive(Debug, Default)]
pub struct Listeners(Vec<EventListener>);

impl Listeners {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// # Errors
	///
	/// Iff the platform refuses to add the listener.
	pub fn listen(&mut self, target: &web_sys::EventTarget, event: &'static str, handler: Handler) -> Result<(), JsValue> {
		let closure = Closure::wrap(handler);
		target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())?;
		self.0.push(EventListener {
			target: target.clone(),
			event,
			closure,
		});
		Ok(())
	}

	pub fn clear(&mut self) {
		let count = self.0.len();
		self.0.clear();
		trace!("Removed {} event listener(s).", count);
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Builds [`NodeSpec`]s into elements of one document.
#[derive(Debug, Clone)]
pub struct UiBuilder {
	document: web_sys::Document,
}

impl UiBuilder {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// Creates the element tree described by `spec`.
	///
	/// Event listeners are registered into `listeners` and stay active only as long as that's kept.
	///
	/// # Errors
	///
	/// Iff the platform rejects an operation, for example because `spec` has an invalid tag or attribute name.
	/// Elements created up to that point are left detached.
	#[instrument(skip(spec, listeners), fields(tag = %spec.tag))]
	pub fn build(&self, spec: NodeSpec, listeners: &mut Listeners) -> Result<web_sys::Element, JsValue> {
		self.build_node(spec, listeners)
	}

	fn build_node(&self, spec: NodeSpec, listeners: &mut Listeners) -> Result<web_sys::Element, JsValue> {
		let NodeSpec {
			tag,
			content,
			attrs,
			events,
			children,
			container: _,
		} = spec;
		let span = trace_span!("Building element", %tag, attrs = attrs.len(), events = events.len(), children = children.len());
		let _enter = span.enter();

		let element = self.document.create_element(&tag)?;
		match content {
			Some(Content::Markup(markup)) => element.set_inner_html(&markup),
			Some(Content::Text(text)) => element.set_text_content(Some(&text)),
			None => (),
		}

		for (name, value) in &attrs {
			match value.as_attribute() {
				Some(value) => element.set_attribute(name, value)?,
				None => trace!(name, "Skipped falsy attribute."),
			}
		}

		for (event, handler) in events {
			listeners.listen(&element, event, handler)?;
		}

		for child in children {
			match child {
				Child::Live(node) => {
					element.append_child(&node)?;
				}
				Child::Spec(mut spec) => {
					let container = spec.container.take();
					let built = self.build_node(spec, listeners)?;
					container.as_ref().unwrap_or(&element).append_child(&built)?;
				}
			}
		}

		Ok(element)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn falsy_attributes_are_skipped() {
		assert_eq!(AttrValue::from(false).as_attribute(), None);
		assert_eq!(AttrValue::from("").as_attribute(), None);
		assert_eq!(AttrValue::from(String::new()).as_attribute(), None);
		assert_eq!(AttrValue::from(true).as_attribute(), Some(""));
		assert_eq!(AttrValue::from("list").as_attribute(), Some("list"));
	}

	#[test]
	fn later_content_wins() {
		let spec = NodeSpec::new("div").markup("<b>a</b>").text("b");
		assert!(matches!(spec.content, Some(Content::Text(ref text)) if text == "b"));
	}

	#[test]
	fn spec_collects_declarations_in_order() {
		let spec = NodeSpec::new("input")
			.attr("type", "checkbox")
			.attr("checked", false)
			.on("change", |_| ())
			.child(NodeSpec::new("span"))
			.children(vec![NodeSpec::new("i"), NodeSpec::new("b")]);
		assert_eq!(spec.tag(), "input");
		assert_eq!(spec.attrs.iter().map(|(name, _)| *name).collect::<Vec<_>>(), ["type", "checked"]);
		assert_eq!(spec.events.len(), 1);
		assert_eq!(
			spec.children
				.iter()
				.map(|child| match child {
					Child::Spec(spec) => spec.tag(),
					Child::Live(_) => unreachable!(),
				})
				.collect::<Vec<_>>(),
			["span", "i", "b"]
		);
	}
}
