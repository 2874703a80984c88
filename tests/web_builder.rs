#![cfg(target_arch = "wasm32")]

use std::{cell::Cell, rc::Rc};
use todo_dom::builder::{Listeners, NodeSpec, UiBuilder};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn builder() -> UiBuilder {
	todo_dom::app::init_logging();
	UiBuilder::new(window().unwrap().document().unwrap())
}

#[wasm_bindgen_test]
fn nested() {
	let builder = builder();
	let mut listeners = Listeners::new();

	let element = builder
		.build(
			NodeSpec::new("section")
				.attr("class", "app")
				.child(NodeSpec::new("h1").text("todo app"))
				.child(NodeSpec::new("ul").child(NodeSpec::new("li").markup("<b>bold</b>"))),
			&mut listeners,
		)
		.unwrap();

	assert_eq!(element.tag_name(), "SECTION");
	assert_eq!(element.get_attribute("class").as_deref(), Some("app"));
	assert_eq!(element.child_element_count(), 2);
	assert_eq!(element.query_selector("h1").unwrap().unwrap().text_content().as_deref(), Some("todo app"));
	assert!(element.query_selector("ul > li > b").unwrap().is_some());
	assert!(listeners.is_empty());
}

#[wasm_bindgen_test]
fn text_is_not_markup() {
	let element = builder().build(NodeSpec::new("div").text("<b>bold</b>"), &mut Listeners::new()).unwrap();
	assert_eq!(element.child_element_count(), 0);
	assert_eq!(element.text_content().as_deref(), Some("<b>bold</b>"));
}

#[wasm_bindgen_test]
fn falsy_attributes() {
	let element = builder()
		.build(
			NodeSpec::new("input")
				.attr("type", "checkbox")
				.attr("checked", false)
				.attr("autofocus", true)
				.attr("placeholder", ""),
			&mut Listeners::new(),
		)
		.unwrap();
	assert!(!element.has_attribute("checked"));
	assert!(element.has_attribute("autofocus"));
	assert!(!element.has_attribute("placeholder"));
	assert_eq!(element.get_attribute("type").as_deref(), Some("checkbox"));
}

#[wasm_bindgen_test]
fn live_children_and_alternate_container() {
	let builder = builder();
	let mut listeners = Listeners::new();
	let live = builder.build(NodeSpec::new("span"), &mut listeners).unwrap();
	let elsewhere = builder.build(NodeSpec::new("aside"), &mut listeners).unwrap();

	let element = builder
		.build(
			NodeSpec::new("div").child(live.clone()).child(NodeSpec::new("p").mount_into(elsewhere.clone())),
			&mut listeners,
		)
		.unwrap();

	assert_eq!(element.child_element_count(), 1);
	assert_eq!(live.parent_element(), Some(element));
	assert_eq!(elsewhere.first_element_child().unwrap().tag_name(), "P");
}

#[wasm_bindgen_test]
fn events_until_listeners_drop() {
	let builder = builder();
	let mut listeners = Listeners::new();
	let clicks = Rc::new(Cell::new(0));

	let button: HtmlElement = builder
		.build(
			NodeSpec::new("button").on("click", {
				let clicks = clicks.clone();
				move |event: web_sys::Event| {
					assert_eq!(event.type_(), "click");
					clicks.set(clicks.get() + 1);
				}
			}),
			&mut listeners,
		)
		.unwrap()
		.dyn_into()
		.unwrap();
	assert_eq!(listeners.len(), 1);

	button.click();
	button.click();
	assert_eq!(clicks.get(), 2);

	listeners.clear();
	button.click();
	assert_eq!(clicks.get(), 2);
}

#[wasm_bindgen_test]
fn invalid_tag_is_platform_error() {
	assert!(builder().build(NodeSpec::new("not a tag"), &mut Listeners::new()).is_err());
}
