#![doc(html_root_url = "https://docs.rs/todo-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A todo list application that renders straight into the DOM and persists into `localStorage`.
//!
//! The pieces, leaf first:
//!
//! - [`builder`] turns declarative [`NodeSpec`](`builder::NodeSpec`)s into live elements.
//! - [`store`] keeps the task list, written through to a [`Storage`](`storage::Storage`).
//! - [`view`] displays tasks and reports gestures.
//! - [`controller`] connects the latter two.
//! - [`app`] mounts everything into a page.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod app;
pub mod builder;
pub mod controller;
pub mod error;
pub mod filter;
pub mod registry;
pub mod storage;
pub mod store;
pub mod subscribers;
pub mod task;
pub mod view;

pub use app::{mount_app, AppConfig, TodoApp};
pub use error::{AppError, StorageError, StoreError};
pub use filter::Filter;
pub use task::{Task, TaskId, TaskPatch};
