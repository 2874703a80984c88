use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// Identifies a [`Task`] within one task list.
///
/// Stored as a bare JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
	/// The id following this one, unless this is the last one.
	#[must_use]
	pub fn next(self) -> Option<Self> {
		self.0.checked_add(1).map(Self)
	}
}

impl Display for TaskId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// One todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
	pub id: TaskId,
	pub title: String,
	#[serde(default)]
	pub completed: bool,
}

impl Task {
	/// Creates an uncompleted task. `title` is stored as given.
	pub fn new(id: TaskId, title: impl Into<String>) -> Self {
		Self {
			id,
			title: title.into(),
			completed: false,
		}
	}

	/// Shallowly merges `patch` into this task. Absent fields are left unchanged.
	pub fn apply(&mut self, patch: TaskPatch) {
		let TaskPatch { title, completed } = patch;
		if let Some(title) = title {
			self.title = title;
		}
		if let Some(completed) = completed {
			self.completed = completed;
		}
	}
}

/// A partial [`Task`] for [`TaskStore::edit`](`crate::store::TaskStore::edit`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub completed: Option<bool>,
}

impl TaskPatch {
	#[must_use]
	pub fn title(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::default()
		}
	}

	#[must_use]
	pub fn completed(completed: bool) -> Self {
		Self {
			completed: Some(completed),
			..Self::default()
		}
	}
}

/// Trims user-entered text. Returns [`None`] if nothing but whitespace remains.
#[must_use]
pub fn normalize_title(raw: &str) -> Option<&str> {
	Some(raw.trim()).filter(|title| !title.is_empty())
}
