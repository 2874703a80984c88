use crate::task::Task;

/// Which subset of the task list is shown.
///
/// Session-local, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
	All,
	Active,
	Completed,
}

impl Default for Filter {
	fn default() -> Self {
		Self::All
	}
}

impl Filter {
	/// In display order.
	pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

	/// Parses a location fragment (including the leading `#`).
	///
	/// Unrecognised fragments, including the empty one, select [`Filter::All`].
	#[must_use]
	pub fn from_hash(hash: &str) -> Self {
		match hash {
			"#active" => Self::Active,
			"#completed" => Self::Completed,
			_ => Self::All,
		}
	}

	#[must_use]
	pub fn hash(self) -> &'static str {
		match self {
			Self::All => "#",
			Self::Active => "#active",
			Self::Completed => "#completed",
		}
	}

	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Self::All => "All",
			Self::Active => "Active",
			Self::Completed => "Completed",
		}
	}

	#[must_use]
	pub fn matches(self, task: &Task) -> bool {
		match self {
			Self::All => true,
			Self::Active => !task.completed,
			Self::Completed => task.completed,
		}
	}

	/// The visible subset of `tasks`, in collection order.
	#[must_use]
	pub fn apply(self, tasks: &[Task]) -> Vec<Task> {
		tasks.iter().filter(|task| self.matches(task)).cloned().collect()
	}
}

#[must_use]
pub fn remaining_count(tasks: &[Task]) -> usize {
	tasks.iter().filter(|task| !task.completed).count()
}

/// `"1 task left"`, `"0 task left"`, but `"2 tasks left."`.
#[must_use]
pub fn counter_text(remaining: usize) -> String {
	if remaining > 1 {
		format!("{} tasks left.", remaining)
	} else {
		format!("{} task left", remaining)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::task::TaskId;

	fn tasks() -> Vec<Task> {
		vec![
			Task::new(TaskId(1), "open"),
			Task {
				completed: true,
				..Task::new(TaskId(2), "done")
			},
		]
	}

	fn ids(tasks: &[Task]) -> Vec<u64> {
		tasks.iter().map(|task| task.id.0).collect()
	}

	#[test]
	fn derivation() {
		let tasks = tasks();
		assert_eq!(ids(&Filter::Active.apply(&tasks)), [1]);
		assert_eq!(ids(&Filter::Completed.apply(&tasks)), [2]);
		assert_eq!(ids(&Filter::All.apply(&tasks)), [1, 2]);
	}

	#[test]
	fn hashes() {
		assert_eq!(Filter::from_hash("#active"), Filter::Active);
		assert_eq!(Filter::from_hash("#completed"), Filter::Completed);
		assert_eq!(Filter::from_hash(""), Filter::All);
		assert_eq!(Filter::from_hash("#"), Filter::All);
		assert_eq!(Filter::from_hash("#nonsense"), Filter::All);
		for filter in Filter::ALL.iter().copied() {
			assert_eq!(Filter::from_hash(filter.hash()), filter);
		}
	}

	#[test]
	fn counter() {
		assert_eq!(counter_text(0), "0 task left");
		assert_eq!(counter_text(1), "1 task left");
		assert_eq!(counter_text(2), "2 tasks left.");
		assert_eq!(remaining_count(&tasks()), 1);
	}
}
