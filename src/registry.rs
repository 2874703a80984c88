use crate::error::AppError;
use core::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Limits how many apps may be mounted at once.
///
/// Slots are held by [`Registration`]s and freed when those are dropped.
#[derive(Debug)]
pub struct AppRegistry {
	limit: usize,
	live: Cell<usize>,
}

impl AppRegistry {
	#[must_use]
	pub fn new(limit: usize) -> Rc<Self> {
		Rc::new(Self {
			limit,
			live: Cell::new(0),
		})
	}

	#[must_use]
	pub fn limit(&self) -> usize {
		self.limit
	}

	#[must_use]
	pub fn live(&self) -> usize {
		self.live.get()
	}

	/// Takes a slot.
	///
	/// # Errors
	///
	/// Iff all slots are taken.
	pub fn register(self: &Rc<Self>) -> Result<Registration, AppError> {
		let live = self.live.get();
		if live >= self.limit {
			warn!(limit = self.limit, "Refusing to register another app instance.");
			return Err(AppError::TooManyInstances { limit: self.limit });
		}
		self.live.set(live + 1);
		debug!(live = live + 1, limit = self.limit, "Registered app instance.");
		Ok(Registration { registry: self.clone() })
	}
}

#[derive(Debug)]
#[must_use = "The slot is freed again when this is dropped."]
pub struct Registration {
	registry: Rc<AppRegistry>,
}

impl Drop for Registration {
	fn drop(&mut self) {
		let live = self.registry.live.get().saturating_sub(1);
		self.registry.live.set(live);
		debug!(live, "Released app instance.");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ceiling() {
		let registry = AppRegistry::new(2);
		let first = registry.register().unwrap();
		let _second = registry.register().unwrap();
		assert!(matches!(registry.register(), Err(AppError::TooManyInstances { limit: 2 })));
		assert_eq!(registry.live(), 2);

		drop(first);
		assert_eq!(registry.live(), 1);
		let _third = registry.register().unwrap();
	}

	#[test]
	fn registries_are_independent() {
		let a = AppRegistry::new(1);
		let b = AppRegistry::new(1);
		let _a = a.register().unwrap();
		let _b = b.register().unwrap();
		assert!(a.register().is_err());
		assert!(b.register().is_err());
	}

	#[test]
	fn zero_limit() {
		assert!(AppRegistry::new(0).register().is_err());
	}
}
