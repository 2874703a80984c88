use core::cell::RefCell;
use std::rc::Rc;

type Handler<A> = Rc<dyn Fn(&A)>;

/// An ordered list of event handlers that are all invoked on [`emit`](`Subscribers::emit`).
///
/// Handlers may subscribe further handlers or emit again while running.
/// Those changes take effect from the next emission on.
pub struct Subscribers<A: ?Sized> {
	handlers: RefCell<Vec<Handler<A>>>,
}

impl<A: ?Sized> Default for Subscribers<A> {
	fn default() -> Self {
		Self {
			handlers: RefCell::default(),
		}
	}
}

impl<A: ?Sized> core::fmt::Debug for Subscribers<A> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Subscribers").field("len", &self.len()).finish()
	}
}

impl<A: ?Sized> Subscribers<A> {
	pub fn subscribe(&self, handler: impl Fn(&A) + 'static) {
		self.handlers.borrow_mut().push(Rc::new(handler));
	}

	pub fn emit(&self, argument: &A) {
		let handlers = self.handlers.borrow().clone();
		for handler in handlers {
			handler(argument);
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.handlers.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.handlers.borrow().is_empty()
	}
}
