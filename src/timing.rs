//! Rate limiting for high-frequency callbacks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::{Pending, Scheduler};

/// Runs `func` once calls have stopped for `wait_ms`, with the last call's
/// arguments.
pub struct Debounce<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u32,
    func: Rc<dyn Fn(A)>,
    pending: RefCell<Option<Box<dyn Pending>>>,
}

impl<A: 'static> Debounce<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u32, func: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            wait_ms,
            func: Rc::new(func),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, args: A) {
        let func = Rc::clone(&self.func);
        let next = self
            .scheduler
            .schedule(self.wait_ms, Box::new(move || func(args)));
        // Dropping the previous handle cancels it.
        let previous = self.pending.replace(Some(next));
        drop(previous);
    }
}

/// Runs `func` on the first call, then drops calls until `limit_ms` has
/// passed.
pub struct Throttle<A> {
    scheduler: Rc<dyn Scheduler>,
    limit_ms: u32,
    func: Box<dyn Fn(A)>,
    cooling: Rc<Cell<bool>>,
    reset: RefCell<Option<Box<dyn Pending>>>,
}

impl<A> Throttle<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, limit_ms: u32, func: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            limit_ms,
            func: Box::new(func),
            cooling: Rc::new(Cell::new(false)),
            reset: RefCell::new(None),
        }
    }

    pub fn call(&self, args: A) {
        if self.cooling.replace(true) {
            return;
        }
        let cooling = Rc::clone(&self.cooling);
        let reset = self
            .scheduler
            .schedule(self.limit_ms, Box::new(move || cooling.set(false)));
        let previous = self.reset.replace(Some(reset));
        drop(previous);
        (self.func)(args);
    }
}
