//! Wall clocks

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDateTime};

/// A source for the current local wall-clock time.
///
/// Every temporal decision of this crate (overdue tasks, reminders, fresh ids) reads the time from a `Clock`, so that tests can control it.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The actual local time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so that a test can keep a handle on a clock it has given away.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Rc::new(Cell::new(now)) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: chrono::Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
