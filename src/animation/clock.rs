use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable frame clock.
///
/// The time is fetched once and kept until [`Clock::clear`] so that everything looking at the
/// clock during one dispatch sees the same instant. The rate can be slowed down or sped up to
/// debug animations.
#[derive(Debug, Clone)]
pub struct Clock {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
struct Inner {
    /// Latest raw time, `None` until it is fetched again.
    raw: Option<Duration>,
    last_raw: Duration,
    adjusted: Duration,
    rate: f64,
    complete_instantly: bool,
}

impl Clock {
    /// Creates a clock frozen at the given time until the time is set or cleared.
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                raw: Some(time),
                last_raw: time,
                adjusted: time,
                rate: 1.,
                complete_instantly: false,
            })),
        }
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Sets the raw clock time.
    pub fn set_unadjusted(&mut self, time: Duration) {
        self.inner.borrow_mut().raw = Some(time);
    }

    /// Moves the raw clock time forward.
    pub fn advance(&mut self, delta: Duration) {
        let mut inner = self.inner.borrow_mut();
        let time = inner.raw.unwrap_or(inner.last_raw) + delta;
        inner.raw = Some(time);
    }

    /// Forgets the stored time so that it's fetched again next.
    pub fn clear(&mut self) {
        self.inner.borrow_mut().raw = None;
    }

    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.inner.borrow_mut().rate = rate.clamp(0., 1000.);
    }

    pub fn should_complete_instantly(&self) -> bool {
        self.inner.borrow().complete_instantly
    }

    pub fn set_complete_instantly(&mut self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::with_time(get_monotonic_time())
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl Inner {
    fn now(&mut self) -> Duration {
        let raw = *self.raw.get_or_insert_with(get_monotonic_time);
        if raw == self.last_raw {
            return self.adjusted;
        }

        if self.last_raw < raw {
            let delta = (raw - self.last_raw).mul_f64(self.rate);
            self.adjusted = self.adjusted.saturating_add(delta);
        } else {
            let delta = (self.last_raw - raw).mul_f64(self.rate);
            self.adjusted = self.adjusted.saturating_sub(delta);
        }

        self.last_raw = raw;
        self.adjusted
    }
}
