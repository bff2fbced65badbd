use std::time::Duration;

use keyframe::functions::{EaseOutCubic, EaseOutQuad};
use keyframe::EasingFunction;

mod clock;
pub use clock::Clock;

mod timed;
pub use timed::{Animatable, AnimationId, AnimationTarget, Property, TimedAnimation};

#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    start_time: Duration,
    clock: Clock,
    curve: Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
}

impl Animation {
    pub fn ease(clock: Clock, from: f64, to: f64, duration_ms: u64, curve: Curve) -> Self {
        Self {
            from,
            to,
            duration: Duration::from_millis(duration_ms),
            start_time: clock.now(),
            clock,
            curve,
        }
    }

    pub fn is_done(&self) -> bool {
        if self.clock.should_complete_instantly() {
            return true;
        }

        self.clock.now() >= self.start_time + self.duration
    }

    pub fn value_at(&self, at: Duration) -> f64 {
        if self.clock.should_complete_instantly() || self.start_time + self.duration <= at {
            return self.to;
        } else if at <= self.start_time {
            return self.from;
        }

        let passed = at.saturating_sub(self.start_time).as_secs_f64();
        let total = self.duration.as_secs_f64();
        let x = (passed / total).clamp(0., 1.);
        self.curve.y(x) * (self.to - self.from) + self.from
    }

    pub fn value(&self) -> f64 {
        self.value_at(self.clock.now())
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn end_time(&self) -> Duration {
        self.start_time + self.duration
    }
}

impl Curve {
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuad => EaseOutQuad.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn linear_midpoint() {
        let mut clock = Clock::with_time(Duration::ZERO);
        let anim = Animation::ease(clock.clone(), 0., 10., 100, Curve::Linear);
        assert_eq!(anim.value(), 0.);

        clock.set_unadjusted(Duration::from_millis(50));
        assert_relative_eq!(anim.value(), 5.);
        assert!(!anim.is_done());

        clock.set_unadjusted(Duration::from_millis(100));
        assert_eq!(anim.value(), 10.);
        assert!(anim.is_done());
    }

    #[test]
    fn ease_out_is_ahead_of_linear() {
        let mut clock = Clock::with_time(Duration::ZERO);
        let anim = Animation::ease(clock.clone(), 0., 1., 200, Curve::EaseOutCubic);
        clock.set_unadjusted(Duration::from_millis(100));
        assert!(anim.value() > 0.5);
        assert!(anim.value() < 1.);
    }

    #[test]
    fn complete_instantly() {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_complete_instantly(true);
        let anim = Animation::ease(clock.clone(), 0., 1., 150, Curve::EaseOutQuad);
        assert!(anim.is_done());
    }
}
