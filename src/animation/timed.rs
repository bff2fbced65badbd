//! Property animations that drive views and blings.

use super::Animation;
use crate::utils::arena::Id;
use crate::view::bling::BlingId;
use crate::view::ViewId;

pub type AnimationId = Id<TimedAnimation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Width,
    Height,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationTarget {
    View(ViewId),
    Bling { view: ViewId, bling: BlingId },
}

/// Something a [`TimedAnimation`] can write its values into.
pub trait Animatable {
    fn set_animated(&mut self, property: Property, value: f64);
}

/// A set of property animations running against one target.
#[derive(Debug)]
pub struct TimedAnimation {
    target: AnimationTarget,
    properties: Vec<(Property, Animation)>,
    /// Remove the animation once every property reached its end value.
    dispose_on_done: bool,
}

impl TimedAnimation {
    pub fn new(target: AnimationTarget, dispose_on_done: bool) -> Self {
        Self {
            target,
            properties: Vec::new(),
            dispose_on_done,
        }
    }

    pub fn with_property(mut self, property: Property, animation: Animation) -> Self {
        self.properties.retain(|(p, _)| *p != property);
        self.properties.push((property, animation));
        self
    }

    pub fn target(&self) -> AnimationTarget {
        self.target
    }

    pub fn dispose_on_done(&self) -> bool {
        self.dispose_on_done
    }

    pub fn is_done(&self) -> bool {
        self.properties.iter().all(|(_, anim)| anim.is_done())
    }

    /// Current value of every animated property.
    pub fn values(&self) -> impl Iterator<Item = (Property, f64)> + '_ {
        self.properties.iter().map(|(p, anim)| (*p, anim.value()))
    }

    pub fn apply_to(&self, target: &mut impl Animatable) {
        for (property, value) in self.values() {
            target.set_animated(property, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::{Clock, Curve};

    #[derive(Default)]
    struct Target {
        alpha: f64,
        x: f64,
    }

    impl Animatable for Target {
        fn set_animated(&mut self, property: Property, value: f64) {
            match property {
                Property::Alpha => self.alpha = value,
                Property::X => self.x = value,
                _ => (),
            }
        }
    }

    #[test]
    fn drives_all_properties() {
        let view: ViewId = Id::for_test(0);

        let mut clock = Clock::with_time(Duration::ZERO);
        let anim = TimedAnimation::new(AnimationTarget::View(view), true)
            .with_property(
                Property::Alpha,
                Animation::ease(clock.clone(), 0., 1., 100, Curve::Linear),
            )
            .with_property(
                Property::X,
                Animation::ease(clock.clone(), 10., 20., 200, Curve::Linear),
            );

        let mut target = Target::default();
        clock.set_unadjusted(Duration::from_millis(100));
        anim.apply_to(&mut target);
        assert_eq!(target.alpha, 1.);
        assert_eq!(target.x, 15.);
        assert!(!anim.is_done());

        clock.set_unadjusted(Duration::from_millis(200));
        assert!(anim.is_done());
    }
}
