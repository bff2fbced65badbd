//! Registry of the touch points currently down.

use std::collections::HashMap;

use smithay::utils::{Logical, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub slot: i32,
    /// Last known position in layout coordinates.
    pub position: Point<f64, Logical>,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    #[error("touch point {0} does not exist")]
    Unknown(i32),
}

#[derive(Debug, Default)]
pub struct TouchPoints {
    points: HashMap<i32, TouchPoint>,
}

impl TouchPoints {
    /// Starts tracking a touch point.
    ///
    /// Returns the point previously tracked under the same slot, which the caller should treat
    /// as a protocol inconsistency. The new position wins.
    pub fn add(&mut self, slot: i32, position: Point<f64, Logical>) -> Option<TouchPoint> {
        self.points.insert(slot, TouchPoint { slot, position })
    }

    pub fn update(
        &mut self,
        slot: i32,
        position: Point<f64, Logical>,
    ) -> Result<TouchPoint, TouchError> {
        let point = self.points.get_mut(&slot).ok_or(TouchError::Unknown(slot))?;
        point.position = position;
        Ok(*point)
    }

    pub fn remove(&mut self, slot: i32) -> Result<TouchPoint, TouchError> {
        self.points.remove(&slot).ok_or(TouchError::Unknown(slot))
    }

    pub fn get(&self, slot: i32) -> Option<&TouchPoint> {
        self.points.get(&slot)
    }

    pub fn contains(&self, slot: i32) -> bool {
        self.points.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchPoint> + '_ {
        self.points.values()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lifecycle() {
        let mut points = TouchPoints::default();
        assert_eq!(points.add(5, Point::from((1., 2.))), None);

        let point = points.update(5, Point::from((3., 4.))).unwrap();
        assert_eq!(point.position, Point::from((3., 4.)));

        points.remove(5).unwrap();
        assert_eq!(points.get(5), None);
        assert!(points.is_empty());
    }

    #[test]
    fn unknown_slots_are_reported() {
        let mut points = TouchPoints::default();
        points.add(1, Point::from((0., 0.)));

        assert_eq!(
            points.update(2, Point::from((5., 5.))),
            Err(TouchError::Unknown(2))
        );
        assert_eq!(points.remove(2), Err(TouchError::Unknown(2)));
        assert_eq!(points.len(), 1);
        assert_eq!(points.get(1).unwrap().position, Point::from((0., 0.)));
    }

    #[test]
    fn duplicate_add_replaces() {
        let mut points = TouchPoints::default();
        points.add(1, Point::from((0., 0.)));
        let old = points.add(1, Point::from((1., 1.))).unwrap();
        assert_eq!(old.position, Point::from((0., 0.)));
        assert_eq!(points.get(1).unwrap().position, Point::from((1., 1.)));
    }

    #[derive(Debug, Clone, proptest_derive::Arbitrary)]
    enum Op {
        Add(#[proptest(strategy = "0..4i32")] i32),
        Update(#[proptest(strategy = "0..4i32")] i32),
        Remove(#[proptest(strategy = "0..4i32")] i32),
    }

    proptest! {
        #[test]
        fn matches_a_set_of_slots(ops: Vec<Op>) {
            let mut points = TouchPoints::default();
            let mut model = std::collections::HashSet::new();

            for op in ops {
                match op {
                    Op::Add(slot) => {
                        let prev = points.add(slot, Point::from((0., 0.)));
                        prop_assert_eq!(prev.is_some(), !model.insert(slot));
                    }
                    Op::Update(slot) => {
                        let res = points.update(slot, Point::from((1., 1.)));
                        prop_assert_eq!(res.is_ok(), model.contains(&slot));
                    }
                    Op::Remove(slot) => {
                        let res = points.remove(slot);
                        prop_assert_eq!(res.is_ok(), model.remove(&slot));
                    }
                }
                prop_assert_eq!(points.len(), model.len());
            }
        }
    }
}
