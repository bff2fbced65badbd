//! Gesture recognizers fed by the cursor.
//!
//! Recognizers see every qualifying low-level event at the cursor's layout position, in the
//! order they were registered. Each is a small state machine that reports what it recognized
//! through [`GestureSignal`]s.

use smithay::utils::{Logical, Point};

/// A low-level event as seen by gesture recognizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    MotionNotify,
    ButtonPress,
    ButtonRelease,
    TouchBegin(i32),
    TouchUpdate(i32),
    TouchEnd(i32),
    TouchCancel(i32),
}

/// Pointer or touch stream a gesture tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Pointer,
    Touch(i32),
}

impl GestureEvent {
    fn sequence(self) -> Sequence {
        match self {
            GestureEvent::MotionNotify | GestureEvent::ButtonPress | GestureEvent::ButtonRelease => {
                Sequence::Pointer
            }
            GestureEvent::TouchBegin(slot)
            | GestureEvent::TouchUpdate(slot)
            | GestureEvent::TouchEnd(slot)
            | GestureEvent::TouchCancel(slot) => Sequence::Touch(slot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    /// The drag started at this layout position.
    DragBegin(Point<f64, Logical>),
    /// The drag moved; offset from the start.
    DragUpdate(Point<f64, Logical>),
    DragEnd(Point<f64, Logical>),
    Cancel(Sequence),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(pub(crate) usize);

/// Recognizes a single-point drag from press to release.
#[derive(Debug, Default, Clone)]
pub struct DragGesture {
    sequence: Option<Sequence>,
    start: Point<f64, Logical>,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn sequence(&self) -> Option<Sequence> {
        self.sequence
    }

    pub fn start(&self) -> Point<f64, Logical> {
        self.start
    }

    fn handle_event(
        &mut self,
        event: GestureEvent,
        pos: Point<f64, Logical>,
    ) -> Option<GestureSignal> {
        let sequence = event.sequence();

        match event {
            GestureEvent::ButtonPress | GestureEvent::TouchBegin(_) => {
                if let Some(current) = self.sequence {
                    // A second point means this isn't a single-point drag anymore.
                    self.reset();
                    return Some(GestureSignal::Cancel(current));
                }
                self.sequence = Some(sequence);
                self.start = pos;
                Some(GestureSignal::DragBegin(pos))
            }
            GestureEvent::MotionNotify | GestureEvent::TouchUpdate(_) => {
                if self.sequence != Some(sequence) {
                    return None;
                }
                Some(GestureSignal::DragUpdate(pos - self.start))
            }
            GestureEvent::ButtonRelease | GestureEvent::TouchEnd(_) => {
                if self.sequence != Some(sequence) {
                    return None;
                }
                let offset = pos - self.start;
                self.reset();
                Some(GestureSignal::DragEnd(offset))
            }
            GestureEvent::TouchCancel(_) => {
                if self.sequence != Some(sequence) {
                    return None;
                }
                self.reset();
                Some(GestureSignal::Cancel(sequence))
            }
        }
    }

    /// Forgets the current sequence without reporting anything.
    pub fn reset(&mut self) {
        self.sequence = None;
    }
}

#[derive(Debug, Clone)]
pub enum Gesture {
    Drag(DragGesture),
}

impl Gesture {
    pub fn handle_event(
        &mut self,
        event: GestureEvent,
        pos: Point<f64, Logical>,
    ) -> Option<GestureSignal> {
        match self {
            Gesture::Drag(drag) => drag.handle_event(event, pos),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Gesture::Drag(drag) => drag.reset(),
        }
    }

    /// Sequences the gesture currently tracks.
    pub fn sequences(&self) -> Vec<Sequence> {
        match self {
            Gesture::Drag(drag) => drag.sequence.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point<f64, Logical> {
        Point::from((x, y))
    }

    #[test]
    fn pointer_drag() {
        let mut drag = Gesture::Drag(DragGesture::new());

        assert_eq!(drag.handle_event(GestureEvent::MotionNotify, pt(0., 0.)), None);
        assert_eq!(
            drag.handle_event(GestureEvent::ButtonPress, pt(10., 10.)),
            Some(GestureSignal::DragBegin(pt(10., 10.)))
        );
        assert_eq!(
            drag.handle_event(GestureEvent::MotionNotify, pt(15., 30.)),
            Some(GestureSignal::DragUpdate(pt(5., 20.)))
        );
        assert_eq!(
            drag.handle_event(GestureEvent::ButtonRelease, pt(15., 40.)),
            Some(GestureSignal::DragEnd(pt(5., 30.)))
        );
        assert!(drag.sequences().is_empty());
    }

    #[test]
    fn touch_drag_ignores_other_slots() {
        let mut drag = Gesture::Drag(DragGesture::new());
        drag.handle_event(GestureEvent::TouchBegin(3), pt(0., 0.));
        assert_eq!(drag.handle_event(GestureEvent::TouchUpdate(4), pt(5., 5.)), None);
        assert_eq!(drag.handle_event(GestureEvent::TouchEnd(4), pt(5., 5.)), None);
        assert_eq!(drag.sequences(), vec![Sequence::Touch(3)]);
    }

    #[test]
    fn second_point_cancels() {
        let mut drag = Gesture::Drag(DragGesture::new());
        drag.handle_event(GestureEvent::TouchBegin(0), pt(0., 0.));
        assert_eq!(
            drag.handle_event(GestureEvent::TouchBegin(1), pt(5., 5.)),
            Some(GestureSignal::Cancel(Sequence::Touch(0)))
        );
        assert_eq!(drag.handle_event(GestureEvent::TouchUpdate(0), pt(1., 1.)), None);
    }

    #[test]
    fn reset_is_silent() {
        let mut drag = Gesture::Drag(DragGesture::new());
        drag.handle_event(GestureEvent::ButtonPress, pt(0., 0.));
        drag.reset();
        assert_eq!(drag.handle_event(GestureEvent::ButtonRelease, pt(1., 1.)), None);
    }
}
