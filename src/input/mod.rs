//! Input routing: pointer, touch and tablet events in, wire events out.
//!
//! Backends translate their device events into [`InputEvent`]s in layout coordinates and hand
//! them to [`Compositor::process_input_event`]. From there the cursor decides whether an event
//! goes to the surface under it, drives a move or resize grab, or feeds a gesture.

use bitflags::bitflags;
use smithay::utils::{Logical, Point};

use crate::compositor::Compositor;
use crate::protocols::{ButtonState, WireEvent};
use crate::surface::{SurfaceId, SurfaceRole};
use crate::utils::rect_from_coords;

use self::constraint::region_contains;
use self::cursor::CursorMode;
use self::gesture::GestureEvent;

pub mod constraint;
pub mod cursor;
pub mod gesture;
pub mod seat;
pub mod suggestion;
pub mod touch;

pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;

pub const DEFAULT_CURSOR: &str = "default";
pub const MOVE_CURSOR: &str = "grabbing";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ResizeEdge: u32 {
        const TOP = 0b0001;
        const BOTTOM = 0b0010;
        const LEFT = 0b0100;
        const RIGHT = 0b1000;

        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();

        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();
    }
}

impl ResizeEdge {
    pub fn cursor_name(self) -> &'static str {
        match self {
            Self::TOP => "n-resize",
            Self::BOTTOM => "s-resize",
            Self::LEFT => "w-resize",
            Self::RIGHT => "e-resize",
            Self::TOP_LEFT => "nw-resize",
            Self::TOP_RIGHT => "ne-resize",
            Self::BOTTOM_LEFT => "sw-resize",
            Self::BOTTOM_RIGHT => "se-resize",
            _ => DEFAULT_CURSOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CursorImage {
    /// An image from the cursor theme.
    Named(&'static str),
    /// A client surface.
    Surface {
        surface: SurfaceId,
        hotspot: Point<i32, Logical>,
    },
    Hidden,
}

/// A device event, with positions already in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMotion {
        time: u32,
        delta: Point<f64, Logical>,
        delta_unaccel: Point<f64, Logical>,
    },
    PointerMotionAbsolute {
        time: u32,
        position: Point<f64, Logical>,
    },
    PointerButton {
        time: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis {
        time: u32,
        horizontal: f64,
        vertical: f64,
    },
    PointerFrame,
    TouchDown {
        time: u32,
        slot: i32,
        position: Point<f64, Logical>,
    },
    TouchMotion {
        time: u32,
        slot: i32,
        position: Point<f64, Logical>,
    },
    TouchUp {
        time: u32,
        slot: i32,
    },
    /// The device cancelled every touch point.
    TouchCancel,
    TouchFrame,
    /// Absolute tablet tool motion; an axis that didn't change is `None`.
    TabletToolAxis {
        time: u32,
        x: Option<f64>,
        y: Option<f64>,
    },
    TabletToolTip {
        time: u32,
        state: ButtonState,
    },
    Modifiers {
        meta: bool,
    },
}

impl Compositor {
    pub fn process_input_event(&mut self, event: InputEvent) {
        // Let finished animations settle before acting on what's on screen.
        self.advance_animations();

        use InputEvent::*;
        match event {
            PointerMotion {
                time,
                delta,
                delta_unaccel,
            } => self.on_pointer_motion(time, delta, delta_unaccel),
            PointerMotionAbsolute { time, position } => {
                self.on_pointer_motion_absolute(time, position)
            }
            PointerButton {
                time,
                button,
                state,
            } => self.on_pointer_button(time, button, state),
            PointerAxis {
                time,
                horizontal,
                vertical,
            } => self.seat_pointer_axis(time, horizontal, vertical),
            PointerFrame => self.seat_pointer_frame(),
            TouchDown {
                time,
                slot,
                position,
            } => self.on_touch_down(time, slot, position),
            TouchMotion {
                time,
                slot,
                position,
            } => self.on_touch_motion(time, slot, position),
            TouchUp { time, slot } => self.on_touch_up(time, slot),
            TouchCancel => self.on_touch_cancel(),
            TouchFrame => self.seat_touch_frame(),
            TabletToolAxis { time, x, y } => self.on_tablet_tool_axis(time, x, y),
            TabletToolTip { time, state } => self.cursor_press_button(time, BTN_LEFT, state),
            Modifiers { meta } => self.seat.set_meta_pressed(meta),
        }
    }

    fn send_relative_motion(
        &mut self,
        time: u32,
        delta: Point<f64, Logical>,
        delta_unaccel: Point<f64, Logical>,
    ) {
        if let Some(surface) = self.seat.pointer_focus() {
            self.send(WireEvent::RelativeMotion {
                surface,
                time,
                delta,
                delta_unaccel,
            });
        }
    }

    fn on_pointer_motion(
        &mut self,
        time: u32,
        delta: Point<f64, Logical>,
        delta_unaccel: Point<f64, Logical>,
    ) {
        if self.outputs.is_empty() {
            return;
        }

        self.send_relative_motion(time, delta, delta_unaccel);

        let mut delta = delta;
        if self.seat.cursor.active_constraint.is_some() {
            let from = self.seat.cursor.focus_local();
            let to = from + delta;
            match constraint::region_confine(&self.seat.cursor.confine, from, to) {
                Some(confined) => delta = confined - from,
                // Locked, or the cursor somehow left the region.
                None => return,
            }
        }

        let pos = self.seat.cursor.position() + delta;
        self.cursor_warp_closest(pos);
        self.cursor_update_position(time);
    }

    fn on_pointer_motion_absolute(&mut self, time: u32, pos: Point<f64, Logical>) {
        if self.outputs.is_empty() {
            return;
        }

        self.cursor_feed_gestures(GestureEvent::MotionNotify, pos);

        let delta = pos - self.seat.cursor.position();
        self.send_relative_motion(time, delta, delta);

        if self.seat.cursor.active_constraint.is_some() {
            let local = self.seat.cursor.focus_local() + delta;
            if !region_contains(&self.seat.cursor.confine, local) {
                return;
            }
        }

        self.cursor_warp_closest(pos);
        self.cursor_update_position(time);
    }

    fn on_pointer_button(&mut self, time: u32, button: u32, state: ButtonState) {
        let event = match state {
            ButtonState::Pressed => GestureEvent::ButtonPress,
            ButtonState::Released => GestureEvent::ButtonRelease,
        };
        let pos = self.seat.cursor.position();
        self.cursor_feed_gestures(event, pos);

        self.cursor_press_button(time, button, state);
    }

    fn on_tablet_tool_axis(&mut self, time: u32, x: Option<f64>, y: Option<f64>) {
        if x.is_none() && y.is_none() {
            return;
        }

        let current = self.seat.cursor.position();
        let pos = Point::from((x.unwrap_or(current.x), y.unwrap_or(current.y)));

        if self.seat.cursor.active_constraint.is_some() {
            let local = self.seat.cursor.focus_local() + (pos - current);
            if !region_contains(&self.seat.cursor.confine, local) {
                return;
            }
        }

        self.cursor_warp_closest(pos);
        self.cursor_update_position(time);
    }

    fn damage_touch_point(&mut self, pos: Point<f64, Logical>) {
        if self.options.debug_touch_points {
            let pos = pos.to_i32_floor();
            self.damage_rect(rect_from_coords(pos.x, pos.y, 1, 1));
        }
    }

    fn on_touch_down(&mut self, time: u32, slot: i32, pos: Point<f64, Logical>) {
        if self.seat.cursor.touch_points.add(slot, pos).is_some() {
            error!("touch point {slot} already exists");
        }
        self.damage_touch_point(pos);

        self.cursor_feed_gestures(GestureEvent::TouchBegin(slot), pos);

        let hit = self.surface_at(pos);
        let surface = hit.and_then(|hit| hit.surface);
        let local = hit.map_or(Point::from((0., 0.)), |hit| hit.local);

        if let Some(view) = hit.and_then(|hit| hit.view) {
            self.seat_set_focus_view(Some(view));
        }

        let Some(surface) = surface else {
            return;
        };
        if !self.allows_input(surface) {
            return;
        }

        self.focus_layer_if_interactive(Some(surface));

        let threshold = self.options.shell_reveal_touch_threshold;
        if self.cursor_shell_reveal(Some(surface), pos, threshold) {
            return;
        }

        self.seat_touch_down(surface, time, slot, local);

        if self.seat.touch_id.is_none() && self.seat.cursor.mode() == CursorMode::Passthrough {
            self.seat.touch_id = Some(slot);
            self.seat.touch_position = pos;
            self.cursor_warp_closest(pos);
            self.cursor_update_position(time);
        }
    }

    fn on_touch_up(&mut self, time: u32, slot: i32) {
        let Some(point) = self.seat.cursor.touch_points.get(slot).copied() else {
            return;
        };

        self.cursor_feed_gestures(GestureEvent::TouchEnd(slot), point.position);

        // Checked above.
        let _ = self.seat.cursor.touch_points.remove(slot);
        if self.seat.touch_id == Some(slot) {
            self.seat.touch_id = None;
        }

        if self.seat.touch_focus(slot).is_none() {
            return;
        }

        if self.seat.cursor.mode().is_grab() {
            self.submit_pending_view_state_change();
            self.seat.cursor.set_mode(CursorMode::Passthrough);
            self.update_cursor_focus();
        }

        self.seat_touch_up(time, slot);
    }

    fn on_touch_motion(&mut self, time: u32, slot: i32, pos: Point<f64, Logical>) {
        if let Err(err) = self.seat.cursor.touch_points.update(slot, pos) {
            error!("touch motion: {err}");
            return;
        }
        self.damage_touch_point(pos);

        self.cursor_feed_gestures(GestureEvent::TouchUpdate(slot), pos);

        let Some(surface) = self.seat.touch_focus(slot) else {
            return;
        };
        if self.outputs.output_at(pos).is_none() {
            return;
        }

        if let Some(local) = self.touch_local(surface, pos) {
            if self.allows_input(surface) {
                self.seat_touch_motion(time, slot, local);
            }
        }

        if self.seat.touch_id == Some(slot) {
            self.seat.touch_position = pos;
            if self.seat.cursor.mode().is_grab() {
                self.cursor_warp_closest(pos);
                self.cursor_update_position(time);
            }
        }
    }

    fn on_touch_cancel(&mut self) {
        let points: Vec<_> = self.seat.cursor.touch_points.iter().copied().collect();
        for point in points {
            self.cursor_feed_gestures(GestureEvent::TouchCancel(point.slot), point.position);
            let _ = self.seat.cursor.touch_points.remove(point.slot);

            if let Some(surface) = self.seat.touch_focus(point.slot) {
                self.seat_touch_cancel(surface);
            }
        }
        self.seat.touch_id = None;
    }

    /// Position of a layout point relative to a surface that keeps getting touch events even
    /// when the point moves off of it.
    fn touch_local(&self, surface: SurfaceId, pos: Point<f64, Logical>) -> Option<Point<f64, Logical>> {
        let root = self.surfaces.root(surface);
        let root_local = match self.surfaces.role(root) {
            SurfaceRole::Layer(id) => {
                let layer = self.layers.get(id)?;
                let output = self.outputs.get(layer.output()?)?;
                pos - output.geometry().loc.to_f64() - layer.geometry().loc.to_f64()
            }
            SurfaceRole::Toplevel(id) => {
                let view = self.views.get(id)?;
                let scale = view.scale();
                let loc = view.rect().loc.to_f64();
                Point::from((pos.x / scale - loc.x, pos.y / scale - loc.y))
            }
            _ => {
                let hit = self.surface_at(pos)?;
                return (hit.surface == Some(surface)).then_some(hit.local);
            }
        };

        Some(root_local - self.surfaces.subsurface_offset(surface).to_f64())
    }
}
