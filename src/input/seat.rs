//! The seat: keyboard focus, pointer and touch focus, and delivery of input to clients.

use std::collections::HashMap;

use smithay::utils::{Logical, Point};

use super::cursor::Cursor;
use crate::compositor::Compositor;
use crate::layer::{Layer, LayerId};
use crate::protocols::{ButtonState, Delivery, WireEvent};
use crate::surface::SurfaceId;
use crate::view::ViewId;

#[derive(Debug)]
pub struct Seat {
    name: String,
    pub cursor: Cursor,
    focused_view: Option<ViewId>,
    /// Views in the order they were focused, most recent first.
    focus_stack: Vec<ViewId>,
    /// Keyboard-interactive top or overlay layer surface holding keyboard focus.
    focused_layer: Option<LayerId>,
    keyboard_focus: Option<SurfaceId>,
    meta_pressed: bool,
    pointer_focus: Option<SurfaceId>,
    /// A client holds a pointer grab, e.g. for a popup menu.
    pointer_grab: bool,
    /// A client holds a touch grab.
    touch_grab: bool,
    /// Surface each delivered touch point went down on.
    touch_focus: HashMap<i32, SurfaceId>,
    /// Touch point driving the cursor, claimed by the first touch down in passthrough mode.
    pub(crate) touch_id: Option<i32>,
    pub(crate) touch_position: Point<f64, Logical>,
}

impl Seat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cursor: Cursor::new(),
            focused_view: None,
            focus_stack: Vec::new(),
            focused_layer: None,
            keyboard_focus: None,
            meta_pressed: false,
            pointer_focus: None,
            pointer_grab: false,
            touch_grab: false,
            touch_focus: HashMap::new(),
            touch_id: None,
            touch_position: Point::from((0., 0.)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn focused_view(&self) -> Option<ViewId> {
        self.focused_view
    }

    pub fn focused_layer(&self) -> Option<LayerId> {
        self.focused_layer
    }

    pub fn keyboard_focus(&self) -> Option<SurfaceId> {
        self.keyboard_focus
    }

    pub fn pointer_focus(&self) -> Option<SurfaceId> {
        self.pointer_focus
    }

    pub fn is_meta_pressed(&self) -> bool {
        self.meta_pressed
    }

    pub(crate) fn set_meta_pressed(&mut self, pressed: bool) {
        self.meta_pressed = pressed;
    }

    pub fn touch_id(&self) -> Option<i32> {
        self.touch_id
    }

    /// Surface the touch point was delivered to, if it was delivered at all.
    pub fn touch_focus(&self, slot: i32) -> Option<SurfaceId> {
        self.touch_focus.get(&slot).copied()
    }

    pub fn has_touch(&self) -> bool {
        !self.touch_focus.is_empty()
    }

    pub fn set_pointer_grab(&mut self, grabbed: bool) {
        self.pointer_grab = grabbed;
    }

    pub fn set_touch_grab(&mut self, grabbed: bool) {
        self.touch_grab = grabbed;
    }
}

impl Compositor {
    /// Gives keyboard focus to a view and raises it, or takes focus away from views.
    ///
    /// Focusing a view that another view covers in fullscreen unfullscreens that one first.
    pub fn seat_set_focus_view(&mut self, view: Option<ViewId>) {
        let target = match view {
            Some(id) => {
                let Some(v) = self.views.get(id) else {
                    return;
                };
                match v.surface() {
                    Some(surface) => {
                        if !self.allows_input(surface) {
                            debug!("not focusing {id:?}: input denied");
                            return;
                        }
                        Some((id, surface))
                    }
                    None => None,
                }
            }
            None => None,
        };

        if let Some((id, _)) = target {
            self.unfullscreen_covering(id);
        }

        let prev = self.seat.focused_view;
        if prev == target.map(|(id, _)| id) {
            return;
        }

        if let Some(prev) = prev {
            self.view_activate(prev, false);
        }
        self.seat.focused_view = target.map(|(id, _)| id);

        let Some((id, surface)) = target else {
            if self.seat.focused_layer.is_none() {
                self.seat_keyboard_enter(None);
            }
            return;
        };

        debug!("focusing {id:?}");
        self.seat.focus_stack.retain(|v| *v != id);
        self.seat.focus_stack.insert(0, id);
        self.raise_view(id);
        self.view_activate(id, true);

        if self
            .views
            .get(id)
            .map_or(false, |v| v.activation_token().is_some())
        {
            self.flush_view_activation_token(id);
        }

        // A keyboard-interactive layer surface keeps the keyboard.
        if self.seat.focused_layer.is_none() {
            self.seat_keyboard_enter(Some(surface));
        }
    }

    /// Unfullscreens the fullscreen view of the output `id` is on, unless that's `id` or one of
    /// its ancestors.
    fn unfullscreen_covering(&mut self, id: ViewId) {
        let Some(output) = self.view_output(id) else {
            return;
        };
        let Some(fullscreen) = self.outputs.get(output).and_then(|o| o.fullscreen_view()) else {
            return;
        };

        let mut node = Some(id);
        while let Some(current) = node {
            if current == fullscreen {
                return;
            }
            node = self.views.get(current).and_then(|v| v.parent());
        }

        debug!("{id:?} got focus, unfullscreening {fullscreen:?}");
        if let Err(err) = self.set_view_fullscreen(fullscreen, false, None) {
            warn!("error unfullscreening {fullscreen:?}: {err}");
        }
    }

    /// Gives keyboard focus to a layer surface, or hands it back to the focused view.
    pub fn seat_set_focus_layer(&mut self, layer: Option<LayerId>) {
        let Some(id) = layer else {
            if self.seat.focused_layer.take().is_none() {
                return;
            }
            let surface = self
                .seat
                .focused_view
                .and_then(|v| self.views.get(v))
                .and_then(|v| v.surface());
            self.seat_keyboard_enter(surface);
            return;
        };

        if self.seat.focused_layer == Some(id) {
            return;
        }
        let Some(layer) = self.layers.get(id) else {
            return;
        };
        let surface = layer.surface();
        let kind = layer.layer();
        if !self.allows_input(surface) {
            debug!("not focusing layer surface {id:?}: input denied");
            return;
        }

        debug!("focusing layer surface {id:?}");
        self.seat_keyboard_enter(Some(surface));
        if kind >= Layer::Top {
            self.seat.focused_layer = Some(id);
        }
    }

    /// Puts the view and its transient children on top of the stack.
    pub fn raise_view(&mut self, id: ViewId) {
        if !self.stack.contains(&id) {
            return;
        }

        self.stack.retain(|v| *v != id);
        self.stack.insert(0, id);
        self.view_damage_whole(id);

        // Most recent child ends up topmost.
        let children = self
            .views
            .get(id)
            .map(|v| v.children().to_vec())
            .unwrap_or_default();
        for child in children.into_iter().rev() {
            self.raise_view(child);
        }
    }

    /// Drops every reference the seat holds to a view that is going away.
    pub(crate) fn seat_forget_view(&mut self, id: ViewId) {
        self.seat.focus_stack.retain(|v| *v != id);

        if self.seat.cursor.suggestion.map(|s| s.view) == Some(id) {
            self.clear_view_state_change();
        }
        if self.seat.cursor.pointer_view.as_ref().map(|pv| pv.view) == Some(id) {
            self.seat.cursor.pointer_view = None;
        }
        if self.seat.focused_view != Some(id) {
            return;
        }

        if self.seat.cursor.mode().is_grab() {
            debug!("grabbed view {id:?} went away");
            self.seat.cursor.set_mode(super::cursor::CursorMode::Passthrough);
        }

        self.seat.focused_view = None;
        let next = self
            .seat
            .focus_stack
            .iter()
            .copied()
            .find(|v| self.views.get(*v).map_or(false, |v| v.is_mapped()));
        match next {
            Some(next) => self.seat_set_focus_view(Some(next)),
            None => {
                if self.seat.focused_layer.is_none() {
                    self.seat_keyboard_enter(None);
                }
            }
        }
    }

    pub(crate) fn seat_forget_layer(&mut self, id: LayerId) {
        if self.seat.cursor.drag_layer == Some(id) {
            self.seat.cursor.drag_layer = None;
        }
        if self.seat.focused_layer == Some(id) {
            self.seat_set_focus_layer(None);
        }
    }

    fn seat_keyboard_enter(&mut self, surface: Option<SurfaceId>) {
        if self.seat.keyboard_focus == surface {
            return;
        }

        if let Some(old) = self.seat.keyboard_focus.take() {
            if self.surfaces.contains(old) {
                self.send(WireEvent::KeyboardLeave { surface: old });
            }
        }
        if let Some(surface) = surface {
            self.send(WireEvent::KeyboardEnter { surface });
        }
        self.seat.keyboard_focus = surface;
    }

    /// How an event for `surface` is delivered while a client may hold a grab.
    ///
    /// Layer surfaces stay reachable under a grab, so that an on-screen keyboard keeps working
    /// while a popup menu is open.
    fn seat_delivery(&self, surface: SurfaceId, grabbed: bool) -> Delivery {
        if grabbed && self.surfaces.layer_of(self.surfaces.root(surface)).is_some() {
            Delivery::Direct
        } else {
            Delivery::Grab
        }
    }

    pub(crate) fn seat_pointer_enter(&mut self, surface: SurfaceId, local: Point<f64, Logical>) {
        if self.seat.pointer_focus == Some(surface) {
            return;
        }

        let delivery = self.seat_delivery(surface, self.seat.pointer_grab);
        if let Some(old) = self.seat.pointer_focus.take() {
            if self.surfaces.contains(old) {
                self.send(WireEvent::PointerLeave {
                    surface: old,
                    delivery,
                });
            }
        }

        self.seat.pointer_focus = Some(surface);
        self.seat.cursor.focus_local = local;
        self.send(WireEvent::PointerEnter {
            surface,
            location: local,
            delivery,
        });

        self.cursor_handle_focus_change(Some(surface), local);
    }

    pub(crate) fn seat_pointer_motion(&mut self, time: u32, local: Point<f64, Logical>) {
        let Some(surface) = self.seat.pointer_focus else {
            return;
        };

        self.seat.cursor.focus_local = local;
        let delivery = self.seat_delivery(surface, self.seat.pointer_grab);
        self.send(WireEvent::PointerMotion {
            surface,
            time,
            location: local,
            delivery,
        });
    }

    pub(crate) fn seat_pointer_clear_focus(&mut self) {
        let Some(old) = self.seat.pointer_focus.take() else {
            return;
        };

        if self.surfaces.contains(old) {
            let delivery = self.seat_delivery(old, self.seat.pointer_grab);
            self.send(WireEvent::PointerLeave {
                surface: old,
                delivery,
            });
        }
        self.cursor_handle_focus_change(None, Point::from((0., 0.)));
    }

    pub(crate) fn seat_pointer_button(&mut self, time: u32, button: u32, state: ButtonState) {
        self.send(WireEvent::PointerButton {
            surface: self.seat.pointer_focus,
            time,
            button,
            state,
        });
    }

    pub(crate) fn seat_pointer_axis(&mut self, time: u32, horizontal: f64, vertical: f64) {
        let Some(surface) = self.seat.pointer_focus else {
            return;
        };
        let delivery = self.seat_delivery(surface, self.seat.pointer_grab);
        self.send(WireEvent::PointerAxis {
            surface,
            time,
            horizontal,
            vertical,
            delivery,
        });
    }

    pub(crate) fn seat_pointer_frame(&mut self) {
        if let Some(surface) = self.seat.pointer_focus {
            self.send(WireEvent::PointerFrame { surface });
        }
    }

    pub(crate) fn seat_touch_down(
        &mut self,
        surface: SurfaceId,
        time: u32,
        slot: i32,
        local: Point<f64, Logical>,
    ) {
        let delivery = self.seat_delivery(surface, self.seat.touch_grab);
        self.seat.touch_focus.insert(slot, surface);
        self.send(WireEvent::TouchDown {
            surface,
            time,
            slot,
            location: local,
            delivery,
        });
    }

    pub(crate) fn seat_touch_motion(&mut self, time: u32, slot: i32, local: Point<f64, Logical>) {
        let Some(surface) = self.seat.touch_focus(slot) else {
            return;
        };
        let delivery = self.seat_delivery(surface, self.seat.touch_grab);
        self.send(WireEvent::TouchMotion {
            surface,
            time,
            slot,
            location: local,
            delivery,
        });
    }

    pub(crate) fn seat_touch_up(&mut self, time: u32, slot: i32) {
        let Some(surface) = self.seat.touch_focus.remove(&slot) else {
            return;
        };
        let delivery = self.seat_delivery(surface, self.seat.touch_grab);
        self.send(WireEvent::TouchUp {
            surface,
            time,
            slot,
            delivery,
        });
    }

    /// Cancels every touch point delivered to `surface`.
    pub(crate) fn seat_touch_cancel(&mut self, surface: SurfaceId) {
        let before = self.seat.touch_focus.len();
        self.seat.touch_focus.retain(|_, s| *s != surface);
        if self.seat.touch_focus.len() != before {
            self.send(WireEvent::TouchCancel { surface });
        }
    }

    pub(crate) fn seat_touch_frame(&mut self) {
        let mut surfaces: Vec<SurfaceId> = self.seat.touch_focus.values().copied().collect();
        surfaces.sort_unstable();
        surfaces.dedup();
        for surface in surfaces {
            self.send(WireEvent::TouchFrame { surface });
        }
    }
}
