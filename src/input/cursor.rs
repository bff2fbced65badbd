//! The cursor: position, grab modes, hovering over decorations and the gestures it feeds.

use smithay::utils::{Logical, Point, Rectangle, Size};

use super::gesture::{DragGesture, Gesture, GestureEvent, GestureId, GestureSignal, Sequence};
use super::suggestion::Suggestion;
use super::touch::TouchPoints;
use super::{CursorImage, ResizeEdge, BTN_LEFT, DEFAULT_CURSOR, MOVE_CURSOR};
use crate::compositor::{Compositor, DesktopEvent};
use crate::layer::draggable::DragState;
use crate::layer::{Anchor, Layer, LayerId};
use crate::protocols::{ButtonState, WireEvent};
use crate::surface::{ClientId, SurfaceId};
use crate::view::deco::DecoPart;
use crate::view::{TileDirection, ViewId, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Events go to whatever is under the cursor.
    #[default]
    Passthrough,
    Move,
    Resize,
}

impl CursorMode {
    pub fn is_grab(self) -> bool {
        self != CursorMode::Passthrough
    }
}

/// The view the pointer is over, with the state of a press on its decoration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerView {
    pub view: ViewId,
    /// The left button went down on the decoration and hasn't moved yet.
    pub has_button_grab: bool,
    pub grab_local: Point<f64, Logical>,
}

impl PointerView {
    fn new(view: ViewId) -> Self {
        Self {
            view,
            has_button_grab: false,
            grab_local: Point::from((0., 0.)),
        }
    }
}

#[derive(Debug)]
pub struct Cursor {
    position: Point<f64, Logical>,
    mode: CursorMode,
    /// Cursor position when the grab started.
    pub(crate) grab_start: Point<f64, Logical>,
    /// Position of the view content when the grab started.
    pub(crate) grab_view_loc: Point<f64, Logical>,
    /// Box size when a resize started.
    pub(crate) grab_view_size: Size<i32, Logical>,
    pub(crate) resize_edges: ResizeEdge,
    pub(crate) pointer_view: Option<PointerView>,
    /// Surface the last hit test found, `None` over decorations and empty space.
    pub(crate) hovered: Option<SurfaceId>,
    /// Cursor position relative to the pointer focus.
    pub(crate) focus_local: Point<f64, Logical>,
    image: CursorImage,
    /// Client whose cursor image is shown.
    pub(crate) image_client: Option<ClientId>,
    pub(crate) touch_points: TouchPoints,
    /// Registered in order; index 0 is the built-in layer surface drag.
    pub(crate) gestures: Vec<(GestureId, Gesture)>,
    next_gesture_id: usize,
    /// Draggable layer surface the built-in drag gesture is driving.
    pub(crate) drag_layer: Option<LayerId>,
    pub(crate) suggestion: Option<Suggestion>,
    pub(crate) active_constraint: Option<SurfaceId>,
    pub(crate) confine: Vec<Rectangle<i32, Logical>>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            position: Point::from((0., 0.)),
            mode: CursorMode::Passthrough,
            grab_start: Point::from((0., 0.)),
            grab_view_loc: Point::from((0., 0.)),
            grab_view_size: Size::from((0, 0)),
            resize_edges: ResizeEdge::empty(),
            pointer_view: None,
            hovered: None,
            focus_local: Point::from((0., 0.)),
            image: CursorImage::Named(DEFAULT_CURSOR),
            image_client: None,
            touch_points: TouchPoints::default(),
            gestures: vec![(GestureId(0), Gesture::Drag(DragGesture::new()))],
            next_gesture_id: 1,
            drag_layer: None,
            suggestion: None,
            active_constraint: None,
            confine: Vec::new(),
        }
    }

    pub fn position(&self) -> Point<f64, Logical> {
        self.position
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: CursorMode) {
        self.mode = mode;
    }

    pub fn focus_local(&self) -> Point<f64, Logical> {
        self.focus_local
    }

    pub fn image(&self) -> &CursorImage {
        &self.image
    }

    pub fn pointer_view(&self) -> Option<&PointerView> {
        self.pointer_view.as_ref()
    }

    pub fn resize_edges(&self) -> ResizeEdge {
        self.resize_edges
    }

    pub fn touch_points(&self) -> &TouchPoints {
        &self.touch_points
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn active_constraint(&self) -> Option<SurfaceId> {
        self.active_constraint
    }

    pub fn drag_layer(&self) -> Option<LayerId> {
        self.drag_layer
    }
}

impl Compositor {
    /// Moves the cursor to the point of the layout closest to `pos`.
    pub fn cursor_warp_closest(&mut self, pos: Point<f64, Logical>) {
        if let Some(pos) = self.outputs.closest_point(pos) {
            self.seat.cursor.position = pos;
        }
    }

    pub(crate) fn cursor_set_image(&mut self, image: CursorImage) {
        if self.seat.cursor.image == image {
            return;
        }
        self.seat.cursor.image = image.clone();
        self.send(WireEvent::CursorImage(image));
    }

    fn cursor_set_default_image(&mut self) {
        self.cursor_set_image(CursorImage::Named(DEFAULT_CURSOR));
    }

    /// Re-resolves what is under the cursor, as if it just moved there.
    pub fn update_cursor_focus(&mut self) {
        let time = self.clock.now().as_millis() as u32;
        self.cursor_passthrough(time);
    }

    /// Sends enter and motion to whatever is under the cursor.
    fn cursor_passthrough(&mut self, time: u32) {
        let pos = self.seat.cursor.position;
        let hit = self.surface_at(pos);
        let surface = hit.and_then(|hit| hit.surface);
        let local = hit.map_or(Point::from((0., 0.)), |hit| hit.local);

        if let Some(surface) = surface {
            if !self.allows_input(surface) {
                return;
            }
        }

        let client = surface.and_then(|s| self.surfaces.client(s));
        if client.is_none() || self.seat.cursor.image_client != client {
            self.cursor_set_default_image();
            self.seat.cursor.image_client = client;
        }

        match hit.and_then(|hit| hit.view) {
            Some(view) => {
                let prev = self.seat.cursor.pointer_view;
                if let Some(prev) = prev {
                    if self.seat.cursor.hovered.is_none()
                        && (surface.is_some() || prev.view != view)
                    {
                        self.cursor_deco_leave();
                    }
                }

                let pointer_view = match self.seat.cursor.pointer_view {
                    Some(pv) if pv.view == view => pv,
                    _ => PointerView::new(view),
                };
                self.seat.cursor.pointer_view = Some(pointer_view);

                if surface.is_none() {
                    self.cursor_deco_motion(local);
                }
            }
            None => self.seat.cursor.pointer_view = None,
        }

        self.seat.cursor.hovered = surface;

        match surface {
            Some(surface) => {
                self.seat_pointer_enter(surface, local);
                // Activating a constraint on enter may have warped the cursor.
                let local = if self.seat.cursor.position == pos {
                    local
                } else {
                    self.seat.cursor.focus_local
                };
                self.seat_pointer_motion(time, local);
            }
            None => self.seat_pointer_clear_focus(),
        }
    }

    /// Acts on a cursor move according to the current mode.
    pub fn cursor_update_position(&mut self, time: u32) {
        match self.seat.cursor.mode {
            CursorMode::Passthrough => self.cursor_passthrough(time),
            CursorMode::Move => self.cursor_update_move(),
            CursorMode::Resize => self.cursor_update_resize(),
        }
    }

    fn cursor_update_move(&mut self) {
        let Some(id) = self.seat.focused_view() else {
            return;
        };
        let Some(view) = self.views.get(id) else {
            return;
        };
        let geom = view.geometry();
        let scale = view.scale();
        let fullscreen = view.is_fullscreen();

        let cursor = &self.seat.cursor;
        let pos = cursor.position;
        let delta = pos - cursor.grab_start;
        let view_loc = cursor.grab_view_loc;

        let threshold = self.options.edge_snap_threshold;
        let output = self.outputs.output_at(pos).and_then(|id| {
            self.outputs
                .get(id)
                .map(|o| (id, o.geometry().to_f64(), o.is_landscape()))
        });

        if let Some((output, geo, landscape)) = output {
            if fullscreen {
                if let Err(err) = self.set_view_fullscreen(id, true, Some(output)) {
                    warn!("error moving fullscreen {id:?}: {err}");
                }
                return;
            }

            let suggestion = if pos.y < geo.loc.y + threshold {
                Some((ViewState::Maximized, TileDirection::Left))
            } else if landscape && pos.x < geo.loc.x + threshold {
                Some((ViewState::Tiled, TileDirection::Left))
            } else if landscape && pos.x > geo.loc.x + geo.size.w - threshold {
                Some((ViewState::Tiled, TileDirection::Right))
            } else {
                None
            };

            if let Some((state, direction)) = suggestion {
                self.suggest_view_state_change(id, output, state, direction);
                return;
            }
        }

        self.clear_view_state_change();
        self.restore_view(id);
        self.view_move(
            id,
            view_loc.x + delta.x - f64::from(geom.loc.x) * scale,
            view_loc.y + delta.y - f64::from(geom.loc.y) * scale,
        );
    }

    fn cursor_update_resize(&mut self) {
        let Some(id) = self.seat.focused_view() else {
            return;
        };
        let Some(view) = self.views.get(id) else {
            return;
        };
        let geom = view.geometry();
        let scale = view.scale();
        let rect = view.rect();

        let cursor = &self.seat.cursor;
        let delta = cursor.position - cursor.grab_start;
        let view_loc = cursor.grab_view_loc;
        let edges = cursor.resize_edges;

        let mut x = f64::from(rect.loc.x);
        let mut y = f64::from(rect.loc.y);
        let mut width = f64::from(cursor.grab_view_size.w);
        let mut height = f64::from(cursor.grab_view_size.h);

        if edges.contains(ResizeEdge::TOP) {
            y = view_loc.y + delta.y - f64::from(geom.loc.y) * scale;
            height -= delta.y;
            if height < 1. {
                y += height;
            }
        } else if edges.contains(ResizeEdge::BOTTOM) {
            height += delta.y;
        }

        if edges.contains(ResizeEdge::LEFT) {
            x = view_loc.x + delta.x - f64::from(geom.loc.x) * scale;
            width -= delta.x;
            if width < 1. {
                x += width;
            }
        } else if edges.contains(ResizeEdge::RIGHT) {
            width += delta.x;
        }

        self.view_move_resize(
            id,
            x,
            y,
            (width as i32).max(1),
            (height as i32).max(1),
        );
    }

    /// Handles a button press or release at the cursor position.
    pub(crate) fn cursor_press_button(&mut self, time: u32, button: u32, state: ButtonState) {
        let pos = self.seat.cursor.position;
        let hit = self.surface_at(pos);
        let surface = hit.and_then(|hit| hit.surface);
        let view = hit.and_then(|hit| hit.view);
        let local = hit.map_or(Point::from((0., 0.)), |hit| hit.local);

        match view {
            Some(view) if state == ButtonState::Pressed && self.seat.is_meta_pressed() => {
                self.seat_set_focus_view(Some(view));

                if button == BTN_LEFT {
                    self.begin_move(view);
                } else if button == super::BTN_RIGHT {
                    let size = surface
                        .and_then(|s| self.surfaces.get(s))
                        .map(|s| s.size)
                        .or_else(|| self.views.get(view).map(|v| v.rect().size))
                        .unwrap_or_else(|| Size::from((0, 0)));

                    let mut edges = ResizeEdge::empty();
                    edges |= if local.x < f64::from(size.w) / 2. {
                        ResizeEdge::LEFT
                    } else {
                        ResizeEdge::RIGHT
                    };
                    edges |= if local.y < f64::from(size.h) / 2. {
                        ResizeEdge::TOP
                    } else {
                        ResizeEdge::BOTTOM
                    };
                    self.begin_resize(view, edges);
                }
            }
            _ => {
                if view.is_some() && surface.is_none() && self.seat.cursor.pointer_view.is_some() {
                    self.cursor_deco_button(local, button, state);
                }

                if state == ButtonState::Released && self.seat.cursor.mode.is_grab() {
                    self.submit_pending_view_state_change();
                    self.seat.cursor.mode = CursorMode::Passthrough;
                    self.update_cursor_focus();
                } else if state == ButtonState::Pressed {
                    if let Some(view) = view {
                        self.seat_set_focus_view(Some(view));
                    }
                    self.focus_layer_if_interactive(surface);
                }
            }
        }

        let threshold = self.options.shell_reveal_pointer_threshold;
        if !self.cursor_shell_reveal(surface, pos, threshold) {
            self.seat_pointer_button(time, button, state);
        }
    }

    /// Gives keyboard focus to the layer surface owning `surface` if it asks for it.
    pub(crate) fn focus_layer_if_interactive(&mut self, surface: Option<SurfaceId>) {
        let Some(surface) = surface else {
            return;
        };
        let Some(layer) = self.surfaces.layer_of(self.surfaces.root(surface)) else {
            return;
        };
        if self
            .layers
            .get(layer)
            .map_or(false, |l| l.state().keyboard_interactive)
        {
            self.seat_set_focus_layer(Some(layer));
        }
    }

    fn cursor_deco_motion(&mut self, local: Point<f64, Logical>) {
        let Some(mut pv) = self.seat.cursor.pointer_view else {
            return;
        };
        let local = if pv.has_button_grab {
            pv.grab_local
        } else {
            local
        };

        let parts = self.view_deco_part(pv.view, local.x, local.y);
        let is_titlebar = parts.contains(DecoPart::TITLEBAR);
        let edges = if parts.contains(DecoPart::LEFT_BORDER) {
            ResizeEdge::LEFT
        } else if parts.contains(DecoPart::RIGHT_BORDER) {
            ResizeEdge::RIGHT
        } else if parts.contains(DecoPart::BOTTOM_BORDER) {
            ResizeEdge::BOTTOM
        } else if parts.contains(DecoPart::TOP_BORDER) {
            ResizeEdge::TOP
        } else {
            ResizeEdge::empty()
        };

        if pv.has_button_grab {
            if is_titlebar {
                self.begin_move(pv.view);
            } else if !edges.is_empty() {
                self.begin_resize(pv.view, edges);
            }
            pv.has_button_grab = false;
            if let Some(current) = self.seat.cursor.pointer_view.as_mut() {
                current.has_button_grab = false;
            }
        } else if is_titlebar {
            self.cursor_set_default_image();
        } else if !edges.is_empty() {
            self.cursor_set_image(CursorImage::Named(edges.cursor_name()));
        }
    }

    fn cursor_deco_leave(&mut self) {
        self.cursor_set_default_image();
        if let Some(pv) = self.seat.cursor.pointer_view.as_mut() {
            pv.has_button_grab = false;
        }
    }

    fn cursor_deco_button(&mut self, local: Point<f64, Logical>, button: u32, state: ButtonState) {
        let Some(pv) = self.seat.cursor.pointer_view.as_mut() else {
            return;
        };
        let view = pv.view;

        if button == BTN_LEFT && state == ButtonState::Pressed {
            pv.has_button_grab = true;
            pv.grab_local = local;
        } else {
            pv.has_button_grab = false;
        }

        let parts = self.view_deco_part(view, local.x, local.y);
        if state == ButtonState::Released && parts.contains(DecoPart::TITLEBAR) {
            self.cursor_set_default_image();
        }
    }

    /// Reveals auto-hidden shell surfaces over fullscreen content when `pos` is close to an
    /// output edge that has a top layer bar.
    ///
    /// Returns whether the point is within the reveal area, in which case the event shouldn't
    /// reach the fullscreen client.
    pub(crate) fn cursor_shell_reveal(
        &mut self,
        surface: Option<SurfaceId>,
        pos: Point<f64, Logical>,
        threshold: f64,
    ) -> bool {
        if surface.map_or(false, |s| self.surfaces.layer_of(s).is_some()) {
            return false;
        }

        let Some(output_id) = self.outputs.output_at(pos) else {
            return false;
        };
        let Some(output) = self.outputs.get(output_id) else {
            return false;
        };
        let geo = output.geometry().to_f64();

        let mut edges = Anchor::empty();
        for id in output.layers() {
            let Some(layer) = self.layers.get(*id) else {
                continue;
            };
            if layer.layer() != Layer::Top {
                continue;
            }

            let anchor = layer.state().anchor;
            for (edge, perpendicular) in [
                (Anchor::TOP, Anchor::LEFT | Anchor::RIGHT),
                (Anchor::BOTTOM, Anchor::LEFT | Anchor::RIGHT),
                (Anchor::LEFT, Anchor::TOP | Anchor::BOTTOM),
                (Anchor::RIGHT, Anchor::TOP | Anchor::BOTTOM),
            ] {
                if anchor == edge | perpendicular {
                    edges |= edge;
                }
            }
        }

        let (x, y) = (geo.loc.x, geo.loc.y);
        let (w, h) = (geo.size.w, geo.size.h);
        let near = (edges.contains(Anchor::TOP) && pos.y <= y + threshold)
            || (edges.contains(Anchor::BOTTOM) && pos.y >= y + h - 1. - threshold)
            || (edges.contains(Anchor::LEFT) && pos.x <= x + threshold)
            || (edges.contains(Anchor::RIGHT) && pos.x >= x + w - 1. - threshold);

        let has_fullscreen = output.fullscreen_view().is_some();
        let Some(output) = self.outputs.get_mut(output_id) else {
            return false;
        };
        if near {
            if has_fullscreen {
                output.force_shell_reveal(true);
            }
            return true;
        }

        output.force_shell_reveal(false);
        false
    }

    /// The pointer focus changed: activate the constraint of the new surface, if it has one.
    pub(crate) fn cursor_handle_focus_change(
        &mut self,
        surface: Option<SurfaceId>,
        local: Point<f64, Logical>,
    ) {
        trace!("pointer focus is now {surface:?} at {local:?}");
        self.cursor_constrain(surface, local);
    }

    /// A client asked to show `image` as the cursor.
    ///
    /// Only the client with pointer focus may do so, and only outside of grabs.
    pub fn cursor_request_set_cursor(&mut self, client: ClientId, image: CursorImage) {
        let focused_client = self
            .seat
            .pointer_focus()
            .and_then(|s| self.surfaces.client(s));
        if focused_client != Some(client) || self.seat.cursor.mode.is_grab() {
            debug!("denying request to set cursor from unfocused client {client:?}");
            return;
        }

        self.cursor_set_image(image);
        self.seat.cursor.image_client = Some(client);
    }

    /// Starts moving the view with the cursor.
    pub fn begin_move(&mut self, id: ViewId) {
        if self.seat.touch_id.is_some() {
            self.seat.cursor.position = self.seat.touch_position;
        }

        let Some(view) = self.views.get(id) else {
            return;
        };
        let pos = self.seat.cursor.position;
        let rect = view.rect();
        let saved = view.saved();
        let geom = view.geometry();
        let scale = view.scale();
        let restorable = view.is_maximized() || view.is_tiled();

        debug!("begin move of {id:?}");
        self.seat.cursor.mode = CursorMode::Move;
        self.seat.cursor.grab_start = pos;

        let view_loc = if restorable && rect.size.w > 0 && rect.size.h > 0 {
            // Keep the cursor at the same relative spot once the saved size is restored.
            let rx = (pos.x - f64::from(rect.loc.x)) / f64::from(rect.size.w);
            let ry = (pos.y - f64::from(rect.loc.y)) / f64::from(rect.size.h);
            let loc = Point::from((
                pos.x - rx * f64::from(saved.size.w),
                pos.y - ry * f64::from(saved.size.h),
            ));
            if let Some(view) = self.views.get_mut(id) {
                view.saved.loc = loc.to_i32_round();
            }
            loc
        } else {
            Point::from((
                f64::from(rect.loc.x) + f64::from(geom.loc.x) * scale,
                f64::from(rect.loc.y) + f64::from(geom.loc.y) * scale,
            ))
        };
        self.seat.cursor.grab_view_loc = view_loc;

        self.seat_pointer_clear_focus();
        self.cursor_set_image(CursorImage::Named(MOVE_CURSOR));
    }

    /// Starts resizing the view from `edges` with the cursor.
    pub fn begin_resize(&mut self, id: ViewId, edges: ResizeEdge) {
        if self.seat.touch_id.is_some() {
            self.seat.cursor.position = self.seat.touch_position;
        }

        let Some(view) = self.views.get(id) else {
            return;
        };
        let rect = view.rect();
        let size = view.get_box().size;
        let geom = view.geometry();
        let scale = view.scale();

        debug!("begin resize of {id:?} from {edges:?}");
        let cursor = &mut self.seat.cursor;
        cursor.mode = CursorMode::Resize;
        cursor.grab_start = cursor.position;
        cursor.grab_view_loc = Point::from((
            f64::from(rect.loc.x) + f64::from(geom.loc.x) * scale,
            f64::from(rect.loc.y) + f64::from(geom.loc.y) * scale,
        ));
        cursor.grab_view_size = size;
        cursor.resize_edges = edges;

        self.seat_pointer_clear_focus();
        self.cursor_set_image(CursorImage::Named(edges.cursor_name()));
    }

    /// Registers a gesture recognizer after the ones already present.
    ///
    /// Its signals are reported as [`DesktopEvent::Gesture`].
    pub fn add_gesture(&mut self, gesture: Gesture) -> GestureId {
        let cursor = &mut self.seat.cursor;
        let id = GestureId(cursor.next_gesture_id);
        cursor.next_gesture_id += 1;
        cursor.gestures.push((id, gesture));
        id
    }

    pub fn remove_gesture(&mut self, id: GestureId) {
        if id == GestureId(0) {
            error!("the built-in drag gesture can't be removed");
            return;
        }
        self.seat.cursor.gestures.retain(|(g, _)| *g != id);
    }

    /// Feeds an event at `pos` to every gesture, in registration order.
    pub(crate) fn cursor_feed_gestures(&mut self, event: GestureEvent, pos: Point<f64, Logical>) {
        let mut signals = Vec::new();
        for (id, gesture) in &mut self.seat.cursor.gestures {
            if let Some(signal) = gesture.handle_event(event, pos) {
                signals.push((*id, signal));
            }
        }

        for (id, signal) in signals {
            if id == GestureId(0) {
                self.on_drag_gesture(signal);
            } else {
                self.emit(DesktopEvent::Gesture {
                    gesture: id,
                    signal,
                });
            }
        }
    }

    fn drag_gesture(&self) -> Option<&DragGesture> {
        match self.seat.cursor.gestures.first() {
            Some((_, Gesture::Drag(drag))) => Some(drag),
            None => None,
        }
    }

    fn on_drag_gesture(&mut self, signal: GestureSignal) {
        match signal {
            GestureSignal::DragBegin(pos) => {
                self.seat.cursor.drag_layer = None;
                let Some(layer) = self.layer_surface_at(pos).and_then(|hit| hit.layer) else {
                    return;
                };
                match self.layer_drag_start(layer, pos) {
                    None | Some(DragState::Rejected) => (),
                    Some(_) => self.seat.cursor.drag_layer = Some(layer),
                }
            }
            GestureSignal::DragUpdate(offset) => {
                let Some(layer) = self.seat.cursor.drag_layer else {
                    return;
                };
                let Some((start, sequence)) = self
                    .drag_gesture()
                    .map(|drag| (drag.start(), drag.sequence()))
                else {
                    return;
                };

                match self.layer_drag_update(layer, start + offset) {
                    Some(DragState::Dragging) => {
                        // The client would otherwise see the drag as touch input too.
                        if let Some(Sequence::Touch(slot)) = sequence {
                            if self.seat.touch_focus(slot).is_some() {
                                if let Some(surface) = self.layers.get(layer).map(|l| l.surface()) {
                                    debug!("cancelling touch on dragged layer surface {layer:?}");
                                    self.seat_touch_cancel(surface);
                                }
                            }
                        }
                    }
                    Some(DragState::Rejected) => {
                        if let Some((_, gesture)) = self.seat.cursor.gestures.first_mut() {
                            gesture.reset();
                        }
                        self.layer_drag_end(layer);
                        self.seat.cursor.drag_layer = None;
                    }
                    _ => (),
                }
            }
            GestureSignal::DragEnd(_) => {
                if let Some(layer) = self.seat.cursor.drag_layer.take() {
                    self.layer_drag_end(layer);
                }
            }
            GestureSignal::Cancel(sequence) => {
                debug!("drag gesture cancelled for {sequence:?}");
                if let Some(layer) = self.seat.cursor.drag_layer.take() {
                    self.layer_drag_cancel(layer);
                }
            }
        }
    }
}
