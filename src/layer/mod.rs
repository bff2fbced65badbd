//! Layer-shell surfaces: panels, backgrounds, overlays and on-screen keyboards.
//!
//! Layer surfaces live on one output, outside the view stack. Their geometry comes out of
//! [`Compositor::arrange_layers`], which also shrinks the output's usable area by the exclusive
//! zones they claim.

use bitflags::bitflags;
use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::compositor::Compositor;
use crate::output::OutputId;
use crate::protocols::WireEvent;
use crate::surface::{SurfaceId, SurfaceRole};
use crate::utils::arena::Id;
use crate::utils::is_empty;

pub mod draggable;

use draggable::DraggableLayer;

pub type LayerId = Id<LayerSurface>;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    #[error("no output for the layer surface")]
    NoOutput,
    #[error("the layer surface is gone")]
    Gone,
}

/// Stacking layer, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Layer {
    Background,
    Bottom,
    Top,
    Overlay,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Anchor: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

/// State a layer surface client asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerState {
    pub anchor: Anchor,
    /// Positive values reserve space, -1 asks to ignore other surfaces' exclusive zones.
    pub exclusive_zone: i32,
    pub margin: Margin,
    /// 0 along an axis means "stretch between the anchors".
    pub desired_size: Size<i32, Logical>,
    pub keyboard_interactive: bool,
}

#[derive(Debug)]
pub struct LayerSurface {
    pub(crate) surface: SurfaceId,
    /// `None` once the output is gone.
    pub(crate) output: Option<OutputId>,
    pub(crate) layer: Layer,
    pub(crate) namespace: String,
    pub(crate) state: LayerState,
    pub(crate) mapped: bool,
    /// Output-local geometry computed by the last arrangement.
    pub(crate) geometry: Rectangle<i32, Logical>,
    pub(crate) alpha: f64,
    pub(crate) subsurfaces: Vec<SurfaceId>,
    pub(crate) draggable: Option<DraggableLayer>,
}

impl LayerSurface {
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn output(&self) -> Option<OutputId> {
        self.output
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn geometry(&self) -> Rectangle<i32, Logical> {
        self.geometry
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn draggable(&self) -> Option<&DraggableLayer> {
        self.draggable.as_ref()
    }
}

impl Compositor {
    /// Creates a layer surface on `output`, or on the output under the cursor.
    ///
    /// Without any output the surface is closed right away.
    pub fn create_layer_surface(
        &mut self,
        surface: SurfaceId,
        output: Option<OutputId>,
        layer: Layer,
        namespace: impl Into<String>,
    ) -> Result<LayerId, LayerError> {
        let output = output
            .filter(|o| self.outputs.contains(*o))
            .or_else(|| self.outputs.output_at(self.seat.cursor.position()))
            .or_else(|| self.outputs.ids().first().copied());
        let Some(output) = output else {
            warn!("no output for layer surface {surface:?}, closing it");
            self.send(WireEvent::LayerClosed { surface });
            return Err(LayerError::NoOutput);
        };

        let id = self.layers.insert(LayerSurface {
            surface,
            output: Some(output),
            layer,
            namespace: namespace.into(),
            state: LayerState::default(),
            mapped: false,
            geometry: Rectangle::default(),
            alpha: 1.,
            subsurfaces: Vec::new(),
            draggable: None,
        });
        self.surfaces.set_role(surface, SurfaceRole::Layer(id));
        if let Some(out) = self.outputs.get_mut(output) {
            out.layers.push(id);
        }

        debug!("new layer surface {id:?} on {output:?}");
        Ok(id)
    }

    pub fn layer_map(&mut self, id: LayerId) -> Result<(), LayerError> {
        let layer = self.layers.get_mut(id).ok_or(LayerError::Gone)?;
        let Some(output) = layer.output else {
            return Err(LayerError::NoOutput);
        };
        layer.mapped = true;
        let surface = layer.surface;

        layer.subsurfaces = self
            .surfaces
            .get(surface)
            .map(|s| s.subsurfaces.clone())
            .unwrap_or_default();

        self.send(WireEvent::SurfaceEnter { surface, output });
        self.arrange_layers(output);
        self.layer_damage_whole(id);
        self.update_layer_focus();
        Ok(())
    }

    pub fn layer_unmap(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get_mut(id) else {
            return;
        };
        layer.mapped = false;
        layer.subsurfaces.clear();
        let output = layer.output;

        self.layer_damage_whole(id);
        self.update_cursor_focus();
        if let Some(output) = output {
            self.arrange_layers(output);
        }
        self.update_layer_focus();
    }

    /// Forgets a layer surface the client destroyed.
    pub fn layer_destroy(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get(id) else {
            return;
        };
        if layer.mapped {
            self.layer_damage_whole(id);
        }

        let Some(layer) = self.layers.remove(id) else {
            return;
        };
        self.seat_forget_layer(id);

        let Some(output) = layer.output.filter(|o| self.outputs.contains(*o)) else {
            return;
        };
        if let Some(out) = self.outputs.get_mut(output) {
            out.layers.retain(|l| *l != id);
        }
        self.arrange_layers(output);
        self.update_layer_focus();
    }

    /// The output of the layer surface went away: tear the surface down.
    pub(crate) fn handle_layer_output_destroyed(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get_mut(id) else {
            return;
        };
        layer.output = None;
        let surface = layer.surface;
        debug!("output of layer surface {id:?} is gone, closing it");

        self.send(WireEvent::LayerClosed { surface });
        self.layer_destroy(id);
    }

    pub fn set_layer_state(&mut self, id: LayerId, state: LayerState) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.state = state;
        }
    }

    /// Moves the surface to another layer, as clients may do at runtime.
    pub fn set_layer(&mut self, id: LayerId, new_layer: Layer) {
        let Some(layer) = self.layers.get_mut(id) else {
            return;
        };
        if layer.layer == new_layer {
            return;
        }
        layer.layer = new_layer;
        self.layer_damage_whole(id);
    }

    /// Handles a commit on the layer surface: re-arranges its output and applies damage.
    pub fn layer_commit(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get(id) else {
            return;
        };
        let Some(output) = layer.output else {
            return;
        };
        let old_geometry = layer.geometry;

        self.arrange_layers(output);

        let Some(layer) = self.layers.get(id) else {
            return;
        };
        if layer.geometry != old_geometry {
            let origin = self
                .outputs
                .get(output)
                .map(|o| o.geometry().loc)
                .unwrap_or_default();
            self.damage_rect(Rectangle::new(old_geometry.loc + origin, old_geometry.size));
            self.layer_damage_whole(id);
        } else {
            self.layer_damage(id);
        }
    }

    /// Sets the opacity. Values outside [0, 1] are a bug in the caller.
    pub fn set_layer_alpha(&mut self, id: LayerId, alpha: f64) {
        assert!((0. ..=1.).contains(&alpha), "layer alpha out of range: {alpha}");
        if let Some(layer) = self.layers.get_mut(id) {
            layer.alpha = alpha;
        }
        self.layer_damage_whole(id);
    }

    fn layer_surfaces_in_layout(&self, id: LayerId) -> Vec<(SurfaceId, Point<i32, Logical>)> {
        let Some(layer) = self.layers.get(id) else {
            return Vec::new();
        };
        let Some(origin) = layer
            .output
            .and_then(|o| self.outputs.get(o))
            .map(|o| o.geometry().loc)
        else {
            return Vec::new();
        };

        let base = origin + layer.geometry.loc;
        let mut surfaces = Vec::new();
        self.surfaces
            .for_each_surface(layer.surface, true, &mut |surface, offset| {
                surfaces.push((surface, base + offset));
            });
        surfaces
    }

    /// Applies committed buffer damage of the surface tree.
    pub fn layer_damage(&mut self, id: LayerId) {
        for (surface, loc) in self.layer_surfaces_in_layout(id) {
            let damage = self
                .surfaces
                .get_mut(surface)
                .map(|s| s.take_damage())
                .unwrap_or_default();
            for rect in damage {
                self.damage_rect(Rectangle::new(rect.loc + loc, rect.size));
            }
        }
    }

    pub fn layer_damage_whole(&mut self, id: LayerId) {
        for (surface, loc) in self.layer_surfaces_in_layout(id) {
            let Some(size) = self.surfaces.get(surface).map(|s| s.size) else {
                continue;
            };
            self.damage_rect(Rectangle::new(loc, size));
        }
    }

    /// Lays out the layer surfaces of an output and updates its usable area.
    ///
    /// Surfaces with an exclusive zone go first, layer by layer from the top, each shrinking
    /// the usable area. The remaining surfaces are placed inside what is left.
    pub fn arrange_layers(&mut self, output: OutputId) {
        let Some(out) = self.outputs.get(output) else {
            return;
        };
        let full = Rectangle::new(Point::from((0, 0)), out.size());
        let old_usable = out.usable_area();
        let ids = out.layers.clone();

        let order = [Layer::Overlay, Layer::Top, Layer::Bottom, Layer::Background];

        let mut usable = full;
        for layer in order {
            self.arrange_layer(&ids, layer, full, &mut usable, true);
        }

        if usable != old_usable {
            debug!("usable area of {output:?} changed to {usable:?}");
            if let Some(out) = self.outputs.get_mut(output) {
                out.set_usable_area(usable);
            }

            for view in self.stack.clone() {
                if self.view_output(view) != Some(output) {
                    continue;
                }
                let Some(v) = self.views.get(view) else {
                    continue;
                };
                if v.is_maximized() {
                    self.arrange_maximized(view, Some(output));
                } else if v.is_tiled() {
                    self.arrange_tiled(view, Some(output));
                }
            }
        }

        for layer in order {
            self.arrange_layer(&ids, layer, full, &mut usable, false);
        }
    }

    fn arrange_layer(
        &mut self,
        ids: &[LayerId],
        kind: Layer,
        full: Rectangle<i32, Logical>,
        usable: &mut Rectangle<i32, Logical>,
        exclusive: bool,
    ) {
        for id in ids.iter().rev() {
            let Some(layer) = self.layers.get(*id) else {
                continue;
            };
            if layer.layer != kind {
                continue;
            }
            let state = layer.state;
            if exclusive != (state.exclusive_zone > 0) {
                continue;
            }

            let bounds = if state.exclusive_zone == -1 {
                full
            } else {
                *usable
            };

            let Some(geometry) = layer_geometry(&state, bounds) else {
                warn!("layer surface {id:?} has a negative size, closing it");
                let surface = layer.surface;
                self.send(WireEvent::LayerClosed { surface });
                continue;
            };

            apply_exclusive_zone(usable, &state);

            let Some(layer) = self.layers.get_mut(*id) else {
                continue;
            };
            let size_changed = layer.geometry.size != geometry.size;
            layer.geometry = geometry;
            let surface = layer.surface;

            if size_changed {
                self.send(WireEvent::LayerConfigure {
                    surface,
                    size: geometry.size,
                });
            }
        }
    }

    /// Gives keyboard focus to the topmost keyboard-interactive surface in the top or overlay
    /// layer, or takes it back from layer surfaces.
    pub fn update_layer_focus(&mut self) {
        let mut focus = None;
        'outer: for (_, output) in self.outputs.iter() {
            for kind in [Layer::Overlay, Layer::Top] {
                for id in output.layers().iter().rev() {
                    let Some(layer) = self.layers.get(*id) else {
                        continue;
                    };
                    if layer.layer == kind && layer.mapped && layer.state.keyboard_interactive {
                        focus = Some(*id);
                        break 'outer;
                    }
                }
            }
        }

        self.seat_set_focus_layer(focus);
    }

    /// Slides a layer surface popup into the usable area of the layer's output.
    pub fn layer_popup_unconstrain(&mut self, layer: LayerId, popup: SurfaceId) {
        let Some(l) = self.layers.get(layer) else {
            return;
        };
        let Some(output) = l.output.and_then(|o| self.outputs.get(o)) else {
            return;
        };
        let usable = output.usable_area();
        let layer_loc = l.geometry.loc;

        let Some(data) = self.surfaces.get(popup) else {
            return;
        };
        let size = data.size;
        let parent_pos = match data.role {
            SurfaceRole::Popup { parent } => self.surfaces.subsurface_offset(parent),
            _ => return,
        };

        // Bounds in the coordinate system of the layer surface.
        let bounds = Rectangle::new(usable.loc - layer_loc, usable.size);
        let mut loc = parent_pos + data.offset;
        loc.x = loc.x.min(bounds.loc.x + bounds.size.w - size.w).max(bounds.loc.x);
        loc.y = loc.y.min(bounds.loc.y + bounds.size.h - size.h).max(bounds.loc.y);

        let geometry = Rectangle::new(loc - parent_pos, size);
        if let Some(data) = self.surfaces.get_mut(popup) {
            data.offset = geometry.loc;
        }
        self.send(WireEvent::PopupConfigure {
            surface: popup,
            geometry,
        });
    }
}

/// Computes the output-local geometry of a layer surface inside `bounds`.
///
/// Returns `None` when the margins leave no room.
pub fn layer_geometry(
    state: &LayerState,
    bounds: Rectangle<i32, Logical>,
) -> Option<Rectangle<i32, Logical>> {
    let anchor = state.anchor;
    let margin = state.margin;
    let mut rect = Rectangle::new(Point::from((0, 0)), state.desired_size);

    let both_h = Anchor::LEFT | Anchor::RIGHT;
    if rect.size.w == 0 {
        rect.loc.x = bounds.loc.x;
    } else if anchor.contains(both_h) {
        rect.loc.x = bounds.loc.x + (bounds.size.w / 2 - rect.size.w / 2);
    } else if anchor.contains(Anchor::LEFT) {
        rect.loc.x = bounds.loc.x;
    } else if anchor.contains(Anchor::RIGHT) {
        rect.loc.x = bounds.loc.x + (bounds.size.w - rect.size.w);
    } else {
        rect.loc.x = bounds.loc.x + (bounds.size.w / 2 - rect.size.w / 2);
    }

    let both_v = Anchor::TOP | Anchor::BOTTOM;
    if rect.size.h == 0 {
        rect.loc.y = bounds.loc.y;
    } else if anchor.contains(both_v) {
        rect.loc.y = bounds.loc.y + (bounds.size.h / 2 - rect.size.h / 2);
    } else if anchor.contains(Anchor::TOP) {
        rect.loc.y = bounds.loc.y;
    } else if anchor.contains(Anchor::BOTTOM) {
        rect.loc.y = bounds.loc.y + (bounds.size.h - rect.size.h);
    } else {
        rect.loc.y = bounds.loc.y + (bounds.size.h / 2 - rect.size.h / 2);
    }

    if rect.size.w == 0 {
        rect.loc.x += margin.left;
        rect.size.w = bounds.size.w - (margin.left + margin.right);
    } else if anchor.contains(both_h) {
        // Centered, margins don't apply.
    } else if anchor.contains(Anchor::LEFT) {
        rect.loc.x += margin.left;
    } else if anchor.contains(Anchor::RIGHT) {
        rect.loc.x -= margin.right;
    }

    if rect.size.h == 0 {
        rect.loc.y += margin.top;
        rect.size.h = bounds.size.h - (margin.top + margin.bottom);
    } else if anchor.contains(both_v) {
        // Centered.
    } else if anchor.contains(Anchor::TOP) {
        rect.loc.y += margin.top;
    } else if anchor.contains(Anchor::BOTTOM) {
        rect.loc.y -= margin.bottom;
    }

    if rect.size.w < 0 || rect.size.h < 0 {
        return None;
    }
    Some(rect)
}

/// Shrinks `usable` by the exclusive zone of a surface anchored to one edge.
pub fn apply_exclusive_zone(usable: &mut Rectangle<i32, Logical>, state: &LayerState) {
    if state.exclusive_zone <= 0 {
        return;
    }

    let anchor = state.anchor;
    let margin = state.margin;
    let zone = state.exclusive_zone;

    let edges = [
        (Anchor::TOP, Anchor::LEFT | Anchor::RIGHT | Anchor::TOP, margin.top),
        (Anchor::BOTTOM, Anchor::LEFT | Anchor::RIGHT | Anchor::BOTTOM, margin.bottom),
        (Anchor::LEFT, Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT, margin.left),
        (Anchor::RIGHT, Anchor::TOP | Anchor::BOTTOM | Anchor::RIGHT, margin.right),
    ];

    for (edge, triplet, edge_margin) in edges {
        if anchor != edge && anchor != triplet {
            continue;
        }
        let amount = zone + edge_margin;
        if amount <= 0 {
            continue;
        }

        if edge == Anchor::TOP {
            usable.loc.y += amount;
            usable.size.h -= amount;
        } else if edge == Anchor::BOTTOM {
            usable.size.h -= amount;
        } else if edge == Anchor::LEFT {
            usable.loc.x += amount;
            usable.size.w -= amount;
        } else {
            usable.size.w -= amount;
        }
        break;
    }

    if is_empty(*usable) {
        usable.size.w = usable.size.w.max(0);
        usable.size.h = usable.size.h.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rect_from_coords;

    fn bar(anchor: Anchor, height: i32, zone: i32) -> LayerState {
        LayerState {
            anchor,
            exclusive_zone: zone,
            desired_size: Size::from((0, height)),
            ..LayerState::default()
        }
    }

    #[test]
    fn top_bar_stretches_and_reserves() {
        let bounds = rect_from_coords(0, 0, 720, 1440);
        let state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 32, 32);

        let geometry = layer_geometry(&state, bounds).unwrap();
        assert_eq!(geometry, rect_from_coords(0, 0, 720, 32));

        let mut usable = bounds;
        apply_exclusive_zone(&mut usable, &state);
        assert_eq!(usable, rect_from_coords(0, 32, 720, 1408));
    }

    #[test]
    fn bottom_anchor_with_margin() {
        let bounds = rect_from_coords(0, 0, 720, 1440);
        let mut state = bar(Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT, 40, 40);
        state.margin.bottom = 10;

        let geometry = layer_geometry(&state, bounds).unwrap();
        assert_eq!(geometry, rect_from_coords(0, 1390, 720, 40));

        let mut usable = bounds;
        apply_exclusive_zone(&mut usable, &state);
        assert_eq!(usable, rect_from_coords(0, 0, 720, 1390));
    }

    #[test]
    fn unanchored_is_centered() {
        let bounds = rect_from_coords(0, 0, 100, 100);
        let state = LayerState {
            desired_size: Size::from((20, 10)),
            ..LayerState::default()
        };
        assert_eq!(
            layer_geometry(&state, bounds),
            Some(rect_from_coords(40, 45, 20, 10))
        );
    }

    #[test]
    fn oversized_margins_fail() {
        let bounds = rect_from_coords(0, 0, 100, 100);
        let mut state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 10, 0);
        state.margin.left = 80;
        state.margin.right = 80;
        assert_eq!(layer_geometry(&state, bounds), None);
    }

    #[test]
    fn corner_anchor_reserves_nothing() {
        let bounds = rect_from_coords(0, 0, 100, 100);
        let state = LayerState {
            anchor: Anchor::TOP | Anchor::LEFT,
            exclusive_zone: 20,
            desired_size: Size::from((10, 10)),
            ..LayerState::default()
        };
        let mut usable = bounds;
        apply_exclusive_zone(&mut usable, &state);
        assert_eq!(usable, bounds);
    }
}
