//! Layer surfaces that can be pulled out of their anchored edge, like a notification shade.
//!
//! A draggable layer surface rests either folded or unfolded, each with its own margin on the
//! anchored edge. Dragging moves the margin between the two; on release the surface settles on
//! whichever side the threshold says.

use smithay::utils::{Logical, Point};

use super::{Anchor, LayerId, Margin};
use crate::compositor::Compositor;
use crate::protocols::WireEvent;

/// Travel along the drag axis before a pending drag gets accepted or rejected.
const DRAG_THRESHOLD: f64 = 8.;

/// Where a drag may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Anywhere on the surface.
    #[default]
    Full,
    /// Only within this many pixels of the edge facing away from the anchor.
    Handle(i32),
    /// Not at all.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum DragState {
    #[default]
    Folded,
    /// Touched but not moved far enough to tell what the user wants.
    Pending,
    Dragging,
    Rejected,
    Unfolded,
}

impl DragState {
    pub fn is_resting(self) -> bool {
        matches!(self, DragState::Folded | DragState::Unfolded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// The single edge a surface is anchored to, if the anchor picks one.
    fn from_anchor(anchor: Anchor) -> Option<Self> {
        let both_h = Anchor::LEFT | Anchor::RIGHT;
        let both_v = Anchor::TOP | Anchor::BOTTOM;
        let horizontal = anchor & both_h;
        let vertical = anchor & both_v;
        let h_free = horizontal.is_empty() || horizontal == both_h;
        let v_free = vertical.is_empty() || vertical == both_v;

        if h_free && vertical == Anchor::TOP {
            Some(Edge::Top)
        } else if h_free && vertical == Anchor::BOTTOM {
            Some(Edge::Bottom)
        } else if v_free && horizontal == Anchor::LEFT {
            Some(Edge::Left)
        } else if v_free && horizontal == Anchor::RIGHT {
            Some(Edge::Right)
        } else {
            None
        }
    }

    fn margin(self, margin: &Margin) -> i32 {
        match self {
            Edge::Top => margin.top,
            Edge::Bottom => margin.bottom,
            Edge::Left => margin.left,
            Edge::Right => margin.right,
        }
    }

    fn set_margin(self, margin: &mut Margin, value: i32) {
        match self {
            Edge::Top => margin.top = value,
            Edge::Bottom => margin.bottom = value,
            Edge::Left => margin.left = value,
            Edge::Right => margin.right = value,
        }
    }

    /// Movement away from the anchored edge.
    fn delta(self, from: Point<f64, Logical>, to: Point<f64, Logical>) -> f64 {
        match self {
            Edge::Top => to.y - from.y,
            Edge::Bottom => from.y - to.y,
            Edge::Left => to.x - from.x,
            Edge::Right => from.x - to.x,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraggableLayer {
    margin_folded: i32,
    margin_unfolded: i32,
    exclusive: i32,
    /// Fraction of the way to travel before a release flips the resting state.
    threshold: f64,
    mode: DragMode,
    state: DragState,
    resting: DragState,
    start: Point<f64, Logical>,
    start_margin: i32,
}

impl DraggableLayer {
    pub fn new(
        margin_folded: i32,
        margin_unfolded: i32,
        exclusive: i32,
        threshold: f64,
        mode: DragMode,
    ) -> Self {
        Self {
            margin_folded,
            margin_unfolded,
            exclusive,
            threshold: threshold.clamp(0., 1.),
            mode,
            state: DragState::Folded,
            resting: DragState::Folded,
            start: Point::from((0., 0.)),
            start_margin: margin_folded,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DragMode) {
        self.mode = mode;
    }

    pub fn margin_for(&self, state: DragState) -> i32 {
        match state {
            DragState::Unfolded => self.margin_unfolded,
            _ => self.margin_folded,
        }
    }

    fn clamp(&self, margin: i32) -> i32 {
        let lo = self.margin_folded.min(self.margin_unfolded);
        let hi = self.margin_folded.max(self.margin_unfolded);
        margin.clamp(lo, hi)
    }

    /// Direction along the drag axis that unfolds.
    fn unfold_sign(&self) -> f64 {
        if self.margin_unfolded >= self.margin_folded {
            1.
        } else {
            -1.
        }
    }

    fn progress(&self, margin: i32) -> f64 {
        let span = self.margin_unfolded - self.margin_folded;
        if span == 0 {
            return 0.;
        }
        f64::from(margin - self.margin_folded) / f64::from(span)
    }

    /// Resting state to settle in when released at `margin`.
    pub fn settle(&self, margin: i32) -> DragState {
        let progress = self.progress(margin);
        match self.resting {
            DragState::Unfolded => {
                if 1. - progress > self.threshold {
                    DragState::Folded
                } else {
                    DragState::Unfolded
                }
            }
            _ => {
                if progress > self.threshold {
                    DragState::Unfolded
                } else {
                    DragState::Folded
                }
            }
        }
    }
}

impl Compositor {
    /// Makes a layer surface draggable and puts it into the folded state.
    pub fn set_layer_draggable(&mut self, id: LayerId, draggable: DraggableLayer) {
        let Some(layer) = self.layers.get_mut(id) else {
            return;
        };
        let Some(edge) = Edge::from_anchor(layer.state.anchor) else {
            warn!("layer surface {id:?} is not anchored to a single edge, can't drag it");
            return;
        };

        layer.state.exclusive_zone = draggable.exclusive;
        edge.set_margin(&mut layer.state.margin, draggable.margin_folded);
        layer.draggable = Some(draggable);
        let output = layer.output;

        if let Some(output) = output {
            self.arrange_layers(output);
        }
    }

    /// Starts a drag at `pos`, in layout coordinates.
    ///
    /// Returns `None` for surfaces that aren't draggable.
    pub fn layer_drag_start(&mut self, id: LayerId, pos: Point<f64, Logical>) -> Option<DragState> {
        let layer = self.layers.get(id)?;
        let edge = Edge::from_anchor(layer.state.anchor)?;
        let origin = self.outputs.get(layer.output?)?.geometry().loc;
        let geometry = layer.geometry;
        let margin = edge.margin(&layer.state.margin);
        let draggable = layer.draggable.as_ref()?;

        let local = pos - (origin + geometry.loc).to_f64();
        let allowed = match draggable.mode {
            DragMode::Full => true,
            DragMode::None => false,
            DragMode::Handle(size) => {
                let size = f64::from(size);
                let (w, h) = (f64::from(geometry.size.w), f64::from(geometry.size.h));
                match edge {
                    Edge::Top => local.y >= h - size,
                    Edge::Bottom => local.y <= size,
                    Edge::Left => local.x >= w - size,
                    Edge::Right => local.x <= size,
                }
            }
        };

        let draggable = self.layers.get_mut(id)?.draggable.as_mut()?;
        if !allowed {
            trace!("drag on {id:?} outside of the drag area");
            draggable.state = DragState::Rejected;
            return Some(DragState::Rejected);
        }

        if draggable.state.is_resting() {
            draggable.resting = draggable.state;
        }
        draggable.state = DragState::Pending;
        draggable.start = pos;
        draggable.start_margin = margin;
        Some(DragState::Pending)
    }

    pub fn layer_drag_update(&mut self, id: LayerId, pos: Point<f64, Logical>) -> Option<DragState> {
        let layer = self.layers.get(id)?;
        let edge = Edge::from_anchor(layer.state.anchor)?;
        let draggable = layer.draggable.as_ref()?;
        let delta = edge.delta(draggable.start, pos);
        let state = draggable.state;

        match state {
            DragState::Pending => {
                if delta.abs() < DRAG_THRESHOLD {
                    return Some(DragState::Pending);
                }

                // Pushing further into the resting state makes no sense.
                let towards_unfold = delta * draggable.unfold_sign() > 0.;
                let rejected = match draggable.resting {
                    DragState::Unfolded => towards_unfold,
                    _ => !towards_unfold,
                };

                let draggable = self.layers.get_mut(id)?.draggable.as_mut()?;
                if rejected {
                    debug!("rejecting drag on {id:?}");
                    draggable.state = DragState::Rejected;
                    let margin = draggable.start_margin;
                    self.set_layer_margin(id, margin);
                    return Some(DragState::Rejected);
                }
                draggable.state = DragState::Dragging;
            }
            DragState::Dragging => (),
            state => return Some(state),
        }

        let draggable = self.layers.get(id)?.draggable.as_ref()?;
        let margin = draggable.clamp(draggable.start_margin + delta.round() as i32);
        self.set_layer_margin(id, margin);

        let surface = self.layers.get(id)?.surface;
        self.send(WireEvent::LayerDragged { surface, margin });
        Some(DragState::Dragging)
    }

    /// Ends the drag, settling the surface folded or unfolded.
    pub fn layer_drag_end(&mut self, id: LayerId) -> Option<DragState> {
        let layer = self.layers.get(id)?;
        let edge = Edge::from_anchor(layer.state.anchor)?;
        let margin = edge.margin(&layer.state.margin);
        let surface = layer.surface;
        let draggable = layer.draggable.as_ref()?;

        let settled = match draggable.state {
            DragState::Dragging => draggable.settle(margin),
            DragState::Pending | DragState::Rejected => draggable.resting,
            resting => resting,
        };

        let target = draggable.margin_for(settled);
        let was_dragging = draggable.state == DragState::Dragging;
        let draggable = self.layers.get_mut(id)?.draggable.as_mut()?;
        draggable.state = settled;
        draggable.resting = settled;

        if was_dragging {
            self.set_layer_margin(id, target);
            self.send(WireEvent::LayerDragEnd {
                surface,
                state: settled,
            });
        }
        Some(settled)
    }

    /// Drops an ongoing drag, unwinding to the margin it started from.
    pub fn layer_drag_cancel(&mut self, id: LayerId) {
        let Some(draggable) = self.layers.get_mut(id).and_then(|l| l.draggable.as_mut()) else {
            return;
        };
        if draggable.state.is_resting() {
            return;
        }

        let margin = draggable.start_margin;
        draggable.state = draggable.resting;
        self.set_layer_margin(id, margin);
    }

    /// Folds or unfolds the surface without a drag, as the client may request.
    pub fn layer_slide(&mut self, id: LayerId, state: DragState) {
        if !state.is_resting() {
            error!("can't slide {id:?} into {state:?}");
            return;
        }
        let Some(layer) = self.layers.get_mut(id) else {
            return;
        };
        let surface = layer.surface;
        let Some(draggable) = layer.draggable.as_mut() else {
            return;
        };

        draggable.state = state;
        draggable.resting = state;
        let margin = draggable.margin_for(state);
        self.set_layer_margin(id, margin);
        self.send(WireEvent::LayerDragEnd { surface, state });
    }

    fn set_layer_margin(&mut self, id: LayerId, margin: i32) {
        let Some(layer) = self.layers.get(id) else {
            return;
        };
        let Some(edge) = Edge::from_anchor(layer.state.anchor) else {
            return;
        };
        if edge.margin(&layer.state.margin) == margin {
            return;
        }
        let output = layer.output;

        self.layer_damage_whole(id);
        if let Some(layer) = self.layers.get_mut(id) {
            edge.set_margin(&mut layer.state.margin, margin);
        }
        if let Some(output) = output {
            self.arrange_layers(output);
        }
        self.layer_damage_whole(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_from_anchor() {
        let top = Anchor::TOP | Anchor::LEFT | Anchor::RIGHT;
        assert_eq!(Edge::from_anchor(top), Some(Edge::Top));
        assert_eq!(Edge::from_anchor(Anchor::BOTTOM), Some(Edge::Bottom));
        assert_eq!(
            Edge::from_anchor(Anchor::LEFT | Anchor::TOP | Anchor::BOTTOM),
            Some(Edge::Left)
        );
        assert_eq!(Edge::from_anchor(Anchor::TOP | Anchor::LEFT), None);
        assert_eq!(Edge::from_anchor(Anchor::all()), None);
    }

    #[test]
    fn settles_past_threshold() {
        // A shade hiding all but 40 px of its 400 px.
        let shade = DraggableLayer::new(-360, 0, 40, 0.3, DragMode::Full);
        assert_eq!(shade.settle(-360), DragState::Folded);
        assert_eq!(shade.settle(-260), DragState::Folded);
        assert_eq!(shade.settle(-200), DragState::Unfolded);

        let mut open = shade.clone();
        open.resting = DragState::Unfolded;
        assert_eq!(open.settle(-50), DragState::Unfolded);
        assert_eq!(open.settle(-200), DragState::Folded);
    }

    #[test]
    fn margin_stays_between_states() {
        let shade = DraggableLayer::new(-360, 0, 40, 0.5, DragMode::Full);
        assert_eq!(shade.clamp(20), 0);
        assert_eq!(shade.clamp(-400), -360);
        assert_eq!(shade.clamp(-100), -100);
    }
}
