//! Serializable dumps of the desktop, for introspection tools and the headless driver.

use serde::Serialize;
use smithay::utils::{Logical, Rectangle};

use crate::compositor::Compositor;
use crate::layer::draggable::DragState;
use crate::layer::Layer;
use crate::view::{TileDirection, ViewState};

/// Everything worth knowing about the desktop at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub outputs: Vec<OutputInfo>,
    /// Mapped views, topmost first.
    pub views: Vec<ViewInfo>,
    pub layers: Vec<LayerInfo>,
    /// Index into [`Self::views`] of the view with keyboard focus.
    pub focused_view: Option<usize>,
    /// Cursor position in layout coordinates.
    pub cursor: (f64, f64),
}

/// A rectangle in logical layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<Rectangle<i32, Logical>> for Geometry {
    fn from(rect: Rectangle<i32, Logical>) -> Self {
        Self {
            x: rect.loc.x,
            y: rect.loc.y,
            width: rect.size.w,
            height: rect.size.h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputInfo {
    pub name: String,
    pub geometry: Geometry,
    /// Geometry minus the exclusive zones of layer surfaces.
    pub usable_area: Geometry,
    pub scale: f64,
    /// Whether the shell is revealed over a fullscreen view.
    pub shell_revealed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewInfo {
    pub title: Option<String>,
    pub app_id: Option<String>,
    /// Box including the decoration, in layout coordinates.
    pub geometry: Geometry,
    pub state: ViewState,
    /// Only meaningful when [`Self::state`] is [`ViewState::Tiled`].
    pub tile_direction: TileDirection,
    pub fullscreen: bool,
    pub decorated: bool,
    pub scale: f64,
    pub alpha: f64,
    /// Names of the outputs the view intersects.
    pub outputs: Vec<String>,
    /// Index of the parent view in [`Snapshot::views`].
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerInfo {
    pub namespace: String,
    pub layer: Layer,
    pub output: Option<String>,
    /// Output-local geometry.
    pub geometry: Geometry,
    pub mapped: bool,
    pub drag_state: Option<DragState>,
}

impl Compositor {
    pub fn snapshot(&self) -> Snapshot {
        let output_name = |id| self.outputs.get(id).map(|o| o.name().to_owned());

        let outputs = self
            .outputs
            .iter()
            .map(|(_, output)| OutputInfo {
                name: output.name().to_owned(),
                geometry: output.geometry().into(),
                usable_area: output.usable_area_in_layout().into(),
                scale: output.scale(),
                shell_revealed: output.shell_revealed(),
            })
            .collect();

        let index_of = |id| self.stack.iter().position(|v| *v == id);
        let views = self
            .stack
            .iter()
            .filter_map(|id| {
                let view = self.views.get(*id)?;
                let deco_box = view.deco_box();
                let outputs = self
                    .outputs
                    .iter()
                    .filter(|(o, _)| self.outputs.intersects(*o, deco_box))
                    .map(|(_, o)| o.name().to_owned())
                    .collect();

                Some(ViewInfo {
                    title: view.title().map(str::to_owned),
                    app_id: view.app_id().map(str::to_owned),
                    geometry: deco_box.into(),
                    state: view.state(),
                    tile_direction: view.tile_direction(),
                    fullscreen: view.is_fullscreen(),
                    decorated: view.is_decorated(),
                    scale: view.scale(),
                    alpha: view.alpha(),
                    outputs,
                    parent: view.parent().and_then(index_of),
                })
            })
            .collect();

        let layers = self
            .layers
            .iter()
            .map(|(_, layer)| LayerInfo {
                namespace: layer.namespace().to_owned(),
                layer: layer.layer(),
                output: layer.output().and_then(output_name),
                geometry: layer.geometry().into(),
                mapped: layer.is_mapped(),
                drag_state: layer.draggable().map(|d| d.state()),
            })
            .collect();

        let cursor = self.seat.cursor.position();

        Snapshot {
            outputs,
            views,
            layers,
            focused_view: self.seat.focused_view().and_then(index_of),
            cursor: (cursor.x, cursor.y),
        }
    }
}
