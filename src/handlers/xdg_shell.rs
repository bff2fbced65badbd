use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::compositor::Compositor;
use crate::input::cursor::CursorMode;
use crate::input::ResizeEdge;
use crate::output::OutputId;
use crate::surface::{SurfaceId, SurfaceRole};
use crate::view::child::{ChildId, ChildKind};
use crate::view::kind::{ViewKind, XdgToplevel};
use crate::view::ViewId;

impl Compositor {
    /// Gives `surface` the xdg toplevel role.
    ///
    /// `legacy` clients speak a protocol version that doesn't allow empty configures.
    pub fn new_xdg_toplevel(&mut self, surface: SurfaceId, legacy: bool) -> ViewId {
        let id = self.create_view(ViewKind::Xdg(XdgToplevel::new(legacy)), surface);
        self.auto_maximize_view(id);
        // The initial configure.
        self.force_configure(id);
        id
    }

    pub fn xdg_toplevel_destroy(&mut self, id: ViewId) {
        self.view_destroy(id);
    }

    /// The client acked a configure. Unknown serials are a protocol error and are ignored.
    pub fn xdg_ack_configure(&mut self, id: ViewId, serial: u32) {
        let Some(toplevel) = self.views.get_mut(id).and_then(|v| v.kind.as_xdg_mut()) else {
            return;
        };
        if !toplevel.ack_configure(serial) {
            error!("{id:?} acked unknown configure serial {serial}");
        }
    }

    pub fn xdg_set_min_size(&mut self, id: ViewId, size: Size<i32, Logical>) {
        if let Some(toplevel) = self.views.get_mut(id).and_then(|v| v.kind.as_xdg_mut()) {
            toplevel.min_size = size;
        }
    }

    pub fn xdg_set_max_size(&mut self, id: ViewId, size: Size<i32, Logical>) {
        if let Some(toplevel) = self.views.get_mut(id).and_then(|v| v.kind.as_xdg_mut()) {
            toplevel.max_size = size;
        }
    }

    pub(crate) fn xdg_toplevel_commit(
        &mut self,
        id: ViewId,
        was_mapped: bool,
        mapped: bool,
        window_geometry: Option<Rectangle<i32, Logical>>,
    ) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface;
        let bbox = self
            .surfaces
            .get(surface)
            .map(|s| s.bbox())
            .unwrap_or_default();
        let Some(toplevel) = view.kind.as_xdg_mut() else {
            return;
        };

        if window_geometry.is_some() {
            toplevel.explicit_geometry = window_geometry;
        }
        toplevel.geometry = toplevel.explicit_geometry.unwrap_or(bbox);
        let geometry = toplevel.geometry;

        if let Some((serial, configure)) = toplevel.acked.take() {
            toplevel.current = configure;
            toplevel.configure_serial = serial;
        }

        match (was_mapped, mapped) {
            (false, true) => {
                if !toplevel.configured {
                    error!("{id:?} committed a buffer before the initial configure");
                }
                toplevel.saved_geometry = geometry;
                view.rect.size = geometry.size;

                self.view_map(id, surface);
                self.view_setup(id);
            }
            (true, false) => self.view_unmap(id),
            (true, true) => self.xdg_apply_commit(id, geometry),
            (false, false) => (),
        }
    }

    fn xdg_apply_commit(&mut self, id: ViewId, geometry: Rectangle<i32, Logical>) {
        self.view_apply_damage(id);
        self.update_view_size(id, geometry.size.w, geometry.size.h);

        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let floating = view.is_floating();
        let rect = view.rect;
        let scale = view.scale;
        let pending = view.pending_move_resize;
        let Some(toplevel) = view.kind.as_xdg_mut() else {
            return;
        };

        let pending_serial = toplevel.pending_move_resize_serial;
        let current_serial = toplevel.configure_serial;
        let saved_geometry = toplevel.saved_geometry;
        toplevel.saved_geometry = geometry;

        if pending_serial > 0 && pending_serial >= current_serial {
            if pending_serial == current_serial {
                toplevel.pending_move_resize_serial = 0;
            }

            let size = geometry.size;
            let mut x = f64::from(rect.loc.x);
            let mut y = f64::from(rect.loc.y);
            if pending.update_x {
                x = if floating {
                    pending.x + f64::from(pending.width - size.w)
                } else {
                    pending.x
                };
            }
            if pending.update_y {
                y = if floating {
                    pending.y + f64::from(pending.height - size.h)
                } else {
                    pending.y
                };
            }
            self.update_view_position(id, x as i32, y as i32);
        }

        if saved_geometry.loc != geometry.loc {
            let Some(rect) = self.views.get(id).map(|v| v.rect) else {
                return;
            };
            let shift = (saved_geometry.loc - geometry.loc).to_f64().upscale(scale);
            self.update_view_position(
                id,
                (f64::from(rect.loc.x) + shift.x) as i32,
                (f64::from(rect.loc.y) + shift.y) as i32,
            );
        }
    }

    /// Interactive move requested by the client, e.g. from a client-side titlebar.
    pub fn xdg_request_move(&mut self, id: ViewId) {
        if self.seat.cursor.mode() != CursorMode::Passthrough {
            return;
        }
        self.begin_move(id);
    }

    pub fn xdg_request_resize(&mut self, id: ViewId, edges: ResizeEdge) {
        if self.seat.cursor.mode() != CursorMode::Passthrough {
            return;
        }
        self.begin_resize(id, edges);
    }

    pub fn xdg_request_maximize(&mut self, id: ViewId, maximized: bool) {
        if maximized {
            if let Err(err) = self.maximize_view(id, None) {
                warn!("error maximizing {id:?}: {err}");
            }
        } else {
            self.restore_view(id);
        }
    }

    pub fn xdg_request_fullscreen(&mut self, id: ViewId, fullscreen: bool, output: Option<OutputId>) {
        if let Err(err) = self.set_view_fullscreen(id, fullscreen, output) {
            warn!("error setting fullscreen of {id:?}: {err}");
        }
    }

    pub fn xdg_set_parent(&mut self, id: ViewId, parent: Option<ViewId>) {
        if let Err(err) = self.set_view_parent(id, parent) {
            warn!("can't set parent of {id:?}: {err}");
        }
    }

    /// The client picked a decoration mode through xdg-decoration.
    pub fn xdg_decoration_request_mode(&mut self, id: ViewId, server_side: bool) {
        self.update_view_decorated(id, server_side);
    }

    /// Creates a popup and slides it into the usable area.
    ///
    /// Only popups of views get a [`ChildId`]; popups of layer surfaces are just placed.
    pub fn xdg_new_popup(
        &mut self,
        popup: SurfaceId,
        parent: SurfaceId,
        geometry: Rectangle<i32, Logical>,
        anchor: Point<i32, Logical>,
    ) -> Option<ChildId> {
        self.surfaces
            .set_role(popup, SurfaceRole::Popup { parent });
        if let Some(data) = self.surfaces.get_mut(popup) {
            data.offset = geometry.loc;
            data.size = geometry.size;
        }

        let Some(view) = self.surfaces.view_of(parent) else {
            if let Some(layer) = self.surfaces.layer_of(parent) {
                self.layer_popup_unconstrain(layer, popup);
            }
            return None;
        };

        let parent_child = self.view_child_of_surface(parent);
        let child = self.view_child_create(view, parent_child, popup, ChildKind::Popup { anchor });
        self.view_popup_unconstrain(child);
        Some(child)
    }
}
