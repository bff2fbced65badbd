use smithay::utils::{Logical, Point, Rectangle};

use crate::compositor::Compositor;
use crate::input::cursor::CursorMode;
use crate::input::ResizeEdge;
use crate::protocols::{ActivationKind, WireEvent};
use crate::surface::SurfaceId;
use crate::view::kind::{SizeHints, ViewKind, X11WindowType, XwaylandSurface};
use crate::view::ViewId;

impl Compositor {
    /// Creates the view of an X11 window.
    pub fn new_xwayland_surface(
        &mut self,
        surface: SurfaceId,
        geometry: Rectangle<i32, Logical>,
        override_redirect: bool,
    ) -> ViewId {
        let kind = ViewKind::Xwayland(XwaylandSurface::new(
            geometry.loc.x,
            geometry.loc.y,
            override_redirect,
        ));
        let id = self.create_view(kind, surface);
        if let Some(view) = self.views.get_mut(id) {
            view.rect = geometry;
        }
        id
    }

    fn xwayland_mut(&mut self, id: ViewId) -> Option<&mut XwaylandSurface> {
        self.views.get_mut(id)?.kind.as_xwayland_mut()
    }

    pub fn xwayland_set_window_types(&mut self, id: ViewId, types: Vec<X11WindowType>) {
        if let Some(surface) = self.xwayland_mut(id) {
            surface.window_types = types;
        }
    }

    pub fn xwayland_set_size_hints(&mut self, id: ViewId, hints: Option<SizeHints>) {
        if let Some(surface) = self.xwayland_mut(id) {
            surface.size_hints = hints;
        }
    }

    pub fn xwayland_set_decorations(&mut self, id: ViewId, all: bool) {
        if let Some(surface) = self.xwayland_mut(id) {
            surface.decorations_all = all;
        }
    }

    /// The window asked for a position and size of its own, which X11 grants right away.
    pub fn xwayland_request_configure(&mut self, id: ViewId, geometry: Rectangle<i32, Logical>) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let surface = view.toplevel_surface();

        self.update_view_position(id, geometry.loc.x, geometry.loc.y);
        self.send(WireEvent::X11Configure { surface, geometry });
    }

    /// Interactive move. X11 doesn't say which seat, so it has to be the one with the pointer
    /// over the window.
    pub fn xwayland_request_move(&mut self, id: ViewId) {
        if !self.xwayland_has_pointer(id) || self.seat.cursor.mode() != CursorMode::Passthrough {
            return;
        }
        self.begin_move(id);
    }

    pub fn xwayland_request_resize(&mut self, id: ViewId, edges: ResizeEdge) {
        if !self.xwayland_has_pointer(id) || self.seat.cursor.mode() != CursorMode::Passthrough {
            return;
        }
        self.begin_resize(id, edges);
    }

    fn xwayland_has_pointer(&self, id: ViewId) -> bool {
        let surface = self.views.get(id).and_then(|v| v.surface());
        surface.is_some() && self.seat.pointer_focus() == surface
    }

    pub fn xwayland_request_maximize(&mut self, id: ViewId, horizontal: bool, vertical: bool) {
        if horizontal && vertical {
            if let Err(err) = self.maximize_view(id, None) {
                warn!("error maximizing {id:?}: {err}");
            }
        } else {
            self.restore_view(id);
        }
    }

    pub fn xwayland_request_fullscreen(&mut self, id: ViewId, fullscreen: bool) {
        if let Err(err) = self.set_view_fullscreen(id, fullscreen, None) {
            warn!("error setting fullscreen of {id:?}: {err}");
        }
    }

    pub fn xwayland_set_startup_id(&mut self, id: ViewId, startup_id: &str) {
        debug!("got startup id {startup_id} for {id:?}");
        self.send(WireEvent::StartupNotify {
            token: startup_id.to_owned(),
            kind: ActivationKind::X11,
        });
    }

    pub(crate) fn xwayland_commit(&mut self, id: ViewId, was_mapped: bool, mapped: bool) {
        match (was_mapped, mapped) {
            (false, true) => self.xwayland_map(id),
            (true, false) => self.view_unmap(id),
            (true, true) => self.xwayland_apply_commit(id),
            (false, false) => (),
        }
    }

    fn xwayland_map(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface();
        let size = self
            .surfaces
            .get(surface)
            .map(|s| s.size)
            .unwrap_or(view.rect.size);
        let Some(xsurface) = view.kind.as_xwayland() else {
            return;
        };
        view.rect = Rectangle::new(Point::from((xsurface.x, xsurface.y)), size);
        let maximized = xsurface.maximized_horz && xsurface.maximized_vert;
        let override_redirect = xsurface.override_redirect;
        let decorated = xsurface.decorations_all;

        if maximized {
            if let Err(err) = self.maximize_view(id, None) {
                warn!("error maximizing {id:?}: {err}");
            }
        }
        self.auto_maximize_view(id);

        self.view_map(id, surface);

        if override_redirect {
            self.view_initial_focus(id);
            return;
        }

        if decorated {
            self.update_view_decorated(id, true);
        }
        self.view_setup(id);
    }

    fn xwayland_apply_commit(&mut self, id: ViewId) {
        self.view_apply_damage(id);

        let Some(view) = self.views.get(id) else {
            return;
        };
        let Some(size) = self.surfaces.get(view.toplevel_surface()).map(|s| s.size) else {
            return;
        };
        self.update_view_size(id, size.w, size.h);

        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let floating = view.is_floating();
        let pending = &mut view.pending_move_resize;
        let mut x = f64::from(view.rect.loc.x);
        let mut y = f64::from(view.rect.loc.y);

        if pending.update_x {
            x = if floating {
                pending.x + f64::from(pending.width - size.w)
            } else {
                pending.x
            };
            pending.update_x = false;
        }
        if pending.update_y {
            y = if floating {
                pending.y + f64::from(pending.height - size.h)
            } else {
                pending.y
            };
            pending.update_y = false;
        }

        self.update_view_position(id, x as i32, y as i32);
    }
}
