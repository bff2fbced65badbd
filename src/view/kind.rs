//! Shell-specific parts of a view.
//!
//! xdg toplevels negotiate their size through configure serials: the compositor schedules a
//! configure, the client acks it and commits a buffer of the new size. X11 windows are told their
//! geometry outright and simply commit whatever they end up with.

use smithay::utils::{Logical, Rectangle, Size, SERIAL_COUNTER};

use super::{PendingMoveResize, TileDirection, ViewId};
use crate::compositor::Compositor;
use crate::protocols::{ToplevelStates, WireEvent};
use crate::surface::SurfaceRole;
use crate::utils::rect_from_coords;

/// Size and states of one xdg configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToplevelConfigure {
    pub size: Size<i32, Logical>,
    pub states: ToplevelStates,
}

#[derive(Debug, Default)]
pub struct XdgToplevel {
    /// Speaks an old protocol version that can't take a configure without changes.
    pub(crate) legacy: bool,
    /// What the next configure will carry.
    pub(crate) scheduled: ToplevelConfigure,
    /// What the client last acked and committed.
    pub(crate) current: ToplevelConfigure,
    pub(crate) min_size: Size<i32, Logical>,
    pub(crate) max_size: Size<i32, Logical>,
    /// Window geometry the client set, if any.
    pub(crate) explicit_geometry: Option<Rectangle<i32, Logical>>,
    /// Window geometry in effect: the explicit one, or the bounding box of the surface.
    pub(crate) geometry: Rectangle<i32, Logical>,
    pub(crate) saved_geometry: Rectangle<i32, Logical>,
    /// Serial of the configure a pending move-resize waits for, 0 for none.
    pub(crate) pending_move_resize_serial: u32,
    /// Serial of the last configure the client acked and committed.
    pub(crate) configure_serial: u32,
    /// Serial reserved for the configure to send on the next flush.
    pub(crate) configure_pending: Option<u32>,
    /// Configures sent and not yet acked, oldest first.
    pub(crate) sent: Vec<(u32, ToplevelConfigure)>,
    /// Acked configure waiting for the next commit.
    pub(crate) acked: Option<(u32, ToplevelConfigure)>,
    pub(crate) configured: bool,
}

impl XdgToplevel {
    pub fn new(legacy: bool) -> Self {
        Self {
            legacy,
            ..Self::default()
        }
    }

    /// Reserves a serial for the next configure and returns it.
    ///
    /// Legacy clients only get a configure when something changed; 0 means none is scheduled.
    pub(crate) fn schedule(&mut self) -> u32 {
        if self.legacy && self.scheduled == self.current {
            self.configure_pending = None;
            return 0;
        }
        *self
            .configure_pending
            .get_or_insert_with(|| SERIAL_COUNTER.next_serial().into())
    }

    pub(crate) fn set_size(&mut self, size: Size<i32, Logical>) -> u32 {
        self.scheduled.size = size;
        self.schedule()
    }

    pub(crate) fn set_state(&mut self, state: ToplevelStates, enable: bool) -> u32 {
        self.scheduled.states.set(state, enable);
        self.schedule()
    }

    /// Marks a sent configure as acked. Unknown serials are a protocol error.
    pub fn ack_configure(&mut self, serial: u32) -> bool {
        let Some(idx) = self.sent.iter().position(|(s, _)| *s == serial) else {
            return false;
        };
        let acked = self.sent[idx];
        self.sent.drain(..=idx);
        self.acked = Some(acked);
        true
    }

    pub(crate) fn apply_size_constraints(&self, size: Size<i32, Logical>) -> Size<i32, Logical> {
        let constrain = |value: i32, min: i32, max: i32| {
            if value < min {
                min
            } else if max > 0 && value > max {
                max
            } else {
                value
            }
        };
        Size::from((
            constrain(size.w, self.min_size.w, self.max_size.w),
            constrain(size.h, self.min_size.h, self.max_size.h),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum X11WindowType {
    Normal,
    Dialog,
    Utility,
    Toolbar,
    Splash,
    Menu,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
}

/// WM_NORMAL_HINTS size limits, 0 when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeHints {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

#[derive(Debug, Default)]
pub struct XwaylandSurface {
    /// Position the X11 client asked for, in layout coordinates.
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) override_redirect: bool,
    pub(crate) window_types: Vec<X11WindowType>,
    pub(crate) size_hints: Option<SizeHints>,
    pub(crate) maximized_horz: bool,
    pub(crate) maximized_vert: bool,
    pub(crate) fullscreen: bool,
    /// Client wants server-side decorations.
    pub(crate) decorations_all: bool,
}

impl XwaylandSurface {
    pub fn new(x: i32, y: i32, override_redirect: bool) -> Self {
        Self {
            x,
            y,
            override_redirect,
            ..Self::default()
        }
    }

    /// Normal windows and dialogs can be moved; docks, menus and the like stay put.
    pub fn is_moveable(&self) -> bool {
        self.window_types
            .iter()
            .all(|t| matches!(t, X11WindowType::Normal | X11WindowType::Dialog))
    }

    fn apply_size_constraints(&self, size: Size<i32, Logical>) -> Size<i32, Logical> {
        let Some(hints) = self.size_hints else {
            return size;
        };

        let mut w = size.w;
        let mut h = size.h;
        if w < hints.min_width {
            w = hints.min_width;
        } else if hints.max_width > 0 && w > hints.max_width {
            w = hints.max_width;
        }
        if h < hints.min_height {
            h = hints.min_height;
        } else if hints.max_height > 0 && h > hints.max_height {
            h = hints.max_height;
        }
        Size::from((w, h))
    }

    fn is_fixed_size(&self) -> bool {
        self.size_hints.map_or(false, |hints| {
            hints.min_width > 0
                && hints.min_height > 0
                && hints.min_width == hints.max_width
                && hints.min_height == hints.max_height
        })
    }
}

#[derive(Debug)]
pub enum ViewKind {
    Xdg(XdgToplevel),
    Xwayland(XwaylandSurface),
}

impl ViewKind {
    pub fn is_xdg(&self) -> bool {
        matches!(self, ViewKind::Xdg(_))
    }

    pub fn as_xdg(&self) -> Option<&XdgToplevel> {
        match self {
            ViewKind::Xdg(toplevel) => Some(toplevel),
            ViewKind::Xwayland(_) => None,
        }
    }

    pub fn as_xdg_mut(&mut self) -> Option<&mut XdgToplevel> {
        match self {
            ViewKind::Xdg(toplevel) => Some(toplevel),
            ViewKind::Xwayland(_) => None,
        }
    }

    pub fn as_xwayland(&self) -> Option<&XwaylandSurface> {
        match self {
            ViewKind::Xdg(_) => None,
            ViewKind::Xwayland(surface) => Some(surface),
        }
    }

    pub fn as_xwayland_mut(&mut self) -> Option<&mut XwaylandSurface> {
        match self {
            ViewKind::Xdg(_) => None,
            ViewKind::Xwayland(surface) => Some(surface),
        }
    }

    /// Whether the view can be scaled down to fit its output.
    pub fn want_scaling(&self) -> bool {
        match self {
            ViewKind::Xdg(_) => true,
            ViewKind::Xwayland(_) => false,
        }
    }

    /// Whether auto-maximize should maximize this view when it's on.
    ///
    /// Transient xdg toplevels and fixed-size or unmoveable X11 windows keep their size.
    pub fn want_auto_maximize(&self, has_parent: bool) -> bool {
        match self {
            ViewKind::Xdg(_) => !has_parent,
            ViewKind::Xwayland(surface) => {
                if surface.is_fixed_size() {
                    return false;
                }
                surface.is_moveable()
            }
        }
    }
}

impl Compositor {
    fn xdg_mut(&mut self, id: ViewId) -> Option<&mut XdgToplevel> {
        self.views.get_mut(id)?.kind.as_xdg_mut()
    }

    /// Shows the view as activated or not, without touching focus.
    pub(crate) fn kind_set_active(&mut self, id: ViewId, active: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface;

        if let Some(toplevel) = view.kind.as_xdg_mut() {
            toplevel.set_state(ToplevelStates::ACTIVATED, active);
            return;
        }

        self.send(WireEvent::X11Activate {
            surface,
            activated: active,
        });
    }

    pub(crate) fn kind_set_maximized(&mut self, id: ViewId, maximized: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        match &mut view.kind {
            ViewKind::Xdg(toplevel) => {
                toplevel.set_state(ToplevelStates::MAXIMIZED, maximized);
            }
            ViewKind::Xwayland(surface) => {
                surface.maximized_horz = maximized;
                surface.maximized_vert = maximized;
            }
        }
    }

    pub(crate) fn kind_set_fullscreen(&mut self, id: ViewId, fullscreen: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        match &mut view.kind {
            ViewKind::Xdg(toplevel) => {
                toplevel.set_state(ToplevelStates::FULLSCREEN, fullscreen);
            }
            ViewKind::Xwayland(surface) => surface.fullscreen = fullscreen,
        }
    }

    /// Tells xdg clients which edges touch something. X11 has no notion of tiling.
    pub(crate) fn kind_set_tiled(&mut self, id: ViewId, tiled: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let direction = view.tile_direction;
        let Some(toplevel) = view.kind.as_xdg_mut() else {
            return;
        };

        let edges = if !tiled {
            ToplevelStates::empty()
        } else {
            match direction {
                TileDirection::Left => {
                    ToplevelStates::TILED_TOP
                        | ToplevelStates::TILED_BOTTOM
                        | ToplevelStates::TILED_LEFT
                }
                TileDirection::Right => {
                    ToplevelStates::TILED_TOP
                        | ToplevelStates::TILED_BOTTOM
                        | ToplevelStates::TILED_RIGHT
                }
            }
        };

        toplevel.scheduled.states.remove(ToplevelStates::TILED);
        toplevel.scheduled.states.insert(edges);
        toplevel.schedule();
    }

    /// Asks the client to pick the given size.
    pub(crate) fn kind_resize(&mut self, id: ViewId, width: i32, height: i32) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface;
        let loc = view.rect.loc;

        match &mut view.kind {
            ViewKind::Xdg(toplevel) => {
                let size = toplevel.apply_size_constraints(Size::from((width, height)));
                if toplevel.scheduled.size == size {
                    return;
                }
                toplevel.set_size(size);
                self.send_frame_done_if_not_visible(id);
            }
            ViewKind::Xwayland(xsurface) => {
                let size = xsurface.apply_size_constraints(Size::from((width, height)));
                self.send(WireEvent::X11Configure {
                    surface,
                    geometry: rect_from_coords(loc.x, loc.y, size.w, size.h),
                });
            }
        }
    }

    pub(crate) fn kind_move(&mut self, id: ViewId, x: f64, y: f64) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let surface = view.toplevel_surface;
        let size = view.rect.size;

        match &view.kind {
            ViewKind::Xdg(_) => self.update_view_position(id, x as i32, y as i32),
            ViewKind::Xwayland(xsurface) => {
                if !xsurface.is_moveable() {
                    return;
                }
                self.update_view_position(id, x as i32, y as i32);
                self.send(WireEvent::X11Configure {
                    surface,
                    geometry: rect_from_coords(x as i32, y as i32, size.w, size.h),
                });
            }
        }
    }

    /// Moves and resizes at once. The new position is applied once the client commits the new
    /// size, keeping the right and bottom edges in place when only those moved.
    pub(crate) fn kind_move_resize(&mut self, id: ViewId, x: f64, y: f64, width: i32, height: i32) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface;
        let rect = view.rect;

        match &mut view.kind {
            ViewKind::Xdg(toplevel) => {
                let update_x = x != f64::from(rect.loc.x);
                let update_y = y != f64::from(rect.loc.y);

                let size = toplevel.apply_size_constraints(Size::from((width, height)));
                let x = if update_x {
                    x + f64::from(width) - f64::from(size.w)
                } else {
                    x
                };
                let y = if update_y {
                    y + f64::from(height) - f64::from(size.h)
                } else {
                    y
                };

                view.pending_move_resize = PendingMoveResize {
                    update_x,
                    update_y,
                    x,
                    y,
                    width: size.w,
                    height: size.h,
                };

                let mut move_now = false;
                if toplevel.legacy {
                    let serial = toplevel.set_size(size);
                    if serial > 0 {
                        toplevel.pending_move_resize_serial = serial;
                    } else if toplevel.pending_move_resize_serial == 0 {
                        move_now = true;
                    }
                } else if toplevel.scheduled.size == size {
                    move_now = true;
                } else {
                    toplevel.pending_move_resize_serial = toplevel.set_size(size);
                }

                if move_now {
                    self.update_view_position(id, x as i32, y as i32);
                }
                self.send_frame_done_if_not_visible(id);
            }
            ViewKind::Xwayland(xsurface) => {
                let (x, y) = if xsurface.is_moveable() {
                    (x, y)
                } else {
                    (f64::from(rect.loc.x), f64::from(rect.loc.y))
                };

                let update_x = x != f64::from(rect.loc.x);
                let update_y = y != f64::from(rect.loc.y);

                let size = xsurface.apply_size_constraints(Size::from((width, height)));
                let x = if update_x {
                    x + f64::from(width) - f64::from(size.w)
                } else {
                    x
                };
                let y = if update_y {
                    y + f64::from(height) - f64::from(size.h)
                } else {
                    y
                };

                view.pending_move_resize = PendingMoveResize {
                    update_x,
                    update_y,
                    x,
                    y,
                    width: size.w,
                    height: size.h,
                };

                self.send(WireEvent::X11Configure {
                    surface,
                    geometry: rect_from_coords(x as i32, y as i32, size.w, size.h),
                });
            }
        }
    }

    /// Asks the client to close the view and dismisses its popups.
    pub fn view_close(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let surface = view.toplevel_surface;

        if view.kind.is_xdg() {
            let mut popups = Vec::new();
            self.surfaces.for_each_surface(surface, true, &mut |s, _| {
                if matches!(self.surfaces.role(s), SurfaceRole::Popup { .. }) {
                    popups.push(s);
                }
            });
            for popup in popups {
                self.send(WireEvent::PopupDone { surface: popup });
            }
        }

        self.send(WireEvent::Close { surface });
        self.send_frame_done_if_not_visible(id);
    }

    /// Sends every scheduled xdg configure.
    pub(crate) fn flush_configures(&mut self) {
        let mut configures = Vec::new();
        for (_, view) in self.views.iter_mut() {
            let surface = view.toplevel_surface;
            let Some(toplevel) = view.kind.as_xdg_mut() else {
                continue;
            };
            let Some(serial) = toplevel.configure_pending.take() else {
                continue;
            };

            let configure = toplevel.scheduled;
            toplevel.sent.push((serial, configure));
            toplevel.configured = true;
            configures.push(WireEvent::XdgConfigure {
                surface,
                serial,
                size: configure.size,
                states: configure.states,
            });
        }

        for event in configures {
            self.send(event);
        }
    }

    /// Makes sure the client gets a configure even though nothing changed.
    pub(crate) fn force_configure(&mut self, id: ViewId) -> Option<u32> {
        let toplevel = self.xdg_mut(id)?;
        Some(
            *toplevel
                .configure_pending
                .get_or_insert_with(|| SERIAL_COUNTER.next_serial().into()),
        )
    }

    pub fn view_want_scaling(&self, id: ViewId) -> bool {
        self.views.get(id).map_or(false, |v| v.kind.want_scaling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_constraints() {
        let toplevel = XdgToplevel {
            min_size: Size::from((100, 50)),
            max_size: Size::from((400, 0)),
            ..XdgToplevel::default()
        };
        assert_eq!(
            toplevel.apply_size_constraints(Size::from((10, 10))),
            Size::from((100, 50))
        );
        assert_eq!(
            toplevel.apply_size_constraints(Size::from((1000, 1000))),
            Size::from((400, 1000))
        );
    }

    #[test]
    fn legacy_skips_redundant_configures() {
        let mut toplevel = XdgToplevel::new(true);
        assert_eq!(toplevel.schedule(), 0);
        assert!(toplevel.configure_pending.is_none());

        let serial = toplevel.set_size(Size::from((10, 10)));
        assert_ne!(serial, 0);
        assert_eq!(toplevel.set_size(Size::from((20, 20))), serial);

        toplevel.set_size(Size::from((0, 0)));
        assert!(toplevel.configure_pending.is_none());
    }

    #[test]
    fn ack_drops_older_configures() {
        let mut toplevel = XdgToplevel::new(false);
        let configure = ToplevelConfigure::default();
        toplevel.sent = vec![(1, configure), (2, configure), (3, configure)];

        assert!(toplevel.ack_configure(2));
        assert_eq!(toplevel.acked.map(|(s, _)| s), Some(2));
        assert_eq!(toplevel.sent.len(), 1);
        assert!(!toplevel.ack_configure(7));
    }

    #[test]
    fn x11_moveable_types() {
        let mut surface = XwaylandSurface::new(0, 0, false);
        assert!(surface.is_moveable());
        surface.window_types = vec![X11WindowType::Normal, X11WindowType::Dialog];
        assert!(surface.is_moveable());
        surface.window_types.push(X11WindowType::Splash);
        assert!(!surface.is_moveable());
    }

    #[test]
    fn fixed_size_x11_windows_are_not_auto_maximized() {
        let mut surface = XwaylandSurface::new(0, 0, false);
        surface.size_hints = Some(SizeHints {
            min_width: 300,
            min_height: 200,
            max_width: 300,
            max_height: 200,
        });
        assert!(!ViewKind::Xwayland(surface).want_auto_maximize(false));
    }
}
