use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::compositor::Compositor;
use crate::surface::{ClientId, SurfaceId, SurfaceRole};
use crate::view::child::ChildKind;
use crate::view::kind::ViewKind;

/// Buffer change carried by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferAssignment {
    #[default]
    Unchanged,
    /// A buffer of this size was attached.
    NewBuffer(Size<i32, Logical>),
    /// The buffer was detached, unmapping the surface.
    Removed,
}

/// What a client committed to a surface, as far as placement and damage are concerned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceCommit {
    pub buffer: BufferAssignment,
    /// Surface-local damage.
    pub damage: Vec<Rectangle<i32, Logical>>,
    /// New position relative to the parent, for subsurfaces.
    pub offset: Option<Point<i32, Logical>>,
    /// xdg window geometry set with this commit.
    pub window_geometry: Option<Rectangle<i32, Logical>>,
}

impl Compositor {
    pub fn new_surface(&mut self, client: ClientId) -> SurfaceId {
        self.surfaces.create(client)
    }

    /// Makes `surface` a subsurface of `parent`.
    ///
    /// Subsurfaces of mapped views and layer surfaces are tracked right away.
    pub fn new_subsurface(&mut self, surface: SurfaceId, parent: SurfaceId) {
        self.surfaces
            .set_role(surface, SurfaceRole::Subsurface { parent });

        let root = self.surfaces.popup_root(parent);
        match self.surfaces.role(root) {
            SurfaceRole::Toplevel(view) => {
                if !self.views.get(view).map_or(false, |v| v.is_mapped()) {
                    return;
                }
                let parent_child = self.view_child_of_surface(parent);
                self.view_child_create(view, parent_child, surface, ChildKind::Subsurface);
            }
            SurfaceRole::Layer(layer) => {
                if let Some(layer) = self.layers.get_mut(layer) {
                    if layer.mapped {
                        layer.subsurfaces.push(surface);
                    }
                }
            }
            _ => (),
        }
    }

    /// Routes a commit to whatever the surface belongs to.
    pub fn surface_commit(&mut self, surface: SurfaceId, commit: SurfaceCommit) {
        let Some(data) = self.surfaces.get_mut(surface) else {
            error!("commit on unknown surface {surface:?}");
            return;
        };

        let was_mapped = data.mapped;
        match commit.buffer {
            BufferAssignment::Unchanged => (),
            BufferAssignment::NewBuffer(size) => {
                data.size = size;
                data.mapped = true;
            }
            BufferAssignment::Removed => {
                data.size = Size::from((0, 0));
                data.mapped = false;
            }
        }
        let mapped = data.mapped;
        if let Some(offset) = commit.offset {
            data.offset = offset;
        }
        for damage in commit.damage {
            data.push_damage(damage);
        }
        let role = data.role;

        match role {
            SurfaceRole::Toplevel(view) => {
                let is_xdg = self.views.get(view).map_or(false, |v| v.kind().is_xdg());
                if is_xdg {
                    self.xdg_toplevel_commit(view, was_mapped, mapped, commit.window_geometry);
                } else {
                    self.xwayland_commit(view, was_mapped, mapped);
                }
            }
            SurfaceRole::Layer(layer) => self.layer_surface_commit(layer, mapped),
            SurfaceRole::Subsurface { .. } | SurfaceRole::Popup { .. } => {
                self.child_commit(surface, was_mapped, mapped);
            }
            SurfaceRole::None => (),
        }

        self.cursor_handle_constraint_commit(surface);
    }

    fn child_commit(&mut self, surface: SurfaceId, was_mapped: bool, mapped: bool) {
        if let Some(child) = self.view_child_of_surface(surface) {
            match (was_mapped, mapped) {
                (false, true) => self.view_child_map(child),
                (true, false) => self.view_child_unmap(child),
                _ => (),
            }
            self.view_child_apply_damage(child);
            return;
        }

        if let Some(layer) = self.surfaces.layer_of(surface) {
            if !was_mapped && mapped {
                self.layer_damage_whole(layer);
            } else {
                self.layer_damage(layer);
            }
        }
    }

    /// Forgets a surface the client destroyed, along with whatever it backed.
    pub fn surface_destroy(&mut self, surface: SurfaceId) {
        if let Some(child) = self.view_child_of_surface(surface) {
            self.view_child_destroy(child);
        }
        if self.pointer_constraints.contains_key(&surface) {
            self.remove_pointer_constraint(surface);
        }

        match self.surfaces.role(surface) {
            SurfaceRole::Toplevel(view) => {
                // X11 windows go away with their wl_surface; xdg toplevels are destroyed
                // through their role object first.
                if self
                    .views
                    .get(view)
                    .map_or(false, |v| matches!(v.kind(), ViewKind::Xwayland(_)))
                {
                    self.view_destroy(view);
                }
            }
            SurfaceRole::Layer(layer) => self.layer_destroy(layer),
            SurfaceRole::Subsurface { parent } => {
                if let Some(layer) = self
                    .surfaces
                    .layer_of(parent)
                    .and_then(|l| self.layers.get_mut(l))
                {
                    layer.subsurfaces.retain(|s| *s != surface);
                }
            }
            _ => (),
        }

        if self.seat.pointer_focus() == Some(surface) {
            self.seat_pointer_clear_focus();
        }
        self.seat_touch_cancel(surface);

        self.surfaces.destroy(surface);
        self.update_cursor_focus();
    }
}
