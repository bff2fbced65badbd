//! Subsurfaces and popups of a view.
//!
//! Every surface hanging off a mapped view gets a [`ViewChild`], so that it can be damaged,
//! mapped and unmapped on its own. Children form a tree through `parent`; a child only counts as
//! mapped when all of its ancestors are.

use smithay::utils::{Logical, Point, Rectangle};

use super::ViewId;
use crate::compositor::Compositor;
use crate::protocols::WireEvent;
use crate::surface::{SurfaceId, SurfaceRole};
use crate::utils::arena::Id;
use crate::utils::intersects;

pub type ChildId = Id<ViewChild>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Subsurface,
    /// Anchor point of the positioner, relative to the parent surface.
    Popup { anchor: Point<i32, Logical> },
}

#[derive(Debug)]
pub struct ViewChild {
    pub(crate) view: ViewId,
    pub(crate) surface: SurfaceId,
    pub(crate) kind: ChildKind,
    pub(crate) parent: Option<ChildId>,
    /// Most recent first.
    pub(crate) children: Vec<ChildId>,
    pub(crate) mapped: bool,
    /// Lost its parent; stays unmapped until destroyed.
    pub(crate) orphaned: bool,
}

impl ViewChild {
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn kind(&self) -> ChildKind {
        self.kind
    }
}

impl Compositor {
    /// Tracks a new subsurface or popup of a view, along with the subsurfaces it already has.
    pub fn view_child_create(
        &mut self,
        view: ViewId,
        parent: Option<ChildId>,
        surface: SurfaceId,
        kind: ChildKind,
    ) -> ChildId {
        let mapped = match kind {
            ChildKind::Subsurface => self.surfaces.get(surface).map_or(false, |s| s.mapped),
            ChildKind::Popup { .. } => false,
        };

        let id = self.children.insert(ViewChild {
            view,
            surface,
            kind,
            parent,
            children: Vec::new(),
            mapped,
            orphaned: false,
        });

        if let Some(v) = self.views.get_mut(view) {
            v.child_surfaces.insert(0, id);
        }
        if let Some(parent) = parent.and_then(|p| self.children.get_mut(p)) {
            parent.children.insert(0, id);
        }

        let subsurfaces = self
            .surfaces
            .get(surface)
            .map(|s| s.subsurfaces.clone())
            .unwrap_or_default();
        for sub in subsurfaces {
            self.view_child_create(view, Some(id), sub, ChildKind::Subsurface);
        }

        if parent.is_some() {
            self.view_child_damage_whole(id);
        }

        trace!("new view child {id:?} for {surface:?}");
        id
    }

    /// Forgets a child. Its own children stay tracked but are unmapped for good.
    pub fn view_child_destroy(&mut self, id: ChildId) {
        if self.view_child_is_mapped(id) {
            self.view_child_damage_whole(id);
        }

        let Some(child) = self.children.remove(id) else {
            return;
        };

        if let Some(parent) = child.parent.and_then(|p| self.children.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        for grandchild in child.children {
            if let Some(grandchild) = self.children.get_mut(grandchild) {
                grandchild.parent = None;
                grandchild.mapped = false;
                grandchild.orphaned = true;
            }
        }
        if let Some(view) = self.views.get_mut(child.view) {
            view.child_surfaces.retain(|c| *c != id);
        }
    }

    /// Whether the child and all its ancestors are mapped.
    pub fn view_child_is_mapped(&self, id: ChildId) -> bool {
        let mut node = Some(id);
        while let Some(current) = node {
            let Some(child) = self.children.get(current) else {
                return false;
            };
            if !child.mapped || child.orphaned {
                return false;
            }
            node = child.parent;
        }
        true
    }

    fn view_child_visible(&self, id: ChildId) -> Option<ViewId> {
        let view = self.children.get(id)?.view;
        let mapped = self.views.get(view).map_or(false, |v| v.is_mapped());
        (mapped && self.view_child_is_mapped(id)).then_some(view)
    }

    /// Position of the child surface relative to the view's surface.
    pub fn view_child_position(&self, id: ChildId) -> Point<i32, Logical> {
        let Some(child) = self.children.get(id) else {
            return Point::from((0, 0));
        };
        let root = self.views.get(child.view).map(|v| v.toplevel_surface);

        let mut offset = Point::from((0, 0));
        let mut surface = child.surface;
        while Some(surface) != root {
            let parent = match self.surfaces.role(surface) {
                SurfaceRole::Subsurface { parent } | SurfaceRole::Popup { parent } => parent,
                _ => break,
            };
            let Some(data) = self.surfaces.get(surface) else {
                break;
            };
            offset += data.offset;
            surface = parent;
        }
        offset
    }

    /// Child tracking the surface, if any.
    pub fn view_child_of_surface(&self, surface: SurfaceId) -> Option<ChildId> {
        self.children
            .iter()
            .find(|(_, child)| child.surface == surface)
            .map(|(id, _)| id)
    }

    pub fn view_child_damage_whole(&mut self, id: ChildId) {
        let Some(view) = self.view_child_visible(id) else {
            return;
        };
        let Some(surface) = self.children.get(id).map(|c| c.surface) else {
            return;
        };
        let Some(bbox) = self.surfaces.get(surface).map(|s| s.bbox()) else {
            return;
        };

        let position = self.view_child_position(id);
        if let Some(rect) = self.view_surface_rect(view, position, bbox) {
            self.damage_rect(rect);
        }
    }

    /// Applies committed damage of a child surface.
    pub fn view_child_apply_damage(&mut self, id: ChildId) {
        if let Some(view) = self.view_child_visible(id) {
            self.view_apply_damage(view);
        }
    }

    pub fn view_child_map(&mut self, id: ChildId) {
        let Some(child) = self.children.get_mut(id) else {
            return;
        };
        if child.orphaned {
            trace!("not mapping orphaned view child {id:?}");
            return;
        }
        child.mapped = true;
        let surface = child.surface;
        let view = child.view;
        self.view_child_damage_whole(id);

        let Some(rect) = self.views.get(view).map(|v| v.get_box()) else {
            return;
        };
        let outputs: Vec<_> = self
            .outputs
            .iter()
            .filter(|(_, output)| intersects(output.geometry(), rect))
            .map(|(id, _)| id)
            .collect();
        for output in outputs {
            self.send(WireEvent::SurfaceEnter { surface, output });
        }

        self.update_cursor_focus();
    }

    pub fn view_child_unmap(&mut self, id: ChildId) {
        self.view_child_damage_whole(id);
        self.update_cursor_focus();
        if let Some(child) = self.children.get_mut(id) {
            child.mapped = false;
        }
    }

    /// Slides a popup so that it stays within the usable area of the output its anchor is on.
    pub fn view_popup_unconstrain(&mut self, id: ChildId) {
        let Some(child) = self.children.get(id) else {
            return;
        };
        let ChildKind::Popup { anchor } = child.kind else {
            return;
        };
        let surface = child.surface;
        let Some(view_loc) = self.views.get(child.view).map(|v| v.rect.loc) else {
            return;
        };
        let Some(data) = self.surfaces.get(surface) else {
            return;
        };
        let size = data.size;
        let offset = data.offset;

        // Popup position relative to the toplevel.
        let popup = self.view_child_position(id);
        let parent_pos = popup - offset;
        let anchor = (view_loc + parent_pos + anchor).to_f64();

        let Some(dest) = self.outputs.closest_point(anchor) else {
            return;
        };
        let Some(usable) = self
            .outputs
            .output_at(dest)
            .and_then(|o| self.outputs.get(o))
            .map(|o| o.usable_area_in_layout())
        else {
            return;
        };

        // The usable area in the toplevel's coordinate system.
        let bounds = Rectangle::new(usable.loc - view_loc, usable.size);

        let mut loc = popup;
        if loc.x + size.w > bounds.loc.x + bounds.size.w {
            loc.x = bounds.loc.x + bounds.size.w - size.w;
        }
        if loc.x < bounds.loc.x {
            loc.x = bounds.loc.x;
        }
        if loc.y + size.h > bounds.loc.y + bounds.size.h {
            loc.y = bounds.loc.y + bounds.size.h - size.h;
        }
        if loc.y < bounds.loc.y {
            loc.y = bounds.loc.y;
        }

        let geometry = Rectangle::new(loc - parent_pos, size);
        if let Some(data) = self.surfaces.get_mut(surface) {
            data.offset = geometry.loc;
        }
        self.send(WireEvent::PopupConfigure { surface, geometry });
    }
}

#[cfg(test)]
mod tests {
    use tessera_config::Config;

    use super::*;
    use crate::handlers::{BufferAssignment, SurfaceCommit};
    use crate::surface::ClientId;
    use crate::utils::rect_from_coords;
    use crate::view::kind::{ViewKind, XdgToplevel};

    struct Tree {
        comp: Compositor,
        sub: SurfaceId,
        nested: SurfaceId,
    }

    fn attach(comp: &mut Compositor, surface: SurfaceId) {
        comp.surface_commit(
            surface,
            SurfaceCommit {
                buffer: BufferAssignment::NewBuffer((20, 20).into()),
                ..SurfaceCommit::default()
            },
        );
    }

    fn detach(comp: &mut Compositor, surface: SurfaceId) {
        comp.surface_commit(
            surface,
            SurfaceCommit {
                buffer: BufferAssignment::Removed,
                ..SurfaceCommit::default()
            },
        );
    }

    /// A mapped view with a subsurface that has a subsurface of its own.
    fn tree() -> Tree {
        let mut comp = Compositor::new(&Config::default());
        comp.add_output("headless-1", rect_from_coords(0, 0, 1280, 720), 1.);

        let client = ClientId::next();
        let toplevel = comp.new_surface(client);
        let view = comp.create_view(ViewKind::Xdg(XdgToplevel::new(false)), toplevel);
        comp.view_map(view, toplevel);

        let sub = comp.new_surface(client);
        comp.new_subsurface(sub, toplevel);
        attach(&mut comp, sub);

        let nested = comp.new_surface(client);
        comp.new_subsurface(nested, sub);
        attach(&mut comp, nested);

        Tree { comp, sub, nested }
    }

    #[test]
    fn children_are_tracked_with_their_parent() {
        let Tree { comp, sub, nested } = tree();

        let sub = comp.view_child_of_surface(sub).unwrap();
        let nested = comp.view_child_of_surface(nested).unwrap();
        assert_eq!(comp.children.get(nested).unwrap().parent, Some(sub));
        assert_eq!(comp.children.get(sub).unwrap().children, vec![nested]);
        assert!(comp.view_child_is_mapped(sub));
        assert!(comp.view_child_is_mapped(nested));
    }

    #[test]
    fn unmapped_parent_hides_mapped_child() {
        let Tree {
            mut comp,
            sub,
            nested,
        } = tree();

        detach(&mut comp, sub);

        let nested = comp.view_child_of_surface(nested).unwrap();
        assert!(comp.children.get(nested).unwrap().mapped);
        assert!(!comp.view_child_is_mapped(nested));
    }

    #[test]
    fn destroying_parent_orphans_children() {
        let Tree {
            mut comp,
            sub,
            nested,
        } = tree();

        comp.surface_destroy(sub);

        let child = comp.view_child_of_surface(nested).unwrap();
        let data = comp.children.get(child).unwrap();
        assert_eq!(data.parent, None);
        assert!(!data.mapped);
        assert!(!comp.view_child_is_mapped(child));

        // A fresh buffer doesn't bring it back.
        detach(&mut comp, nested);
        attach(&mut comp, nested);
        assert!(!comp.children.get(child).unwrap().mapped);
        assert!(!comp.view_child_is_mapped(child));
    }
}
