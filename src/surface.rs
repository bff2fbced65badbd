//! Client surfaces and the trees they form.
//!
//! A surface gets a role once: toplevel (backing a view), subsurface or popup (hanging off a
//! parent surface), or layer surface. Subsurfaces and popups are positioned by an offset from
//! their parent surface.

use std::collections::HashMap;

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::layer::LayerId;
use crate::utils::id::IdCounter;
use crate::utils::contains_f64;
use crate::view::ViewId;

static SURFACE_ID_COUNTER: IdCounter = IdCounter::new();
static CLIENT_ID_COUNTER: IdCounter = IdCounter::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    fn next() -> SurfaceId {
        SurfaceId(SURFACE_ID_COUNTER.next())
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u32);

impl ClientId {
    pub fn next() -> ClientId {
        ClientId(CLIENT_ID_COUNTER.next())
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    None,
    Toplevel(ViewId),
    Subsurface { parent: SurfaceId },
    Popup { parent: SurfaceId },
    Layer(LayerId),
}

#[derive(Debug)]
pub struct SurfaceData {
    pub client: ClientId,
    pub role: SurfaceRole,
    /// Size of the committed buffer.
    pub size: Size<i32, Logical>,
    /// Offset from the parent surface, for subsurfaces and popups.
    pub offset: Point<i32, Logical>,
    /// Whether a buffer is attached.
    pub mapped: bool,
    pub subsurfaces: Vec<SurfaceId>,
    pub popups: Vec<SurfaceId>,
    /// Damage committed since the last time it was applied, surface-local.
    pending_damage: Vec<Rectangle<i32, Logical>>,
}

impl SurfaceData {
    fn new(client: ClientId) -> Self {
        Self {
            client,
            role: SurfaceRole::None,
            size: Size::from((0, 0)),
            offset: Point::from((0, 0)),
            mapped: false,
            subsurfaces: Vec::new(),
            popups: Vec::new(),
            pending_damage: Vec::new(),
        }
    }

    pub fn push_damage(&mut self, damage: Rectangle<i32, Logical>) {
        self.pending_damage.push(damage);
    }

    pub fn take_damage(&mut self) -> Vec<Rectangle<i32, Logical>> {
        std::mem::take(&mut self.pending_damage)
    }

    pub fn bbox(&self) -> Rectangle<i32, Logical> {
        Rectangle::new(Point::from((0, 0)), self.size)
    }
}

#[derive(Debug, Default)]
pub struct Surfaces {
    map: HashMap<SurfaceId, SurfaceData>,
}

impl Surfaces {
    pub fn create(&mut self, client: ClientId) -> SurfaceId {
        let id = SurfaceId::next();
        self.map.insert(id, SurfaceData::new(client));
        trace!("new surface {id:?} of client {client:?}");
        id
    }

    /// Forgets the surface and detaches it from its parent.
    ///
    /// Children of the surface keep pointing at it and won't resolve it anymore.
    pub fn destroy(&mut self, id: SurfaceId) -> Option<SurfaceData> {
        let data = self.map.remove(&id)?;
        match data.role {
            SurfaceRole::Subsurface { parent } => {
                if let Some(parent) = self.map.get_mut(&parent) {
                    parent.subsurfaces.retain(|s| *s != id);
                }
            }
            SurfaceRole::Popup { parent } => {
                if let Some(parent) = self.map.get_mut(&parent) {
                    parent.popups.retain(|s| *s != id);
                }
            }
            _ => (),
        }
        Some(data)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&SurfaceData> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut SurfaceData> {
        self.map.get_mut(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn client(&self, id: SurfaceId) -> Option<ClientId> {
        self.get(id).map(|s| s.client)
    }

    pub fn role(&self, id: SurfaceId) -> SurfaceRole {
        self.get(id).map_or(SurfaceRole::None, |s| s.role)
    }

    /// Assigns a role, linking subsurfaces and popups into their parent.
    pub fn set_role(&mut self, id: SurfaceId, role: SurfaceRole) {
        let Some(surface) = self.map.get_mut(&id) else {
            return;
        };
        if surface.role != SurfaceRole::None && surface.role != role {
            error!("surface {id:?} already has role {:?}", surface.role);
            return;
        }
        surface.role = role;

        match role {
            SurfaceRole::Subsurface { parent } => {
                if let Some(parent) = self.map.get_mut(&parent) {
                    if !parent.subsurfaces.contains(&id) {
                        parent.subsurfaces.push(id);
                    }
                }
            }
            SurfaceRole::Popup { parent } => {
                if let Some(parent) = self.map.get_mut(&parent) {
                    if !parent.popups.contains(&id) {
                        parent.popups.push(id);
                    }
                }
            }
            _ => (),
        }
    }

    /// Topmost surface of a subsurface tree.
    pub fn root(&self, mut id: SurfaceId) -> SurfaceId {
        while let SurfaceRole::Subsurface { parent } = self.role(id) {
            if !self.contains(parent) {
                break;
            }
            id = parent;
        }
        id
    }

    /// Root surface, following popups up to the surface they were opened from.
    pub fn popup_root(&self, id: SurfaceId) -> SurfaceId {
        let mut root = self.root(id);
        while let SurfaceRole::Popup { parent } = self.role(root) {
            if !self.contains(parent) {
                break;
            }
            root = self.root(parent);
        }
        root
    }

    /// View whose toplevel surface owns this surface, through subsurfaces and popups.
    pub fn view_of(&self, id: SurfaceId) -> Option<ViewId> {
        match self.role(self.popup_root(id)) {
            SurfaceRole::Toplevel(view) => Some(view),
            _ => None,
        }
    }

    /// Layer surface owning this surface, through subsurfaces and popups.
    pub fn layer_of(&self, id: SurfaceId) -> Option<LayerId> {
        match self.role(self.popup_root(id)) {
            SurfaceRole::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    /// Sum of subsurface offsets between the surface and its root.
    pub fn subsurface_offset(&self, mut id: SurfaceId) -> Point<i32, Logical> {
        let mut offset = Point::from((0, 0));
        while let SurfaceRole::Subsurface { parent } = self.role(id) {
            let Some(data) = self.get(id) else { break };
            offset += data.offset;
            id = parent;
        }
        offset
    }

    /// Calls `f` for the surface and every descendant with its offset from `id`.
    ///
    /// Subsurfaces come before popups, parents before children.
    pub fn for_each_surface(
        &self,
        id: SurfaceId,
        include_popups: bool,
        f: &mut dyn FnMut(SurfaceId, Point<i32, Logical>),
    ) {
        self.for_each_surface_at(id, Point::from((0, 0)), include_popups, f);
    }

    fn for_each_surface_at(
        &self,
        id: SurfaceId,
        offset: Point<i32, Logical>,
        include_popups: bool,
        f: &mut dyn FnMut(SurfaceId, Point<i32, Logical>),
    ) {
        let Some(data) = self.get(id) else { return };
        f(id, offset);

        for sub in &data.subsurfaces {
            if let Some(sub_data) = self.get(*sub) {
                self.for_each_surface_at(*sub, offset + sub_data.offset, include_popups, f);
            }
        }

        if include_popups {
            for popup in &data.popups {
                if let Some(popup_data) = self.get(*popup) {
                    self.for_each_surface_at(*popup, offset + popup_data.offset, true, f);
                }
            }
        }
    }

    /// Mapped surface in the tree at the given point, relative to `id`.
    ///
    /// Returns the surface together with the point in its local coordinates. Popups are above
    /// subsurfaces, which are above their parent; later siblings are above earlier ones.
    pub fn surface_under(
        &self,
        id: SurfaceId,
        point: Point<f64, Logical>,
        include_popups: bool,
    ) -> Option<(SurfaceId, Point<f64, Logical>)> {
        let data = self.get(id)?;
        if !data.mapped {
            return None;
        }

        if include_popups {
            for popup in data.popups.iter().rev() {
                let Some(popup_data) = self.get(*popup) else { continue };
                let local = point - popup_data.offset.to_f64();
                if let Some(hit) = self.surface_under(*popup, local, true) {
                    return Some(hit);
                }
            }
        }

        for sub in data.subsurfaces.iter().rev() {
            let Some(sub_data) = self.get(*sub) else { continue };
            let local = point - sub_data.offset.to_f64();
            if let Some(hit) = self.surface_under(*sub, local, include_popups) {
                return Some(hit);
            }
        }

        contains_f64(data.bbox(), point).then_some((id, point))
    }
}
