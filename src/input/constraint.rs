//! Pointer constraints: locking the pointer in place or confining it to a region.

use smithay::utils::{Logical, Point, Rectangle};

use crate::compositor::Compositor;
use crate::protocols::WireEvent;
use crate::surface::SurfaceId;
use crate::utils::{closest_point, contains_f64, distance_squared, intersection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Locked,
    Confined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerConstraint {
    pub surface: SurfaceId,
    pub kind: ConstraintKind,
    /// Requested region, surface-local. `None` means the whole surface.
    pub requested: Option<Vec<Rectangle<i32, Logical>>>,
    /// Requested region clipped to the surface.
    region: Vec<Rectangle<i32, Logical>>,
}

impl PointerConstraint {
    pub fn new(
        surface: SurfaceId,
        kind: ConstraintKind,
        requested: Option<Vec<Rectangle<i32, Logical>>>,
    ) -> Self {
        Self {
            surface,
            kind,
            requested,
            region: Vec::new(),
        }
    }

    pub fn region(&self) -> &[Rectangle<i32, Logical>] {
        &self.region
    }

    /// Clips the requested region to the surface area.
    pub(crate) fn update_region(&mut self, surface_area: Rectangle<i32, Logical>) {
        self.region = match &self.requested {
            None => vec![surface_area],
            Some(rects) => rects
                .iter()
                .filter_map(|rect| intersection(*rect, surface_area))
                .collect(),
        };
    }
}

pub fn region_contains(region: &[Rectangle<i32, Logical>], point: Point<f64, Logical>) -> bool {
    let point = Point::from((point.x.floor(), point.y.floor()));
    region.iter().any(|rect| contains_f64(*rect, point))
}

/// Moves from `from` towards `to` without leaving the region.
///
/// Returns `None` when `from` isn't inside the region to begin with.
pub fn region_confine(
    region: &[Rectangle<i32, Logical>],
    from: Point<f64, Logical>,
    to: Point<f64, Logical>,
) -> Option<Point<f64, Logical>> {
    if !region_contains(region, from) {
        return None;
    }
    if region_contains(region, to) {
        return Some(to);
    }

    region
        .iter()
        .map(|rect| closest_point(*rect, to))
        .min_by(|a, b| distance_squared(*a, to).total_cmp(&distance_squared(*b, to)))
}

impl Compositor {
    /// Registers a constraint a client requested for one of its surfaces.
    pub fn add_pointer_constraint(&mut self, constraint: PointerConstraint) {
        let surface = constraint.surface;
        if self.pointer_constraints.contains_key(&surface) {
            error!("surface {surface:?} already has a pointer constraint");
            return;
        }
        self.pointer_constraints.insert(surface, constraint);

        if self.seat.pointer_focus() == Some(surface) {
            let local = self.seat.cursor.focus_local();
            self.cursor_constrain(Some(surface), local);
        }
    }

    pub fn remove_pointer_constraint(&mut self, surface: SurfaceId) {
        if self.seat.cursor.active_constraint == Some(surface) {
            self.cursor_constrain(None, Point::from((0., 0.)));
        }
        self.pointer_constraints.remove(&surface);
    }

    pub fn set_pointer_constraint_region(
        &mut self,
        surface: SurfaceId,
        region: Option<Vec<Rectangle<i32, Logical>>>,
    ) {
        if let Some(constraint) = self.pointer_constraints.get_mut(&surface) {
            constraint.requested = region;
        }
    }

    /// Makes `surface`'s constraint the active one, or deactivates constraints.
    ///
    /// `local` is the cursor position relative to the surface. When it's outside the new
    /// region, the cursor warps into it first.
    pub fn cursor_constrain(&mut self, surface: Option<SurfaceId>, local: Point<f64, Logical>) {
        let surface = surface.filter(|s| self.pointer_constraints.contains_key(s));
        if self.seat.cursor.active_constraint == surface {
            return;
        }

        debug!("constraining cursor to {surface:?}");

        if let Some(old) = self.seat.cursor.active_constraint.take() {
            self.send(WireEvent::ConstraintDeactivated { surface: old });
        }
        self.seat.cursor.confine.clear();

        let Some(surface) = surface else {
            return;
        };

        let area = self
            .surfaces
            .get(surface)
            .map(|s| s.bbox())
            .unwrap_or_default();
        let Some(constraint) = self.pointer_constraints.get_mut(&surface) else {
            return;
        };
        constraint.update_region(area);
        let region = constraint.region.clone();
        let kind = constraint.kind;

        self.seat.cursor.active_constraint = Some(surface);
        self.send(WireEvent::ConstraintActivated { surface });

        if !region_contains(&region, local) {
            if let Some(first) = region.first() {
                let view_loc = self
                    .seat
                    .cursor
                    .pointer_view
                    .as_ref()
                    .and_then(|pv| self.views.get(pv.view))
                    .map(|v| v.rect().loc.to_f64());
                if let Some(view_loc) = view_loc {
                    let center = Point::from((
                        f64::from(first.loc.x) + f64::from(first.size.w) / 2.,
                        f64::from(first.loc.y) + f64::from(first.size.h) / 2.,
                    ));
                    self.cursor_warp_closest(view_loc + center);
                    self.seat.cursor.focus_local = center;
                }
            }
        }

        // A locked pointer gets an empty region and can't move at all.
        if kind == ConstraintKind::Confined {
            self.seat.cursor.confine = region;
        }
    }

    /// The constrained surface committed: check that the cursor is still over it.
    pub(crate) fn cursor_handle_constraint_commit(&mut self, surface: SurfaceId) {
        if self.seat.cursor.active_constraint != Some(surface) {
            return;
        }

        let hit = self.surface_at(self.seat.cursor.position());
        match hit {
            // Views move around right after creation, from (0, 0) to their real position.
            Some(hit) if hit.surface == Some(surface) => {
                // Re-evaluate from scratch.
                self.seat.cursor.active_constraint = None;
                self.cursor_constrain(Some(surface), hit.local);
            }
            _ => self.update_cursor_focus(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::surface::{ClientId, Surfaces};
    use crate::utils::rect_from_coords;

    fn pt(x: f64, y: f64) -> Point<f64, Logical> {
        Point::from((x, y))
    }

    #[test]
    fn region_is_clipped_to_surface() {
        let mut constraint = PointerConstraint::new(
            Surfaces::default().create(ClientId::next()),
            ConstraintKind::Confined,
            Some(vec![rect_from_coords(-10, -10, 30, 30), rect_from_coords(200, 0, 5, 5)]),
        );
        constraint.update_region(rect_from_coords(0, 0, 100, 100));
        assert_eq!(constraint.region(), &[rect_from_coords(0, 0, 20, 20)]);
    }

    #[test]
    fn confine_stops_at_edges() {
        let region = [rect_from_coords(0, 0, 100, 50)];
        assert_eq!(region_confine(&region, pt(10., 10.), pt(20., 20.)), Some(pt(20., 20.)));
        let p = region_confine(&region, pt(10., 10.), pt(150., 20.)).unwrap();
        assert_abs_diff_eq!(p.x, 100., epsilon = 0.001);
        assert!(p.x < 100.);
        assert_eq!(p.y, 20.);
        assert_eq!(region_confine(&region, pt(10., 10.), pt(-5., -5.)), Some(pt(0., 0.)));
        assert_eq!(region_confine(&region, pt(150., 10.), pt(20., 20.)), None);
    }

    #[test]
    fn empty_region_allows_nothing() {
        assert!(!region_contains(&[], pt(0., 0.)));
        assert_eq!(region_confine(&[], pt(0., 0.), pt(1., 1.)), None);
    }
}
