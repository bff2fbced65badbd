//! Extra things drawn along with a view.

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::animation::{Animatable, Property};
use crate::utils::id::IdCounter;

static BLING_ID_COUNTER: IdCounter = IdCounter::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlingId(u32);

impl BlingId {
    fn next() -> BlingId {
        BlingId(BLING_ID_COUNTER.next())
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlingKind {
    /// Translucent rectangle in layout coordinates.
    ColorRect {
        rect: Rectangle<f64, Logical>,
        color: [f32; 4],
    },
    /// Server-side decoration, sized after the view it belongs to.
    Deco,
}

/// A renderable overlay attached to a view.
///
/// The renderer draws mapped blings just before the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Bling {
    id: BlingId,
    kind: BlingKind,
    mapped: bool,
}

impl Bling {
    pub fn color_rect(rect: Rectangle<i32, Logical>, color: [f32; 4]) -> Self {
        Self {
            id: BlingId::next(),
            kind: BlingKind::ColorRect {
                rect: rect.to_f64(),
                color,
            },
            mapped: false,
        }
    }

    pub fn deco() -> Self {
        Self {
            id: BlingId::next(),
            kind: BlingKind::Deco,
            mapped: false,
        }
    }

    pub fn id(&self) -> BlingId {
        self.id
    }

    pub fn kind(&self) -> &BlingKind {
        &self.kind
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub(crate) fn set_mapped(&mut self, mapped: bool) {
        self.mapped = mapped;
    }

    /// Area covered by the bling, given the decorated box of its view.
    pub fn bounds(&self, deco_box: Rectangle<i32, Logical>) -> Rectangle<i32, Logical> {
        match &self.kind {
            BlingKind::ColorRect { rect, .. } => {
                let x1 = rect.loc.x.floor();
                let y1 = rect.loc.y.floor();
                let x2 = (rect.loc.x + rect.size.w).ceil();
                let y2 = (rect.loc.y + rect.size.h).ceil();
                Rectangle::new(
                    Point::from((x1 as i32, y1 as i32)),
                    Size::from(((x2 - x1) as i32, (y2 - y1) as i32)),
                )
            }
            BlingKind::Deco => deco_box,
        }
    }
}

impl Animatable for Bling {
    fn set_animated(&mut self, property: Property, value: f64) {
        let BlingKind::ColorRect { rect, .. } = &mut self.kind else {
            return;
        };

        match property {
            Property::X => rect.loc.x = value,
            Property::Y => rect.loc.y = value,
            Property::Width => rect.size.w = value,
            Property::Height => rect.size.h = value,
            Property::Alpha => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rect_from_coords;

    #[test]
    fn color_rect_bounds_round_out() {
        let mut bling = Bling::color_rect(rect_from_coords(0, 0, 10, 10), [0.; 4]);
        bling.set_animated(Property::X, 0.5);
        bling.set_animated(Property::Width, 10.2);
        assert_eq!(
            bling.bounds(rect_from_coords(0, 0, 1, 1)),
            rect_from_coords(0, 0, 11, 10)
        );
    }

    #[test]
    fn deco_follows_view() {
        let bling = Bling::deco();
        let deco_box = rect_from_coords(-4, -16, 108, 70);
        assert_eq!(bling.bounds(deco_box), deco_box);
        assert_ne!(bling.id(), Bling::deco().id());
    }
}
