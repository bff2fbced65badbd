//! Server-side decoration geometry.

use bitflags::bitflags;
use smithay::utils::{Logical, Rectangle, Size};

use crate::utils::expand;

bitflags! {
    /// Part of a server-side decoration under a point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecoPart: u8 {
        const TITLEBAR = 1 << 0;
        const LEFT_BORDER = 1 << 1;
        const RIGHT_BORDER = 1 << 2;
        const TOP_BORDER = 1 << 3;
        const BOTTOM_BORDER = 1 << 4;
    }
}

impl DecoPart {
    pub const NONE: Self = Self::empty();
}

/// Decoration metrics of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration {
    pub titlebar_height: i32,
    pub border_width: i32,
}

impl Decoration {
    pub const NONE: Self = Self {
        titlebar_height: 0,
        border_width: 0,
    };

    /// Grows a view box to include the decoration.
    pub fn expand(&self, rect: Rectangle<i32, Logical>) -> Rectangle<i32, Logical> {
        let bw = self.border_width;
        expand(rect, bw, bw + self.titlebar_height, bw, bw)
    }
}

/// Classifies a point in surface-local coordinates.
///
/// The titlebar takes precedence over the borders. Borders are tested per edge; a point matching
/// both a horizontal and a vertical border is a corner and classifies as [`DecoPart::NONE`].
pub fn deco_part(surface_size: Size<i32, Logical>, decoration: Decoration, sx: f64, sy: f64) -> DecoPart {
    let sw = f64::from(surface_size.w);
    let sh = f64::from(surface_size.h);
    let bw = f64::from(decoration.border_width);
    let titlebar_h = f64::from(decoration.titlebar_height);

    if sx > 0. && sx < sw && sy < 0. && sy > -titlebar_h {
        return DecoPart::TITLEBAR;
    }

    let mut parts = DecoPart::NONE;

    if sy >= -(titlebar_h + bw) && sy <= sh + bw {
        if sx < 0. && sx > -bw {
            parts |= DecoPart::LEFT_BORDER;
        } else if sx > sw && sx < sw + bw {
            parts |= DecoPart::RIGHT_BORDER;
        }
    }

    if sx >= -bw && sx <= sw + bw {
        if sy > sh && sy <= sh + bw {
            parts |= DecoPart::BOTTOM_BORDER;
        } else if sy >= -(titlebar_h + bw) && sy < 0. {
            parts |= DecoPart::TOP_BORDER;
        }
    }

    let horizontal = parts.intersects(DecoPart::LEFT_BORDER | DecoPart::RIGHT_BORDER);
    let vertical = parts.intersects(DecoPart::TOP_BORDER | DecoPart::BOTTOM_BORDER);
    if horizontal && vertical {
        return DecoPart::NONE;
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECO: Decoration = Decoration {
        titlebar_height: 12,
        border_width: 4,
    };

    fn part(sx: f64, sy: f64) -> DecoPart {
        deco_part(Size::from((100, 50)), DECO, sx, sy)
    }

    #[test]
    fn classification() {
        assert_eq!(part(50., -6.), DecoPart::TITLEBAR);
        assert_eq!(part(-2., 20.), DecoPart::LEFT_BORDER);
        assert_eq!(part(102., 20.), DecoPart::RIGHT_BORDER);
        assert_eq!(part(50., 52.), DecoPart::BOTTOM_BORDER);
        assert_eq!(part(50., -14.), DecoPart::TOP_BORDER);
        assert_eq!(part(50., 20.), DecoPart::NONE);
    }

    #[test]
    fn corners_are_none() {
        assert_eq!(part(-2., -2.), DecoPart::NONE);
        assert_eq!(part(102., 52.), DecoPart::NONE);
        assert_eq!(part(-2., 52.), DecoPart::NONE);
    }

    #[test]
    fn outside_bands() {
        assert_eq!(part(-10., 20.), DecoPart::NONE);
        assert_eq!(part(50., 60.), DecoPart::NONE);
        assert_eq!(part(50., -20.), DecoPart::NONE);
    }

    #[test]
    fn undecorated_metrics_hit_nothing() {
        let size = Size::from((100, 50));
        assert_eq!(deco_part(size, Decoration::NONE, -0.5, 20.), DecoPart::NONE);
        assert_eq!(deco_part(size, Decoration::NONE, 50., -0.5), DecoPart::NONE);
    }

    #[test]
    fn expand_box() {
        let rect = crate::utils::rect_from_coords(10, 20, 100, 50);
        assert_eq!(
            DECO.expand(rect),
            crate::utils::rect_from_coords(6, 4, 108, 70)
        );
    }
}
