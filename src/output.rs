//! Outputs and their arrangement in the global layout.

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::layer::LayerId;
use crate::utils::arena::{Arena, Id};
use crate::utils::{closest_point, contains_f64, distance_squared, intersection, intersects};
use crate::view::ViewId;

pub type OutputId = Id<Output>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Regions of an output that need to be redrawn, in output-local coordinates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputDamage {
    pub whole: bool,
    pub regions: Vec<Rectangle<i32, Logical>>,
}

impl OutputDamage {
    pub fn is_empty(&self) -> bool {
        !self.whole && self.regions.is_empty()
    }
}

#[derive(Debug)]
pub struct Output {
    name: String,
    /// Position and size in the global layout.
    geometry: Rectangle<i32, Logical>,
    scale: f64,
    /// Area not covered by exclusive zones of layer surfaces, output-local.
    usable_area: Rectangle<i32, Logical>,
    /// The single view allowed to be fullscreen on this output.
    pub(crate) fullscreen_view: Option<ViewId>,
    /// Whether auto-hiding shell surfaces are forced on top of fullscreen content.
    shell_revealed: bool,
    /// Layer surfaces on this output, in creation order.
    pub(crate) layers: Vec<LayerId>,
    damage: OutputDamage,
}

impl Output {
    pub fn new(name: impl Into<String>, geometry: Rectangle<i32, Logical>, scale: f64) -> Self {
        Self {
            name: name.into(),
            geometry,
            scale,
            usable_area: Rectangle::new(Point::from((0, 0)), geometry.size),
            fullscreen_view: None,
            shell_revealed: false,
            layers: Vec::new(),
            damage: OutputDamage::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Rectangle<i32, Logical> {
        self.geometry
    }

    pub fn size(&self) -> Size<i32, Logical> {
        self.geometry.size
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn usable_area(&self) -> Rectangle<i32, Logical> {
        self.usable_area
    }

    pub(crate) fn set_usable_area(&mut self, area: Rectangle<i32, Logical>) {
        self.usable_area = area;
    }

    /// Usable area translated into global layout coordinates.
    pub fn usable_area_in_layout(&self) -> Rectangle<i32, Logical> {
        Rectangle::new(self.usable_area.loc + self.geometry.loc, self.usable_area.size)
    }

    pub fn is_landscape(&self) -> bool {
        self.geometry.size.w > self.geometry.size.h
    }

    pub fn fullscreen_view(&self) -> Option<ViewId> {
        self.fullscreen_view
    }

    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub fn shell_revealed(&self) -> bool {
        self.shell_revealed
    }

    /// Forces auto-hidden shell surfaces above fullscreen content, or stops doing so.
    pub fn force_shell_reveal(&mut self, reveal: bool) {
        if self.shell_revealed == reveal {
            return;
        }

        debug!("{}: forcing shell reveal to {reveal}", self.name);
        self.shell_revealed = reveal;
        self.damage_whole();
    }

    /// Damages a rectangle given in layout coordinates.
    ///
    /// Only the part overlapping this output is recorded.
    pub fn damage(&mut self, rect: Rectangle<i32, Logical>) {
        if self.damage.whole {
            return;
        }

        if let Some(overlap) = intersection(rect, self.geometry) {
            let local = Rectangle::new(overlap.loc - self.geometry.loc, overlap.size);
            self.damage.regions.push(local);
        }
    }

    pub fn damage_whole(&mut self) {
        self.damage.whole = true;
        self.damage.regions.clear();
    }

    pub fn has_damage(&self) -> bool {
        !self.damage.is_empty()
    }

    pub fn damage_state(&self) -> &OutputDamage {
        &self.damage
    }

    /// Hands the accumulated damage to the renderer.
    pub fn take_damage(&mut self) -> OutputDamage {
        std::mem::take(&mut self.damage)
    }
}

/// Outputs arranged in the global layout space.
#[derive(Debug, Default)]
pub struct OutputLayout {
    outputs: Arena<Output>,
    order: Vec<OutputId>,
}

impl OutputLayout {
    pub fn add(&mut self, output: Output) -> OutputId {
        debug!(
            "adding output {} at {:?}",
            output.name(),
            output.geometry()
        );
        let id = self.outputs.insert(output);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: OutputId) -> Option<Output> {
        self.order.retain(|o| *o != id);
        self.outputs.remove(id)
    }

    pub fn get(&self, id: OutputId) -> Option<&Output> {
        self.outputs.get(id)
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.get_mut(id)
    }

    pub fn contains(&self, id: OutputId) -> bool {
        self.outputs.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Output ids in the order they were added.
    pub fn ids(&self) -> Vec<OutputId> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputId, &Output)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.outputs.get(*id).map(|o| (*id, o)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Output> + '_ {
        self.outputs.iter_mut().map(|(_, o)| o)
    }

    pub fn by_name(&self, name: &str) -> Option<OutputId> {
        self.iter().find(|(_, o)| o.name() == name).map(|(id, _)| id)
    }

    /// Output containing the layout point.
    pub fn output_at(&self, point: Point<f64, Logical>) -> Option<OutputId> {
        self.iter()
            .find(|(_, o)| contains_f64(o.geometry(), point))
            .map(|(id, _)| id)
    }

    /// Closest point to `point` that lies on some output.
    pub fn closest_point(&self, point: Point<f64, Logical>) -> Option<Point<f64, Logical>> {
        self.iter()
            .map(|(_, o)| closest_point(o.geometry(), point))
            .min_by(|a, b| {
                distance_squared(*a, point).total_cmp(&distance_squared(*b, point))
            })
    }

    pub fn intersects(&self, id: OutputId, rect: Rectangle<i32, Logical>) -> bool {
        self.get(id)
            .map_or(false, |o| intersects(o.geometry(), rect))
    }

    /// Nearest output lying fully on the given side of `id`, measured from `reference`.
    pub fn adjacent_output(
        &self,
        id: OutputId,
        direction: Direction,
        reference: Point<f64, Logical>,
    ) -> Option<OutputId> {
        let current = self.get(id)?.geometry();

        self.iter()
            .filter(|(other, _)| *other != id)
            .filter(|(_, o)| {
                let geo = o.geometry();
                match direction {
                    Direction::Left => geo.loc.x + geo.size.w <= current.loc.x,
                    Direction::Right => geo.loc.x >= current.loc.x + current.size.w,
                    Direction::Up => geo.loc.y + geo.size.h <= current.loc.y,
                    Direction::Down => geo.loc.y >= current.loc.y + current.size.h,
                }
            })
            .map(|(other, o)| {
                let closest = closest_point(o.geometry(), reference);
                (other, distance_squared(closest, reference))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(other, _)| other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rect_from_coords;

    fn layout() -> (OutputLayout, OutputId, OutputId) {
        let mut layout = OutputLayout::default();
        let a = layout.add(Output::new("A", rect_from_coords(0, 0, 1920, 1080), 1.));
        let b = layout.add(Output::new("B", rect_from_coords(1920, 0, 720, 1440), 2.));
        (layout, a, b)
    }

    #[test]
    fn output_at_point() {
        let (layout, a, b) = layout();
        assert_eq!(layout.output_at(Point::from((10., 10.))), Some(a));
        assert_eq!(layout.output_at(Point::from((1920., 1200.))), Some(b));
        assert_eq!(layout.output_at(Point::from((100., 1200.))), None);
    }

    #[test]
    fn closest_point_snaps_to_nearest_output() {
        let (layout, _, _) = layout();
        let p = layout.closest_point(Point::from((100., 1200.))).unwrap();
        assert_eq!(p.x, 100.);
        assert!(p.y < 1080.);
    }

    #[test]
    fn adjacent() {
        let (layout, a, b) = layout();
        let reference = Point::from((100., 100.));
        assert_eq!(layout.adjacent_output(a, Direction::Right, reference), Some(b));
        assert_eq!(layout.adjacent_output(a, Direction::Left, reference), None);
        assert_eq!(layout.adjacent_output(b, Direction::Left, reference), Some(a));
        assert_eq!(layout.adjacent_output(a, Direction::Down, reference), None);
    }

    #[test]
    fn damage_is_clipped_and_local() {
        let (mut layout, _, b) = layout();
        let output = layout.get_mut(b).unwrap();

        output.damage(rect_from_coords(1900, 10, 40, 10));
        output.damage(rect_from_coords(0, 0, 10, 10));
        assert_eq!(
            output.damage_state().regions,
            vec![rect_from_coords(0, 10, 20, 10)]
        );

        output.damage_whole();
        output.damage(rect_from_coords(1920, 0, 10, 10));
        let damage = output.take_damage();
        assert!(damage.whole);
        assert!(damage.regions.is_empty());
        assert!(!output.has_damage());
    }

    #[test]
    fn shell_reveal_damages_once() {
        let (mut layout, a, _) = layout();
        let output = layout.get_mut(a).unwrap();

        output.force_shell_reveal(false);
        assert!(!output.has_damage());

        output.force_shell_reveal(true);
        assert!(output.shell_revealed());
        assert!(output.take_damage().whole);

        output.force_shell_reveal(true);
        assert!(!output.has_damage());
    }
}
