//! Placing views: maximize, tile, fullscreen, center and scale-to-fit.

use smithay::utils::{Logical, Point, Rectangle, Size};

use super::{TileDirection, ViewError, ViewId, ViewState};
use crate::compositor::Compositor;
use crate::output::{Direction, OutputId};
use crate::protocols::WireEvent;
use crate::utils::{intersects, is_empty};

impl Compositor {
    /// Output the center of the view is on, or closest to.
    pub fn view_output(&self, id: ViewId) -> Option<OutputId> {
        let view = self.views.get(id)?;
        let rect = view.get_box();
        let center = Point::from((
            f64::from(view.rect.loc.x) + f64::from(rect.size.w) / 2.,
            f64::from(view.rect.loc.y) + f64::from(rect.size.h) / 2.,
        ));
        let closest = self.outputs.closest_point(center)?;
        self.outputs.output_at(closest)
    }

    /// Remembers the floating box so it can be restored later.
    pub(crate) fn save_view(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        if !view.is_floating() {
            return;
        }

        let geom = view.geometry();
        let scale = view.scale;
        view.saved = Rectangle::new(
            Point::from((
                (f64::from(view.rect.loc.x) + f64::from(geom.loc.x) * scale) as i32,
                (f64::from(view.rect.loc.y) + f64::from(geom.loc.y) * scale) as i32,
            )),
            view.rect.size,
        );
    }

    fn view_usable_area(
        &self,
        id: ViewId,
        output: Option<OutputId>,
    ) -> Result<(Rectangle<i32, Logical>, f64), ViewError> {
        let view = self.views.get(id).ok_or(ViewError::Gone)?;
        if view.is_fullscreen() {
            return Err(ViewError::Fullscreen);
        }

        let output = output
            .or_else(|| self.view_output(id))
            .and_then(|o| self.outputs.get(o))
            .ok_or(ViewError::NoOutput)?;
        Ok((output.usable_area_in_layout(), view.scale))
    }

    /// The box the view would take up when maximized on the output.
    pub fn view_maximized_box(
        &self,
        id: ViewId,
        output: Option<OutputId>,
    ) -> Result<Rectangle<i32, Logical>, ViewError> {
        let (usable, scale) = self.view_usable_area(id, output)?;
        Ok(Rectangle::new(
            Point::from((
                (f64::from(usable.loc.x) / scale) as i32,
                (f64::from(usable.loc.y) / scale) as i32,
            )),
            (
                (f64::from(usable.size.w) / scale) as i32,
                (f64::from(usable.size.h) / scale) as i32,
            )
                .into(),
        ))
    }

    /// The box the view would take up when tiled to one half of the output.
    pub fn view_tiled_box(
        &self,
        id: ViewId,
        direction: TileDirection,
        output: Option<OutputId>,
    ) -> Result<Rectangle<i32, Logical>, ViewError> {
        let (usable, scale) = self.view_usable_area(id, output)?;
        let x = match direction {
            TileDirection::Left => usable.loc.x,
            TileDirection::Right => usable.loc.x + (0.5 * f64::from(usable.size.w)) as i32,
        };
        Ok(Rectangle::new(
            Point::from((
                (f64::from(x) / scale) as i32,
                (f64::from(usable.loc.y) / scale) as i32,
            )),
            (
                (f64::from(usable.size.w / 2) / scale) as i32,
                (f64::from(usable.size.h) / scale) as i32,
            )
                .into(),
        ))
    }

    pub(crate) fn arrange_maximized(&mut self, id: ViewId, output: Option<OutputId>) {
        let Ok(rect) = self.view_maximized_box(id, output) else {
            return;
        };
        self.move_resize_into(id, rect);
    }

    pub(crate) fn arrange_tiled(&mut self, id: ViewId, output: Option<OutputId>) {
        let Some(direction) = self.views.get(id).map(|v| v.tile_direction) else {
            return;
        };
        let Ok(rect) = self.view_tiled_box(id, direction, output) else {
            return;
        };
        self.move_resize_into(id, rect);
    }

    /// Moves the view so that its content, not its surface, fills `rect`.
    fn move_resize_into(&mut self, id: ViewId, rect: Rectangle<i32, Logical>) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let geom = view.geometry();
        let scale = view.scale;
        let x = rect.loc.x - (f64::from(geom.loc.x) / scale) as i32;
        let y = rect.loc.y - (f64::from(geom.loc.y) / scale) as i32;
        self.view_move_resize(id, f64::from(x), f64::from(y), rect.size.w, rect.size.h);
    }

    /// Moves the view, in layout coordinates.
    pub fn view_move(&mut self, id: ViewId, x: f64, y: f64) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        if f64::from(view.rect.loc.x) == x && f64::from(view.rect.loc.y) == y {
            return;
        }

        view.pending_move_resize.update_x = false;
        view.pending_move_resize.update_y = false;
        view.pending_centering = false;

        self.kind_move(id, x, y);
    }

    pub fn view_resize(&mut self, id: ViewId, width: i32, height: i32) {
        self.kind_resize(id, width, height);
    }

    pub fn view_move_resize(&mut self, id: ViewId, x: f64, y: f64, width: i32, height: i32) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let update_x = x != f64::from(view.rect.loc.x);
        let update_y = y != f64::from(view.rect.loc.y);
        let update_width = width != view.rect.size.w;
        let update_height = height != view.rect.size.h;

        view.pending_move_resize.update_x = false;
        view.pending_move_resize.update_y = false;

        if !update_x && !update_y {
            self.view_resize(id, width, height);
            return;
        }

        if !update_width && !update_height {
            self.view_move(id, x, y);
            return;
        }

        self.kind_move_resize(id, x, y, width, height);
    }

    /// Maximizes the view on `output`, or on the output it is on.
    ///
    /// Fails without changing anything when there is no output to maximize on.
    pub fn maximize_view(
        &mut self,
        id: ViewId,
        output: Option<OutputId>,
    ) -> Result<(), ViewError> {
        let view = self.views.get(id).ok_or(ViewError::Gone)?;
        if view.is_fullscreen() {
            return Ok(());
        }
        if view.is_maximized() && (output.is_none() || self.view_output(id) == output) {
            return Ok(());
        }
        self.view_maximized_box(id, output)?;

        self.kind_set_tiled(id, false);
        self.kind_set_maximized(id, true);
        self.update_toplevel_handle(id, |handle| handle.set_maximized(true));

        self.save_view(id);

        if let Some(view) = self.views.get_mut(id) {
            view.state = ViewState::Maximized;
        }
        self.arrange_maximized(id, output);
        Ok(())
    }

    /// Maximizes the view if auto-maximize applies to it.
    pub(crate) fn auto_maximize_view(&mut self, id: ViewId) {
        if !self.view_want_auto_maximize(id) {
            return;
        }
        if let Err(err) = self.maximize_view(id, None) {
            warn!("error auto-maximizing {id:?}: {err}");
        }
    }

    /// Goes back to floating from maximized or tiled.
    pub fn restore_view(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if !view.is_maximized() && !view.is_tiled() {
            return;
        }
        if self.view_want_auto_maximize(id) {
            return;
        }

        if let Some(view) = self.views.get_mut(id) {
            view.state = ViewState::Floating;
        }
        self.restore_saved_box(id);

        self.update_toplevel_handle(id, |handle| handle.set_maximized(false));
        self.kind_set_maximized(id, false);
        self.kind_set_tiled(id, false);
    }

    /// Puts the view back into its saved floating box, or lets the client pick a size and
    /// centers it once it commits one.
    fn restore_saved_box(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let saved = view.saved;
        let geom = view.geometry();
        let scale = view.scale;

        if is_empty(saved) {
            self.view_resize(id, 0, 0);
            if let Some(view) = self.views.get_mut(id) {
                view.pending_centering = true;
            }
            return;
        }

        self.view_move_resize(
            id,
            f64::from(saved.loc.x) - f64::from(geom.loc.x) * scale,
            f64::from(saved.loc.y) - f64::from(geom.loc.y) * scale,
            saved.size.w,
            saved.size.h,
        );
    }

    /// Fullscreens the view on `output`, or its current output, or unfullscreens it.
    ///
    /// A mapped view can only fullscreen itself while focused. A view already holding the
    /// output's fullscreen slot is unfullscreened first.
    pub fn set_view_fullscreen(
        &mut self,
        id: ViewId,
        fullscreen: bool,
        output: Option<OutputId>,
    ) -> Result<(), ViewError> {
        let view = self.views.get(id).ok_or(ViewError::Gone)?;
        let was_fullscreen = view.is_fullscreen();

        if fullscreen && !was_fullscreen && view.is_mapped() && self.seat.focused_view() != Some(id)
        {
            debug!("refusing to fullscreen unfocused view {id:?}");
            return Ok(());
        }

        if fullscreen {
            let output_id = output
                .or_else(|| self.view_output(id))
                .ok_or(ViewError::NoOutput)?;
            let output_rect = self
                .outputs
                .get(output_id)
                .map(|o| o.geometry())
                .ok_or(ViewError::NoOutput)?;

            if !was_fullscreen {
                self.kind_set_fullscreen(id, true);
                self.update_toplevel_handle(id, |handle| handle.set_fullscreen(true));
            }

            let previous = self
                .outputs
                .get(output_id)
                .and_then(|o| o.fullscreen_view)
                .filter(|v| *v != id);
            if let Some(previous) = previous {
                debug!("{id:?} takes the fullscreen slot of {previous:?}");
                if let Err(err) = self.set_view_fullscreen(previous, false, None) {
                    warn!("error unfullscreening {previous:?}: {err}");
                }
            }

            if was_fullscreen {
                let old = self.views.get(id).and_then(|v| v.fullscreen_output);
                if let Some(old) = old.and_then(|o| self.outputs.get_mut(o)) {
                    old.fullscreen_view = None;
                }
            }

            self.save_view(id);
            self.view_move_resize(
                id,
                f64::from(output_rect.loc.x),
                f64::from(output_rect.loc.y),
                output_rect.size.w,
                output_rect.size.h,
            );

            if let Some(out) = self.outputs.get_mut(output_id) {
                out.fullscreen_view = Some(id);
                out.force_shell_reveal(false);
                out.damage_whole();
            }
            if let Some(view) = self.views.get_mut(id) {
                view.fullscreen_output = Some(output_id);
            }
            return Ok(());
        }

        if !was_fullscreen {
            return Ok(());
        }

        self.kind_set_fullscreen(id, false);
        self.update_toplevel_handle(id, |handle| handle.set_fullscreen(false));

        let Some(output_id) = self
            .views
            .get_mut(id)
            .and_then(|v| v.fullscreen_output.take())
        else {
            return Ok(());
        };
        let target = match self.outputs.get_mut(output_id) {
            Some(out) => {
                if out.fullscreen_view == Some(id) {
                    out.fullscreen_view = None;
                }
                out.damage_whole();
                Some(output_id)
            }
            // The output is gone, go wherever the view is now.
            None => None,
        };

        let state = self.views.get(id).map(|v| v.state);
        match state {
            Some(ViewState::Maximized) => self.arrange_maximized(id, target),
            Some(ViewState::Tiled) => self.arrange_tiled(id, target),
            Some(ViewState::Floating) => self.restore_saved_box(id),
            None => return Ok(()),
        }

        self.auto_maximize_view(id);
        Ok(())
    }

    /// Moves the view to the neighbouring output in `direction`, keeping its state.
    pub fn view_move_to_next_output(&mut self, id: ViewId, direction: Direction) -> bool {
        let Some(output) = self.view_output(id) else {
            return false;
        };
        let Some(view) = self.views.get(id) else {
            return false;
        };
        let reference = view.rect.loc.to_f64();
        let Some(new_output) = self.outputs.adjacent_output(output, direction, reference) else {
            return false;
        };
        let Some(usable) = self.outputs.get(new_output).map(|o| o.usable_area_in_layout()) else {
            return false;
        };

        if let Some(view) = self.views.get_mut(id) {
            let x = usable.loc.x + usable.size.w / 2 - view.saved.size.w / 2;
            let y = usable.loc.y + usable.size.h / 2 - view.saved.size.h / 2;
            debug!("moving saved position of {id:?} to {x}, {y}");
            view.saved.loc = Point::from((x, y));
        }

        let Some(view) = self.views.get(id) else {
            return false;
        };
        if view.is_fullscreen() {
            if let Err(err) = self.set_view_fullscreen(id, true, Some(new_output)) {
                warn!("error moving fullscreen {id:?}: {err}");
                return false;
            }
        } else if view.is_maximized() {
            self.arrange_maximized(id, Some(new_output));
        } else if view.is_tiled() {
            self.arrange_tiled(id, Some(new_output));
        } else {
            self.center_view(id, Some(new_output));
        }

        true
    }

    /// Tiles the view to one half of `output`, or of the output it is on.
    ///
    /// Fails without changing anything when there is no output to tile on.
    pub fn tile_view(
        &mut self,
        id: ViewId,
        direction: TileDirection,
        output: Option<OutputId>,
    ) -> Result<(), ViewError> {
        let view = self.views.get(id).ok_or(ViewError::Gone)?;
        if view.is_fullscreen() {
            return Ok(());
        }
        self.view_tiled_box(id, direction, output)?;

        self.save_view(id);

        if let Some(view) = self.views.get_mut(id) {
            view.state = ViewState::Tiled;
            view.tile_direction = direction;
        }

        self.kind_set_maximized(id, false);
        self.kind_set_tiled(id, true);
        self.arrange_tiled(id, output);
        Ok(())
    }

    /// Centers a floating view in the usable area of `output`, or of the output under the
    /// cursor.
    pub fn center_view(&mut self, id: ViewId, output: Option<OutputId>) -> bool {
        let Some(view) = self.views.get(id) else {
            return false;
        };
        if !view.is_floating() {
            return false;
        }

        let rect = view.get_box();
        let geom = view.geometry();
        let scale = view.scale;

        let Some(output) = output.or_else(|| self.outputs.output_at(self.seat.cursor.position()))
        else {
            return false;
        };
        let Some(out) = self.outputs.get(output) else {
            return false;
        };
        let usable = out.usable_area();
        let origin = out.geometry().loc;

        let x = f64::from(usable.size.w - rect.size.w) / 2.
            + f64::from(usable.loc.x + origin.x)
            - f64::from(geom.loc.x) * scale;
        let y = f64::from(usable.size.h - rect.size.h) / 2.
            + f64::from(usable.loc.y + origin.y)
            - f64::from(geom.loc.y) * scale;

        debug!("centering {id:?} at {x}, {y}");
        self.view_move(id, x / scale, y / scale);

        if !self.options.auto_maximize {
            return true;
        }

        let Some(size) = self.views.get(id).map(|v| v.rect.size) else {
            return true;
        };
        if size.w > usable.size.w || size.h > usable.size.h {
            self.view_resize(id, size.w.min(usable.size.w), size.h.min(usable.size.h));
        }

        true
    }

    /// Recomputes the scale of views that may be scaled down to fit their output.
    pub(crate) fn update_view_scale(&mut self, id: ViewId) {
        if !self.view_want_scaling(id) {
            return;
        }
        let Some(usable) = self
            .view_output(id)
            .and_then(|o| self.outputs.get(o))
            .map(|o| o.usable_area())
        else {
            return;
        };
        let global = self.options.scale_to_fit;
        let Some(view) = self.views.get_mut(id) else {
            return;
        };

        let old_scale = view.scale;
        view.scale = if view.scale_to_fit || global {
            let scale_x = f64::from(usable.size.w) / f64::from(view.rect.size.w);
            let scale_y = f64::from(usable.size.h) / f64::from(view.rect.size.h);
            let scale = scale_x.min(scale_y).max(0.5);
            if scale > 1. || view.is_fullscreen() {
                1.
            } else {
                scale
            }
        } else {
            1.
        };

        if view.scale == old_scale {
            return;
        }

        if view.is_maximized() {
            self.arrange_maximized(id, None);
        } else if view.is_tiled() {
            self.arrange_tiled(id, None);
        } else {
            self.center_view(id, None);
        }
    }

    /// Sends output enter and leave events for the outputs the view started or stopped
    /// overlapping since the last call.
    pub(crate) fn update_view_output(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if !view.is_mapped() {
            return;
        }
        let rect = view.get_box();

        let now: Vec<OutputId> = self
            .outputs
            .iter()
            .filter(|(_, output)| intersects(output.geometry(), rect))
            .map(|(id, _)| id)
            .collect();

        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let left: Vec<_> = view
            .outputs
            .iter()
            .copied()
            .filter(|o| !now.contains(o))
            .collect();
        let entered: Vec<_> = now
            .iter()
            .copied()
            .filter(|o| !view.outputs.contains(o))
            .collect();
        if left.is_empty() && entered.is_empty() {
            return;
        }
        view.outputs = now;

        let mut surfaces = Vec::new();
        self.view_for_each_surface(id, &mut |surface, _| surfaces.push(surface));

        for output in left {
            // Clients already saw the global go away.
            if self.outputs.get(output).is_some() {
                for &surface in &surfaces {
                    self.send(WireEvent::SurfaceLeave { surface, output });
                }
            }
            self.update_toplevel_handle(id, |handle| handle.output_leave(output));
        }
        for output in entered {
            for &surface in &surfaces {
                self.send(WireEvent::SurfaceEnter { surface, output });
            }
            self.update_toplevel_handle(id, |handle| handle.output_enter(output));
        }
    }

    pub(crate) fn update_view_position(&mut self, id: ViewId, x: i32, y: i32) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if view.rect.loc == Point::from((x, y)) {
            return;
        }

        self.view_damage_whole(id);
        if let Some(view) = self.views.get_mut(id) {
            view.rect.loc = Point::from((x, y));
        }
        self.update_view_output(id);
        self.view_damage_whole(id);
    }

    pub(crate) fn update_view_size(&mut self, id: ViewId, width: i32, height: i32) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if view.rect.size == Size::from((width, height)) {
            return;
        }

        self.view_damage_whole(id);

        let auto_maximize = self.options.auto_maximize;
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        view.rect.size = Size::from((width, height));

        if view.pending_centering || (view.is_floating() && auto_maximize) {
            self.center_view(id, None);
            if let Some(view) = self.views.get_mut(id) {
                view.pending_centering = false;
            }
        }

        self.update_view_scale(id);
        self.update_view_output(id);
        self.view_damage_whole(id);
    }
}
