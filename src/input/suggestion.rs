//! Edge-snap previews shown while a view is dragged around.

use crate::animation::{Animation, AnimationId, AnimationTarget, Curve, Property, TimedAnimation};
use crate::compositor::Compositor;
use crate::output::OutputId;
use crate::view::bling::{Bling, BlingId};
use crate::view::{TileDirection, ViewId, ViewState};

/// A state change the cursor proposes for the dragged view.
///
/// Only ids are held: when the view or the output goes away, the suggestion is dropped without
/// being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub view: ViewId,
    pub output: OutputId,
    pub state: ViewState,
    pub tile_direction: TileDirection,
    bling: BlingId,
    animation: Option<AnimationId>,
}

impl Suggestion {
    pub fn bling(&self) -> BlingId {
        self.bling
    }
}

impl Compositor {
    /// Previews maximizing or tiling `view` on `output`.
    ///
    /// Does nothing while another suggestion is shown.
    pub fn suggest_view_state_change(
        &mut self,
        view: ViewId,
        output: OutputId,
        state: ViewState,
        tile_direction: TileDirection,
    ) {
        if self.seat.cursor.suggestion.is_some() {
            return;
        }

        let target = match state {
            ViewState::Maximized => self.view_maximized_box(view, Some(output)),
            ViewState::Tiled => self.view_tiled_box(view, tile_direction, Some(output)),
            ViewState::Floating => unreachable!("floating is not a suggestible state"),
        };
        let target = match target {
            Ok(target) => target,
            Err(err) => {
                warn!("can't get the target box for {state:?} of {view:?}: {err}");
                return;
            }
        };
        let Some(from) = self.views.get(view).map(|v| v.get_box()) else {
            return;
        };

        debug!("suggesting {state:?} {target:?} for {view:?}");

        let color = self.options.suggestion_color;
        let bling = self.view_add_bling(view, Bling::color_rect(from, color));

        let duration = self.options.suggestion_ms;
        let ease = |from: i32, to: i32| {
            Animation::ease(
                self.clock.clone(),
                f64::from(from),
                f64::from(to),
                duration,
                Curve::EaseOutCubic,
            )
        };
        let anim = TimedAnimation::new(AnimationTarget::Bling { view, bling }, false)
            .with_property(Property::X, ease(from.loc.x, target.loc.x))
            .with_property(Property::Y, ease(from.loc.y, target.loc.y))
            .with_property(Property::Width, ease(from.size.w, target.size.w))
            .with_property(Property::Height, ease(from.size.h, target.size.h));

        self.view_map_bling(view, bling);
        let animation = self.play_animation(anim);

        self.seat.cursor.suggestion = Some(Suggestion {
            view,
            output,
            state,
            tile_direction,
            bling,
            animation: Some(animation),
        });
    }

    /// Drops the current suggestion without applying it.
    pub fn clear_view_state_change(&mut self) {
        let Some(suggestion) = self.seat.cursor.suggestion.take() else {
            return;
        };

        if let Some(animation) = suggestion.animation {
            self.stop_animation(animation);
        }
        if self.views.contains(suggestion.view) {
            self.view_remove_bling(suggestion.view, suggestion.bling);
        }
    }

    /// Applies the current suggestion, if there is one and its targets are still around.
    pub fn submit_pending_view_state_change(&mut self) {
        let Some(suggestion) = self.seat.cursor.suggestion else {
            return;
        };

        if self.views.contains(suggestion.view) && self.outputs.contains(suggestion.output) {
            let Suggestion {
                view,
                output,
                state,
                tile_direction,
                ..
            } = suggestion;
            debug!("applying {state:?} to {view:?}");

            let res = match state {
                ViewState::Maximized => self.maximize_view(view, Some(output)),
                ViewState::Tiled => self.tile_view(view, tile_direction, Some(output)),
                ViewState::Floating => unreachable!(),
            };
            if let Err(err) = res {
                warn!("error applying {state:?} to {view:?}: {err}");
            }
        }

        self.clear_view_state_change();
    }
}
