//! Views: toplevel windows of any shell.
//!
//! A [`View`] is the part common to every toplevel kind: its box in the layout, its state
//! (floating, maximized, tiled, and the orthogonal fullscreen slot), decorations, blings and the
//! tree of child surfaces. Whatever differs between shells lives in [`ViewKind`] and is reached
//! through the capability methods in [`kind`].

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::animation::{Animatable, Animation, AnimationTarget, Curve, Property, TimedAnimation};
use crate::compositor::{Compositor, DesktopEvent};
use crate::output::OutputId;
use crate::protocols::foreign_toplevel::ToplevelHandle;
use crate::protocols::{ActivationKind, WireEvent};
use crate::surface::{SurfaceId, SurfaceRole};
use crate::utils::arena::Id;
use crate::utils::signal::Subscription;

pub mod arrange;
pub mod bling;
pub mod child;
pub mod deco;
pub mod kind;

use bling::{Bling, BlingId};
use child::{ChildId, ChildKind};
use deco::{DecoPart, Decoration};
pub use kind::ViewKind;

pub type ViewId = Id<View>;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    #[error("no output to place the view on")]
    NoOutput,
    #[error("the new parent is a descendant of the view")]
    ParentCycle,
    #[error("the view is fullscreen")]
    Fullscreen,
    #[error("the view is gone")]
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum ViewState {
    #[default]
    Floating,
    Maximized,
    Tiled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum TileDirection {
    #[default]
    Left,
    Right,
}

/// Position to apply once the client commits the size it was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingMoveResize {
    pub update_x: bool,
    pub update_y: bool,
    pub x: f64,
    pub y: f64,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug)]
pub struct View {
    pub(crate) kind: ViewKind,
    /// Surface backing the view's role, present for the whole lifetime.
    pub(crate) toplevel_surface: SurfaceId,
    /// Set while the view is mapped.
    surface: Option<SurfaceId>,
    /// Position in the layout and unscaled size.
    pub(crate) rect: Rectangle<i32, Logical>,
    /// Floating box to go back to when leaving maximized, tiled or fullscreen.
    pub(crate) saved: Rectangle<i32, Logical>,
    pub(crate) state: ViewState,
    pub(crate) tile_direction: TileDirection,
    pub(crate) pending_move_resize: PendingMoveResize,
    /// Center the view once the client commits a real size.
    pub(crate) pending_centering: bool,
    pub(crate) scale: f64,
    pub(crate) scale_to_fit: bool,
    pub(crate) alpha: f64,
    pub(crate) decorated: bool,
    pub(crate) decoration: Decoration,
    title: Option<String>,
    app_id: Option<String>,
    pid: Option<u32>,
    activation_token: Option<(String, ActivationKind)>,
    pub(crate) parent: Option<ViewId>,
    /// Views whose parent this view is, most recent first.
    pub(crate) stack: Vec<ViewId>,
    /// Most recently added first.
    blings: Vec<Bling>,
    /// Every subsurface and popup of the view, at any depth.
    pub(crate) child_surfaces: Vec<ChildId>,
    pub(crate) fullscreen_output: Option<OutputId>,
    /// Outputs the view's surfaces were sent an enter for.
    pub(crate) outputs: Vec<OutputId>,
    pub(crate) toplevel_handle: Option<ToplevelHandle>,
    pub(crate) scale_to_fit_subscription: Option<Subscription>,
}

impl View {
    pub fn new(kind: ViewKind, toplevel_surface: SurfaceId) -> Self {
        Self {
            kind,
            toplevel_surface,
            surface: None,
            rect: Rectangle::default(),
            saved: Rectangle::default(),
            state: ViewState::Floating,
            tile_direction: TileDirection::Left,
            pending_move_resize: PendingMoveResize::default(),
            pending_centering: false,
            scale: 1.,
            scale_to_fit: false,
            alpha: 1.,
            decorated: false,
            decoration: Decoration::NONE,
            title: None,
            app_id: None,
            pid: None,
            activation_token: None,
            parent: None,
            stack: Vec::new(),
            blings: Vec::new(),
            child_surfaces: Vec::new(),
            fullscreen_output: None,
            outputs: Vec::new(),
            toplevel_handle: None,
            scale_to_fit_subscription: None,
        }
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn toplevel_surface(&self) -> SurfaceId {
        self.toplevel_surface
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn is_mapped(&self) -> bool {
        self.surface.is_some()
    }

    /// Unscaled box.
    pub fn rect(&self) -> Rectangle<i32, Logical> {
        self.rect
    }

    /// Box as shown on screen, with the size scaled.
    pub fn get_box(&self) -> Rectangle<i32, Logical> {
        let size = Size::from((
            (f64::from(self.rect.size.w) * self.scale) as i32,
            (f64::from(self.rect.size.h) * self.scale) as i32,
        ));
        Rectangle::new(self.rect.loc, size)
    }

    /// Box including server-side decorations.
    pub fn deco_box(&self) -> Rectangle<i32, Logical> {
        let rect = self.get_box();
        if !self.decorated {
            return rect;
        }
        self.decoration.expand(rect)
    }

    /// Client geometry: where the content starts inside the surface and how large it is.
    pub fn geometry(&self) -> Rectangle<i32, Logical> {
        match &self.kind {
            ViewKind::Xdg(toplevel) => toplevel.geometry,
            ViewKind::Xwayland(_) => Rectangle::new(Point::from((0, 0)), self.get_box().size),
        }
    }

    pub fn saved(&self) -> Rectangle<i32, Logical> {
        self.saved
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn tile_direction(&self) -> TileDirection {
        self.tile_direction
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen_output.is_some()
    }

    pub fn fullscreen_output(&self) -> Option<OutputId> {
        self.fullscreen_output
    }

    /// Outputs the view overlaps, as last announced to the client.
    pub fn outputs(&self) -> &[OutputId] {
        &self.outputs
    }

    pub fn is_floating(&self) -> bool {
        self.state == ViewState::Floating && !self.is_fullscreen()
    }

    pub fn is_maximized(&self) -> bool {
        self.state == ViewState::Maximized && !self.is_fullscreen()
    }

    pub fn is_tiled(&self) -> bool {
        self.state == ViewState::Tiled && !self.is_fullscreen()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn scale_to_fit(&self) -> bool {
        self.scale_to_fit
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    pub fn decoration(&self) -> Decoration {
        self.decoration
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn activation_token(&self) -> Option<&str> {
        self.activation_token.as_ref().map(|(token, _)| token.as_str())
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.stack
    }

    pub fn blings(&self) -> &[Bling] {
        &self.blings
    }

    pub fn bling_mut(&mut self, id: BlingId) -> Option<&mut Bling> {
        self.blings.iter_mut().find(|b| b.id() == id)
    }

    pub fn child_surfaces(&self) -> &[ChildId] {
        &self.child_surfaces
    }

    pub fn toplevel_handle(&self) -> Option<&ToplevelHandle> {
        self.toplevel_handle.as_ref()
    }
}

impl Animatable for View {
    fn set_animated(&mut self, property: Property, value: f64) {
        if property == Property::Alpha {
            self.alpha = value.clamp(0., 1.);
        }
    }
}

impl Compositor {
    /// Creates the view for a toplevel surface. It stays unmapped until the client commits a
    /// buffer.
    pub fn create_view(&mut self, kind: ViewKind, surface: SurfaceId) -> ViewId {
        let id = self.views.insert(View::new(kind, surface));
        self.surfaces.set_role(surface, SurfaceRole::Toplevel(id));
        debug!("new view {id:?} for {surface:?}");
        id
    }

    pub fn view_map(&mut self, id: ViewId, surface: SurfaceId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        assert!(view.surface.is_none(), "view {id:?} is already mapped");
        view.surface = Some(surface);

        let subsurfaces = self
            .surfaces
            .get(surface)
            .map(|s| s.subsurfaces.clone())
            .unwrap_or_default();
        for sub in subsurfaces {
            self.view_child_create(id, None, sub, ChildKind::Subsurface);
        }

        if self.options.auto_maximize {
            self.kind_set_active(id, true);
            // Mapping a new stack can hide the previous one.
            self.damage_top_stack();
        }

        self.stack.insert(0, id);
        self.view_damage_whole(id);
        self.update_cursor_focus();

        let pid = self
            .surfaces
            .client(surface)
            .and_then(|client| self.client_pid(client));
        let subscription = self.scale_to_fit_watchers.subscribe(id);

        let fade_in = self.options.animations_enabled
            && self.views.get(id).map_or(false, |v| v.parent.is_none())
            && !self.view_want_auto_maximize(id);

        let Some(view) = self.views.get_mut(id) else {
            self.scale_to_fit_watchers.unsubscribe(subscription);
            return;
        };
        view.pid = pid;
        view.scale_to_fit_subscription = Some(subscription);

        if fade_in {
            view.alpha = 0.;
            let anim = TimedAnimation::new(AnimationTarget::View(id), true).with_property(
                Property::Alpha,
                Animation::ease(
                    self.clock.clone(),
                    0.,
                    1.,
                    self.options.fade_in_ms,
                    Curve::EaseOutQuad,
                ),
            );
            self.play_animation(anim);
        }

        debug!("mapped view {id:?}");
        self.emit(DesktopEvent::ViewMapped(id));
    }

    pub fn view_unmap(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        assert!(view.surface.is_some(), "view {id:?} is not mapped");

        let was_visible = self.view_is_visible(id);
        self.view_damage_whole(id);

        let children = self
            .views
            .get(id)
            .map(|v| v.child_surfaces.clone())
            .unwrap_or_default();
        for child in children {
            self.view_child_destroy(child);
        }

        let fullscreen = self.views.get(id).and_then(|v| v.fullscreen_output);
        if let Some(output) = fullscreen {
            if let Some(output) = self.outputs.get_mut(output) {
                output.damage_whole();
                output.fullscreen_view = None;
            }
        }

        self.stack.retain(|v| *v != id);

        if was_visible && self.options.auto_maximize {
            // The next stack becomes visible.
            self.damage_top_stack();
        }

        let subscription = self.views.get_mut(id).and_then(|view| {
            view.surface = None;
            view.fullscreen_output = None;
            view.outputs.clear();
            view.rect.size = Size::from((0, 0));
            view.toplevel_handle = None;
            view.scale_to_fit_subscription.take()
        });
        if let Some(subscription) = subscription {
            self.scale_to_fit_watchers.unsubscribe(subscription);
        }

        self.seat_forget_view(id);

        debug!("unmapped view {id:?}");
        self.emit(DesktopEvent::ViewUnmapped(id));
    }

    /// Drops the view, unmapping it first if needed.
    pub fn view_destroy(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };

        let parent = view.parent;
        let children = view.stack.clone();
        let mapped = view.is_mapped();
        let fullscreen = view.fullscreen_output;

        if let Some(parent) = parent.and_then(|p| self.views.get_mut(p)) {
            parent.stack.retain(|v| *v != id);
        }

        // Children move up to the grandparent.
        for child in children {
            if let Some(view) = self.views.get_mut(child) {
                view.parent = parent;
            }
            if let Some(parent) = parent.and_then(|p| self.views.get_mut(p)) {
                parent.stack.insert(0, child);
            }
        }

        if mapped {
            self.view_unmap(id);
        }

        // Fullscreened while unmapped and never mapped.
        if let Some(output) = fullscreen.and_then(|o| self.outputs.get_mut(o)) {
            if output.fullscreen_view == Some(id) {
                output.fullscreen_view = None;
            }
        }

        self.seat_forget_view(id);
        self.views.remove(id);
        debug!("destroyed view {id:?}");
        self.emit(DesktopEvent::ViewDestroyed(id));
    }

    /// Finishes mapping: foreign toplevel handle, focus, placement and scale.
    pub fn view_setup(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        view.toplevel_handle = Some(ToplevelHandle::default());

        self.view_initial_focus(id);
        self.center_view(id, None);
        self.update_view_scale(id);
        self.update_view_output(id);

        let Some(view) = self.views.get(id) else {
            return;
        };
        let fullscreen = view.is_fullscreen();
        let maximized = view.is_maximized();
        let title = view.title.clone();
        let app_id = view.app_id.clone();
        let parent = view.parent;

        self.update_toplevel_handle(id, |handle| {
            let mut changed = handle.set_fullscreen(fullscreen);
            changed |= handle.set_maximized(maximized);
            changed |= handle.set_title(title.as_deref());
            changed |= handle.set_app_id(app_id.as_deref());
            changed |= handle.set_parent(parent);
            changed
        });
    }

    /// Focuses a freshly mapped view, which also flushes its activation token.
    pub fn view_initial_focus(&mut self, id: ViewId) {
        self.seat_set_focus_view(Some(id));
    }

    /// Makes the view look activated or not and updates the foreign toplevel handle.
    ///
    /// This doesn't move keyboard focus.
    pub fn view_activate(&mut self, id: ViewId, activate: bool) {
        if !self.options.auto_maximize {
            self.kind_set_active(id, activate);
        }

        self.update_toplevel_handle(id, |handle| handle.set_activated(activate));

        if activate {
            let fullscreen = self.views.get(id).and_then(|v| v.fullscreen_output);
            if let Some(output) = fullscreen.and_then(|o| self.outputs.get_mut(o)) {
                output.force_shell_reveal(false);
            }
        }
    }

    /// Sets the transient parent of a view.
    pub fn set_view_parent(&mut self, id: ViewId, parent: Option<ViewId>) -> Result<(), ViewError> {
        if !self.views.contains(id) {
            return Err(ViewError::Gone);
        }

        let mut node = parent;
        while let Some(ancestor) = node {
            if ancestor == id {
                error!("refusing to make {id:?} its own ancestor");
                return Err(ViewError::ParentCycle);
            }
            node = self.views.get(ancestor).and_then(|v| v.parent);
        }

        let old_parent = self.views.get(id).and_then(|v| v.parent);
        if let Some(old) = old_parent.and_then(|p| self.views.get_mut(p)) {
            old.stack.retain(|v| *v != id);
        }

        if let Some(view) = self.views.get_mut(id) {
            view.parent = parent;
        }
        if let Some(new) = parent.and_then(|p| self.views.get_mut(p)) {
            new.stack.insert(0, id);
        }

        self.update_toplevel_handle(id, |handle| handle.set_parent(parent));
        Ok(())
    }

    pub fn set_view_title(&mut self, id: ViewId, title: Option<&str>) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        view.title = title.map(str::to_owned);
        self.update_toplevel_handle(id, |handle| handle.set_title(title));
    }

    pub fn set_view_app_id(&mut self, id: ViewId, app_id: Option<&str>) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };

        if view.app_id.as_deref() != app_id {
            view.app_id = app_id.map(str::to_owned);
            self.refresh_view_app_settings(id);
        }

        self.update_toplevel_handle(id, |handle| handle.set_app_id(app_id));
    }

    /// Applies per-application settings keyed by the view's app id.
    pub(crate) fn refresh_view_app_settings(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let Some(app_id) = view.app_id.as_deref() else {
            return;
        };

        let munged = tessera_config::munge_app_id(app_id);
        let scale_to_fit = self.options.app_scale_to_fit.contains(&munged);
        self.set_view_scale_to_fit(id, scale_to_fit);
    }

    /// Turns scaling down of oversized content on or off for one view.
    pub fn set_view_scale_to_fit(&mut self, id: ViewId, enable: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        if view.scale_to_fit == enable {
            return;
        }

        view.scale_to_fit = enable;
        self.update_view_scale(id);
    }

    pub fn set_view_alpha(&mut self, id: ViewId, alpha: f64) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        if (view.alpha - alpha).abs() <= f64::from(f32::EPSILON) {
            return;
        }

        view.alpha = alpha;
        self.view_damage_whole(id);
    }

    /// Sets whether the compositor draws decorations for the view, and their metrics.
    pub fn set_view_decoration(&mut self, id: ViewId, decorated: bool, decoration: Decoration) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };

        view.decorated = decorated;
        view.decoration = if decorated {
            decoration
        } else {
            Decoration::NONE
        };
    }

    /// Toggles server-side decorations with the default metrics.
    pub fn update_view_decorated(&mut self, id: ViewId, decorated: bool) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if view.decorated == decorated {
            return;
        }

        self.view_damage_whole(id);

        let decoration = Decoration {
            titlebar_height: self.options.titlebar_height,
            border_width: self.options.border_width,
        };
        self.set_view_decoration(id, decorated, decoration);

        let deco_bling = self.views.get(id).and_then(|view| {
            view.blings
                .iter()
                .find(|b| matches!(b.kind(), bling::BlingKind::Deco))
                .map(Bling::id)
        });
        match (decorated, deco_bling) {
            (true, None) => {
                let bling = self.view_add_bling(id, Bling::deco());
                self.view_map_bling(id, bling);
            }
            (false, Some(bling)) => self.view_remove_bling(id, bling),
            _ => (),
        }

        self.view_damage_whole(id);
    }

    pub fn set_view_activation_token(
        &mut self,
        id: ViewId,
        token: Option<&str>,
        kind: ActivationKind,
    ) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        if view.activation_token() == token {
            return;
        }

        view.activation_token = token.map(|t| (t.to_owned(), kind));
    }

    /// Reports the activation token as handled and clears it.
    pub fn flush_view_activation_token(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let Some((token, kind)) = view.activation_token.take() else {
            error!("view {id:?} has no activation token to flush");
            return;
        };

        debug!("flushing activation token {token}");
        self.send(WireEvent::StartupNotify { token, kind });
    }

    /// Attaches a bling so that it's drawn just before the view.
    pub fn view_add_bling(&mut self, id: ViewId, bling: Bling) -> BlingId {
        let bling_id = bling.id();
        if let Some(view) = self.views.get_mut(id) {
            view.blings.insert(0, bling);
        }
        bling_id
    }

    pub fn view_remove_bling(&mut self, id: ViewId, bling: BlingId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let Some(idx) = view.blings.iter().position(|b| b.id() == bling) else {
            error!("bling {bling:?} is not attached to {id:?}");
            return;
        };

        let removed = view.blings.remove(idx);
        if removed.is_mapped() {
            let bounds = removed.bounds(view.deco_box());
            self.damage_rect(bounds);
        }
    }

    pub fn view_map_bling(&mut self, id: ViewId, bling: BlingId) {
        self.set_bling_mapped(id, bling, true);
    }

    pub fn view_unmap_bling(&mut self, id: ViewId, bling: BlingId) {
        self.set_bling_mapped(id, bling, false);
    }

    fn set_bling_mapped(&mut self, id: ViewId, bling: BlingId, mapped: bool) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let deco_box = view.deco_box();
        let Some(bling) = view.bling_mut(bling) else {
            return;
        };
        if bling.is_mapped() == mapped {
            return;
        }

        bling.set_mapped(mapped);
        let bounds = bling.bounds(deco_box);
        self.damage_rect(bounds);
    }

    /// Whether the view can currently be seen.
    ///
    /// In auto-maximize mode only the topmost view and its ancestors are visible.
    pub fn view_is_visible(&self, id: ViewId) -> bool {
        let Some(view) = self.views.get(id) else {
            return false;
        };
        if !view.is_mapped() {
            return false;
        }
        let Some(top) = self.stack.first().copied() else {
            return false;
        };
        if !self.options.auto_maximize {
            return true;
        }

        // X11 parent relations aren't subject to auto-maximize.
        if matches!(view.kind, ViewKind::Xwayland(_)) {
            return true;
        }

        let mut node = Some(top);
        while let Some(current) = node {
            if current == id {
                return true;
            }
            node = self.views.get(current).and_then(|v| v.parent);
        }
        false
    }

    /// Damages the topmost view and its ancestors.
    fn damage_top_stack(&mut self) {
        let mut node = self.stack.first().copied();
        while let Some(current) = node {
            self.view_damage_whole(current);
            node = self.views.get(current).and_then(|v| v.parent);
        }
    }

    /// Calls `f` with every surface of the view and its offset from the view box.
    pub fn view_for_each_surface(
        &self,
        id: ViewId,
        f: &mut dyn FnMut(SurfaceId, Point<i32, Logical>),
    ) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let Some(surface) = view.surface else {
            return;
        };
        self.surfaces
            .for_each_surface(surface, view.kind.is_xdg(), f);
    }

    /// Surface-local rectangle of a view surface translated to the layout.
    pub(crate) fn view_surface_rect(
        &self,
        id: ViewId,
        offset: Point<i32, Logical>,
        rect: Rectangle<i32, Logical>,
    ) -> Option<Rectangle<i32, Logical>> {
        let view = self.views.get(id)?;
        let scale = view.scale;
        let origin = view.rect.loc.to_f64();
        let loc = origin + (offset + rect.loc).to_f64().upscale(scale);
        let size = rect.size.to_f64().upscale(scale);

        let x1 = loc.x.floor();
        let y1 = loc.y.floor();
        let x2 = (loc.x + size.w).ceil();
        let y2 = (loc.y + size.h).ceil();
        Some(Rectangle::new(
            Point::from((x1 as i32, y1 as i32)),
            Size::from(((x2 - x1) as i32, (y2 - y1) as i32)),
        ))
    }

    /// Damages everything the view covers, ignoring buffer damage.
    pub fn view_damage_whole(&mut self, id: ViewId) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        if !view.is_mapped() {
            return;
        }

        let mut rects = vec![view.deco_box()];
        for bling in &view.blings {
            if bling.is_mapped() {
                rects.push(bling.bounds(view.deco_box()));
            }
        }

        let mut surfaces = Vec::new();
        self.view_for_each_surface(id, &mut |surface, offset| surfaces.push((surface, offset)));
        for (surface, offset) in surfaces {
            let Some(data) = self.surfaces.get(surface) else {
                continue;
            };
            if let Some(rect) = self.view_surface_rect(id, offset, data.bbox()) {
                rects.push(rect);
            }
        }

        for rect in rects {
            self.damage_rect(rect);
        }
    }

    /// Moves the buffer damage accumulated by the view's surfaces to the outputs.
    pub fn view_apply_damage(&mut self, id: ViewId) {
        let mut surfaces = Vec::new();
        self.view_for_each_surface(id, &mut |surface, offset| surfaces.push((surface, offset)));

        for (surface, offset) in surfaces {
            let damage = self
                .surfaces
                .get_mut(surface)
                .map(|s| s.take_damage())
                .unwrap_or_default();
            for rect in damage {
                if let Some(rect) = self.view_surface_rect(id, offset, rect) {
                    self.damage_rect(rect);
                }
            }
        }
    }

    /// Sends a frame callback to a view nobody can see, so that the client doesn't stall
    /// waiting for one.
    pub fn send_frame_done_if_not_visible(&mut self, id: ViewId) {
        let Some(surface) = self.views.get(id).and_then(|v| v.surface) else {
            return;
        };
        if !self.view_is_visible(id) {
            self.send(WireEvent::FrameDone { surface });
        }
    }

    /// Decoration part under a point in the view's surface-local coordinates.
    pub fn view_deco_part(&self, id: ViewId, sx: f64, sy: f64) -> DecoPart {
        let Some(view) = self.views.get(id) else {
            return DecoPart::NONE;
        };
        if !view.decorated {
            return DecoPart::NONE;
        }
        let Some(surface) = view.surface.and_then(|s| self.surfaces.get(s)) else {
            return DecoPart::NONE;
        };

        deco::deco_part(surface.size, view.decoration, sx, sy)
    }

    /// Whether auto-maximize applies to the view right now.
    pub fn view_want_auto_maximize(&self, id: ViewId) -> bool {
        if !self.options.auto_maximize {
            return false;
        }
        self.views
            .get(id)
            .map_or(false, |view| view.kind.want_auto_maximize(view.parent.is_some()))
    }

    /// Runs `f` on the view's foreign toplevel handle and tells shells if it changed anything.
    pub(crate) fn update_toplevel_handle(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut ToplevelHandle) -> bool,
    ) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let surface = view.toplevel_surface;
        let Some(handle) = view.toplevel_handle.as_mut() else {
            return;
        };

        if f(handle) {
            self.send(WireEvent::ToplevelHandleChanged { surface });
        }
    }
}
