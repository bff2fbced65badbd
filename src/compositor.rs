//! The desktop: everything the scene and input core knows about, in one place.
//!
//! Every operation takes `&mut Compositor` explicitly. Cross references between views, outputs,
//! layer surfaces and view children are generational ids, so a reference to something that was
//! destroyed simply stops resolving.

use std::collections::{HashMap, HashSet};

use smithay::utils::{Logical, Point, Rectangle};
use tessera_config::{munge_app_id, Config};

use crate::animation::{AnimationId, AnimationTarget, Clock, TimedAnimation};
use crate::input::constraint::PointerConstraint;
use crate::input::gesture::{GestureId, GestureSignal};
use crate::input::seat::Seat;
use crate::layer::{Layer, LayerId, LayerSurface};
use crate::output::{Output, OutputId, OutputLayout};
use crate::protocols::WireEvent;
use crate::surface::{ClientId, SurfaceId, Surfaces};
use crate::utils::arena::Arena;
use crate::utils::signal::{Signal, Subscription};
use crate::view::child::ViewChild;
use crate::view::{View, ViewId};

/// Settings derived from the config.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub auto_maximize: bool,
    pub scale_to_fit: bool,
    pub animations_enabled: bool,
    pub fade_in_ms: u64,
    pub suggestion_ms: u64,
    pub edge_snap_threshold: f64,
    pub shell_reveal_pointer_threshold: f64,
    pub shell_reveal_touch_threshold: f64,
    pub titlebar_height: i32,
    pub border_width: i32,
    pub decoration_color: [f32; 4],
    pub suggestion_color: [f32; 4],
    /// Munged app ids of applications with scale-to-fit forced on.
    pub app_scale_to_fit: HashSet<String>,
    pub debug_touch_points: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto_maximize: config.desktop.auto_maximize,
            scale_to_fit: config.desktop.scale_to_fit,
            animations_enabled: !config.animations.off,
            fade_in_ms: u64::from(config.animations.window_fade_in_ms),
            suggestion_ms: u64::from(config.animations.suggestion_ms),
            edge_snap_threshold: f64::from(config.desktop.edge_snap_threshold),
            shell_reveal_pointer_threshold: f64::from(config.input.shell_reveal_pointer_threshold),
            shell_reveal_touch_threshold: f64::from(config.input.shell_reveal_touch_threshold),
            titlebar_height: i32::from(config.decoration.titlebar_height),
            border_width: i32::from(config.decoration.border_width),
            decoration_color: config.decoration.color.to_array_unpremul(),
            suggestion_color: config.desktop.suggestion_color.to_array_unpremul(),
            app_scale_to_fit: config
                .applications
                .iter()
                .filter(|app| app.scale_to_fit)
                .map(|app| munge_app_id(&app.app_id))
                .collect(),
            debug_touch_points: config.debug.touch_points,
        }
    }
}

/// Notifications for observers outside the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesktopEvent {
    OutputAdded(OutputId),
    OutputRemoved(OutputId),
    ViewMapped(ViewId),
    ViewUnmapped(ViewId),
    ViewDestroyed(ViewId),
    /// A gesture added with [`Compositor::add_gesture`] recognized something.
    Gesture {
        gesture: GestureId,
        signal: GestureSignal,
    },
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// `None` when the point is on a server-side decoration.
    pub surface: Option<SurfaceId>,
    /// The point in the local coordinates of the surface, or of the view for decorations.
    pub local: Point<f64, Logical>,
    pub view: Option<ViewId>,
    pub layer: Option<LayerId>,
}

pub struct Compositor {
    pub options: Options,
    pub clock: Clock,
    pub outputs: OutputLayout,
    pub surfaces: Surfaces,
    pub views: Arena<View>,
    /// Mapped views, topmost first.
    pub stack: Vec<ViewId>,
    pub children: Arena<ViewChild>,
    pub layers: Arena<LayerSurface>,
    pub animations: Arena<TimedAnimation>,
    pub seat: Seat,
    pub pointer_constraints: HashMap<SurfaceId, PointerConstraint>,
    client_pids: HashMap<ClientId, u32>,
    /// Clients not allowed to receive input, e.g. by their security context.
    restricted_clients: HashSet<ClientId>,
    /// Views following the global scale-to-fit setting.
    pub(crate) scale_to_fit_watchers: Signal<ViewId>,
    events: Signal<Box<dyn FnMut(&DesktopEvent)>>,
    outbox: Vec<WireEvent>,
}

impl Compositor {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Clock::default())
    }

    pub fn with_clock(config: &Config, clock: Clock) -> Self {
        Self {
            options: Options::from_config(config),
            clock,
            outputs: OutputLayout::default(),
            surfaces: Surfaces::default(),
            views: Arena::new(),
            stack: Vec::new(),
            children: Arena::new(),
            layers: Arena::new(),
            animations: Arena::new(),
            seat: Seat::new("seat0"),
            pointer_constraints: HashMap::new(),
            client_pids: HashMap::new(),
            restricted_clients: HashSet::new(),
            scale_to_fit_watchers: Signal::default(),
            events: Signal::default(),
            outbox: Vec::new(),
        }
    }

    /// Applies a new config.
    pub fn reload_config(&mut self, config: &Config) {
        let options = Options::from_config(config);
        if options == self.options {
            return;
        }

        let auto_maximize = options.auto_maximize;
        let scale_to_fit = options.scale_to_fit;
        let app_scale_to_fit_changed = options.app_scale_to_fit != self.options.app_scale_to_fit;

        self.options = Options {
            auto_maximize: self.options.auto_maximize,
            scale_to_fit: self.options.scale_to_fit,
            ..options
        };

        if app_scale_to_fit_changed {
            for id in self.views.ids() {
                self.refresh_view_app_settings(id);
            }
        }
        self.set_scale_to_fit(scale_to_fit);
        self.set_auto_maximize(auto_maximize);
    }

    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        geometry: Rectangle<i32, Logical>,
        scale: f64,
    ) -> OutputId {
        let id = self.outputs.add(Output::new(name, geometry, scale));
        self.emit(DesktopEvent::OutputAdded(id));
        id
    }

    /// Removes an output, destroying the layer surfaces that live on it.
    pub fn remove_output(&mut self, id: OutputId) {
        let Some(output) = self.outputs.get(id) else {
            return;
        };
        debug!("removing output {}", output.name());

        let layers = output.layers.clone();
        let fullscreen = output.fullscreen_view;

        for layer in layers {
            self.handle_layer_output_destroyed(layer);
        }

        self.outputs.remove(id);
        self.emit(DesktopEvent::OutputRemoved(id));

        if let Some(view) = fullscreen {
            if let Err(err) = self.set_view_fullscreen(view, false, None) {
                warn!("error unfullscreening {view:?}: {err}");
            }
        }

        for view in self.stack.clone() {
            self.update_view_output(view);
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&DesktopEvent)>) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.events.unsubscribe(subscription);
    }

    pub(crate) fn emit(&mut self, event: DesktopEvent) {
        trace!("desktop event: {event:?}");
        self.events.emit(&event);
    }

    pub(crate) fn send(&mut self, event: WireEvent) {
        trace!("queueing {event:?}");
        self.outbox.push(event);
    }

    /// Flushes pending configures and returns everything queued for clients.
    pub fn take_wire_events(&mut self) -> Vec<WireEvent> {
        self.flush_configures();
        std::mem::take(&mut self.outbox)
    }

    pub fn set_client_pid(&mut self, client: ClientId, pid: u32) {
        self.client_pids.insert(client, pid);
    }

    pub fn client_pid(&self, client: ClientId) -> Option<u32> {
        self.client_pids.get(&client).copied()
    }

    /// Stops delivering input to the client's surfaces.
    pub fn restrict_client_input(&mut self, client: ClientId) {
        self.restricted_clients.insert(client);
    }

    /// Whether the surface is allowed to receive input.
    pub fn allows_input(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .client(surface)
            .map_or(false, |client| !self.restricted_clients.contains(&client))
    }

    /// Toggles the desktop-wide auto-maximize policy.
    pub fn set_auto_maximize(&mut self, enable: bool) {
        if self.options.auto_maximize == enable {
            return;
        }

        info!("auto-maximize: {enable}");
        self.options.auto_maximize = enable;

        for id in self.stack.clone() {
            if enable {
                self.kind_set_active(id, true);
                self.auto_maximize_view(id);
            } else {
                let focused = self.seat.focused_view() == Some(id);
                self.kind_set_active(id, focused);
            }
        }

        for output in self.outputs.iter_mut() {
            output.damage_whole();
        }
    }

    /// Toggles the global scale-to-fit setting.
    pub fn set_scale_to_fit(&mut self, enable: bool) {
        if self.options.scale_to_fit == enable {
            return;
        }

        info!("scale-to-fit: {enable}");
        self.options.scale_to_fit = enable;

        let watchers: Vec<ViewId> = self.scale_to_fit_watchers.listeners().copied().collect();
        for view in watchers {
            self.update_view_scale(view);
        }
    }

    /// Damages the rectangle, given in layout coordinates, on every output it touches.
    pub fn damage_rect(&mut self, rect: Rectangle<i32, Logical>) {
        for output in self.outputs.iter_mut() {
            output.damage(rect);
        }
    }

    pub fn damage_output_whole(&mut self, id: OutputId) {
        if let Some(output) = self.outputs.get_mut(id) {
            output.damage_whole();
        }
    }

    pub fn play_animation(&mut self, animation: TimedAnimation) -> AnimationId {
        self.animations.insert(animation)
    }

    pub fn stop_animation(&mut self, id: AnimationId) {
        self.animations.remove(id);
    }

    /// Writes the current animation values into their targets and drops finished animations.
    pub fn advance_animations(&mut self) {
        for id in self.animations.ids() {
            let Some(anim) = self.animations.get(id) else {
                continue;
            };

            let applied = match anim.target() {
                AnimationTarget::View(view) => match self.views.get_mut(view) {
                    Some(target) => {
                        anim.apply_to(target);
                        Some(view)
                    }
                    None => None,
                },
                AnimationTarget::Bling { view, bling } => {
                    match self.views.get_mut(view).and_then(|v| v.bling_mut(bling)) {
                        Some(target) => {
                            anim.apply_to(target);
                            Some(view)
                        }
                        None => None,
                    }
                }
            };
            let remove = applied.is_none() || (anim.is_done() && anim.dispose_on_done());

            if let Some(view) = applied {
                self.view_damage_whole(view);
            }
            if remove {
                self.animations.remove(id);
            }
        }
    }

    /// Finds what is under a point in layout coordinates.
    pub fn surface_at(&self, pos: Point<f64, Logical>) -> Option<SurfaceHit> {
        let output = self.outputs.output_at(pos);

        if let Some(output_id) = output {
            if let Some(hit) = self.layer_hit(output_id, &[Layer::Overlay], pos) {
                return Some(hit);
            }

            if let Some(out) = self.outputs.get(output_id) {
                if let Some(fullscreen) = out.fullscreen_view() {
                    if out.shell_revealed() {
                        if let Some(hit) = self.layer_hit(output_id, &[Layer::Top], pos) {
                            return Some(hit);
                        }
                    }
                    return self.view_at(fullscreen, pos);
                }
            }

            if let Some(hit) = self.layer_hit(output_id, &[Layer::Top], pos) {
                return Some(hit);
            }
        }

        for view in &self.stack {
            if !self.view_is_visible(*view) {
                continue;
            }
            if let Some(hit) = self.view_at(*view, pos) {
                return Some(hit);
            }
        }

        let output_id = output?;
        self.layer_hit(output_id, &[Layer::Bottom, Layer::Background], pos)
    }

    /// Topmost mapped layer surface of any layer under the point.
    pub fn layer_surface_at(&self, pos: Point<f64, Logical>) -> Option<SurfaceHit> {
        let output = self.outputs.output_at(pos)?;
        self.layer_hit(
            output,
            &[Layer::Overlay, Layer::Top, Layer::Bottom, Layer::Background],
            pos,
        )
    }

    fn layer_hit(
        &self,
        output: OutputId,
        layers: &[Layer],
        pos: Point<f64, Logical>,
    ) -> Option<SurfaceHit> {
        let out = self.outputs.get(output)?;
        let origin = out.geometry().loc.to_f64();

        for kind in layers {
            for id in out.layers().iter().rev() {
                let Some(layer) = self.layers.get(*id) else {
                    continue;
                };
                if !layer.mapped || layer.layer != *kind {
                    continue;
                }

                let local = pos - origin - layer.geometry.loc.to_f64();
                if let Some((surface, local)) = self.surfaces.surface_under(layer.surface, local, true)
                {
                    return Some(SurfaceHit {
                        surface: Some(surface),
                        local,
                        view: None,
                        layer: Some(*id),
                    });
                }
            }
        }

        None
    }

    fn view_at(&self, id: ViewId, pos: Point<f64, Logical>) -> Option<SurfaceHit> {
        let view = self.views.get(id)?;
        let surface = view.surface()?;

        let rect = view.rect();
        let scale = view.scale();
        let local = Point::from((
            pos.x / scale - f64::from(rect.loc.x),
            pos.y / scale - f64::from(rect.loc.y),
        ));

        let include_popups = view.kind.is_xdg();
        if let Some((surface, local)) = self.surfaces.surface_under(surface, local, include_popups) {
            return Some(SurfaceHit {
                surface: Some(surface),
                local,
                view: Some(id),
                layer: None,
            });
        }

        if !self.view_deco_part(id, local.x, local.y).is_empty() {
            return Some(SurfaceHit {
                surface: None,
                local,
                view: Some(id),
                layer: None,
            });
        }

        None
    }
}
