//! Headless backend: outputs without hardware and clients without sockets.
//!
//! Clients are simulated in-process. They ack every configure they receive and commit a buffer of
//! the configured size, which is what a well-behaved toolkit does. This drives the core through
//! the same entry points a protocol layer would use.

use std::time::Duration;

use smithay::utils::{Logical, Point, Rectangle, Size};
use tessera_config::Config;

use crate::animation::Clock;
use crate::compositor::Compositor;
use crate::handlers::{BufferAssignment, SurfaceCommit};
use crate::layer::{Layer, LayerId, LayerState};
use crate::output::OutputId;
use crate::protocols::WireEvent;
use crate::surface::{ClientId, SurfaceId};
use crate::view::ViewId;

/// Upper bound on configure ping-pong rounds in one dispatch.
const MAX_ROUNDS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub client: ClientId,
    pub surface: SurfaceId,
    pub view: ViewId,
}

#[derive(Debug)]
struct SimulatedWindow {
    window: Window,
    /// Size the client picks when the compositor leaves it up to it.
    preferred_size: Size<i32, Logical>,
    size: Size<i32, Logical>,
    configures: Vec<(u32, Size<i32, Logical>)>,
    close_requested: bool,
}

#[derive(Debug)]
struct SimulatedLayer {
    layer: LayerId,
    surface: SurfaceId,
    size: Size<i32, Logical>,
    mapped: bool,
}

pub struct Headless {
    pub compositor: Compositor,
    windows: Vec<SimulatedWindow>,
    layers: Vec<SimulatedLayer>,
    /// Every event drained so far, oldest first.
    events: Vec<WireEvent>,
}

impl Headless {
    pub fn new(config: &Config) -> Self {
        let clock = Clock::with_time(Duration::ZERO);
        let compositor = Compositor::with_clock(config, clock);

        let mut headless = Self {
            compositor,
            windows: Vec::new(),
            layers: Vec::new(),
            events: Vec::new(),
        };

        for output in &config.outputs {
            let size = output.size.map_or((1280, 720), |s| {
                (i32::from(s.width), i32::from(s.height))
            });
            let loc = output.position.map_or((0, 0), |p| (p.x, p.y));
            let scale = output.scale.unwrap_or(1.);
            headless.compositor.add_output(
                output.name.clone(),
                Rectangle::new(Point::from(loc), Size::from(size)),
                scale,
            );
        }

        headless
    }

    /// Adds `headless-{n}` right of the existing outputs.
    pub fn add_output(&mut self, n: u8, size: (u16, u16)) -> OutputId {
        let x = self
            .compositor
            .outputs
            .iter()
            .map(|(_, o)| o.geometry().loc.x + o.geometry().size.w)
            .max()
            .unwrap_or(0);
        let geometry = Rectangle::new(
            Point::from((x, 0)),
            Size::from((i32::from(size.0), i32::from(size.1))),
        );
        self.compositor.add_output(format!("headless-{n}"), geometry, 1.)
    }

    /// Opens an xdg toplevel and maps it with `size` unless the compositor picks one.
    pub fn add_window(&mut self, app_id: &str, size: (i32, i32)) -> Window {
        let client = ClientId::next();
        let surface = self.compositor.new_surface(client);
        let view = self.compositor.new_xdg_toplevel(surface, false);
        self.compositor.set_view_app_id(view, Some(app_id));

        let window = Window {
            client,
            surface,
            view,
        };
        self.windows.push(SimulatedWindow {
            window,
            preferred_size: Size::from(size),
            size: Size::from((0, 0)),
            configures: Vec::new(),
            close_requested: false,
        });

        self.dispatch();
        window
    }

    pub fn close_window(&mut self, window: Window) {
        self.compositor.surface_commit(
            window.surface,
            SurfaceCommit {
                buffer: BufferAssignment::Removed,
                ..SurfaceCommit::default()
            },
        );
        self.compositor.xdg_toplevel_destroy(window.view);
        self.compositor.surface_destroy(window.surface);
        self.windows.retain(|w| w.window != window);
        self.dispatch();
    }

    /// Opens a layer surface on `output`.
    pub fn add_layer(
        &mut self,
        output: Option<OutputId>,
        layer: Layer,
        namespace: &str,
        state: LayerState,
        size: (i32, i32),
    ) -> Option<LayerId> {
        let client = ClientId::next();
        let surface = self.compositor.new_surface(client);
        let id = self
            .compositor
            .new_layer_surface(surface, output, layer, namespace)?;
        self.compositor.layer_set_state(id, state);
        self.layers.push(SimulatedLayer {
            layer: id,
            surface,
            size: Size::from(size),
            mapped: false,
        });

        self.commit_layers();
        self.dispatch();
        Some(id)
    }

    fn commit_layers(&mut self) {
        for layer in &mut self.layers {
            if layer.mapped {
                continue;
            }
            layer.mapped = true;
            self.compositor.surface_commit(
                layer.surface,
                SurfaceCommit {
                    buffer: BufferAssignment::NewBuffer(layer.size),
                    ..SurfaceCommit::default()
                },
            );
        }
    }

    /// Lets the simulated clients react to everything the compositor sent them.
    pub fn dispatch(&mut self) {
        for _ in 0..MAX_ROUNDS {
            let events = self.compositor.take_wire_events();
            if events.is_empty() {
                return;
            }

            let mut to_commit = Vec::new();
            let mut layers_to_commit = Vec::new();
            for event in &events {
                match *event {
                    WireEvent::XdgConfigure {
                        surface,
                        serial,
                        size,
                        ..
                    } => {
                        if let Some(window) = self.window_mut(surface) {
                            window.configures.push((serial, size));
                            to_commit.push((window.window, serial, size));
                        }
                    }
                    WireEvent::Close { surface } => {
                        if let Some(window) = self.window_mut(surface) {
                            window.close_requested = true;
                        }
                    }
                    WireEvent::LayerConfigure { surface, size } => {
                        if let Some(layer) = self.layers.iter_mut().find(|l| l.surface == surface) {
                            layer.size = size;
                            layers_to_commit.push((surface, size));
                        }
                    }
                    WireEvent::LayerClosed { surface } => {
                        self.layers.retain(|l| l.surface != surface);
                    }
                    _ => (),
                }
            }
            self.events.extend(events);

            for (window, serial, size) in to_commit {
                self.ack_and_commit(window, serial, size);
            }
            for (surface, size) in layers_to_commit {
                self.compositor.surface_commit(
                    surface,
                    SurfaceCommit {
                        buffer: BufferAssignment::NewBuffer(size),
                        damage: vec![Rectangle::from_size(size)],
                        ..SurfaceCommit::default()
                    },
                );
            }
        }

        warn!("clients are still being configured after {MAX_ROUNDS} rounds");
    }

    fn ack_and_commit(&mut self, window: Window, serial: u32, size: Size<i32, Logical>) {
        let Some(sim) = self.window_mut(window.surface) else {
            return;
        };
        let size = Size::from((
            if size.w > 0 { size.w } else { sim.preferred_size.w },
            if size.h > 0 { size.h } else { sim.preferred_size.h },
        ));
        let buffer = if sim.size == size {
            BufferAssignment::Unchanged
        } else {
            sim.size = size;
            BufferAssignment::NewBuffer(size)
        };

        self.compositor.xdg_ack_configure(window.view, serial);
        self.compositor.surface_commit(
            window.surface,
            SurfaceCommit {
                buffer,
                damage: vec![Rectangle::from_size(size)],
                ..SurfaceCommit::default()
            },
        );
    }

    fn window_mut(&mut self, surface: SurfaceId) -> Option<&mut SimulatedWindow> {
        self.windows.iter_mut().find(|w| w.window.surface == surface)
    }

    /// Sizes the window was configured with, in order.
    pub fn configures(&self, window: Window) -> Vec<Size<i32, Logical>> {
        self.windows
            .iter()
            .find(|w| w.window == window)
            .map(|w| w.configures.iter().map(|(_, size)| *size).collect())
            .unwrap_or_default()
    }

    pub fn close_requested(&self, window: Window) -> bool {
        self.windows
            .iter()
            .any(|w| w.window == window && w.close_requested)
    }

    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Moves time forward and lets animations progress.
    pub fn advance_time(&mut self, delta: Duration) {
        self.compositor.clock.advance(delta);
        self.compositor.advance_animations();
        self.dispatch();
    }
}
