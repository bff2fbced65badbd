use std::time::Duration;

use smithay::utils::{Logical, Point, Rectangle};
use tessera_config::Config;

use crate::backend::headless::{Headless, Window};
use crate::compositor::Compositor;
use crate::input::InputEvent;
use crate::layer::{Anchor, Layer, LayerId, LayerState};
use crate::output::OutputId;
use crate::protocols::{ButtonState, ToplevelStates, WireEvent};
use crate::view::View;

pub struct Fixture {
    pub headless: Headless,
    time: u32,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            headless: Headless::new(&config),
            time: 0,
        }
    }

    pub fn parse(text: &str) -> Self {
        Self::with_config(Config::parse("test.kdl", text).unwrap())
    }

    pub fn compositor(&mut self) -> &mut Compositor {
        &mut self.headless.compositor
    }

    pub fn add_output(&mut self, n: u8, size: (u16, u16)) -> OutputId {
        self.headless.add_output(n, size)
    }

    pub fn add_window(&mut self, size: (i32, i32)) -> Window {
        self.headless.add_window("org.example.App", size)
    }

    pub fn view(&self, window: Window) -> &View {
        self.headless.compositor.views.get(window.view).unwrap()
    }

    pub fn view_box(&self, window: Window) -> Rectangle<i32, Logical> {
        self.view(window).get_box()
    }

    /// States of the last configure the window got.
    pub fn last_states(&self, window: Window) -> ToplevelStates {
        self.headless
            .events()
            .iter()
            .rev()
            .find_map(|event| match *event {
                WireEvent::XdgConfigure {
                    surface, states, ..
                } if surface == window.surface => Some(states),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Adds a bar anchored to the top edge that reserves its own height.
    pub fn add_top_bar(&mut self, output: OutputId, height: i32) -> LayerId {
        let state = LayerState {
            anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
            exclusive_zone: height,
            desired_size: (0, height).into(),
            ..LayerState::default()
        };
        self.headless
            .add_layer(Some(output), Layer::Top, "bar", state, (0, height))
            .unwrap()
    }

    pub fn dispatch(&mut self) {
        self.headless.dispatch();
    }

    pub fn advance_time(&mut self, ms: u64) {
        self.headless.advance_time(Duration::from_millis(ms));
    }

    pub fn input(&mut self, event: InputEvent) {
        self.headless.compositor.process_input_event(event);
        self.dispatch();
    }

    fn tick(&mut self) -> u32 {
        self.time += 10;
        self.time
    }

    pub fn pointer_to(&mut self, x: f64, y: f64) {
        let time = self.tick();
        self.input(InputEvent::PointerMotionAbsolute {
            time,
            position: Point::from((x, y)),
        });
    }

    /// Relative pointer motion, as from a mouse.
    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        let time = self.tick();
        let delta = Point::from((dx, dy));
        self.input(InputEvent::PointerMotion {
            time,
            delta,
            delta_unaccel: delta,
        });
    }

    pub fn button(&mut self, button: u32, state: ButtonState) {
        let time = self.tick();
        self.input(InputEvent::PointerButton {
            time,
            button,
            state,
        });
    }

    pub fn meta(&mut self, pressed: bool) {
        self.input(InputEvent::Modifiers { meta: pressed });
    }

    pub fn touch_down(&mut self, slot: i32, x: f64, y: f64) {
        let time = self.tick();
        self.input(InputEvent::TouchDown {
            time,
            slot,
            position: Point::from((x, y)),
        });
    }

    pub fn touch_motion(&mut self, slot: i32, x: f64, y: f64) {
        let time = self.tick();
        self.input(InputEvent::TouchMotion {
            time,
            slot,
            position: Point::from((x, y)),
        });
    }

    pub fn touch_up(&mut self, slot: i32) {
        let time = self.tick();
        self.input(InputEvent::TouchUp { time, slot });
    }
}
