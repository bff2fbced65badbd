//! Messages the core sends to clients.
//!
//! Marshaling is someone else's job: the core queues a [`WireEvent`] for every message a protocol
//! implementation would send, and the backend drains the queue after each dispatch.

use bitflags::bitflags;
use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::input::CursorImage;
use crate::layer::draggable::DragState;
use crate::output::OutputId;
use crate::surface::SurfaceId;

pub mod foreign_toplevel;

bitflags! {
    /// States sent along with an xdg toplevel configure.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ToplevelStates: u32 {
        const MAXIMIZED = 1 << 0;
        const FULLSCREEN = 1 << 1;
        const ACTIVATED = 1 << 2;
        const TILED_LEFT = 1 << 3;
        const TILED_RIGHT = 1 << 4;
        const TILED_TOP = 1 << 5;
        const TILED_BOTTOM = 1 << 6;
    }
}

impl ToplevelStates {
    pub const TILED: Self = Self::TILED_LEFT
        .union(Self::TILED_RIGHT)
        .union(Self::TILED_TOP)
        .union(Self::TILED_BOTTOM);
}

/// How a seat event reached its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Through the active seat grab, which may redirect or swallow it.
    Grab,
    /// Straight to the target surface.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    XdgActivation,
    GtkShell,
    X11,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    SurfaceEnter {
        surface: SurfaceId,
        output: OutputId,
    },
    SurfaceLeave {
        surface: SurfaceId,
        output: OutputId,
    },
    FrameDone {
        surface: SurfaceId,
    },
    XdgConfigure {
        surface: SurfaceId,
        serial: u32,
        size: Size<i32, Logical>,
        states: ToplevelStates,
    },
    X11Configure {
        surface: SurfaceId,
        geometry: Rectangle<i32, Logical>,
    },
    X11Activate {
        surface: SurfaceId,
        activated: bool,
    },
    Close {
        surface: SurfaceId,
    },
    PopupConfigure {
        surface: SurfaceId,
        geometry: Rectangle<i32, Logical>,
    },
    PopupDone {
        surface: SurfaceId,
    },
    LayerConfigure {
        surface: SurfaceId,
        size: Size<i32, Logical>,
    },
    LayerClosed {
        surface: SurfaceId,
    },
    LayerDragged {
        surface: SurfaceId,
        margin: i32,
    },
    LayerDragEnd {
        surface: SurfaceId,
        state: DragState,
    },
    KeyboardEnter {
        surface: SurfaceId,
    },
    KeyboardLeave {
        surface: SurfaceId,
    },
    PointerEnter {
        surface: SurfaceId,
        location: Point<f64, Logical>,
        delivery: Delivery,
    },
    PointerLeave {
        surface: SurfaceId,
        delivery: Delivery,
    },
    PointerMotion {
        surface: SurfaceId,
        time: u32,
        location: Point<f64, Logical>,
        delivery: Delivery,
    },
    PointerButton {
        surface: Option<SurfaceId>,
        time: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis {
        surface: SurfaceId,
        time: u32,
        horizontal: f64,
        vertical: f64,
        delivery: Delivery,
    },
    PointerFrame {
        surface: SurfaceId,
    },
    RelativeMotion {
        surface: SurfaceId,
        time: u32,
        delta: Point<f64, Logical>,
        delta_unaccel: Point<f64, Logical>,
    },
    TouchDown {
        surface: SurfaceId,
        time: u32,
        slot: i32,
        location: Point<f64, Logical>,
        delivery: Delivery,
    },
    TouchMotion {
        surface: SurfaceId,
        time: u32,
        slot: i32,
        location: Point<f64, Logical>,
        delivery: Delivery,
    },
    TouchUp {
        surface: SurfaceId,
        time: u32,
        slot: i32,
        delivery: Delivery,
    },
    TouchCancel {
        surface: SurfaceId,
    },
    TouchFrame {
        surface: SurfaceId,
    },
    ConstraintActivated {
        surface: SurfaceId,
    },
    ConstraintDeactivated {
        surface: SurfaceId,
    },
    CursorImage(CursorImage),
    StartupNotify {
        token: String,
        kind: ActivationKind,
    },
    ToplevelHandleChanged {
        surface: SurfaceId,
    },
}

impl WireEvent {
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            WireEvent::SurfaceEnter { surface, .. }
            | WireEvent::SurfaceLeave { surface, .. }
            | WireEvent::FrameDone { surface }
            | WireEvent::XdgConfigure { surface, .. }
            | WireEvent::X11Configure { surface, .. }
            | WireEvent::X11Activate { surface, .. }
            | WireEvent::Close { surface }
            | WireEvent::PopupConfigure { surface, .. }
            | WireEvent::PopupDone { surface }
            | WireEvent::LayerConfigure { surface, .. }
            | WireEvent::LayerClosed { surface }
            | WireEvent::LayerDragged { surface, .. }
            | WireEvent::LayerDragEnd { surface, .. }
            | WireEvent::KeyboardEnter { surface }
            | WireEvent::KeyboardLeave { surface }
            | WireEvent::PointerEnter { surface, .. }
            | WireEvent::PointerLeave { surface, .. }
            | WireEvent::PointerMotion { surface, .. }
            | WireEvent::PointerAxis { surface, .. }
            | WireEvent::PointerFrame { surface }
            | WireEvent::RelativeMotion { surface, .. }
            | WireEvent::TouchDown { surface, .. }
            | WireEvent::TouchMotion { surface, .. }
            | WireEvent::TouchUp { surface, .. }
            | WireEvent::TouchCancel { surface }
            | WireEvent::TouchFrame { surface }
            | WireEvent::ConstraintActivated { surface }
            | WireEvent::ConstraintDeactivated { surface }
            | WireEvent::ToplevelHandleChanged { surface } => Some(*surface),
            WireEvent::PointerButton { surface, .. } => *surface,
            WireEvent::CursorImage(_) | WireEvent::StartupNotify { .. } => None,
        }
    }
}
