#[macro_use]
extern crate tracing;

pub mod animation;
pub mod backend;
pub mod cli;
pub mod compositor;
pub mod handlers;
pub mod input;
pub mod ipc;
pub mod layer;
pub mod output;
pub mod protocols;
pub mod surface;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;

pub use compositor::{Compositor, DesktopEvent, Options, SurfaceHit};
