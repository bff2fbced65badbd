//! Foreign toplevel handles, used by shells to list and control windows.

use crate::output::OutputId;
use crate::view::ViewId;

/// Requests a shell can make through a toplevel handle.
pub trait ForeignToplevelHandler {
    fn activate(&mut self, view: ViewId);
    fn close(&mut self, view: ViewId);
    fn set_fullscreen(&mut self, view: ViewId, output: Option<OutputId>);
    fn unset_fullscreen(&mut self, view: ViewId);
    fn set_maximized(&mut self, view: ViewId);
    fn unset_maximized(&mut self, view: ViewId);
}

/// Toplevel state as advertised to shells.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ToplevelHandle {
    pub title: Option<String>,
    pub app_id: Option<String>,
    pub parent: Option<ViewId>,
    pub maximized: bool,
    pub fullscreen: bool,
    pub activated: bool,
    pub outputs: Vec<OutputId>,
}

impl ToplevelHandle {
    pub fn set_title(&mut self, title: Option<&str>) -> bool {
        update(&mut self.title, title.map(str::to_owned))
    }

    pub fn set_app_id(&mut self, app_id: Option<&str>) -> bool {
        update(&mut self.app_id, app_id.map(str::to_owned))
    }

    pub fn set_parent(&mut self, parent: Option<ViewId>) -> bool {
        update(&mut self.parent, parent)
    }

    pub fn set_maximized(&mut self, maximized: bool) -> bool {
        update(&mut self.maximized, maximized)
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
        update(&mut self.fullscreen, fullscreen)
    }

    pub fn set_activated(&mut self, activated: bool) -> bool {
        update(&mut self.activated, activated)
    }

    pub fn output_enter(&mut self, output: OutputId) -> bool {
        if self.outputs.contains(&output) {
            return false;
        }
        self.outputs.push(output);
        true
    }

    pub fn output_leave(&mut self, output: OutputId) -> bool {
        let len = self.outputs.len();
        self.outputs.retain(|o| *o != output);
        self.outputs.len() != len
    }
}

fn update<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
