//! Entry points for client requests.
//!
//! The embedding protocol layer decodes requests and calls into these; replies go out through
//! [`Compositor::take_wire_events`].

mod compositor;
mod layer_shell;
mod xdg_shell;
mod xwayland;

pub use compositor::{BufferAssignment, SurfaceCommit};

use crate::compositor::Compositor;
use crate::output::OutputId;
use crate::protocols::foreign_toplevel::ForeignToplevelHandler;
use crate::protocols::ActivationKind;
use crate::surface::SurfaceId;
use crate::view::ViewId;

impl ForeignToplevelHandler for Compositor {
    fn activate(&mut self, view: ViewId) {
        self.seat_set_focus_view(Some(view));
    }

    fn close(&mut self, view: ViewId) {
        self.view_close(view);
    }

    fn set_fullscreen(&mut self, view: ViewId, output: Option<OutputId>) {
        if let Err(err) = self.set_view_fullscreen(view, true, output) {
            warn!("error fullscreening {view:?}: {err}");
        }
    }

    fn unset_fullscreen(&mut self, view: ViewId) {
        if let Err(err) = self.set_view_fullscreen(view, false, None) {
            warn!("error unfullscreening {view:?}: {err}");
        }
    }

    fn set_maximized(&mut self, view: ViewId) {
        if let Err(err) = self.maximize_view(view, None) {
            warn!("error maximizing {view:?}: {err}");
        }
    }

    fn unset_maximized(&mut self, view: ViewId) {
        self.restore_view(view);
    }
}

impl Compositor {
    /// A client handed over an activation token for `surface`.
    ///
    /// Tokens of unmapped views are kept until setup; mapped views are focused right away.
    pub fn request_activation(&mut self, surface: SurfaceId, token: &str, kind: ActivationKind) {
        let Some(id) = self.surfaces.view_of(surface) else {
            debug!("activation for {surface:?} which has no view");
            return;
        };

        self.set_view_activation_token(id, Some(token), kind);

        if self.views.get(id).map_or(false, |v| v.is_mapped()) {
            self.seat_set_focus_view(Some(id));
            self.flush_view_activation_token(id);
        }
    }
}
