use crate::compositor::Compositor;
use crate::layer::{Layer, LayerId, LayerState};
use crate::output::OutputId;
use crate::surface::SurfaceId;

impl Compositor {
    /// Gives `surface` the layer-shell role.
    ///
    /// Returns `None` when there's no output to put it on; the client has been told to close it.
    pub fn new_layer_surface(
        &mut self,
        surface: SurfaceId,
        output: Option<OutputId>,
        layer: Layer,
        namespace: &str,
    ) -> Option<LayerId> {
        match self.create_layer_surface(surface, output, layer, namespace) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("error creating layer surface {namespace:?}: {err}");
                None
            }
        }
    }

    /// Double-buffered layer state arrives with the next commit.
    pub fn layer_set_state(&mut self, id: LayerId, state: LayerState) {
        self.set_layer_state(id, state);
    }

    pub fn layer_surface_destroy(&mut self, id: LayerId) {
        self.layer_destroy(id);
    }

    pub(crate) fn layer_surface_commit(&mut self, id: LayerId, mapped: bool) {
        let Some(layer) = self.layers.get(id) else {
            return;
        };

        match (layer.mapped, mapped) {
            (false, true) => {
                if let Err(err) = self.layer_map(id) {
                    warn!("error mapping layer surface {id:?}: {err}");
                }
            }
            (true, false) => self.layer_unmap(id),
            _ => self.layer_commit(id),
        }
    }
}
