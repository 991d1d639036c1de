// Módulo de mapas: primitivas de renderizado + superficie reconciliada

#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod registry;
pub mod surface;
pub mod traits;

pub use registry::LayerRegistry;
pub use surface::{MapSurface, RenderedLayers, SurfacePhase};
pub use traits::{ArrowPattern, LayerId, MapBackend, MapError, MapHandle, PolylineStyle};
