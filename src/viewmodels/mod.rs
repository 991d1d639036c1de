// ============================================================================
// VIEWMODELS - Preparación de datos para el mapa (sin estado, sin I/O)
// ============================================================================

pub mod marker_icons;
pub mod point_orderer;
pub mod popup_composer;

pub use marker_icons::{IconDescriptor, MarkerIconResolver, MarkerKind};
pub use point_orderer::{OrderStrategy, PointOrderer};
pub use popup_composer::{PopupComposer, PopupContent};
