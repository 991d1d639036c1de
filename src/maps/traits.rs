use crate::models::{Coordinates, GeoBounds};
use crate::viewmodels::marker_icons::IconDescriptor;
use crate::viewmodels::popup_composer::PopupContent;

/// Instancia de mapa creada por el backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(pub u64);

/// Capa viva dentro de un mapa (teselas, grupo, marcador, línea, decorador)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Estilo de la polilínea del recorrido
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

/// Patrón de glifos repetidos sobre una línea
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPattern {
    pub offset: String,
    pub repeat: String,
    pub pixel_size: u32,
    pub color: String,
}

/// Primitivas de renderizado que consume `MapSurface`.
/// Cualquier librería de mapas que las cumpla es intercambiable.
pub trait MapBackend {
    fn create_map(&mut self, container_id: &str, center: Coordinates, zoom: f64) -> Result<MapHandle, MapError>;

    fn add_tile_layer(&mut self, map: MapHandle, url_template: &str, attribution: &str, max_zoom: u8) -> Result<LayerId, MapError>;

    fn add_zoom_control(&mut self, map: MapHandle) -> Result<(), MapError>;

    /// Grupo vacío ya añadido al mapa
    fn create_layer_group(&mut self, map: MapHandle) -> Result<LayerId, MapError>;

    /// Marcador dentro de un grupo (o directamente en el mapa si `group` es `None`)
    fn add_marker(
        &mut self,
        map: MapHandle,
        group: Option<LayerId>,
        position: Coordinates,
        icon: &IconDescriptor,
        popup: Option<&PopupContent>,
    ) -> Result<LayerId, MapError>;

    fn add_polyline(&mut self, map: MapHandle, points: &[Coordinates], style: &PolylineStyle) -> Result<LayerId, MapError>;

    fn add_decorator(&mut self, map: MapHandle, polyline: LayerId, patterns: &[ArrowPattern]) -> Result<LayerId, MapError>;

    fn fit_bounds(&mut self, map: MapHandle, bounds: GeoBounds, padding_px: u32);

    /// Quita la capa del mapa y libera la referencia
    fn remove_layer(&mut self, map: MapHandle, layer: LayerId);

    /// Desmonta la instancia del mapa completa
    fn destroy_map(&mut self, map: MapHandle);
}

/// Error del mapa
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    NotReady,
    Disposed,
    InvalidCoordinates,
    RenderInit(String),
    Backend(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotReady => write!(f, "Map is not ready"),
            MapError::Disposed => write!(f, "Map has been disposed"),
            MapError::InvalidCoordinates => write!(f, "Invalid coordinates"),
            MapError::RenderInit(msg) => write!(f, "Map initialization failed: {}", msg),
            MapError::Backend(msg) => write!(f, "Map backend error: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}
