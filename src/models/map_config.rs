// ============================================================================
// MAP CONFIGURATION - Configuración del widget de mapa (desde el dashboard)
// ============================================================================
// Inmutable durante una pasada de reconciliación. Los cambios de
// tile_provider / shape_clip / design_mode obligan a re-inicializar el mapa.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::models::Coordinates;

/// Proveedor de teselas de fondo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileProvider {
    #[default]
    OpenStreetMap,
    CartoLight,
    CartoDark,
    EsriSatellite,
    OpenTopoMap,
}

impl TileProvider {
    pub fn url_template(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileProvider::CartoLight => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            TileProvider::CartoDark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            TileProvider::EsriSatellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            TileProvider::OpenTopoMap => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => "&copy; OpenStreetMap contributors",
            TileProvider::CartoLight | TileProvider::CartoDark => {
                "&copy; OpenStreetMap contributors &copy; CARTO"
            }
            TileProvider::EsriSatellite => "Tiles &copy; Esri",
            TileProvider::OpenTopoMap => "&copy; OpenStreetMap contributors, SRTM | &copy; OpenTopoMap",
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            TileProvider::OpenTopoMap => 17,
            TileProvider::EsriSatellite => 18,
            _ => 19,
        }
    }
}

/// Aspecto de los marcadores de datos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerVisual {
    pub color: String,
    /// Tipo visual ("default", "truck", "person"...). Los desconocidos caen al punto de color.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for MarkerVisual {
    fn default() -> Self {
        Self {
            color: "#3b82f6".to_string(),
            kind: "default".to_string(),
        }
    }
}

/// Aspecto del recorrido y de sus flechas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathVisual {
    pub enabled: bool,
    pub color: String,
    pub arrows_enabled: bool,
    pub arrow_color: String,
}

impl Default for PathVisual {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#3b82f6".to_string(),
            arrows_enabled: false,
            arrow_color: "#1e40af".to_string(),
        }
    }
}

/// Nombres de columna dentro del payload libre de cada fila
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub latitude: String,
    pub longitude: String,
    pub index: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            index: None,
            title: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    None,
    Circle,
    Rounded,
    Polygon,
}

/// Recorte de forma del contenedor del mapa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeClip {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub sides: u8,
}

impl Default for ShapeClip {
    fn default() -> Self {
        Self { kind: ShapeKind::None, sides: 6 }
    }
}

impl ShapeClip {
    /// Valor CSS `clip-path` para el contenedor, `None` sin recorte
    pub fn clip_path_css(&self) -> Option<String> {
        match self.kind {
            ShapeKind::None => None,
            ShapeKind::Circle => Some("circle(50% at 50% 50%)".to_string()),
            ShapeKind::Rounded => Some("inset(0 round 16px)".to_string()),
            ShapeKind::Polygon => {
                let sides = self.sides.clamp(3, 12) as usize;
                let points: Vec<String> = (0..sides)
                    .map(|i| {
                        // Primer vértice arriba, sentido horario
                        let angle = std::f64::consts::TAU * i as f64 / sides as f64
                            - std::f64::consts::FRAC_PI_2;
                        format!(
                            "{:.2}% {:.2}%",
                            50.0 + 50.0 * angle.cos(),
                            50.0 + 50.0 * angle.sin()
                        )
                    })
                    .collect();
                Some(format!("polygon({})", points.join(", ")))
            }
        }
    }
}

/// Configuración completa del mapa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfiguration {
    pub tile_provider: TileProvider,
    pub center: Coordinates,
    pub zoom: f64,
    pub marker_visual: MarkerVisual,
    pub path_visual: PathVisual,
    pub column_mapping: ColumnMapping,
    pub refresh_interval_ms: u32,
    pub design_mode: bool,
    pub shape_clip: ShapeClip,
}

impl Default for MapConfiguration {
    fn default() -> Self {
        Self {
            tile_provider: TileProvider::default(),
            center: Coordinates::new(CONFIG.map_config.default_center_lat, CONFIG.map_config.default_center_lng),
            zoom: CONFIG.map_config.default_zoom,
            marker_visual: MarkerVisual::default(),
            path_visual: PathVisual::default(),
            column_mapping: ColumnMapping::default(),
            refresh_interval_ms: CONFIG.default_refresh_interval_ms,
            design_mode: false,
            shape_clip: ShapeClip::default(),
        }
    }
}

impl MapConfiguration {
    /// Cambios que el mapa no soporta en caliente → destruir y reconstruir
    pub fn requires_reinit(&self, other: &MapConfiguration) -> bool {
        self.tile_provider != other.tile_provider
            || self.shape_clip != other.shape_clip
            || self.design_mode != other.design_mode
    }
}
