// ============================================================================
// MARKER ICONS - (tipo visual, color) → descriptor de icono
// ============================================================================

use serde::Serialize;

use crate::utils::USER_LOCATION_COLOR;

const FALLBACK_COLOR: &str = "#3b82f6";

/// Descriptor de icono independiente de la librería de mapas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconDescriptor {
    /// [ancho, alto] en píxeles
    pub size: [u32; 2],
    /// Punto del icono que cae sobre la coordenada
    pub anchor: [u32; 2],
    pub class_name: String,
    /// HTML del icono
    pub content: String,
}

/// Catálogo de visuales temáticos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Dot,
    Pin,
    Vehicle,
    Truck,
    Person,
    Bike,
    Boat,
    Drone,
    Sensor,
}

impl MarkerKind {
    /// Tipos desconocidos → punto de color
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "pin" => MarkerKind::Pin,
            "vehicle" | "car" => MarkerKind::Vehicle,
            "truck" => MarkerKind::Truck,
            "person" | "user" => MarkerKind::Person,
            "bike" | "bicycle" => MarkerKind::Bike,
            "boat" | "ship" => MarkerKind::Boat,
            "drone" => MarkerKind::Drone,
            "sensor" | "device" => MarkerKind::Sensor,
            _ => MarkerKind::Dot,
        }
    }

    fn glyph(&self) -> Option<&'static str> {
        match self {
            MarkerKind::Dot | MarkerKind::Pin => None,
            MarkerKind::Vehicle => Some("🚗"),
            MarkerKind::Truck => Some("🚚"),
            MarkerKind::Person => Some("🚶"),
            MarkerKind::Bike => Some("🚲"),
            MarkerKind::Boat => Some("🚤"),
            MarkerKind::Drone => Some("🛸"),
            MarkerKind::Sensor => Some("📡"),
        }
    }
}

/// Acepta `#rgb`, `#rrggbb`, `#rrggbbaa` y nombres CSS; el resto cae al azul por defecto
pub fn sanitize_color(color: &str) -> String {
    let color = color.trim();
    let is_hex = color
        .strip_prefix('#')
        .map(|hex| matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    let is_name = !color.is_empty() && color.len() <= 32 && color.chars().all(|c| c.is_ascii_alphabetic());

    if is_hex || is_name {
        color.to_string()
    } else {
        FALLBACK_COLOR.to_string()
    }
}

pub struct MarkerIconResolver;

impl MarkerIconResolver {
    pub fn resolve(kind: &str, color: &str) -> IconDescriptor {
        let color = sanitize_color(color);
        match MarkerKind::parse(kind) {
            MarkerKind::Dot => Self::dot(&color, 14, "map-marker-dot"),
            MarkerKind::Pin => IconDescriptor {
                size: [24, 36],
                anchor: [12, 36],
                class_name: "map-marker-pin".to_string(),
                content: format!(
                    "<svg width=\"24\" height=\"36\" viewBox=\"0 0 24 36\"><path d=\"M12 0C5.4 0 0 5.4 0 12c0 9 12 24 12 24s12-15 12-24C24 5.4 18.6 0 12 0z\" fill=\"{}\"/><circle cx=\"12\" cy=\"12\" r=\"4.5\" fill=\"#fff\"/></svg>",
                    color
                ),
            },
            themed => IconDescriptor {
                size: [32, 32],
                anchor: [16, 16],
                class_name: "map-marker-themed".to_string(),
                content: format!(
                    "<div style=\"width:32px;height:32px;border-radius:50%;background:{};display:flex;align-items:center;justify-content:center;font-size:18px;border:2px solid #fff;box-shadow:0 1px 4px rgba(0,0,0,.4)\">{}</div>",
                    color,
                    themed.glyph().unwrap_or_default()
                ),
            },
        }
    }

    /// Marcador de "mi ubicación", independiente de los de datos
    pub fn user_location() -> IconDescriptor {
        Self::dot(USER_LOCATION_COLOR, 18, "map-marker-user")
    }

    fn dot(color: &str, diameter: u32, class_name: &str) -> IconDescriptor {
        IconDescriptor {
            size: [diameter, diameter],
            anchor: [diameter / 2, diameter / 2],
            class_name: class_name.to_string(),
            content: format!(
                "<div style=\"width:{d}px;height:{d}px;border-radius:50%;background:{c};border:2px solid #fff;box-shadow:0 0 4px rgba(0,0,0,.5)\"></div>",
                d = diameter,
                c = color
            ),
        }
    }
}
