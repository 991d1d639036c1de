// ============================================================================
// LOCATION MODELS - Filas crudas del backend y registros validados
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Par latitud/longitud en grados decimales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Rango WGS84: lat ∈ [-90, 90], lng ∈ [-180, 180]. NaN nunca es válido.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Caja envolvente (suroeste / noreste)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl GeoBounds {
    /// Bounding box de los puntos válidos; `None` si no hay ninguno
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinates>,
    {
        let mut bounds: Option<GeoBounds> = None;
        for point in points.into_iter().filter(|p| p.is_valid()) {
            bounds = Some(match bounds {
                None => GeoBounds { south_west: *point, north_east: *point },
                Some(b) => GeoBounds {
                    south_west: Coordinates::new(
                        b.south_west.latitude.min(point.latitude),
                        b.south_west.longitude.min(point.longitude),
                    ),
                    north_east: Coordinates::new(
                        b.north_east.latitude.max(point.latitude),
                        b.north_east.longitude.max(point.longitude),
                    ),
                },
            });
        }
        bounds
    }
}

/// Fila de datos de runtime tal y como la devuelve el almacenamiento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDataRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data_payload: Map<String, Value>,
}

/// Parámetros de consulta al almacenamiento (producto / tabla / dispositivo)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeQuery {
    pub product_id: String,
    pub table_name: String,
    #[serde(default)]
    pub device_id: Option<String>,
    pub limit: usize,
}

/// Valor crudo de la columna índice (string o número)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexKey {
    Number(f64),
    Text(String),
}

impl IndexKey {
    /// Lee la clave desde un valor JSON arbitrario. `null`, objetos y arrays no cuentan.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(IndexKey::Number),
            Value::String(s) => Some(IndexKey::Text(s.clone())),
            _ => None,
        }
    }

    /// Valor numérico si la clave es parseable
    pub fn as_number(&self) -> Option<f64> {
        match self {
            IndexKey::Number(n) if n.is_finite() => Some(*n),
            IndexKey::Number(_) => None,
            IndexKey::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Registro de ubicación ya validado
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub index_key: Option<IndexKey>,
    /// Payload completo, sin tocar, para los popups
    pub extra: Map<String, Value>,
}

impl LocationRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
