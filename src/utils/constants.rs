/// Ruta del endpoint de datos de runtime
pub const RUNTIME_DATA_PATH: &str = "/api/v1/runtime-data";

/// Estilo de la polilínea del recorrido
pub const PATH_WEIGHT: f64 = 3.0;
pub const PATH_OPACITY: f64 = 0.8;

/// Flechas de dirección: primera al 10% del recorrido, luego cada 20%
pub const ARROW_OFFSET: &str = "10%";
pub const ARROW_REPEAT: &str = "20%";
pub const ARROW_PIXEL_SIZE: u32 = 12;

/// Color del marcador de "mi ubicación"
pub const USER_LOCATION_COLOR: &str = "#ef4444";
