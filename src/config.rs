use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: String,
    pub environment: String,
    pub enable_logging: bool,
    pub default_refresh_interval_ms: u32,
    pub max_rows: usize,
    pub map_config: MapDefaults,
    pub geolocation_config: GeolocationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            default_refresh_interval_ms: 5000,
            max_rows: MAX_ROWS_LIMIT,
            map_config: MapDefaults::default(),
            geolocation_config: GeolocationConfig::default(),
        }
    }
}

/// Límite duro del backend: nunca se piden más de 100 filas
pub const MAX_ROWS_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefaults {
    pub default_center_lat: f64,
    pub default_center_lng: f64,
    pub default_zoom: f64,
    pub fit_padding_px: u32,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            default_center_lat: 48.8566,
            default_center_lng: 2.3522,
            default_zoom: 12.0,
            fit_padding_px: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub timeout_ms: u32,
    pub max_age_ms: u32,
    pub high_accuracy: bool,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_age_ms: 60_000,
            high_accuracy: true,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: option_env!("BACKEND_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            environment: option_env!("ENVIRONMENT")
                .unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true").parse().unwrap_or(true),
            default_refresh_interval_ms: option_env!("DEFAULT_REFRESH_INTERVAL_MS")
                .unwrap_or("5000").parse().unwrap_or(5000),
            max_rows: option_env!("MAX_ROWS")
                .unwrap_or("100").parse::<usize>().unwrap_or(MAX_ROWS_LIMIT)
                .clamp(1, MAX_ROWS_LIMIT),
            map_config: MapDefaults {
                default_center_lat: option_env!("DEFAULT_MAP_CENTER_LAT")
                    .unwrap_or("48.8566").parse().unwrap_or(48.8566),
                default_center_lng: option_env!("DEFAULT_MAP_CENTER_LNG")
                    .unwrap_or("2.3522").parse().unwrap_or(2.3522),
                default_zoom: option_env!("DEFAULT_MAP_ZOOM")
                    .unwrap_or("12.0").parse().unwrap_or(12.0),
                fit_padding_px: option_env!("FIT_PADDING_PX")
                    .unwrap_or("50").parse().unwrap_or(50),
            },
            geolocation_config: GeolocationConfig {
                timeout_ms: option_env!("GEOLOCATION_TIMEOUT_MS")
                    .unwrap_or("10000").parse().unwrap_or(10_000),
                max_age_ms: option_env!("GEOLOCATION_MAX_AGE_MS")
                    .unwrap_or("60000").parse().unwrap_or(60_000),
                high_accuracy: option_env!("GEOLOCATION_HIGH_ACCURACY")
                    .unwrap_or("true").parse().unwrap_or(true),
            },
        }
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
