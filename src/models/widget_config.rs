// ============================================================================
// WIDGET CONFIG - Lo que el dashboard entrega al widget de mapa
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::models::{Coordinates, MapConfiguration, RuntimeQuery};

/// Flags de presentación de popups / etiquetas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayFlags {
    pub show_custom_fields: bool,
    pub always_show_label: bool,
}

/// Configuración completa de una instancia del widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub container_id: String,
    pub product_id: Option<String>,
    pub table_name: Option<String>,
    pub device_id: Option<String>,
    pub map: MapConfiguration,
    pub display: DisplayFlags,
    pub show_user_location: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            product_id: None,
            table_name: None,
            device_id: None,
            map: MapConfiguration::default(),
            display: DisplayFlags::default(),
            show_user_location: false,
        }
    }
}

/// Origen de los datos del mapa
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Configuración incompleta: no se consulta nada
    None,
    /// Vista previa (modo diseño): un único punto fijo
    Static(Coordinates),
    /// Datos vivos consultados por intervalo
    Live(RuntimeQuery),
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl WidgetConfig {
    pub fn data_source(&self) -> DataSource {
        if self.map.design_mode {
            return DataSource::Static(self.map.center);
        }
        match (non_empty(&self.product_id), non_empty(&self.table_name)) {
            (Some(product_id), Some(table_name)) => DataSource::Live(RuntimeQuery {
                product_id,
                table_name,
                device_id: non_empty(&self.device_id),
                limit: CONFIG.max_rows,
            }),
            _ => DataSource::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_config() -> WidgetConfig {
        WidgetConfig {
            product_id: Some("p-1".to_string()),
            table_name: Some("gps".to_string()),
            device_id: Some("  ".to_string()),
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_live_source_requires_product_and_table() {
        match live_config().data_source() {
            DataSource::Live(query) => {
                assert_eq!(query.product_id, "p-1");
                assert_eq!(query.table_name, "gps");
                assert_eq!(query.device_id, None);
                assert!(query.limit <= 100);
            }
            other => panic!("unexpected source: {:?}", other),
        }

        let mut incomplete = live_config();
        incomplete.product_id = Some(String::new());
        assert_eq!(incomplete.data_source(), DataSource::None);

        incomplete.product_id = None;
        assert_eq!(incomplete.data_source(), DataSource::None);
    }

    #[test]
    fn test_design_mode_is_static_preview() {
        let mut config = live_config();
        config.map.design_mode = true;
        assert_eq!(config.data_source(), DataSource::Static(config.map.center));
    }
}
