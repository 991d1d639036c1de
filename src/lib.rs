// ============================================================================
// LIVE MAP WIDGET - Mapa en vivo para dashboards IoT (Rust + WASM)
// ============================================================================
// - Services: SOLO comunicación (almacenamiento, geolocalización)
// - ViewModels: preparación de datos sin estado (orden, iconos, popups)
// - Maps: superficie de mapa + primitivas de renderizado intercambiables
// - State: ciclo de vida del widget (polling, reconfiguración, desmontaje)
// ============================================================================

pub mod config;
pub mod maps;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
pub mod components;

#[cfg(test)]
mod testing;

pub use maps::{MapBackend, MapSurface};
pub use models::{DataSource, LocationRecord, MapConfiguration, WidgetConfig};
pub use state::{LifecycleController, MapServices, WidgetView};

#[cfg(target_arch = "wasm32")]
pub use wasm_entry::*;

#[cfg(target_arch = "wasm32")]
mod wasm_entry {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use wasm_bindgen::prelude::*;
    use wasm_logger::Config;

    use crate::components::{MapWidget, MapWidgetProps};
    use crate::config::CONFIG;
    use crate::models::WidgetConfig;

    // Widgets montados, por id del elemento anfitrión
    thread_local! {
        static WIDGETS: RefCell<HashMap<String, yew::AppHandle<MapWidget>>> = RefCell::new(HashMap::new());
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        if CONFIG.is_logging_enabled() {
            let level = if CONFIG.is_production() { log::Level::Info } else { log::Level::Debug };
            wasm_logger::init(Config::new(level));
        }
        log::info!("🚀 Live map widget listo");
        Ok(())
    }

    fn parse_config(config_json: &str) -> Result<WidgetConfig, JsValue> {
        serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&format!("Invalid widget config: {}", e)))
    }

    /// Monta un widget dentro del elemento `host_id` con la configuración JSON del dashboard
    #[wasm_bindgen(js_name = mountMapWidget)]
    pub fn mount_map_widget(host_id: &str, config_json: &str) -> Result<(), JsValue> {
        let config = parse_config(config_json)?;
        let host = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(host_id))
            .ok_or_else(|| JsValue::from_str(&format!("Element #{} not found", host_id)))?;

        unmount_map_widget(host_id);
        let handle = yew::Renderer::<MapWidget>::with_root_and_props(host, MapWidgetProps { config }).render();
        WIDGETS.with(|widgets| widgets.borrow_mut().insert(host_id.to_string(), handle));
        Ok(())
    }

    /// Nueva configuración para un widget ya montado
    #[wasm_bindgen(js_name = updateMapWidget)]
    pub fn update_map_widget(host_id: &str, config_json: &str) -> Result<(), JsValue> {
        let config = parse_config(config_json)?;
        WIDGETS.with(|widgets| match widgets.borrow_mut().get_mut(host_id) {
            Some(handle) => {
                handle.update(MapWidgetProps { config });
                Ok(())
            }
            None => Err(JsValue::from_str(&format!("No map widget mounted on #{}", host_id))),
        })
    }

    #[wasm_bindgen(js_name = unmountMapWidget)]
    pub fn unmount_map_widget(host_id: &str) {
        let handle = WIDGETS.with(|widgets| widgets.borrow_mut().remove(host_id));
        if let Some(handle) = handle {
            handle.destroy();
        }
    }
}
