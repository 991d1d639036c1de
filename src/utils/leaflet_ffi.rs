// ============================================================================
// LEAFLET FFI - Foreign Function Interface para Leaflet (+ PolylineDecorator)
// ============================================================================
// Solo wrappers para funciones JS - Sin estado, sin lógica
// ============================================================================

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Instancia `L.Map`
    #[derive(Clone, Debug)]
    pub type LeafletMap;

    /// Cualquier `L.Layer` (teselas, grupo, marcador, polilínea, decorador)
    #[derive(Clone, Debug)]
    pub type LeafletLayer;

    pub type LeafletControl;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn create_map(container_id: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &LeafletMap, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &LeafletMap, layer: &LeafletLayer);

    #[wasm_bindgen(method)]
    pub fn remove(this: &LeafletMap);

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &LeafletLayer, map: &LeafletMap) -> LeafletLayer;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &LeafletLayer, layer: &LeafletLayer);

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &LeafletLayer, content: &str) -> LeafletLayer;

    #[wasm_bindgen(method, js_name = bindTooltip)]
    pub fn bind_tooltip(this: &LeafletLayer, content: &str, options: &JsValue) -> LeafletLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Result<LeafletLayer, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    pub fn layer_group() -> LeafletLayer;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(lat_lng: &JsValue, options: &JsValue) -> LeafletLayer;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    pub fn polyline(lat_lngs: &JsValue, options: &JsValue) -> LeafletLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = polylineDecorator)]
    pub fn polyline_decorator(line: &LeafletLayer, options: &JsValue) -> Result<LeafletLayer, JsValue>;

    #[wasm_bindgen(js_namespace = ["L", "Symbol"], js_name = arrowHead)]
    pub fn arrow_head(options: &JsValue) -> JsValue;

    #[wasm_bindgen(catch, js_namespace = ["L", "control"], js_name = zoom)]
    pub fn zoom_control(options: &JsValue) -> Result<LeafletControl, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_control_to(this: &LeafletControl, map: &LeafletMap);
}
