use std::collections::HashMap;

use js_sys::{Object, Reflect};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::models::{Coordinates, GeoBounds};
use crate::utils::leaflet_ffi::{self, LeafletLayer, LeafletMap};
use crate::viewmodels::{IconDescriptor, PopupContent};
use super::{ArrowPattern, LayerId, LayerRegistry, MapBackend, MapError, MapHandle, PolylineStyle};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    center: [f64; 2],
    zoom: f64,
    zoom_control: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions<'a> {
    attribution: &'a str,
    max_zoom: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DivIconOptions<'a> {
    html: &'a str,
    class_name: &'a str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
}

#[derive(Serialize)]
struct PolylineOptions<'a> {
    color: &'a str,
    weight: f64,
    opacity: f64,
}

#[derive(Serialize)]
struct TooltipOptions {
    permanent: bool,
    direction: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArrowHeadOptions<'a> {
    pixel_size: u32,
    polygon: bool,
    path_options: ArrowPathOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArrowPathOptions<'a> {
    color: &'a str,
    weight: u32,
    stroke: bool,
    fill_opacity: f64,
}

#[derive(Serialize)]
struct FitOptions {
    padding: [u32; 2],
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, MapError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| MapError::Backend(e.to_string()))
}

fn lat_lng(point: Coordinates) -> [f64; 2] {
    [point.latitude, point.longitude]
}

fn js_error(error: JsValue) -> MapError {
    MapError::Backend(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

/// Renderizador de mapas para web usando Leaflet
#[derive(Default)]
pub struct LeafletBackend {
    maps: HashMap<MapHandle, LeafletMap>,
    layers: LayerRegistry<LeafletLayer>,
}

impl LeafletBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, map: MapHandle) -> Result<&LeafletMap, MapError> {
        self.maps.get(&map).ok_or(MapError::NotReady)
    }
}

impl MapBackend for LeafletBackend {
    fn create_map(&mut self, container_id: &str, center: Coordinates, zoom: f64) -> Result<MapHandle, MapError> {
        let options = to_js(&MapOptions {
            center: lat_lng(center),
            zoom,
            zoom_control: false,
        })?;
        let map = leaflet_ffi::create_map(container_id, &options).map_err(|e| MapError::RenderInit(js_error(e).to_string()))?;

        let handle = MapHandle(self.layers.next_id());
        self.maps.insert(handle, map);
        Ok(handle)
    }

    fn add_tile_layer(&mut self, map: MapHandle, url_template: &str, attribution: &str, max_zoom: u8) -> Result<LayerId, MapError> {
        let options = to_js(&TileOptions { attribution, max_zoom })?;
        let tiles = leaflet_ffi::tile_layer(url_template, &options).map_err(js_error)?;
        tiles.add_to(self.map(map)?);
        Ok(self.layers.insert(tiles))
    }

    fn add_zoom_control(&mut self, map: MapHandle) -> Result<(), MapError> {
        let control = leaflet_ffi::zoom_control(&Object::new().into()).map_err(js_error)?;
        control.add_control_to(self.map(map)?);
        Ok(())
    }

    fn create_layer_group(&mut self, map: MapHandle) -> Result<LayerId, MapError> {
        let group = leaflet_ffi::layer_group();
        group.add_to(self.map(map)?);
        Ok(self.layers.insert(group))
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        group: Option<LayerId>,
        position: Coordinates,
        icon: &IconDescriptor,
        popup: Option<&PopupContent>,
    ) -> Result<LayerId, MapError> {
        let icon = leaflet_ffi::div_icon(&to_js(&DivIconOptions {
            html: &icon.content,
            class_name: &icon.class_name,
            icon_size: icon.size,
            icon_anchor: icon.anchor,
        })?);
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("icon"), &icon).map_err(js_error)?;

        let marker = leaflet_ffi::marker(&to_js(&lat_lng(position))?, &options);
        if let Some(popup) = popup {
            marker.bind_popup(&popup.popup_text);
            if let Some(label) = &popup.permanent_label_text {
                marker.bind_tooltip(label, &to_js(&TooltipOptions { permanent: true, direction: "top" })?);
            }
        }

        if let Some(group) = group {
            if let Some(group_layer) = self.layers.get(group) {
                group_layer.add_layer(&marker);
                return Ok(self.layers.insert_member(group, marker));
            }
        }
        marker.add_to(self.map(map)?);
        Ok(self.layers.insert(marker))
    }

    fn add_polyline(&mut self, map: MapHandle, points: &[Coordinates], style: &PolylineStyle) -> Result<LayerId, MapError> {
        let points: Vec<[f64; 2]> = points.iter().copied().map(lat_lng).collect();
        let options = to_js(&PolylineOptions {
            color: &style.color,
            weight: style.weight,
            opacity: style.opacity,
        })?;
        let line = leaflet_ffi::polyline(&to_js(&points)?, &options);
        line.add_to(self.map(map)?);
        Ok(self.layers.insert(line))
    }

    fn add_decorator(&mut self, map: MapHandle, polyline: LayerId, patterns: &[ArrowPattern]) -> Result<LayerId, MapError> {
        let line = self.layers.get(polyline).ok_or(MapError::NotReady)?.clone();

        let js_patterns = js_sys::Array::new();
        for pattern in patterns {
            let symbol = leaflet_ffi::arrow_head(&to_js(&ArrowHeadOptions {
                pixel_size: pattern.pixel_size,
                polygon: false,
                path_options: ArrowPathOptions {
                    color: &pattern.color,
                    weight: 2,
                    stroke: true,
                    fill_opacity: 1.0,
                },
            })?);
            let entry = Object::new();
            Reflect::set(&entry, &"offset".into(), &JsValue::from_str(&pattern.offset)).map_err(js_error)?;
            Reflect::set(&entry, &"repeat".into(), &JsValue::from_str(&pattern.repeat)).map_err(js_error)?;
            Reflect::set(&entry, &"symbol".into(), &symbol).map_err(js_error)?;
            js_patterns.push(&entry);
        }

        let options = Object::new();
        Reflect::set(&options, &"patterns".into(), &js_patterns).map_err(js_error)?;
        let decorator = leaflet_ffi::polyline_decorator(&line, &options).map_err(js_error)?;
        decorator.add_to(self.map(map)?);
        Ok(self.layers.insert(decorator))
    }

    fn fit_bounds(&mut self, map: MapHandle, bounds: GeoBounds, padding_px: u32) {
        let (Ok(map), Ok(js_bounds), Ok(options)) = (
            self.map(map),
            to_js(&[lat_lng(bounds.south_west), lat_lng(bounds.north_east)]),
            to_js(&FitOptions { padding: [padding_px, padding_px] }),
        ) else {
            log::warn!("⚠️ fitBounds omitido: mapa no disponible");
            return;
        };
        map.fit_bounds(&js_bounds, &options);
    }

    fn remove_layer(&mut self, map: MapHandle, layer: LayerId) {
        if let (Some(leaflet_map), Some(layer)) = (self.maps.get(&map), self.layers.remove(layer)) {
            leaflet_map.remove_layer(&layer);
        }
    }

    fn destroy_map(&mut self, map: MapHandle) {
        if let Some(leaflet_map) = self.maps.remove(&map) {
            leaflet_map.remove();
        }
        self.layers.clear();
        log::info!("🗑️ Instancia Leaflet eliminada");
    }
}
