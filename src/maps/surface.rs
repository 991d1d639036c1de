// ============================================================================
// MAP SURFACE - Dueño exclusivo del mapa y de sus capas vivas
// ============================================================================
// Uninitialized → Ready → Disposed (terminal, dispose idempotente).
// Cada reconciliación suelta las capas anteriores ANTES de añadir las nuevas:
// las capas se sustituyen enteras, nunca se parchean.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::CONFIG;
use crate::maps::{ArrowPattern, LayerId, MapBackend, MapError, MapHandle, PolylineStyle};
use crate::models::{ColumnMapping, Coordinates, DisplayFlags, GeoBounds, LocationRecord, MapConfiguration, MarkerVisual, PathVisual};
use crate::services::{GeolocationOptions, Geolocator};
use crate::utils::{Scheduler, ARROW_OFFSET, ARROW_PIXEL_SIZE, ARROW_REPEAT, PATH_OPACITY, PATH_WEIGHT};
use crate::viewmodels::{MarkerIconResolver, PopupComposer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    Uninitialized,
    Ready,
    Disposed,
}

/// Grupo de marcadores de datos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLayer {
    pub group: LayerId,
    pub count: usize,
}

/// Capas vivas del mapa. Nunca se persisten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLayers {
    pub tiles: Option<LayerId>,
    pub markers: Option<MarkerLayer>,
    pub path: Option<LayerId>,
    pub arrows: Option<LayerId>,
    pub user_location: Option<LayerId>,
}

impl RenderedLayers {
    pub fn is_empty(&self) -> bool {
        *self == RenderedLayers::default()
    }
}

struct SurfaceInner {
    backend: Box<dyn MapBackend>,
    phase: SurfacePhase,
    map: Option<MapHandle>,
    layers: RenderedLayers,
    user_location_wanted: bool,
    location_request: u64,
}

impl SurfaceInner {
    fn ready_map(&self) -> Result<MapHandle, MapError> {
        match (self.phase, self.map) {
            (SurfacePhase::Ready, Some(map)) => Ok(map),
            (SurfacePhase::Disposed, _) => Err(MapError::Disposed),
            _ => Err(MapError::NotReady),
        }
    }

    fn release(&mut self, map: MapHandle, layer: Option<LayerId>) {
        if let Some(layer) = layer {
            self.backend.remove_layer(map, layer);
        }
    }

    fn release_markers(&mut self, map: MapHandle) {
        let markers = self.layers.markers.take().map(|m| m.group);
        self.release(map, markers);
    }

    fn release_path(&mut self, map: MapHandle) {
        // El decorador depende de la línea: se quita primero
        let arrows = self.layers.arrows.take();
        self.release(map, arrows);
        let path = self.layers.path.take();
        self.release(map, path);
    }

    fn release_user_location(&mut self, map: MapHandle) {
        let user = self.layers.user_location.take();
        self.release(map, user);
    }
}

/// Handle de la superficie de mapa (un hilo, clonable)
#[derive(Clone)]
pub struct MapSurface {
    inner: Rc<RefCell<SurfaceInner>>,
    scheduler: Rc<dyn Scheduler>,
    geolocator: Rc<dyn Geolocator>,
}

impl MapSurface {
    pub fn new(backend: Box<dyn MapBackend>, scheduler: Rc<dyn Scheduler>, geolocator: Rc<dyn Geolocator>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SurfaceInner {
                backend,
                phase: SurfacePhase::Uninitialized,
                map: None,
                layers: RenderedLayers::default(),
                user_location_wanted: false,
                location_request: 0,
            })),
            scheduler,
            geolocator,
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        self.inner.borrow().phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == SurfacePhase::Ready
    }

    /// Copia de las capas vivas
    pub fn layers(&self) -> RenderedLayers {
        self.inner.borrow().layers.clone()
    }

    /// Crea el mapa, una única capa de teselas y (fuera de modo diseño) el zoom
    pub fn initialize(&self, container_id: &str, config: &MapConfiguration) -> Result<(), MapError> {
        let mut inner = self.inner.borrow_mut();
        match inner.phase {
            SurfacePhase::Uninitialized => {}
            SurfacePhase::Ready => return Err(MapError::RenderInit("map already initialized".to_string())),
            SurfacePhase::Disposed => return Err(MapError::Disposed),
        }
        if !config.center.is_valid() {
            return Err(MapError::InvalidCoordinates);
        }

        log::info!("🗺️ Inicializando mapa en #{} ({:?})", container_id, config.tile_provider);

        let map = inner
            .backend
            .create_map(container_id, config.center, config.zoom)
            .map_err(|e| MapError::RenderInit(e.to_string()))?;

        let provider = config.tile_provider;
        let tiles = inner
            .backend
            .add_tile_layer(map, provider.url_template(), provider.attribution(), provider.max_zoom())
            .and_then(|tiles| {
                if !config.design_mode {
                    inner.backend.add_zoom_control(map)?;
                }
                Ok(tiles)
            });

        match tiles {
            Ok(tiles) => {
                inner.map = Some(map);
                inner.layers.tiles = Some(tiles);
                inner.phase = SurfacePhase::Ready;
                log::info!("✅ Mapa listo");
                Ok(())
            }
            Err(e) => {
                // Mapa a medio construir: se desmonta antes de informar
                inner.backend.destroy_map(map);
                Err(MapError::RenderInit(e.to_string()))
            }
        }
    }

    /// Reemplaza todos los marcadores de datos (uno por registro válido)
    pub fn reconcile_markers(
        &self,
        records: &[LocationRecord],
        visual: &MarkerVisual,
        display: &DisplayFlags,
        columns: &ColumnMapping,
    ) -> Result<usize, MapError> {
        let mut inner = self.inner.borrow_mut();
        let map = inner.ready_map()?;
        inner.release_markers(map);

        let group = inner.backend.create_layer_group(map)?;
        let icon = MarkerIconResolver::resolve(&visual.kind, &visual.color);

        let mut count = 0;
        for record in records.iter().filter(|r| r.coordinates().is_valid()) {
            let popup = PopupComposer::compose(record, display, columns);
            if let Err(e) = inner
                .backend
                .add_marker(map, Some(group), record.coordinates(), &icon, Some(&popup))
            {
                inner.backend.remove_layer(map, group);
                log::error!("❌ Error añadiendo marcador {}: {}", record.id, e);
                return Err(e);
            }
            count += 1;
        }

        inner.layers.markers = Some(MarkerLayer { group, count });
        log::debug!("📍 {} marcadores en el mapa", count);
        Ok(count)
    }

    /// Reemplaza recorrido y flechas. Solo hay línea con ≥ 2 puntos válidos.
    pub fn reconcile_path(&self, ordered: &[LocationRecord], visual: &PathVisual) -> Result<(), MapError> {
        let mut inner = self.inner.borrow_mut();
        let map = inner.ready_map()?;
        inner.release_path(map);

        let points: Vec<Coordinates> = ordered
            .iter()
            .map(LocationRecord::coordinates)
            .filter(Coordinates::is_valid)
            .collect();

        if !visual.enabled || points.len() < 2 {
            return Ok(());
        }

        let style = PolylineStyle {
            color: visual.color.clone(),
            weight: PATH_WEIGHT,
            opacity: PATH_OPACITY,
        };
        let path = inner.backend.add_polyline(map, &points, &style)?;
        inner.layers.path = Some(path);

        if visual.arrows_enabled {
            let pattern = ArrowPattern {
                offset: ARROW_OFFSET.to_string(),
                repeat: ARROW_REPEAT.to_string(),
                pixel_size: ARROW_PIXEL_SIZE,
                color: visual.arrow_color.clone(),
            };
            let arrows = inner.backend.add_decorator(map, path, &[pattern])?;
            inner.layers.arrows = Some(arrows);
        }
        Ok(())
    }

    /// Ajusta la vista a todos los puntos válidos; sin puntos no hace nada
    pub fn fit_to_data(&self, records: &[LocationRecord]) -> Result<(), MapError> {
        let mut inner = self.inner.borrow_mut();
        let map = inner.ready_map()?;

        let points: Vec<Coordinates> = records.iter().map(LocationRecord::coordinates).collect();
        if let Some(bounds) = GeoBounds::from_points(points.iter()) {
            inner.backend.fit_bounds(map, bounds, CONFIG.map_config.fit_padding_px);
        }
        Ok(())
    }

    /// Activa (petición única de posición) o quita el marcador del usuario
    pub fn update_user_location(&self, enabled: bool) {
        let request = {
            let mut inner = self.inner.borrow_mut();
            let map = match inner.ready_map() {
                Ok(map) => map,
                Err(_) => return,
            };

            inner.user_location_wanted = enabled;
            inner.location_request += 1;
            if !enabled {
                inner.release_user_location(map);
                return;
            }
            inner.location_request
        };

        let weak: Weak<RefCell<SurfaceInner>> = Rc::downgrade(&self.inner);
        let position = self.geolocator.current_position(GeolocationOptions::default());

        self.scheduler.spawn(Box::pin(async move {
            let result = position.await;

            let cell = match weak.upgrade() {
                Some(cell) => cell,
                None => return,
            };
            let mut inner = cell.borrow_mut();

            // El mapa pudo desmontarse o la opción desactivarse mientras tanto
            let map = match inner.ready_map() {
                Ok(map) => map,
                Err(_) => {
                    log::debug!("📍 Posición descartada: mapa ya desmontado");
                    return;
                }
            };
            if !inner.user_location_wanted || inner.location_request != request {
                log::debug!("📍 Posición descartada: petición obsoleta");
                return;
            }

            match result {
                Ok(position) if position.is_valid() => {
                    inner.release_user_location(map);
                    let icon = MarkerIconResolver::user_location();
                    match inner.backend.add_marker(map, None, position, &icon, None) {
                        Ok(marker) => inner.layers.user_location = Some(marker),
                        Err(e) => log::warn!("⚠️ No se pudo colocar el marcador de usuario: {}", e),
                    }
                }
                Ok(position) => log::warn!("⚠️ Posición de usuario inválida: {:?}", position),
                Err(e) => log::warn!("⚠️ Geolocalización no disponible: {}", e),
            }
        }));
    }

    /// Quita marcadores y recorrido de datos; tiles y posición del usuario se quedan
    pub fn clear_data(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Ok(map) = inner.ready_map() {
            inner.release_markers(map);
            inner.release_path(map);
        }
    }

    /// Suelta todas las capas y desmonta el mapa. Seguro de llamar varias veces.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.phase == SurfacePhase::Disposed {
            return;
        }

        if let Some(map) = inner.map.take() {
            inner.release_user_location(map);
            inner.release_path(map);
            inner.release_markers(map);
            let tiles = inner.layers.tiles.take();
            inner.release(map, tiles);
            inner.backend.destroy_map(map);
            log::info!("🧹 Mapa desmontado");
        }

        inner.layers = RenderedLayers::default();
        inner.user_location_wanted = false;
        inner.phase = SurfacePhase::Disposed;
    }
}
