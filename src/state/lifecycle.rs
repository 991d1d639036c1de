// ============================================================================
// LIFECYCLE CONTROLLER - Polling, reconfiguración y desmontaje del widget
// ============================================================================
// Un solo intervalo activo por widget: el anterior se suelta SIEMPRE antes de
// instalar el nuevo. Las consultas pueden solaparse y se aplican en orden de
// llegada (la última en terminar gana); nada se aplica tras el desmontaje.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Utc;
use serde_json::Map;

use crate::maps::{MapBackend, MapSurface};
use crate::models::{DataSource, LocationRecord, WidgetConfig};
use crate::services::{DataFetcher, FetchError, Geolocator, StorageBackend};
use crate::state::{WidgetStatus, WidgetView};
use crate::utils::{IntervalHandle, Scheduler};
use crate::viewmodels::PointOrderer;

/// Intervalo mínimo de refresco aceptado
const MIN_REFRESH_INTERVAL_MS: u32 = 500;

/// Colaboradores externos del widget
#[derive(Clone)]
pub struct MapServices {
    pub storage: Rc<dyn StorageBackend>,
    pub geolocator: Rc<dyn Geolocator>,
    pub scheduler: Rc<dyn Scheduler>,
    /// Cada (re)inicialización necesita un backend nuevo
    pub backend_factory: Rc<dyn Fn() -> Box<dyn MapBackend>>,
}

/// Qué trabajo exige pasar de una configuración a otra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChange {
    pub reinitialize: bool,
    pub restart_polling: bool,
    pub restyle_markers: bool,
    pub restyle_path: bool,
    pub user_location: bool,
}

impl ConfigChange {
    pub fn between(old: &WidgetConfig, new: &WidgetConfig) -> Self {
        let old_map = &old.map;
        let new_map = &new.map;
        Self {
            reinitialize: old_map.requires_reinit(new_map) || old.container_id != new.container_id,
            restart_polling: old.data_source() != new.data_source()
                || old_map.column_mapping != new_map.column_mapping
                || old_map.refresh_interval_ms != new_map.refresh_interval_ms,
            restyle_markers: old_map.marker_visual != new_map.marker_visual
                || old.display != new.display
                || old_map.column_mapping != new_map.column_mapping,
            restyle_path: old_map.path_visual != new_map.path_visual
                || old_map.column_mapping.index != new_map.column_mapping.index,
            user_location: old.show_user_location != new.show_user_location,
        }
    }

    pub fn is_noop(&self) -> bool {
        *self == ConfigChange::default()
    }
}

struct ControllerState {
    config: WidgetConfig,
    surface: Option<MapSurface>,
    polling: Option<IntervalHandle>,
    /// Último snapshot bueno; se sustituye entero en cada consulta correcta
    snapshot: Option<Rc<Vec<LocationRecord>>>,
    /// El snapshot es el punto de vista previa, no datos consultados
    preview: bool,
    mounted: bool,
    fetches_issued: u64,
}

struct Shared {
    state: RefCell<ControllerState>,
    services: MapServices,
    fetcher: DataFetcher,
    status: WidgetStatus,
}

/// Controlador de una instancia del widget de mapa
#[derive(Clone)]
pub struct LifecycleController {
    shared: Rc<Shared>,
}

impl LifecycleController {
    pub fn new(config: WidgetConfig, services: MapServices) -> Self {
        let fetcher = DataFetcher::new(services.storage.clone());
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(ControllerState {
                    config,
                    surface: None,
                    polling: None,
                    snapshot: None,
                    preview: false,
                    mounted: false,
                    fetches_issued: 0,
                }),
                services,
                fetcher,
                status: WidgetStatus::new(),
            }),
        }
    }

    pub fn status(&self) -> WidgetStatus {
        self.shared.status.clone()
    }

    pub fn config(&self) -> WidgetConfig {
        self.shared.state.borrow().config.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.state.borrow().mounted
    }

    pub fn surface(&self) -> Option<MapSurface> {
        self.shared.state.borrow().surface.clone()
    }

    pub fn snapshot(&self) -> Option<Rc<Vec<LocationRecord>>> {
        self.shared.state.borrow().snapshot.clone()
    }

    pub fn fetches_issued(&self) -> u64 {
        self.shared.state.borrow().fetches_issued
    }

    pub fn mount(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.mounted {
                return;
            }
            state.mounted = true;
            log::info!("🗺️ Montando widget de mapa #{}", state.config.container_id);
        }

        self.initialize_surface();
        self.start_polling();
    }

    /// Aplica una nueva configuración haciendo solo el trabajo necesario
    pub fn update_config(&self, config: WidgetConfig) {
        let change = {
            let mut state = self.shared.state.borrow_mut();
            let change = ConfigChange::between(&state.config, &config);
            state.config = config;
            if !state.mounted || change.is_noop() {
                return;
            }
            change
        };
        log::debug!("⚙️ Cambio de configuración: {:?}", change);

        if change.reinitialize {
            self.dispose_surface();
            self.initialize_surface();
        } else {
            if change.restyle_markers || change.restyle_path {
                self.render_snapshot(false);
            }
            if change.user_location {
                let enabled = self.shared.state.borrow().config.show_user_location;
                if let Some(surface) = self.surface() {
                    surface.update_user_location(enabled);
                }
            }
        }

        if change.restart_polling {
            self.start_polling();
        }
    }

    /// Corta el polling y desmonta el mapa. Idempotente.
    pub fn unmount(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if !state.mounted {
                return;
            }
            state.mounted = false;
            state.polling = None;
        }
        self.dispose_surface();
        self.shared.status.clear_subscribers();
        log::info!("🔌 Widget de mapa desmontado");
    }

    /// Dispara una consulta ahora mismo (además del intervalo)
    pub fn refresh(&self) {
        self.fetch_now();
    }

    fn initialize_surface(&self) {
        let (container_id, map_config, show_user_location) = {
            let state = self.shared.state.borrow();
            (
                state.config.container_id.clone(),
                state.config.map.clone(),
                state.config.show_user_location,
            )
        };

        let backend = (self.shared.services.backend_factory)();
        let surface = MapSurface::new(
            backend,
            self.shared.services.scheduler.clone(),
            self.shared.services.geolocator.clone(),
        );

        if let Err(e) = surface.initialize(&container_id, &map_config) {
            log::error!("❌ Error inicializando el mapa: {}", e);
            surface.dispose();
            self.shared.status.set(WidgetView::RenderError(e.to_string()));
            return;
        }

        self.shared.state.borrow_mut().surface = Some(surface.clone());
        if self.shared.status.get().is_error() {
            self.shared.status.set(WidgetView::Idle);
        }
        self.render_snapshot(true);
        if show_user_location {
            surface.update_user_location(true);
        }
    }

    fn dispose_surface(&self) {
        let surface = self.shared.state.borrow_mut().surface.take();
        if let Some(surface) = surface {
            surface.dispose();
        }
    }

    /// Suelta el intervalo anterior e instala uno nuevo según el origen de datos
    fn start_polling(&self) {
        let (source, period_ms) = {
            let mut state = self.shared.state.borrow_mut();
            state.polling = None;
            (
                state.config.data_source(),
                state.config.map.refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS),
            )
        };

        if !matches!(source, DataSource::Static(_)) {
            self.discard_preview();
        }

        match source {
            DataSource::None => {
                log::info!("⏸️ Configuración incompleta: polling detenido");
                if self.shared.state.borrow().snapshot.is_none() {
                    self.shared.status.set(WidgetView::Idle);
                }
            }
            DataSource::Static(center) => {
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.snapshot = Some(Rc::new(vec![preview_record(center)]));
                    state.preview = true;
                }
                self.render_snapshot(true);
            }
            DataSource::Live(query) => {
                log::info!(
                    "⏰ Polling de {}/{} cada {} ms",
                    query.product_id,
                    query.table_name,
                    period_ms
                );
                self.fetch_now();

                let weak = Rc::downgrade(&self.shared);
                let handle = self.shared.services.scheduler.set_interval(
                    period_ms,
                    Box::new(move || {
                        if let Some(controller) = LifecycleController::upgrade(&weak) {
                            controller.fetch_now();
                        }
                    }),
                );
                self.shared.state.borrow_mut().polling = Some(handle);
            }
        }
    }

    /// La vista previa nunca cuenta como datos: se quita del estado y del mapa
    fn discard_preview(&self) {
        let surface = {
            let mut state = self.shared.state.borrow_mut();
            if !state.preview {
                return;
            }
            state.preview = false;
            state.snapshot = None;
            state.surface.clone()
        };
        if let Some(surface) = surface {
            surface.clear_data();
        }
        log::debug!("🧹 Vista previa retirada");
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn fetch_now(&self) {
        let (query, columns) = {
            let mut state = self.shared.state.borrow_mut();
            if !state.mounted {
                return;
            }
            let query = match state.config.data_source() {
                DataSource::Live(query) => query,
                _ => return,
            };
            state.fetches_issued += 1;
            (query, state.config.map.column_mapping.clone())
        };

        if !self.has_fetched_data() && !self.shared.status.get().is_error() {
            self.shared.status.set(WidgetView::Loading);
        }

        let pending = self.shared.fetcher.fetch_query(&query, &columns);
        let weak = Rc::downgrade(&self.shared);
        self.shared.services.scheduler.spawn(Box::pin(async move {
            let result = pending.await;
            match LifecycleController::upgrade(&weak) {
                Some(controller) => controller.apply_fetch_result(result),
                None => log::debug!("📭 Resultado descartado: widget liberado"),
            }
        }));
    }

    fn has_fetched_data(&self) -> bool {
        let state = self.shared.state.borrow();
        state.snapshot.is_some() && !state.preview
    }

    fn apply_fetch_result(&self, result: Result<Vec<LocationRecord>, FetchError>) {
        {
            let state = self.shared.state.borrow();
            if !state.mounted {
                log::debug!("📭 Resultado descartado: widget desmontado");
                return;
            }
            // Modo diseño o configuración incompleta: nada de datos en vivo
            if !matches!(state.config.data_source(), DataSource::Live(_)) {
                log::debug!("📭 Resultado descartado: el origen ya no es en vivo");
                return;
            }
        }
        let has_data = self.has_fetched_data();

        match result {
            Ok(records) => {
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.snapshot = Some(Rc::new(records));
                    state.preview = false;
                }
                self.render_snapshot(true);
            }
            Err(e) if has_data => {
                // Sin parpadeo: se conserva el último render bueno
                log::warn!("⚠️ Error consultando datos (se mantiene el último render): {}", e);
            }
            Err(e) => {
                log::error!("❌ Error consultando datos: {}", e);
                self.shared.status.set(WidgetView::FetchError(e.to_string()));
            }
        }
    }

    /// Reconciliación completa: marcadores (orden de llegada) + recorrido (ordenado)
    fn render_snapshot(&self, fit: bool) {
        let (surface, snapshot, config) = {
            let state = self.shared.state.borrow();
            match (&state.surface, &state.snapshot) {
                (Some(surface), Some(snapshot)) => (surface.clone(), snapshot.clone(), state.config.clone()),
                _ => return,
            }
        };
        if !surface.is_ready() {
            return;
        }

        let map = &config.map;
        let ordered = PointOrderer::order(&snapshot, map.column_mapping.index.as_deref());
        let rendered = surface
            .reconcile_markers(&snapshot, &map.marker_visual, &config.display, &map.column_mapping)
            .and_then(|markers| {
                surface.reconcile_path(&ordered, &map.path_visual)?;
                if fit {
                    surface.fit_to_data(&snapshot)?;
                }
                Ok(markers)
            });

        match rendered {
            Ok(0) => self.shared.status.set(WidgetView::Empty),
            Ok(markers) => self.shared.status.set(WidgetView::Rendered { markers }),
            Err(e) => {
                log::error!("❌ Error renderizando el mapa: {}", e);
                self.shared.status.set(WidgetView::RenderError(e.to_string()));
            }
        }
    }
}

/// Punto fijo de la vista previa en modo diseño
fn preview_record(center: crate::models::Coordinates) -> LocationRecord {
    LocationRecord {
        id: "preview".to_string(),
        created_at: Utc::now(),
        latitude: center.latitude,
        longitude: center.longitude,
        index_key: None,
        extra: Map::new(),
    }
}
