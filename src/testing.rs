// Fakes compartidos por los tests unitarios

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use futures::executor::block_on;
use serde_json::{Map, Value};

use crate::maps::{ArrowPattern, LayerId, MapBackend, MapError, MapHandle, PolylineStyle};
use crate::models::{Coordinates, GeoBounds, IndexKey, LocationRecord, RuntimeDataRow, RuntimeQuery};
use crate::services::{FetchError, GeolocationError, GeolocationOptions, Geolocator, StorageBackend};
use crate::utils::{IntervalHandle, LocalFuture, Scheduler};
use crate::viewmodels::{IconDescriptor, PopupContent};

pub fn row(id: &str, minutes: i64, payload: Value) -> RuntimeDataRow {
    let data_payload: Map<String, Value> = serde_json::from_value(payload).expect("payload must be an object");
    RuntimeDataRow {
        id: id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        data_payload,
    }
}

pub fn record_at(id: &str, latitude: f64, longitude: f64, index_key: Option<IndexKey>) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        latitude,
        longitude,
        index_key,
        extra: Map::new(),
    }
}

// ----------------------------------------------------------------------------
// Backend de mapa que registra cada primitiva
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateMap { container_id: String },
    AddTileLayer { url_template: String },
    AddZoomControl,
    CreateLayerGroup,
    AddMarker { group: Option<LayerId>, position: Coordinates, label: Option<String> },
    AddPolyline { points: Vec<Coordinates> },
    AddDecorator { patterns: Vec<ArrowPattern> },
    FitBounds { bounds: GeoBounds, padding_px: u32 },
    RemoveLayer(LayerId),
    DestroyMap,
}

#[derive(Default)]
struct BackendLog {
    calls: Vec<BackendCall>,
    next_id: u64,
    live: HashSet<LayerId>,
    group_members: HashMap<LayerId, Vec<LayerId>>,
    removed: HashSet<LayerId>,
    fail_create_map: bool,
}

#[derive(Clone, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<BackendLog>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create_map(&self) {
        self.log.borrow_mut().fail_create_map = true;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.log.borrow().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.log.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn was_removed(&self, layer: LayerId) -> bool {
        self.log.borrow().removed.contains(&layer)
    }

    /// Capas vivas fuera de grupos + grupos
    pub fn live_layers(&self) -> usize {
        self.log.borrow().live.len()
    }

    /// Marcadores en grupos que siguen en el mapa
    pub fn live_markers(&self) -> usize {
        let log = self.log.borrow();
        log.group_members
            .iter()
            .filter(|(group, _)| log.live.contains(*group))
            .map(|(_, members)| members.len())
            .sum()
    }

    pub fn marker_labels(&self) -> Vec<Option<String>> {
        let log = self.log.borrow();
        log.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::AddMarker { group: Some(_), label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_polyline(&self) -> Option<Vec<Coordinates>> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            BackendCall::AddPolyline { points } => Some(points.clone()),
            _ => None,
        })
    }

    pub fn last_decorator_patterns(&self) -> Option<Vec<ArrowPattern>> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            BackendCall::AddDecorator { patterns } => Some(patterns.clone()),
            _ => None,
        })
    }

    pub fn last_bounds(&self) -> Option<GeoBounds> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            BackendCall::FitBounds { bounds, .. } => Some(*bounds),
            _ => None,
        })
    }

    fn next_layer(&self) -> LayerId {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let id = LayerId(log.next_id);
        log.live.insert(id);
        id
    }

    fn record(&self, call: BackendCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl MapBackend for RecordingBackend {
    fn create_map(&mut self, container_id: &str, _center: Coordinates, _zoom: f64) -> Result<MapHandle, MapError> {
        if self.log.borrow().fail_create_map {
            return Err(MapError::Backend("container not found".to_string()));
        }
        self.record(BackendCall::CreateMap { container_id: container_id.to_string() });
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        Ok(MapHandle(log.next_id))
    }

    fn add_tile_layer(&mut self, _map: MapHandle, url_template: &str, _attribution: &str, _max_zoom: u8) -> Result<LayerId, MapError> {
        self.record(BackendCall::AddTileLayer { url_template: url_template.to_string() });
        Ok(self.next_layer())
    }

    fn add_zoom_control(&mut self, _map: MapHandle) -> Result<(), MapError> {
        self.record(BackendCall::AddZoomControl);
        Ok(())
    }

    fn create_layer_group(&mut self, _map: MapHandle) -> Result<LayerId, MapError> {
        self.record(BackendCall::CreateLayerGroup);
        let group = self.next_layer();
        self.log.borrow_mut().group_members.insert(group, Vec::new());
        Ok(group)
    }

    fn add_marker(
        &mut self,
        _map: MapHandle,
        group: Option<LayerId>,
        position: Coordinates,
        _icon: &IconDescriptor,
        popup: Option<&PopupContent>,
    ) -> Result<LayerId, MapError> {
        self.record(BackendCall::AddMarker {
            group,
            position,
            label: popup.and_then(|p| p.permanent_label_text.clone()),
        });
        match group {
            Some(group) => {
                let mut log = self.log.borrow_mut();
                log.next_id += 1;
                let marker = LayerId(log.next_id);
                log.group_members.entry(group).or_default().push(marker);
                Ok(marker)
            }
            None => Ok(self.next_layer()),
        }
    }

    fn add_polyline(&mut self, _map: MapHandle, points: &[Coordinates], _style: &PolylineStyle) -> Result<LayerId, MapError> {
        self.record(BackendCall::AddPolyline { points: points.to_vec() });
        Ok(self.next_layer())
    }

    fn add_decorator(&mut self, _map: MapHandle, _polyline: LayerId, patterns: &[ArrowPattern]) -> Result<LayerId, MapError> {
        self.record(BackendCall::AddDecorator { patterns: patterns.to_vec() });
        Ok(self.next_layer())
    }

    fn fit_bounds(&mut self, _map: MapHandle, bounds: GeoBounds, padding_px: u32) {
        self.record(BackendCall::FitBounds { bounds, padding_px });
    }

    fn remove_layer(&mut self, _map: MapHandle, layer: LayerId) {
        self.record(BackendCall::RemoveLayer(layer));
        let mut log = self.log.borrow_mut();
        log.live.remove(&layer);
        log.removed.insert(layer);
    }

    fn destroy_map(&mut self, _map: MapHandle) {
        self.record(BackendCall::DestroyMap);
    }
}

// ----------------------------------------------------------------------------
// Scheduler manual: intervalos inspeccionables y tareas en cola
// ----------------------------------------------------------------------------

struct IntervalRecord {
    period_ms: u32,
    active: Rc<Cell<bool>>,
    tick: Rc<RefCell<Box<dyn FnMut()>>>,
}

struct IntervalGuard {
    active: Rc<Cell<bool>>,
}

impl Drop for IntervalGuard {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

#[derive(Default)]
pub struct ManualScheduler {
    tasks: RefCell<Vec<LocalFuture<'static, ()>>>,
    intervals: RefCell<Vec<IntervalRecord>>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Periodos de los intervalos que siguen activos
    pub fn active_intervals(&self) -> Vec<u32> {
        self.intervals
            .borrow()
            .iter()
            .filter(|i| i.active.get())
            .map(|i| i.period_ms)
            .collect()
    }

    pub fn installed_intervals(&self) -> usize {
        self.intervals.borrow().len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Dispara una vez cada intervalo activo
    pub fn tick(&self) {
        let ticks: Vec<_> = self
            .intervals
            .borrow()
            .iter()
            .filter(|i| i.active.get())
            .map(|i| (i.active.clone(), i.tick.clone()))
            .collect();
        for (active, tick) in ticks {
            if active.get() {
                (&mut *tick.borrow_mut())();
            }
        }
    }

    /// Completa las tareas en el orden en que se lanzaron
    pub fn run_pending(&self) {
        loop {
            let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                block_on(task);
            }
        }
    }

    /// Completa las tareas en orden inverso (respuestas fuera de orden)
    pub fn run_pending_reversed(&self) {
        let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
        for task in tasks.into_iter().rev() {
            block_on(task);
        }
        self.run_pending();
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> IntervalHandle {
        let active = Rc::new(Cell::new(true));
        self.intervals.borrow_mut().push(IntervalRecord {
            period_ms,
            active: active.clone(),
            tick: Rc::new(RefCell::new(tick)),
        });
        Box::new(IntervalGuard { active })
    }

    fn spawn(&self, task: LocalFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

// ----------------------------------------------------------------------------
// Almacenamiento y geolocalización de prueba
// ----------------------------------------------------------------------------

pub struct StubStorage {
    response: RefCell<Result<Vec<RuntimeDataRow>, FetchError>>,
    queries: RefCell<Vec<RuntimeQuery>>,
}

impl StubStorage {
    pub fn with_rows(rows: Vec<RuntimeDataRow>) -> Rc<Self> {
        Rc::new(Self {
            response: RefCell::new(Ok(rows)),
            queries: RefCell::new(Vec::new()),
        })
    }

    pub fn failing(error: FetchError) -> Rc<Self> {
        Rc::new(Self {
            response: RefCell::new(Err(error)),
            queries: RefCell::new(Vec::new()),
        })
    }

    pub fn set_rows(&self, rows: Vec<RuntimeDataRow>) {
        *self.response.borrow_mut() = Ok(rows);
    }

    pub fn set_failure(&self, error: FetchError) {
        *self.response.borrow_mut() = Err(error);
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn last_query(&self) -> Option<RuntimeQuery> {
        self.queries.borrow().last().cloned()
    }
}

impl StorageBackend for StubStorage {
    fn query(&self, query: &RuntimeQuery) -> LocalFuture<'static, Result<Vec<RuntimeDataRow>, FetchError>> {
        self.queries.borrow_mut().push(query.clone());
        let response = self.response.borrow().clone();
        Box::pin(async move { response })
    }
}

pub struct StubGeolocator {
    response: RefCell<Result<Coordinates, GeolocationError>>,
    requests: Cell<usize>,
}

impl StubGeolocator {
    pub fn at(position: Coordinates) -> Rc<Self> {
        Rc::new(Self {
            response: RefCell::new(Ok(position)),
            requests: Cell::new(0),
        })
    }

    pub fn fail_with(&self, error: GeolocationError) {
        *self.response.borrow_mut() = Err(error);
    }

    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl Geolocator for StubGeolocator {
    fn current_position(&self, _options: GeolocationOptions) -> LocalFuture<'static, Result<Coordinates, GeolocationError>> {
        self.requests.set(self.requests.get() + 1);
        let response = self.response.borrow().clone();
        Box::pin(async move { response })
    }
}
