// ============================================================================
// DATA FETCHER - Consulta el almacenamiento y valida las filas
// ============================================================================
// Sin efectos secundarios: cada llamada produce un snapshot nuevo e inmutable.
// ============================================================================

use std::rc::Rc;

use serde_json::Value;

use crate::config::{CONFIG, MAX_ROWS_LIMIT};
use crate::models::{ColumnMapping, Coordinates, IndexKey, LocationRecord, RuntimeDataRow, RuntimeQuery};
use crate::services::{FetchError, StorageBackend};
use crate::utils::LocalFuture;

#[derive(Clone)]
pub struct DataFetcher {
    storage: Rc<dyn StorageBackend>,
    max_rows: usize,
}

impl DataFetcher {
    pub fn new(storage: Rc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            max_rows: CONFIG.max_rows,
        }
    }

    /// Últimas N filas (N ≤ 100) transformadas en registros válidos.
    /// Lote vacío = éxito sin datos.
    pub fn fetch_batch(
        &self,
        product_id: &str,
        table_name: &str,
        device_id: Option<&str>,
        columns: &ColumnMapping,
    ) -> LocalFuture<'static, Result<Vec<LocationRecord>, FetchError>> {
        let query = RuntimeQuery {
            product_id: product_id.to_string(),
            table_name: table_name.to_string(),
            device_id: device_id.map(str::to_string),
            limit: self.max_rows,
        };
        self.fetch_query(&query, columns)
    }

    /// La petición sale en el momento de la llamada; el future solo espera y transforma
    pub fn fetch_query(
        &self,
        query: &RuntimeQuery,
        columns: &ColumnMapping,
    ) -> LocalFuture<'static, Result<Vec<LocationRecord>, FetchError>> {
        let limit = query.limit.min(self.max_rows).min(MAX_ROWS_LIMIT);
        let query = RuntimeQuery { limit, ..query.clone() };
        let pending = self.storage.query(&query);
        let columns = columns.clone();

        Box::pin(async move {
            let mut rows = pending.await?;
            rows.truncate(limit);

            let records = transform_rows(rows, &columns);
            log::info!(
                "📥 {} registros válidos para {}/{}",
                records.len(),
                query.product_id,
                query.table_name
            );
            Ok(records)
        })
    }
}

/// Filas crudas → registros válidos, conservando el orden de llegada
pub fn transform_rows(rows: Vec<RuntimeDataRow>, columns: &ColumnMapping) -> Vec<LocationRecord> {
    rows.into_iter()
        .filter_map(|row| transform_row(row, columns))
        .collect()
}

fn transform_row(row: RuntimeDataRow, columns: &ColumnMapping) -> Option<LocationRecord> {
    let latitude = coerce_number(row.data_payload.get(&columns.latitude));
    let longitude = coerce_number(row.data_payload.get(&columns.longitude));

    if !Coordinates::new(latitude, longitude).is_valid() {
        log::debug!("⚠️ Fila {} descartada: coordenadas inválidas ({}, {})", row.id, latitude, longitude);
        return None;
    }

    let index_key = columns
        .index
        .as_deref()
        .and_then(|column| row.data_payload.get(column))
        .and_then(IndexKey::from_value);

    Some(LocationRecord {
        id: row.id,
        created_at: row.created_at,
        latitude,
        longitude,
        index_key,
        extra: row.data_payload,
    })
}

/// Números tal cual, strings numéricos parseados, el resto NaN
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{row, StubStorage};
    use futures::executor::block_on;
    use serde_json::json;

    fn columns() -> ColumnMapping {
        ColumnMapping {
            latitude: "lat".to_string(),
            longitude: "lng".to_string(),
            index: Some("seq".to_string()),
            ..ColumnMapping::default()
        }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&json!(" 40.7 "))), 40.7);
        assert_eq!(coerce_number(Some(&json!(-74))), -74.0);
        assert!(coerce_number(Some(&json!("abc"))).is_nan());
        assert!(coerce_number(Some(&json!(""))).is_nan());
        assert!(coerce_number(Some(&json!(true))).is_nan());
        assert!(coerce_number(None).is_nan());
    }

    #[test]
    fn test_invalid_rows_are_dropped_and_payload_kept() {
        let rows = vec![
            row("ok", 3, json!({ "lat": "40.7", "lng": "-74.0", "seq": "2", "speed": 12 })),
            row("abc", 2, json!({ "lat": "abc", "lng": "-74.0" })),
            row("range", 1, json!({ "lat": 91, "lng": 0 })),
            row("missing", 0, json!({ "lng": 10 })),
        ];
        let records = transform_rows(rows, &columns());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "ok");
        assert_eq!(record.coordinates(), Coordinates::new(40.7, -74.0));
        assert_eq!(record.index_key, Some(IndexKey::Text("2".to_string())));
        assert_eq!(record.extra.get("speed"), Some(&json!(12)));
        assert_eq!(record.extra.get("lat"), Some(&json!("40.7")));
    }

    #[test]
    fn test_fetch_batch_keeps_newest_first_order() {
        let storage = StubStorage::with_rows(vec![
            row("r3", 3, json!({ "lat": 1.0, "lng": 1.0 })),
            row("r2", 2, json!({ "lat": 2.0, "lng": 2.0 })),
        ]);
        let fetcher = DataFetcher::new(storage.clone());

        let records = block_on(fetcher.fetch_batch("p-1", "gps", Some("dev-9"), &columns())).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2"]);

        let query = storage.last_query().unwrap();
        assert_eq!(query.device_id.as_deref(), Some("dev-9"));
        assert!(query.limit <= 100);
    }

    #[test]
    fn test_no_valid_rows_is_empty_success() {
        let storage = StubStorage::with_rows(vec![row("bad", 0, json!({ "lat": "x", "lng": "y" }))]);
        let fetcher = DataFetcher::new(storage);
        let records = block_on(fetcher.fetch_batch("p-1", "gps", None, &columns())).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_backend_failure_is_an_error() {
        let storage = StubStorage::failing(FetchError::Http { status: 503, message: "down".to_string() });
        let fetcher = DataFetcher::new(storage);
        let result = block_on(fetcher.fetch_batch("p-1", "gps", None, &columns()));
        assert_eq!(result, Err(FetchError::Http { status: 503, message: "down".to_string() }));
    }

    #[test]
    fn test_rows_are_capped_at_limit() {
        let rows = (0..150)
            .map(|i| row(&format!("r{}", i), i, json!({ "lat": 1.0, "lng": 1.0 })))
            .collect();
        let fetcher = DataFetcher::new(StubStorage::with_rows(rows));
        let records = block_on(fetcher.fetch_batch("p-1", "gps", None, &columns())).unwrap();
        assert_eq!(records.len(), 100);
    }
}
