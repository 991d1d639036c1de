// ============================================================================
// HTTP STORAGE - Lectura de datos de runtime vía gloo-net (solo comunicación)
// ============================================================================

use gloo_net::http::Request;

use crate::models::{RuntimeDataRow, RuntimeQuery};
use crate::services::{FetchError, StorageBackend};
use crate::config::CONFIG;
use crate::utils::{LocalFuture, RUNTIME_DATA_PATH};

#[derive(Clone)]
pub struct HttpStorageBackend {
    base_url: String,
}

impl HttpStorageBackend {
    pub fn new() -> Self {
        Self::with_base_url(&CONFIG.backend_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HttpStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for HttpStorageBackend {
    fn query(&self, query: &RuntimeQuery) -> LocalFuture<'static, Result<Vec<RuntimeDataRow>, FetchError>> {
        let url = format!("{}{}", self.base_url, RUNTIME_DATA_PATH);
        let query = query.clone();

        Box::pin(async move {
            let limit = query.limit.to_string();
            let mut params = vec![
                ("productId", query.product_id.as_str()),
                ("tableName", query.table_name.as_str()),
                ("limit", limit.as_str()),
                ("order", "desc"),
            ];
            if let Some(device_id) = query.device_id.as_deref() {
                params.push(("deviceId", device_id));
            }

            let response = Request::get(&url)
                .query(params)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if !response.ok() {
                return Err(FetchError::Http {
                    status: response.status(),
                    message: response.status_text(),
                });
            }

            response
                .json::<Vec<RuntimeDataRow>>()
                .await
                .map_err(|e| FetchError::Parse(e.to_string()))
        })
    }
}
