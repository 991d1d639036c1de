use crate::models::{RuntimeDataRow, RuntimeQuery};
use crate::utils::LocalFuture;

/// Lectura de filas de runtime (newest-first, máximo `query.limit`)
pub trait StorageBackend {
    fn query(&self, query: &RuntimeQuery) -> LocalFuture<'static, Result<Vec<RuntimeDataRow>, FetchError>>;
}

/// Fallo de transporte o del backend. "Sin datos" NO es un error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Network(String),
    Http { status: u16, message: String },
    Parse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
