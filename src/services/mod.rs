pub mod data_fetcher;
pub mod geolocation;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod http_storage;

pub use data_fetcher::DataFetcher;
pub use geolocation::{GeolocationError, GeolocationOptions, Geolocator};
pub use storage::{FetchError, StorageBackend};

#[cfg(target_arch = "wasm32")]
pub use geolocation::BrowserGeolocator;
#[cfg(target_arch = "wasm32")]
pub use http_storage::HttpStorageBackend;
