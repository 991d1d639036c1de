// ============================================================================
// GEOLOCATION - Petición única de posición del usuario
// ============================================================================
// No cancelable: quien consume el resultado debe comprobar que el mapa
// sigue vivo antes de tocarlo.
// ============================================================================

use crate::config::CONFIG;
use crate::models::Coordinates;
use crate::utils::LocalFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub max_age_ms: u32,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: CONFIG.geolocation_config.high_accuracy,
            timeout_ms: CONFIG.geolocation_config.timeout_ms,
            max_age_ms: CONFIG.geolocation_config.max_age_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    Unavailable,
    Timeout,
    Unsupported,
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "Location permission denied"),
            GeolocationError::Unavailable => write!(f, "Position unavailable"),
            GeolocationError::Timeout => write!(f, "Geolocation timed out"),
            GeolocationError::Unsupported => write!(f, "Geolocation not supported"),
        }
    }
}

impl std::error::Error for GeolocationError {}

pub trait Geolocator {
    fn current_position(&self, options: GeolocationOptions) -> LocalFuture<'static, Result<Coordinates, GeolocationError>>;
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserGeolocator;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{GeolocationPosition, GeolocationPositionError, PositionOptions};

    /// navigator.geolocation.getCurrentPosition envuelto en una Promise
    #[derive(Clone, Copy, Default)]
    pub struct BrowserGeolocator;

    impl Geolocator for BrowserGeolocator {
        fn current_position(&self, options: GeolocationOptions) -> LocalFuture<'static, Result<Coordinates, GeolocationError>> {
            Box::pin(async move {
                let geolocation = web_sys::window()
                    .ok_or(GeolocationError::Unsupported)?
                    .navigator()
                    .geolocation()
                    .map_err(|_| GeolocationError::Unsupported)?;

                let position_options = PositionOptions::new();
                position_options.set_enable_high_accuracy(options.high_accuracy);
                position_options.set_timeout(options.timeout_ms);
                position_options.set_maximum_age(options.max_age_ms);

                let mut request_error = None;
                let promise = js_sys::Promise::new(&mut |resolve, reject| {
                    if geolocation
                        .get_current_position_with_error_callback_and_options(
                            &resolve,
                            Some(&reject),
                            &position_options,
                        )
                        .is_err()
                    {
                        request_error = Some(GeolocationError::Unsupported);
                    }
                });
                if let Some(error) = request_error {
                    return Err(error);
                }

                match JsFuture::from(promise).await {
                    Ok(value) => {
                        let coords = value.unchecked_into::<GeolocationPosition>().coords();
                        Ok(Coordinates::new(coords.latitude(), coords.longitude()))
                    }
                    Err(error) => Err(match error.dyn_into::<GeolocationPositionError>() {
                        Ok(e) if e.code() == GeolocationPositionError::PERMISSION_DENIED => {
                            GeolocationError::PermissionDenied
                        }
                        Ok(e) if e.code() == GeolocationPositionError::TIMEOUT => GeolocationError::Timeout,
                        _ => GeolocationError::Unavailable,
                    }),
                }
            })
        }
    }
}
