use std::env;
use std::fs;
use std::path::Path;

/// Claves que lee `AppConfig::from_env` vía `option_env!`
const CONFIG_KEYS: &[&str] = &[
    "BACKEND_URL",
    "ENVIRONMENT",
    "ENABLE_LOGGING",
    "DEFAULT_REFRESH_INTERVAL_MS",
    "MAX_ROWS",
    "DEFAULT_MAP_CENTER_LAT",
    "DEFAULT_MAP_CENTER_LNG",
    "DEFAULT_MAP_ZOOM",
    "FIT_PADDING_PX",
    "GEOLOCATION_TIMEOUT_MS",
    "GEOLOCATION_MAX_AGE_MS",
    "GEOLOCATION_HIGH_ACCURACY",
];

fn main() {
    let env_file = Path::new(".env");

    match fs::read_to_string(env_file) {
        Ok(contents) => {
            println!("cargo:rerun-if-changed=.env");
            for (key, value) in contents.lines().filter_map(parse_line) {
                if !CONFIG_KEYS.contains(&key) {
                    println!("cargo:warning=.env: clave desconocida '{}' (ignorada)", key);
                    continue;
                }
                // El entorno del proceso manda sobre .env
                if env::var(key).is_err() {
                    println!("cargo:rustc-env={}={}", key, value);
                }
            }
        }
        Err(_) => {
            println!(
                "cargo:warning=No .env file found. Using widget defaults (backend http://localhost:3000, refresh 5000 ms). Copy .env.example to .env to override."
            );
        }
    }

    for key in CONFIG_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.env.example");
}

/// `KEY=VALUE` con comillas opcionales; comentarios y líneas vacías fuera
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim().trim_matches('"')))
}
