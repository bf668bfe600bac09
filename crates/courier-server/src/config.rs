use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Where attachment payloads live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBackend {
    Fs(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub objects: ObjectBackend,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables fall back to defaults;
    /// set but malformed ones are errors.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("COURIER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("COURIER_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("COURIER_PORT must be a port number")?;
        let db_path: PathBuf = var("COURIER_DB_PATH")
            .unwrap_or_else(|| "courier.db".into())
            .into();

        let objects = match var("COURIER_OBJECT_STORE").as_deref().unwrap_or("fs") {
            "fs" => ObjectBackend::Fs(
                var("COURIER_STORAGE_DIR")
                    .unwrap_or_else(|| "./object-storage".into())
                    .into(),
            ),
            "memory" => ObjectBackend::Memory,
            other => bail!("COURIER_OBJECT_STORE must be 'fs' or 'memory', got '{}'", other),
        };

        let max_body_bytes = match var("COURIER_MAX_BODY_BYTES") {
            Some(v) => v
                .parse()
                .context("COURIER_MAX_BODY_BYTES must be a byte count")?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            host,
            port,
            db_path,
            objects,
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("courier.db"));
        assert_eq!(config.objects, ObjectBackend::Fs(PathBuf::from("./object-storage")));
        assert_eq!(config.max_body_bytes, 32 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("COURIER_PORT", "8080"),
            ("COURIER_OBJECT_STORE", "memory"),
            ("COURIER_MAX_BODY_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.objects, ObjectBackend::Memory);
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(config(&[("COURIER_PORT", "eighty")]).is_err());
        assert!(config(&[("COURIER_OBJECT_STORE", "s3")]).is_err());
        assert!(config(&[("COURIER_MAX_BODY_BYTES", "-1")]).is_err());
    }
}
