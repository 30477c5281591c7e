use std::path::PathBuf;
use std::str::FromStr;

use commonground_providers::storage::DEFAULT_SUPABASE_BUCKET;
use commonground_providers::{gemini, perspective};

/// Map style used when `MAP_STYLE_URL` is not set.
pub const DEFAULT_MAP_STYLE_URL: &str = "mapbox://styles/mapbox/streets-v12";

/// A setting that is present but unusable. Raised once at boot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials and models for the generative model API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
}

/// Credentials for the toxicity scoring API.
#[derive(Debug, Clone)]
pub struct PerspectiveConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Where generated images are stored once an idea is submitted.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Files under `media_dir`, served by this service at `/media`.
    Local { media_dir: PathBuf },
    /// A Supabase storage bucket.
    Supabase {
        url: String,
        service_key: String,
        bucket: String,
    },
}

/// Tile provider settings handed to the map widget.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub tiles_api_key: Option<String>,
    pub style_url: String,
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` has a default suitable for local
/// development. Provider keys are optional; a feature whose key is absent
/// answers `PROVIDER_NOT_CONFIGURED`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Timeout for each outbound provider call (default: `90`).
    pub provider_timeout_secs: u64,
    pub database_url: String,
    /// Origin used to resolve site-relative image paths and to build
    /// public URLs for locally stored images.
    pub public_base_url: String,
    pub gemini: Option<GeminiConfig>,
    pub perspective: Option<PerspectiveConfig>,
    pub storage: StorageBackend,
    pub map: MapConfig,
    /// Idle time after which an ideation session is discarded.
    pub session_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                                     |
    /// |-----------------------------|---------------------------------------------|
    /// | `HOST`                      | `0.0.0.0`                                   |
    /// | `PORT`                      | `3000`                                      |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`                     |
    /// | `REQUEST_TIMEOUT_SECS`      | `120`                                       |
    /// | `PROVIDER_TIMEOUT_SECS`     | `90`                                        |
    /// | `DATABASE_URL`              | required                                    |
    /// | `PUBLIC_BASE_URL`           | `http://localhost:3000`                     |
    /// | `GEMINI_API_KEY`            | unset                                       |
    /// | `GEMINI_BASE_URL`           | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_IMAGE_MODEL`        | `gemini-3-pro-image-preview`                |
    /// | `GEMINI_TEXT_MODEL`         | `gemini-2.5-flash-lite`                     |
    /// | `PERSPECTIVE_API_KEY`       | `GEMINI_API_KEY`                            |
    /// | `PERSPECTIVE_BASE_URL`      | `https://commentanalyzer.googleapis.com`    |
    /// | `STORAGE_BACKEND`           | `local`                                     |
    /// | `MEDIA_DIR`                 | `./media`                                   |
    /// | `SUPABASE_URL`              | required for `supabase`                     |
    /// | `SUPABASE_SERVICE_ROLE_KEY` | required for `supabase`                     |
    /// | `SUPABASE_BUCKET`           | `generated_images`                          |
    /// | `MAP_TILES_API_KEY`         | unset                                       |
    /// | `MAP_STYLE_URL`             | `mapbox://styles/mapbox/streets-v12`        |
    /// | `SESSION_TTL_SECS`          | `3600`                                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = parse(&var, "PORT", 3000)?;
        let request_timeout_secs = parse(&var, "REQUEST_TIMEOUT_SECS", 120)?;
        let provider_timeout_secs = parse(&var, "PROVIDER_TIMEOUT_SECS", 90)?;
        let session_ttl_secs = parse(&var, "SESSION_TTL_SECS", 3600)?;

        let cors_origins: Vec<String> = or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let public_base_url = or("PUBLIC_BASE_URL", "http://localhost:3000");
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "PUBLIC_BASE_URL",
                value: public_base_url,
                reason: "expected an http(s) origin".to_string(),
            });
        }

        let gemini_key = var("GEMINI_API_KEY");
        let gemini_config = gemini_key.clone().map(|api_key| GeminiConfig {
            api_key,
            base_url: or("GEMINI_BASE_URL", gemini::DEFAULT_BASE_URL),
            image_model: or("GEMINI_IMAGE_MODEL", gemini::DEFAULT_IMAGE_MODEL),
            text_model: or("GEMINI_TEXT_MODEL", gemini::DEFAULT_TEXT_MODEL),
        });
        let perspective_config = var("PERSPECTIVE_API_KEY")
            .or(gemini_key)
            .map(|api_key| PerspectiveConfig {
                api_key,
                base_url: or("PERSPECTIVE_BASE_URL", perspective::DEFAULT_BASE_URL),
            });

        let storage = match or("STORAGE_BACKEND", "local").to_ascii_lowercase().as_str() {
            "local" => StorageBackend::Local {
                media_dir: PathBuf::from(or("MEDIA_DIR", "./media")),
            },
            "supabase" => StorageBackend::Supabase {
                url: var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
                service_key: var("SUPABASE_SERVICE_ROLE_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
                bucket: or("SUPABASE_BUCKET", DEFAULT_SUPABASE_BUCKET),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'local' or 'supabase'".to_string(),
                })
            }
        };

        let map = MapConfig {
            tiles_api_key: var("MAP_TILES_API_KEY"),
            style_url: or("MAP_STYLE_URL", DEFAULT_MAP_STYLE_URL),
        };

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port,
            cors_origins,
            request_timeout_secs,
            provider_timeout_secs,
            database_url,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            gemini: gemini_config,
            perspective: perspective_config,
            storage,
            map,
            session_ttl_secs,
        })
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    const DB: (&str, &str) = ("DATABASE_URL", "postgres://localhost/commonground");

    #[test]
    fn defaults_apply() {
        let config = load(&[DB]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.provider_timeout_secs, 90);
        assert_eq!(config.session_ttl_secs, 3600);
        assert!(config.gemini.is_none());
        assert!(config.perspective.is_none());
        assert_matches!(config.storage, StorageBackend::Local { .. });
        assert_eq!(config.map.style_url, DEFAULT_MAP_STYLE_URL);
    }

    #[test]
    fn database_url_is_required() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn malformed_number_fails() {
        assert_matches!(
            load(&[DB, ("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        );
    }

    #[test]
    fn perspective_key_falls_back_to_gemini_key() {
        let config = load(&[DB, ("GEMINI_API_KEY", "g-key")]).unwrap();
        assert_eq!(config.gemini.unwrap().image_model, gemini::DEFAULT_IMAGE_MODEL);
        assert_eq!(config.perspective.unwrap().api_key, "g-key");

        let config = load(&[DB, ("GEMINI_API_KEY", "g"), ("PERSPECTIVE_API_KEY", "p")]).unwrap();
        assert_eq!(config.perspective.unwrap().api_key, "p");
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = load(&[DB, ("GEMINI_API_KEY", "  ")]).unwrap();
        assert!(config.gemini.is_none());
    }

    #[test]
    fn supabase_requires_credentials() {
        assert_matches!(
            load(&[DB, ("STORAGE_BACKEND", "supabase")]),
            Err(ConfigError::Missing("SUPABASE_URL"))
        );
        let config = load(&[
            DB,
            ("STORAGE_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ])
        .unwrap();
        assert_matches!(
            config.storage,
            StorageBackend::Supabase { bucket, .. } if bucket == DEFAULT_SUPABASE_BUCKET
        );
    }

    #[test]
    fn unknown_storage_backend_fails() {
        assert_matches!(
            load(&[DB, ("STORAGE_BACKEND", "s3")]),
            Err(ConfigError::Invalid { key: "STORAGE_BACKEND", .. })
        );
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config = load(&[DB, ("CORS_ORIGINS", "https://a.test, https://b.test,")]).unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.test", "https://b.test"]);
    }
}
