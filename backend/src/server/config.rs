//! Application settings and the HTTP server configuration built from them.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use recipe_backend::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use recipe_backend::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use recipe_backend::outbound::persistence::DbPool;
use serde::Deserialize;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MEDIA_ROOT: &str = "media";

/// Settings loaded from CLI flags, `RECIPES_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// PostgreSQL URL. Without it the server runs on in-memory adapters.
    pub database_url: Option<String>,
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<SocketAddr>,
    /// Directory receiving uploaded images, `./media` when unset.
    pub media_root: Option<PathBuf>,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Session cookie settings read from the process environment.
pub fn load_session_settings(mode: BuildMode) -> io::Result<SessionSettings> {
    session_settings_from_env(&DefaultEnv::new(), mode).map_err(io::Error::other)
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) media_root: PathBuf,
    pub(crate) max_upload_bytes: usize,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Back recipes and accounts with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_media_root(mut self, media_root: PathBuf) -> Self {
        self.media_root = media_root;
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "RECIPES_DATABASE_URL",
        "RECIPES_BIND_ADDR",
        "RECIPES_MEDIA_ROOT",
        "RECIPES_MAX_UPLOAD_BYTES",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("recipe-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(settings.media_root(), PathBuf::from("media"));
        assert_eq!(settings.max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let values = [
            Some("postgres://localhost/recipes".to_owned()),
            Some("127.0.0.1:9000".to_owned()),
            Some("/srv/media".to_owned()),
            Some("1024".to_owned()),
        ];
        let _guard = lock_env(VARS.into_iter().zip(values));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/recipes")
        );
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(settings.media_root(), PathBuf::from("/srv/media"));
        assert_eq!(settings.max_upload_bytes(), 1024);
    }

    const SESSION_VARS: [&str; 4] = [
        "SESSION_KEY_FILE",
        "SESSION_COOKIE_SECURE",
        "SESSION_SAMESITE",
        "SESSION_ALLOW_EPHEMERAL",
    ];

    fn session_env(allow_ephemeral: &str) -> env_lock::EnvGuard<'static> {
        let [key_file, secure, same_site, ephemeral] = SESSION_VARS;
        lock_env([
            (key_file, Some("/nonexistent/recipe-backend/session.key".to_owned())),
            (secure, Some("0".to_owned())),
            (same_site, Some("strict".to_owned())),
            (ephemeral, Some(allow_ephemeral.to_owned())),
        ])
    }

    #[rstest]
    fn session_settings_load_from_the_process_environment() {
        let _guard = session_env("1");

        let session = load_session_settings(BuildMode::Debug).expect("session settings");
        assert!(!session.cookie_secure);
        assert_eq!(session.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_builds_refuse_ephemeral_session_keys() {
        let _guard = session_env("1");

        let error = load_session_settings(BuildMode::Release)
            .err()
            .expect("release build must reject ephemeral keys");
        assert!(error.to_string().contains("SESSION_ALLOW_EPHEMERAL"));
    }
}
