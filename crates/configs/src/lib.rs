use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: None }
    }
}

/// Which backend holds the buckets behind `/api/data`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_file_path")]
    pub file_path: String,
    #[serde(default)]
    pub redis_url: String,
    #[serde(default)]
    pub key_prefix: String,
    /// Entries kept in the in-process read cache; 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            file_path: default_file_path(),
            redis_url: String::new(),
            key_prefix: String::new(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_mirror_path")]
    pub local_mirror_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
            local_mirror_path: default_mirror_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordSchemeKind {
    #[default]
    Legacy,
    Argon2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_user")]
    pub username: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub password_scheme: PasswordSchemeKind,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_user(),
            password_hash: String::new(),
            password_scheme: PasswordSchemeKind::Legacy,
            session_ttl_hours: default_session_ttl(),
        }
    }
}

fn default_file_path() -> String {
    "data/buckets.json".into()
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_timeout() -> u64 {
    10
}

fn default_mirror_path() -> String {
    "data/local_mirror.json".into()
}

fn default_admin_user() -> String {
    "admin".into()
}

fn default_session_ttl() -> i64 {
    24
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Load `config.toml` (or `CONFIG_PATH`) if present, otherwise start from
    /// defaults; either way environment overrides apply and the result is
    /// validated.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(&config_path())
    }

    /// Only a missing file falls back to defaults. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_or_default_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e.context(format!("failed to load {}", path))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.store.normalize_from_env();
        self.store.validate()?;
        self.client.validate()?;
        self.admin.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        // unset means the runtime default (one worker per core)
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn normalize_from_env(&mut self) {
        // fill from env when the TOML leaves it blank
        if self.redis_url.trim().is_empty() {
            if let Ok(url) = std::env::var("REDIS_URL") {
                self.redis_url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            BackendKind::Memory => {}
            BackendKind::File => {
                if self.file_path.trim().is_empty() {
                    return Err(anyhow!("store.file_path is required for the file backend"));
                }
            }
            BackendKind::Redis => {
                if self.redis_url.trim().is_empty() {
                    return Err(anyhow!(
                        "store.redis_url is empty; set it in config.toml or REDIS_URL"
                    ));
                }
                let lower = self.redis_url.to_lowercase();
                if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
                    return Err(anyhow!("store.redis_url must start with redis:// or rediss://"));
                }
            }
        }
        if self.cache_capacity > 0 && self.cache_ttl_secs == 0 {
            return Err(anyhow!("store.cache_ttl_secs must be positive when the cache is enabled"));
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        let lower = self.api_base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("client.api_base_url must start with http(s)://"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("client.timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl AdminConfig {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!("admin.username must not be empty"));
        }
        if self.session_ttl_hours <= 0 {
            return Err(anyhow!("admin.session_ttl_hours must be positive"));
        }
        if self.password_scheme == PasswordSchemeKind::Argon2
            && !self.password_hash.is_empty()
            && !self.password_hash.starts_with("$argon2")
        {
            return Err(anyhow!("admin.password_hash is not an argon2 PHC string"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let mut cfg = load_from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.store.backend, BackendKind::Memory);
        assert_eq!(cfg.admin.session_ttl_hours, 24);
        assert_eq!(cfg.server.worker_threads, None);
        Ok(())
    }

    #[test]
    fn zero_worker_threads_means_runtime_default() -> Result<()> {
        let mut cfg = load_from_str("[server]\nhost = \"h\"\nport = 8080\nworker_threads = 0\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.worker_threads, None);

        let mut cfg = load_from_str("[server]\nhost = \"h\"\nport = 8080\nworker_threads = 2\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.worker_threads, Some(2));
        Ok(())
    }

    fn tmp_config(name: &str, body: &str) -> std::io::Result<std::path::PathBuf> {
        let file = format!("gg_config_{}_{}.toml", std::process::id(), name);
        let path = std::env::temp_dir().join(file);
        std::fs::write(&path, body)?;
        Ok(path)
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() -> Result<()> {
        let file = format!("gg_config_{}_absent.toml", std::process::id());
        let path = std::env::temp_dir().join(file);
        let cfg = AppConfig::load_or_default_from(&path.to_string_lossy())?;
        assert_eq!(cfg.server.port, 8080);
        Ok(())
    }

    #[test]
    fn invalid_config_file_is_an_error() -> Result<()> {
        let path = tmp_config("typo", "[store]\nbackend = \"redsi\"\n")?;
        let res = AppConfig::load_or_default_from(&path.to_string_lossy());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());

        let path = tmp_config("syntax", "[server\nport = 1\n")?;
        let res = AppConfig::load_or_default_from(&path.to_string_lossy());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn parses_file_backend() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [store]
            backend = "file"
            file_path = "var/buckets.json"
            cache_capacity = 0
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.store.backend, BackendKind::File);
        assert_eq!(cfg.store.file_path, "var/buckets.json");
        cfg.store.validate()?;
        Ok(())
    }

    #[test]
    fn redis_backend_requires_scheme() {
        let store = StoreConfig {
            backend: BackendKind::Redis,
            redis_url: "localhost:6379".into(),
            ..StoreConfig::default()
        };
        assert!(store.validate().is_err());
        let store = StoreConfig { redis_url: "redis://localhost:6379".into(), ..store };
        assert!(store.validate().is_ok());
    }

    #[test]
    fn client_rejects_zero_timeout() {
        let client = ClientConfig { timeout_secs: 0, ..ClientConfig::default() };
        assert!(client.validate().is_err());
    }

    #[test]
    fn admin_argon2_hash_must_be_phc() {
        let admin = AdminConfig {
            password_scheme: PasswordSchemeKind::Argon2,
            password_hash: "12345".into(),
            ..AdminConfig::default()
        };
        assert!(admin.validate().is_err());
    }
}
