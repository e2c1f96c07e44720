use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
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
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Remote content API used by the sync job.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_base_url")]
    pub base_url: String,
    #[serde(default = "default_sync_token")]
    pub token: String,
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_sync_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_sync_backoff_base")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_sync_backoff_max")]
    pub backoff_max_ms: u64,
    /// Ceiling for a whole sync run, fetches and writes included.
    #[serde(default = "default_sync_max_runtime")]
    pub max_runtime_secs: u64,
    /// PostgreSQL advisory lock key guarding against overlapping runs.
    #[serde(default = "default_sync_lock_key")]
    pub lock_key: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: default_sync_base_url(),
            token: default_sync_token(),
            timeout_secs: default_sync_timeout(),
            max_attempts: default_sync_max_attempts(),
            backoff_base_ms: default_sync_backoff_base(),
            backoff_max_ms: default_sync_backoff_max(),
            max_runtime_secs: default_sync_max_runtime(),
            lock_key: default_sync_lock_key(),
        }
    }
}

fn default_sync_base_url() -> String { "https://ciisa.coningenio.cl/v1".into() }
fn default_sync_token() -> String { "ciisa".into() }
fn default_sync_timeout() -> u64 { 30 }
fn default_sync_max_attempts() -> u32 { 3 }
fn default_sync_backoff_base() -> u64 { 200 }
fn default_sync_backoff_max() -> u64 { 2000 }
fn default_sync_max_runtime() -> u64 { 300 }
fn default_sync_lock_key() -> i64 { 0x636f_6e69_6e67 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: default_log_dir(), json: false }
    }
}

fn default_log_dir() -> String { "storage/logs".into() }

/// `CONFIG_PATH`, or `config.toml` in the working directory.
fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Defaults when `path` does not exist. A file that exists must parse.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    if std::path::Path::new(path).exists() {
        load_from_file(path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file (if any) plus environment overrides, validated.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.sync.normalize_from_env();
        self.sync.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl SyncConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("SYNC_BASE_URL") {
            if !url.trim().is_empty() { self.base_url = url; }
        }
        if let Ok(token) = std::env::var("SYNC_API_TOKEN") {
            if !token.trim().is_empty() { self.token = token; }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("sync.base_url must start with http(s)"));
        }
        if self.timeout_secs == 0 || self.max_runtime_secs == 0 {
            return Err(anyhow!("sync timeouts must be positive seconds"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("sync.max_attempts must be >= 1"));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(anyhow!("sync.backoff_max_ms must be >= backoff_base_ms"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.sync.base_url, "https://ciisa.coningenio.cl/v1");
        assert_eq!(cfg.sync.max_runtime_secs, 300);
        assert_eq!(cfg.logging.dir, "storage/logs");
        assert_eq!(cfg.database.max_connections, 10);
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "postgres://u:p@localhost:5432/coningenio"
            max_connections = 4
            min_connections = 1

            [sync]
            base_url = "http://localhost:7000/v1"
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 4);
        assert_eq!(cfg.sync.max_attempts, 5);
        assert_eq!(cfg.sync.token, "ciisa");
    }

    #[test]
    fn database_validation_rejects_non_postgres_urls() {
        let db = DatabaseConfig { url: "mysql://root@localhost/x".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
        let db = DatabaseConfig { url: "postgres://localhost/x".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_ok());
    }

    #[test]
    fn database_validation_rejects_inverted_pool_sizes() {
        let db = DatabaseConfig {
            url: "postgres://localhost/x".into(),
            max_connections: 1,
            min_connections: 3,
            ..DatabaseConfig::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn sync_validation() {
        assert!(SyncConfig::default().validate().is_ok());
        let bad = SyncConfig { base_url: "ftp://x".into(), ..SyncConfig::default() };
        assert!(bad.validate().is_err());
        let bad = SyncConfig { max_attempts: 0, ..SyncConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn missing_file_means_defaults_but_broken_file_is_an_error() {
        let missing = std::env::temp_dir().join("coningenio-no-such-config.toml");
        let cfg = load_or_default(missing.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8080);

        let broken = std::env::temp_dir().join(format!("coningenio-broken-{}.toml", std::process::id()));
        std::fs::write(&broken, "[server\nport = ").unwrap();
        assert!(load_or_default(broken.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&broken);
    }

    #[test]
    fn server_normalize_fills_worker_threads() {
        let mut s = ServerConfig { host: " ".into(), port: 8080, worker_threads: Some(0) };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }
}
