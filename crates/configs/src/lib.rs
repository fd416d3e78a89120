use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_server_host(), port: default_server_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            password: None,
            command_timeout_ms: default_command_timeout(),
        }
    }
}

/// Storage layout and uniqueness policies for player records.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DirectoryConfig {
    #[serde(default = "default_true")]
    pub enforce_unique_id: bool,
    #[serde(default)]
    pub enforce_unique_name: bool,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_name_index_prefix")]
    pub name_index_prefix: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            enforce_unique_id: true,
            enforce_unique_name: false,
            key_prefix: String::new(),
            name_index_prefix: default_name_index_prefix(),
        }
    }
}

fn default_server_host() -> String { "0.0.0.0".into() }
fn default_server_port() -> u16 { 50051 }
fn default_redis_host() -> String { "127.0.0.1".into() }
fn default_redis_port() -> u16 { 6379 }
fn default_command_timeout() -> u64 { 2000 }
fn default_name_index_prefix() -> String { "directory:name:".into() }
fn default_true() -> bool { true }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is missing, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment wins over the file for the keys the deployment sets
    /// (`SERVER_HOST`, `SERVER_PORT`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`,
    /// `REDIS_PASSWORD`). Unparsable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") { self.server.host = host; }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse().ok()) { self.server.port = port; }
        if let Some(host) = lookup("REDIS_HOST") { self.redis.host = host; }
        if let Some(port) = lookup("REDIS_PORT").and_then(|p| p.parse().ok()) { self.redis.port = port; }
        if let Some(db) = lookup("REDIS_DB").and_then(|d| d.parse().ok()) { self.redis.db = db; }
        if let Some(pw) = lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()) { self.redis.password = Some(pw); }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.redis.validate()?;
        self.directory.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_server_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl RedisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("redis.host is empty; set it in config.toml or REDIS_HOST"));
        }
        if self.port == 0 {
            return Err(anyhow!("redis.port must be in 1..=65535"));
        }
        if self.db < 0 {
            return Err(anyhow!("redis.db must be >= 0"));
        }
        if self.command_timeout_ms == 0 {
            return Err(anyhow!("redis.command_timeout_ms must be a positive number of milliseconds"));
        }
        Ok(())
    }

    /// Connection URL in the form the redis client expects.
    pub fn url(&self) -> String {
        match &self.password {
            Some(pw) => format!("redis://:{}@{}:{}/{}", pw, self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Same as [`RedisConfig::url`] with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        match self.password {
            Some(_) => format!("redis://:***@{}:{}/{}", self.host, self.port, self.db),
            None => self.url(),
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enforce_unique_name {
            if self.name_index_prefix.is_empty() {
                return Err(anyhow!("directory.name_index_prefix must be set when enforce_unique_name is on"));
            }
            // every record key would sit inside the name index
            if self.key_prefix.starts_with(&self.name_index_prefix) {
                return Err(anyhow!("directory.key_prefix must not start with directory.name_index_prefix"));
            }
        }
        Ok(())
    }
}
