use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dokumen: DokumenConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default = "default_jwt_secret")]
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

/// Which dokumen schema a deployment exposes at /api/dokumen.
#[derive(Debug, Clone, Deserialize)]
pub struct DokumenConfig {
    #[serde(default)]
    pub mode: DokumenMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DokumenMode {
    /// Single file per record, tagged with a jenis enumeration.
    #[default]
    Tunggal,
    /// Three fixed PDF slots per record.
    Bundel,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "data/simbem.db".to_string()
}

fn default_jwt_secret() -> String {
    "rahasia-ganti-di-produksi".to_string()
}

fn default_local_path() -> String {
    "data/uploads".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
        }
    }
}

impl Default for DokumenConfig {
    fn default() -> Self {
        Self {
            mode: DokumenMode::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            storage: StorageConfig::default(),
            dokumen: DokumenConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from conf.ini or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["conf.ini", "config.toml", "data/conf.ini", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: SIMBEM_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("SIMBEM_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("SIMBEM_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        if let Ok(val) = env::var("SIMBEM_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        if let Ok(val) = env::var("SIMBEM_CONF_JWT_SECRET") {
            self.jwt.secret = val;
        }

        if let Ok(val) = env::var("SIMBEM_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }

        if let Ok(val) = env::var("SIMBEM_CONF_DOKUMEN_MODE") {
            match val.to_lowercase().as_str() {
                "tunggal" => self.dokumen.mode = DokumenMode::Tunggal,
                "bundel" => self.dokumen.mode = DokumenMode::Bundel,
                other => tracing::warn!("Unknown dokumen mode '{}', keeping {:?}", other, self.dokumen.mode),
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::create_dir_all(&self.storage.local_path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.dokumen.mode, DokumenMode::Tunggal);
        assert!(!config.storage.local_path.is_empty());
    }

    #[test]
    fn dokumen_mode_parses_from_toml() {
        let config: Config = toml::from_str("[dokumen]\nmode = \"bundel\"\n").unwrap();
        assert_eq!(config.dokumen.mode, DokumenMode::Bundel);
    }
}
