// crates/oee-config-store/src/config.rs
// ============================================================================
// Module: Service Configuration
// Description: Configuration loading and validation for the OEE config service.
// Purpose: Provide strict config parsing with hard limits and explicit paths.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Document locations live here rather than in module constants, and each
//! accessor is built from this configuration. When no path is given and the
//! default file is absent, built-in defaults are used; an explicitly named
//! file must exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::env_store::EnvStore;
use crate::oee_config::OeeConfigStore;
use crate::process_order::ProcessOrderLoader;
use crate::write::WriteMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "oee-config-service.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "OEE_CONFIG_SERVICE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum accepted request body size in bytes.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Default bind address for the HTTP server.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default environment document path.
pub const DEFAULT_ENV_PATH: &str = ".env";
/// Default OEE configuration document path.
pub const DEFAULT_OEE_CONFIG_PATH: &str = "config/oeeConfig.json";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// OEE config service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Document storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Process-order loader configuration.
    #[serde(default)]
    pub process_orders: ProcessOrderConfig,
    /// Access audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Resolved config file path when loaded from disk (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ServiceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for
    /// this model.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.process_orders.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        self.bind_addr()?;
        Ok(())
    }
}

/// Document storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the environment document.
    #[serde(default = "default_env_path")]
    pub env_path: String,
    /// Path of the OEE configuration document.
    #[serde(default = "default_oee_config_path")]
    pub oee_config_path: String,
    /// Replacement strategy for document writes.
    #[serde(default)]
    pub write_mode: WriteMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            env_path: default_env_path(),
            oee_config_path: default_oee_config_path(),
            write_mode: WriteMode::default(),
        }
    }
}

impl StorageConfig {
    /// Builds the environment document accessor.
    #[must_use]
    pub fn env_store(&self) -> EnvStore {
        EnvStore::new(self.env_path.trim(), self.write_mode)
    }

    /// Builds the OEE configuration accessor.
    #[must_use]
    pub fn oee_config_store(&self) -> OeeConfigStore {
        OeeConfigStore::new(self.oee_config_path.trim(), self.write_mode)
    }

    /// Validates storage configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("storage.env_path", &self.env_path)?;
        validate_path_string("storage.oee_config_path", &self.oee_config_path)?;
        if Path::new(self.env_path.trim()) == Path::new(self.oee_config_path.trim()) {
            return Err(ConfigError::Invalid(
                "storage.env_path and storage.oee_config_path must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process-order loader configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessOrderConfig {
    /// Optional base directory for relative process-order paths.
    #[serde(default)]
    pub base_dir: Option<String>,
}

impl ProcessOrderConfig {
    /// Builds the process-order loader.
    #[must_use]
    pub fn loader(&self) -> ProcessOrderLoader {
        match self.base_dir.as_deref() {
            Some(dir) => ProcessOrderLoader::with_base_dir(dir.trim()),
            None => ProcessOrderLoader::new(),
        }
    }

    /// Validates process-order configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.base_dir {
            validate_path_string("process_orders.base_dir", dir)?;
        }
        Ok(())
    }
}

/// Access audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured access logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag reports whether the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size in bytes.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default environment document path.
fn default_env_path() -> String {
    DEFAULT_ENV_PATH.to_string()
}

/// Default OEE configuration document path.
fn default_oee_config_path() -> String {
    DEFAULT_OEE_CONFIG_PATH.to_string()
}

/// Audit logging is enabled unless disabled explicitly.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
