use crate::{
    ArtifactConfig, CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigError,
    ConfigErrorResult, LaunchConfig, LogLevel, LoggingConfig, SupervisorConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub supervisor: SupervisorConfig,
    pub launch: LaunchConfig,
    pub artifact: ArtifactConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for SV_CONFIG_DIR env var, else use ./.sv/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply SV_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`] with an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SV_CONFIG_DIR env var > ./.sv/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.supervisor.validate()?;
        self.launch.validate()?;
        self.artifact.validate()?;

        let log_dir = Path::new(&self.logging.dir);
        if log_dir.is_absolute() || self.logging.dir.contains("..") {
            return Err(ConfigError::config(
                "logging.dir must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> ConfigErrorResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  supervisor: attempts={}, backoff={}ms, shutdown={}s",
            self.supervisor.max_attempts,
            self.supervisor.retry_backoff_ms,
            self.supervisor.shutdown_timeout_secs
        );
        info!(
            "  launch: {} {} <artifact> ({}={})",
            self.launch.runtime,
            self.launch.runtime_args.join(" "),
            self.launch.port_env_var,
            self.launch.port
        );
        info!("  readiness: {:?}", self.launch.resolved_markers());
        info!(
            "  artifact: {} (external: {}, private: {})",
            self.artifact.file_name,
            self.artifact.external_dir.as_deref().unwrap_or("<platform>"),
            self.artifact.private_dir.as_deref().unwrap_or("<platform>")
        );
        info!(
            "  logging: {} (file: {}, colored: {})",
            *self.logging.level, self.logging.file, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Supervisor
        Self::apply_env_parse("SV_MAX_ATTEMPTS", &mut self.supervisor.max_attempts);
        Self::apply_env_parse(
            "SV_RETRY_BACKOFF_MS",
            &mut self.supervisor.retry_backoff_ms,
        );
        Self::apply_env_parse(
            "SV_SHUTDOWN_TIMEOUT_SECS",
            &mut self.supervisor.shutdown_timeout_secs,
        );

        // Launch
        Self::apply_env_string("SV_RUNTIME", &mut self.launch.runtime);
        Self::apply_env_list("SV_RUNTIME_ARGS", &mut self.launch.runtime_args);
        Self::apply_env_parse("SV_PORT", &mut self.launch.port);

        // Artifact
        Self::apply_env_string("SV_ARTIFACT_FILE_NAME", &mut self.artifact.file_name);
        Self::apply_env_option_string("SV_ARTIFACT_EXTERNAL_DIR", &mut self.artifact.external_dir);
        Self::apply_env_option_string("SV_ARTIFACT_PRIVATE_DIR", &mut self.artifact.private_dir);

        // Logging
        if let Ok(val) = std::env::var("SV_LOG_LEVEL") {
            self.logging.level = LogLevel::parse_lenient(&val);
        }
        Self::apply_env_bool("SV_LOG_FILE", &mut self.logging.file);
        Self::apply_env_bool("SV_LOG_COLORED", &mut self.logging.colored);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Helper: Apply whitespace-separated list override
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val.split_whitespace().map(String::from).collect();
        }
    }
}
