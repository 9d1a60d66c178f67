mod artifact_config;
mod config;
mod error;
mod launch_config;
mod log_level;
mod logging_config;
mod supervisor_config;

#[cfg(test)]
mod tests;

pub use artifact_config::ArtifactConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use launch_config::LaunchConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use supervisor_config::SupervisorConfig;

pub const CONFIG_DIR_ENV: &str = "SV_CONFIG_DIR";
pub const CONFIG_DIR_NAME: &str = ".sv";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Launch
pub const DEFAULT_RUNTIME: &str = "java";
pub const DEFAULT_RUNTIME_ARGS: &[&str] = &["-jar"];
pub const DEFAULT_PORT_ENV_VAR: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;
pub const MIN_PORT: u16 = 1024;
/// Replaced by `launch.port` wherever it appears in a readiness marker
pub const PORT_PLACEHOLDER: &str = "{port}";
pub const DEFAULT_READINESS_MARKERS: &[&str] = &[
    "Started WebSocketServerApplication",
    "Tomcat started on port(s): {port}",
];

// Artifact
pub const DEFAULT_ARTIFACT_FILE_NAME: &str = "WebSocket-Server-0.0.1-SNAPSHOT.jar";
pub const DEFAULT_APP_DIR_NAME: &str = "server-supervisor";

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
const DEFAULT_LOG_COLORED: bool = true;
