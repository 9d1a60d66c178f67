use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_PORT, DEFAULT_PORT_ENV_VAR, DEFAULT_READINESS_MARKERS,
    DEFAULT_RUNTIME, DEFAULT_RUNTIME_ARGS, MIN_PORT, PORT_PLACEHOLDER,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How the server artifact is turned into a child process.
///
/// The command line is `<runtime> <runtime_args...> <artifact>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Program that runs the artifact (e.g. `java`)
    pub runtime: String,
    /// Arguments placed between the runtime and the artifact path
    pub runtime_args: Vec<String>,
    /// Environment variable that tells the child which port to bind
    pub port_env_var: String,
    pub port: u16,
    /// Substrings that mark a server as ready when seen in its output.
    /// `{port}` stands for [`port`](Self::port).
    pub readiness_markers: Vec<String>,
    /// Extra environment passed to the child
    pub env: BTreeMap<String, String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime: String::from(DEFAULT_RUNTIME),
            runtime_args: DEFAULT_RUNTIME_ARGS.iter().map(|a| a.to_string()).collect(),
            port_env_var: String::from(DEFAULT_PORT_ENV_VAR),
            port: DEFAULT_PORT,
            readiness_markers: DEFAULT_READINESS_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            env: BTreeMap::new(),
        }
    }
}

impl LaunchConfig {
    /// Readiness markers with the port placeholder filled in.
    pub fn resolved_markers(&self) -> Vec<String> {
        let port = self.port.to_string();
        self.readiness_markers
            .iter()
            .map(|marker| marker.replace(PORT_PLACEHOLDER, &port))
            .collect()
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.runtime.trim().is_empty() {
            return Err(ConfigError::launch("launch.runtime must not be empty"));
        }

        if self.port < MIN_PORT {
            return Err(ConfigError::launch(format!(
                "launch.port must be >= {}, got {}",
                MIN_PORT, self.port
            )));
        }

        if self.port_env_var.is_empty() || self.port_env_var.contains('=') {
            return Err(ConfigError::launch(format!(
                "launch.port_env_var is not a valid variable name: '{}'",
                self.port_env_var
            )));
        }

        if !self.readiness_markers.iter().any(|m| !m.is_empty()) {
            return Err(ConfigError::launch(
                "launch.readiness_markers needs at least one non-empty marker",
            ));
        }

        Ok(())
    }
}
