use crate::{ConfigError, ConfigErrorResult, DEFAULT_APP_DIR_NAME, DEFAULT_ARTIFACT_FILE_NAME};

use serde::{Deserialize, Serialize};

/// Where to look for the server artifact.
///
/// Unset directories fall back to the platform data directories
/// (see `sv_core::StorageContext::platform`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub file_name: String,
    /// Directory name appended to the platform data directories
    pub app_dir_name: String,
    /// Shared, user-visible storage. Searched first.
    pub external_dir: Option<String>,
    /// Application-private storage. Searched second.
    pub private_dir: Option<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            file_name: String::from(DEFAULT_ARTIFACT_FILE_NAME),
            app_dir_name: String::from(DEFAULT_APP_DIR_NAME),
            external_dir: None,
            private_dir: None,
        }
    }
}

impl ArtifactConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.file_name.is_empty() {
            return Err(ConfigError::artifact("artifact.file_name must not be empty"));
        }

        if self.file_name.contains('/') || self.file_name.contains('\\') {
            return Err(ConfigError::artifact(format!(
                "artifact.file_name must be a bare file name, got '{}'",
                self.file_name
            )));
        }

        if self.app_dir_name.is_empty() || self.app_dir_name.contains("..") {
            return Err(ConfigError::artifact(
                "artifact.app_dir_name must be non-empty and cannot contain '..'",
            ));
        }

        Ok(())
    }
}
