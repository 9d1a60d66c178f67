//! Finds the server artifact on disk.

use std::path::{Path, PathBuf};

use sv_config::ArtifactConfig;
use tracing::{debug, warn};

/// Storage roots searched for the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageContext {
    /// Shared, user-visible storage; may not exist on every platform
    pub external_dir: Option<PathBuf>,
    /// Application-private storage
    pub private_dir: PathBuf,
}

impl StorageContext {
    pub fn new(external_dir: Option<PathBuf>, private_dir: PathBuf) -> Self {
        Self {
            external_dir,
            private_dir,
        }
    }

    /// Platform data directories joined with `app_dir_name`.
    ///
    /// External storage is the user data directory, private storage the
    /// local (non-roaming) data directory. `None` when the platform has no
    /// local data directory.
    pub fn platform(app_dir_name: &str) -> Option<Self> {
        let private_dir = dirs::data_local_dir()?.join(app_dir_name);
        let external_dir = dirs::data_dir().map(|dir| dir.join(app_dir_name));

        Some(Self::new(external_dir, private_dir))
    }

    /// Configured directories, falling back to the platform ones.
    pub fn from_config(config: &ArtifactConfig) -> Option<Self> {
        let platform = Self::platform(&config.app_dir_name);

        let external_dir = match &config.external_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => platform.as_ref().and_then(|p| p.external_dir.clone()),
        };

        let private_dir = match &config.private_dir {
            Some(dir) => PathBuf::from(dir),
            None => platform?.private_dir,
        };

        Some(Self::new(external_dir, private_dir))
    }
}

/// Candidate artifact paths in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    candidates: Vec<PathBuf>,
}

impl ArtifactLocation {
    /// External storage first, then private storage.
    pub fn for_context(context: &StorageContext, file_name: &str) -> Self {
        let mut candidates = Vec::with_capacity(2);

        if let Some(external) = &context.external_dir {
            candidates.push(external.join(file_name));
        }

        let private = context.private_dir.join(file_name);
        if !candidates.contains(&private) {
            candidates.push(private);
        }

        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that is an existing regular file.
    ///
    /// Missing directories and unreadable entries are skipped.
    pub fn locate(&self) -> Option<PathBuf> {
        let found = self.candidates.iter().find(|path| is_regular_file(path));

        match found {
            Some(path) => debug!("Server artifact found at: {}", path.display()),
            None => warn!("Server artifact not found in {:?}", self.candidates),
        }

        found.cloned()
    }
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Locate `file_name` under the context's storage roots.
pub fn find_artifact_path(context: &StorageContext, file_name: &str) -> Option<PathBuf> {
    ArtifactLocation::for_context(context, file_name).locate()
}
