use crate::config::parser::{parse_settings, settings_version};
use crate::config::types::Settings;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Versioned, reloadable settings store
///
/// `load()` hands out an `Arc<Settings>` snapshot; a session keeps the
/// snapshot it was created with, so `reload()` never changes the behavior
/// of an in-flight crawl. Versions are SHA-256 hashes of the file content.
pub struct ConfigStore {
    path: PathBuf,
    inner: RwLock<Snapshot>,
}

struct Snapshot {
    settings: Arc<Settings>,
    version: String,
}

impl ConfigStore {
    /// Opens a store backed by a TOML file
    ///
    /// The file is read and validated immediately; a bad file fails here,
    /// not on first use.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let snapshot = read_snapshot(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(snapshot),
        })
    }

    /// Creates a store that serves built-in defaults (no backing file)
    pub fn defaults() -> Self {
        let settings = Settings::default();
        let version = settings_version("");
        Self {
            path: PathBuf::new(),
            inner: RwLock::new(Snapshot {
                settings: Arc::new(settings),
                version,
            }),
        }
    }

    /// Returns the current settings snapshot
    pub fn load(&self) -> Arc<Settings> {
        self.inner.read().expect("config store lock poisoned").settings.clone()
    }

    /// Returns the current configuration version
    pub fn version(&self) -> String {
        self.inner.read().expect("config store lock poisoned").version.clone()
    }

    /// Re-reads the backing file and swaps the snapshot if it changed
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The file changed; the new snapshot is active
    /// * `Ok(false)` - Content hash unchanged; snapshot untouched
    /// * `Err(ConfigError)` - The new file is unreadable or invalid; the
    ///   previous snapshot stays active
    pub fn reload(&self) -> Result<bool, ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Ok(false);
        }

        let snapshot = read_snapshot(&self.path)?;
        let mut inner = self.inner.write().expect("config store lock poisoned");

        if inner.version == snapshot.version {
            return Ok(false);
        }

        tracing::info!(
            "Settings reloaded (version {} -> {})",
            &inner.version[..8],
            &snapshot.version[..8]
        );
        *inner = snapshot;
        Ok(true)
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings = parse_settings(&content)?;
    Ok(Snapshot {
        settings: Arc::new(settings),
        version: settings_version(&content),
    })
}
