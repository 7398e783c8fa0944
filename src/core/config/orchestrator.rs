use crate::core::backends::BackendKind;
use crate::core::config::data::{BackendConfig, OverlaySettings, Settings};
use crate::core::config::io::StoreUnavailable;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Persistence boundary for the settings document.
///
/// `save` replaces the whole document; there is no merge and no version
/// check, so the save that completes last wins.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, StoreUnavailable>;
    async fn save(&self, settings: &Settings) -> Result<(), StoreUnavailable>;
    fn describe(&self) -> String;
}

/// TOML file on local disk. File I/O runs on the blocking pool so callers on
/// the session's event loop never stall.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_path() -> Result<Self, StoreUnavailable> {
        Ok(Self::new(Settings::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Settings, StoreUnavailable> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Settings::load_from_path(&path))
            .await
            .map_err(|err| StoreUnavailable::Offline(err.to_string()))?
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreUnavailable> {
        let path = self.path.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || settings.save_to_path(&path))
            .await
            .map_err(|err| StoreUnavailable::Offline(err.to_string()))?
    }

    fn describe(&self) -> String {
        crate::core::config::data::path_display(&self.path)
    }
}

/// Process-local store used for `--ephemeral` sessions and tests. It can be
/// switched offline to simulate an unreachable backend.
#[derive(Default)]
pub struct MemorySettingsStore {
    document: Mutex<Option<Settings>>,
    offline: AtomicBool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            document: Mutex::new(Some(settings)),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreUnavailable> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreUnavailable::Offline(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, StoreUnavailable> {
        self.check_online()?;
        let document = self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(document.clone().unwrap_or_default())
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreUnavailable> {
        self.check_online()?;
        *self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "(in memory)".to_string()
    }
}

/// Sole owner and writer of the backend configuration and the active backend.
///
/// Readers take a cheap [`snapshot`](ConfigStore::snapshot) of the in-memory
/// mirror; a snapshot never changes once taken. Writers go through `save`,
/// which holds `write_lock` across the persist and the mirror swap so that
/// disk and mirror agree on whichever save finished last.
pub struct ConfigStore {
    store: Box<dyn SettingsStore>,
    mirror: RwLock<Arc<Settings>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl ConfigStore {
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self {
            store,
            mirror: RwLock::new(Arc::new(Settings::default())),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current in-memory settings. Read fresh at every dispatch.
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.mirror.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn active_backend(&self) -> BackendKind {
        self.snapshot().active_backend
    }

    pub fn location(&self) -> String {
        self.store.describe()
    }

    fn replace_mirror(&self, settings: Settings) -> Arc<Settings> {
        let settings = Arc::new(settings);
        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&settings);
        settings
    }

    /// Load from the store into the mirror. Has no other side effects.
    pub async fn load(&self) -> Result<(BackendConfig, BackendKind), StoreUnavailable> {
        let settings = self.store.load().await?;
        debug!(
            store = %self.store.describe(),
            active = %settings.active_backend,
            "Loaded settings"
        );
        let settings = self.replace_mirror(settings);
        Ok((settings.backends.clone(), settings.active_backend))
    }

    /// Load, falling back to all-empty defaults when the store is unreachable.
    pub async fn load_or_default(&self) -> Arc<Settings> {
        match self.load().await {
            Ok(_) => self.snapshot(),
            Err(err) => {
                info!(error = %err, "Settings store unavailable; continuing with empty defaults");
                self.replace_mirror(Settings::default())
            }
        }
    }

    /// Replace the backend configuration and active backend.
    ///
    /// URL fields are normalized first. The mirror is updated even when the
    /// store rejects the write, so the running session keeps the user's
    /// choice; the returned error tells the caller it was not persisted.
    pub async fn save(
        &self,
        config: BackendConfig,
        active: BackendKind,
    ) -> Result<(), StoreUnavailable> {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();
        let next = Settings {
            active_backend: active,
            backends: config.normalized(),
            overlay: current.overlay.clone(),
        };
        self.persist_locked(next).await
    }

    /// Switch the active backend, keeping every field value as it is.
    pub async fn select_backend(&self, active: BackendKind) -> Result<(), StoreUnavailable> {
        let _guard = self.write_lock.lock().await;
        let mut next = Settings::clone(&self.snapshot());
        next.active_backend = active;
        self.persist_locked(next).await
    }

    pub async fn save_overlay(&self, overlay: OverlaySettings) -> Result<(), StoreUnavailable> {
        let _guard = self.write_lock.lock().await;
        let mut next = Settings::clone(&self.snapshot());
        next.overlay = overlay;
        self.persist_locked(next).await
    }

    /// Replace the whole document, overlay included.
    pub async fn replace(&self, settings: Settings) -> Result<(), StoreUnavailable> {
        let _guard = self.write_lock.lock().await;
        let next = Settings {
            backends: settings.backends.normalized(),
            ..settings
        };
        self.persist_locked(next).await
    }

    async fn persist_locked(&self, next: Settings) -> Result<(), StoreUnavailable> {
        let result = self.store.save(&next).await;
        let active = next.active_backend;
        self.replace_mirror(next);
        match &result {
            Ok(()) => info!(store = %self.store.describe(), %active, "Settings saved"),
            Err(err) => warn!(error = %err, "Settings kept in memory only"),
        }
        result
    }
}
