//! Periodic snapshot saving.
//!
//! The host marks the manager dirty after every scene transition and calls
//! [`AutoSaveManager::maybe_save`] from its event loop.

use crate::scene::{Action, Scene};
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 2;

/// Key the whole-board snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "wb:v1";

/// Manages automatic snapshot persistence.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    /// Unsaved transitions since the last save.
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Set the auto-save interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record that the scene changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty, and the interval has passed since the last save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if needed. Returns true if a save was performed.
    pub async fn maybe_save(&mut self, scene: &Scene) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(scene).await?;
        Ok(true)
    }

    /// Save immediately.
    pub async fn save(&mut self, scene: &Scene) -> StorageResult<()> {
        self.storage.save(SNAPSHOT_KEY, scene).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("saved board snapshot");
        Ok(())
    }

    /// Load the stored snapshot, if there is one.
    pub async fn load(&mut self) -> StorageResult<Option<Scene>> {
        match self.storage.load(SNAPSHOT_KEY).await {
            Ok(scene) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Ok(Some(scene))
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Merge the stored snapshot into `scene`. Returns true if one was found.
    pub async fn restore(&mut self, scene: &mut Scene) -> StorageResult<bool> {
        let Some(saved) = self.load().await? else {
            return Ok(false);
        };
        scene.apply(Action::InitFromLocal(Box::new(saved.into())));
        Ok(true)
    }

    /// Remove the stored snapshot.
    pub async fn clear(&mut self) -> StorageResult<()> {
        self.storage.delete(SNAPSHOT_KEY).await?;
        self.last_save = None;
        Ok(())
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, block_on};
    use crate::tools::ToolKind;

    fn manager() -> AutoSaveManager<MemoryStorage> {
        AutoSaveManager::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_clean_manager_does_not_save() {
        let mut manager = manager();
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
        assert!(!block_on(manager.maybe_save(&Scene::new())).unwrap());
    }

    #[test]
    fn test_save_clears_dirty() {
        let mut manager = manager();
        manager.mark_dirty();
        assert!(manager.should_save());

        block_on(manager.save(&Scene::new())).unwrap();
        assert!(!manager.is_dirty());
        assert!(block_on(manager.storage().exists(SNAPSHOT_KEY)).unwrap());
    }

    #[test]
    fn test_interval_throttles_saves() {
        let mut manager = manager().with_interval(Duration::from_secs(3600));
        manager.mark_dirty();
        assert!(block_on(manager.maybe_save(&Scene::new())).unwrap());

        manager.mark_dirty();
        assert!(!manager.should_save());
        assert!(!block_on(manager.maybe_save(&Scene::new())).unwrap());
        assert!(manager.is_dirty());
    }

    #[test]
    fn test_restore_merges_snapshot() {
        let mut manager = manager();
        let mut scene = Scene::new();
        scene.apply(Action::AddPage {
            id: None,
            name: None,
        });
        scene.apply(Action::SetTool(ToolKind::Circle));
        block_on(manager.save(&scene)).unwrap();

        let mut other = AutoSaveManager::new(manager.storage().clone());
        let mut restored = Scene::new();
        assert!(block_on(other.restore(&mut restored)).unwrap());
        assert_eq!(restored, scene);
    }

    #[test]
    fn test_restore_without_snapshot() {
        let mut manager = manager();
        let mut scene = Scene::new();
        assert!(!block_on(manager.restore(&mut scene)).unwrap());
        assert_eq!(scene, Scene::new());
    }
}
