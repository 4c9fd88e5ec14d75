//! Key/value persistence for the onboarding snapshot.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::profile::{OnboardingProfile, PROFILE_VERSION};
use super::sequencer::{Stage, Tab};

pub const STAGE_KEY: &str = "eerun_appState";
pub const PROFILE_KEY: &str = "eerun_userData";
pub const TAB_KEY: &str = "eerun_activeTab";

/// String key/value storage, in the manner of browser local storage.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All entries kept in one JSON object on disk, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`; a missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt onboarding state {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read onboarding state {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Everything the sequencer persists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub stage: Stage,
    pub profile: OnboardingProfile,
    pub active_tab: Tab,
}

impl Snapshot {
    /// Reads the three entries, falling back to defaults for anything
    /// missing or unparseable. A corrupt profile discards the whole snapshot.
    pub fn load(store: &dyn SnapshotStore) -> Self {
        let read = |key: &str| {
            store.get(key).unwrap_or_else(|e| {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            })
        };

        let profile = match read(PROFILE_KEY) {
            None => OnboardingProfile::default(),
            Some(raw) => match serde_json::from_str::<OnboardingProfile>(&raw) {
                Ok(profile) if profile.version == PROFILE_VERSION => profile,
                Ok(profile) => {
                    tracing::warn!("Unsupported profile version {}, starting over", profile.version);
                    return Self::default();
                }
                Err(e) => {
                    tracing::warn!("Corrupt onboarding profile, starting over: {}", e);
                    return Self::default();
                }
            },
        };

        let stage = read(STAGE_KEY)
            .and_then(|raw| raw.parse::<Stage>().ok())
            .unwrap_or_default();
        let active_tab = read(TAB_KEY)
            .and_then(|raw| raw.parse::<Tab>().ok())
            .unwrap_or_default();

        Self {
            stage,
            profile,
            active_tab,
        }
    }

    /// Writes stage and profile; the tab only once onboarding is complete.
    pub fn save(&self, store: &mut dyn SnapshotStore) -> Result<()> {
        store.set(STAGE_KEY, self.stage.as_str())?;
        store.set(PROFILE_KEY, &serde_json::to_string(&self.profile)?)?;
        if self.stage == Stage::Complete {
            store.set(TAB_KEY, self.active_tab.as_str())?;
        }
        Ok(())
    }

    pub fn clear(store: &mut dyn SnapshotStore) -> Result<()> {
        store.remove(STAGE_KEY)?;
        store.remove(PROFILE_KEY)?;
        store.remove(TAB_KEY)?;
        Ok(())
    }
}
