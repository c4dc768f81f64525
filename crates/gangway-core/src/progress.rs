use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::step::StepId;
use crate::time::now_utc_rfc3339;

const PROGRESS_VERSION: i64 = 1;

pub const CURRENT_STEP_KEY: &str = "current-step";
pub const RETURN_STEP_KEY: &str = "return-step";

/// Durable key-value port backing onboarding progress. Implementations
/// must degrade rather than fail: a store that cannot be read behaves
/// as empty, and a store that cannot be written absorbs the write.
pub trait KeyValue {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    values: BTreeMap<String, String>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKeyValue {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProgressFile {
    version: i64,
    #[serde(default)]
    updated: Option<String>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Default for ProgressFile {
    fn default() -> Self {
        Self {
            version: PROGRESS_VERSION,
            updated: None,
            values: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgressFileError {
    #[error("failed to read progress file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse progress file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write progress file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize progress file: {0}")]
    Serialize(toml::ser::Error),
    #[error("progress file at {path} has unsupported version {found} (expected {PROGRESS_VERSION})")]
    UnsupportedVersion { path: PathBuf, found: i64 },
}

/// Progress persisted to a versioned TOML document under the user's
/// config directory. Every failure is logged and degraded per the
/// [`KeyValue`] contract so a broken disk never reaches the wizard.
#[derive(Debug)]
pub struct FileKeyValue {
    path: PathBuf,
}

impl FileKeyValue {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ProgressFile, ProgressFileError> {
        if !self.path.exists() {
            return Ok(ProgressFile::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| ProgressFileError::Read {
            path: self.path.clone(),
            source,
        })?;

        let parsed: ProgressFile =
            toml::from_str(&raw).map_err(|source| ProgressFileError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if parsed.version != PROGRESS_VERSION {
            return Err(ProgressFileError::UnsupportedVersion {
                path: self.path.clone(),
                found: parsed.version,
            });
        }

        Ok(parsed)
    }

    fn store(&self, mut file: ProgressFile) -> Result<(), ProgressFileError> {
        let parent = self
            .path
            .parent()
            .expect("progress file path has a parent directory");
        fs::create_dir_all(parent).map_err(|source| ProgressFileError::Write {
            path: parent.to_path_buf(),
            source,
        })?;

        file.updated = now_utc_rfc3339().ok();
        let serialized = toml::to_string(&file).map_err(ProgressFileError::Serialize)?;
        let temp_path = self.path.with_extension("toml.tmp");

        fs::write(&temp_path, serialized).map_err(|source| ProgressFileError::Write {
            path: temp_path.clone(),
            source,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|source| ProgressFileError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn load_degraded(&self) -> ProgressFile {
        match self.load() {
            Ok(file) => file,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "progress file unreadable, treating as empty");
                ProgressFile::default()
            }
        }
    }

    fn store_degraded(&self, file: ProgressFile) {
        if let Err(error) = self.store(file) {
            warn!(path = %self.path.display(), %error, "progress file unwritable, dropping write");
        }
    }
}

impl KeyValue for FileKeyValue {
    fn get(&self, key: &str) -> Option<String> {
        self.load_degraded().values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        let mut file = self.load_degraded();
        file.values.insert(key.to_string(), value.to_string());
        self.store_degraded(file);
    }

    fn remove(&mut self, key: &str) {
        let mut file = self.load_degraded();
        if file.values.remove(key).is_some() || self.path.exists() {
            self.store_degraded(file);
        }
    }
}

pub fn resolve_progress_path() -> anyhow::Result<PathBuf> {
    let base_dirs =
        BaseDirs::new().ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("gangway")
        .join("onboarding.toml"))
}

/// Persisted onboarding position: the step the user last saw, plus an
/// optional step to resume to after a browser round-trip.
pub struct Progress {
    store: Box<dyn KeyValue>,
}

impl Progress {
    pub fn new(store: Box<dyn KeyValue>) -> Self {
        Self { store }
    }

    /// Opens the default on-disk store, falling back to a process-local
    /// store when the home directory cannot be resolved. The wizard then
    /// starts from the first step instead of refusing to run.
    pub fn open_default() -> Self {
        match resolve_progress_path() {
            Ok(path) => Self::new(Box::new(FileKeyValue::new(path))),
            Err(error) => {
                warn!(%error, "progress storage unavailable, running without persistence");
                Self::new(Box::new(MemoryKeyValue::new()))
            }
        }
    }

    pub fn set_current_step(&mut self, id: StepId) {
        self.store.set(CURRENT_STEP_KEY, id.as_str());
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.store
            .get(CURRENT_STEP_KEY)
            .and_then(|value| StepId::parse(&value))
    }

    pub fn set_return_step(&mut self, id: StepId) {
        self.store.set(RETURN_STEP_KEY, id.as_str());
    }

    /// Reads and deletes the return step in one call so a second read in
    /// the same session observes nothing (at-most-once consumption).
    pub fn take_return_step(&mut self) -> Option<StepId> {
        let value = self.store.get(RETURN_STEP_KEY)?;
        self.store.remove(RETURN_STEP_KEY);
        StepId::parse(&value)
    }

    pub fn clear(&mut self) {
        self.store.remove(CURRENT_STEP_KEY);
        self.store.remove(RETURN_STEP_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_current_step() {
        let mut progress = Progress::new(Box::new(MemoryKeyValue::new()));
        assert_eq!(progress.current_step(), None);

        progress.set_current_step(StepId::GithubApp);
        assert_eq!(progress.current_step(), Some(StepId::GithubApp));

        progress.set_current_step(StepId::GithubApp);
        assert_eq!(progress.current_step(), Some(StepId::GithubApp));
    }

    #[test]
    fn take_return_step_consumes_at_most_once() {
        let mut progress = Progress::new(Box::new(MemoryKeyValue::new()));
        progress.set_return_step(StepId::AgentKey);

        assert_eq!(progress.take_return_step(), Some(StepId::AgentKey));
        assert_eq!(progress.take_return_step(), None);
    }

    #[test]
    fn set_return_step_overwrites_previous_value() {
        let mut progress = Progress::new(Box::new(MemoryKeyValue::new()));
        progress.set_return_step(StepId::GithubRepo);
        progress.set_return_step(StepId::AgentKey);

        assert_eq!(progress.take_return_step(), Some(StepId::AgentKey));
    }

    #[test]
    fn clear_removes_both_keys() {
        let mut progress = Progress::new(Box::new(MemoryKeyValue::new()));
        progress.set_current_step(StepId::Complete);
        progress.set_return_step(StepId::GithubRepo);

        progress.clear();

        assert_eq!(progress.current_step(), None);
        assert_eq!(progress.take_return_step(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("gangway").join("onboarding.toml");

        let mut progress = Progress::new(Box::new(FileKeyValue::new(path.clone())));
        progress.set_current_step(StepId::GithubRepo);
        progress.set_return_step(StepId::AgentKey);
        drop(progress);

        let mut reopened = Progress::new(Box::new(FileKeyValue::new(path)));
        assert_eq!(reopened.current_step(), Some(StepId::GithubRepo));
        assert_eq!(reopened.take_return_step(), Some(StepId::AgentKey));
        assert_eq!(reopened.take_return_step(), None);
    }

    #[test]
    fn file_store_write_leaves_no_temp_residue() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("onboarding.toml");

        let mut store = FileKeyValue::new(path.clone());
        store.set(CURRENT_STEP_KEY, "welcome");

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let raw = fs::read_to_string(&path).expect("read progress file");
        assert!(raw.contains("version = 1"));
        assert!(raw.contains("updated"));
    }

    #[test]
    fn file_store_degrades_when_parent_is_not_a_directory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write blocker");

        let mut progress = Progress::new(Box::new(FileKeyValue::new(
            blocker.join("onboarding.toml"),
        )));

        progress.set_current_step(StepId::ModeSelect);
        assert_eq!(progress.current_step(), None);
        assert_eq!(progress.take_return_step(), None);
    }

    #[test]
    fn file_store_treats_corrupt_document_as_empty() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("onboarding.toml");
        fs::write(&path, "version = \"not a number\"").expect("write corrupt file");

        let progress = Progress::new(Box::new(FileKeyValue::new(path)));
        assert_eq!(progress.current_step(), None);
    }

    #[test]
    fn file_store_rejects_future_versions_without_clobbering_reads() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("onboarding.toml");
        fs::write(&path, "version = 2\n[values]\ncurrent-step = \"welcome\"\n")
            .expect("write future version");

        let progress = Progress::new(Box::new(FileKeyValue::new(path)));
        assert_eq!(progress.current_step(), None);
    }
}
