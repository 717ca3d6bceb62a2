use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::{
    bounded_set::{BoundedOrderedSet, BoundedSetError},
    controller::persist::{self, PersistError},
    core::limits::DEFAULT_MAX_TRACKED_FILES,
};

const DOWNLOADED_FIELD: &str = "downloaded";
const EXTRACTED_FIELD: &str = "extracted";

/// File names the controller has seen downloaded and extracted, each bounded by `max_tracked_files`.
/// Callers mutate the two sets directly between saves.
pub struct ControllerPersist {
    max_tracked_files: usize,
    pub downloaded_file_names: BoundedOrderedSet<String>,
    pub extracted_file_names: BoundedOrderedSet<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionStats {
    pub downloaded_evictions: u64,
    pub extracted_evictions: u64,
    pub max_tracked_files: usize,
}

#[derive(Serialize)]
struct PersistedState<'a> {
    downloaded: &'a BoundedOrderedSet<String>,
    extracted: &'a BoundedOrderedSet<String>,
}

impl ControllerPersist {
    pub fn new(max_tracked_files: usize) -> Result<Self, BoundedSetError> {
        Ok(Self {
            max_tracked_files,
            downloaded_file_names: BoundedOrderedSet::new(max_tracked_files)?,
            extracted_file_names: BoundedOrderedSet::new(max_tracked_files)?,
        })
    }

    pub fn max_tracked_files(&self) -> usize {
        self.max_tracked_files
    }

    /// Encode both sets as `{"downloaded": [...], "extracted": [...]}`, each in insertion order
    pub fn serialize(&self) -> Result<String, PersistError> {
        serde_json::to_string(&PersistedState {
            downloaded: &self.downloaded_file_names,
            extracted: &self.extracted_file_names,
        })
        .map_err(|e| PersistError::Encode(e.to_string()))
    }

    /// Rebuild state from text produced by `serialize`. Arrays longer than `max_tracked_files`
    /// keep only their last `max_tracked_files` entries. Unknown fields are ignored.
    /// An invalid limit is reported before the content is looked at.
    pub fn deserialize(content: &str, max_tracked_files: usize) -> Result<Self, PersistError> {
        BoundedOrderedSet::<String>::new(max_tracked_files)?;

        if content.trim().is_empty() {
            return Err(PersistError::Empty);
        }

        let value: Value =
            serde_json::from_str(content).map_err(|e| PersistError::Malformed(e.to_string()))?;
        let object = value.as_object().ok_or(PersistError::NotAnObject)?;

        let downloaded = string_array(object.get(DOWNLOADED_FIELD), DOWNLOADED_FIELD)?;
        let extracted = string_array(object.get(EXTRACTED_FIELD), EXTRACTED_FIELD)?;

        let persist = Self {
            max_tracked_files,
            downloaded_file_names: BoundedOrderedSet::from_iterable(downloaded, max_tracked_files)?,
            extracted_file_names: BoundedOrderedSet::from_iterable(extracted, max_tracked_files)?,
        };

        let stats = persist.get_eviction_stats();
        if stats.downloaded_evictions > 0 || stats.extracted_evictions > 0 {
            debug!(
                "Dropped oldest entries on load (downloaded: {}, extracted: {}, limit: {})",
                stats.downloaded_evictions, stats.extracted_evictions, max_tracked_files
            );
        }

        Ok(persist)
    }

    pub fn get_eviction_stats(&self) -> EvictionStats {
        EvictionStats {
            downloaded_evictions: self.downloaded_file_names.total_evictions(),
            extracted_evictions: self.extracted_file_names.total_evictions(),
            max_tracked_files: self.max_tracked_files,
        }
    }

    pub fn from_file(path: &Path, max_tracked_files: usize) -> Result<Self, PersistError> {
        let content = persist::read_text(path)?;
        let persist = Self::deserialize(&content, max_tracked_files)?;
        info!(
            "Loaded controller state from {:?} ({} downloaded, {} extracted)",
            path,
            persist.downloaded_file_names.len(),
            persist.extracted_file_names.len()
        );
        Ok(persist)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), PersistError> {
        persist::write_atomic(path, &self.serialize()?)
    }
}

impl Default for ControllerPersist {
    fn default() -> Self {
        Self {
            max_tracked_files: DEFAULT_MAX_TRACKED_FILES,
            downloaded_file_names: BoundedOrderedSet::with_clamped_capacity(DEFAULT_MAX_TRACKED_FILES),
            extracted_file_names: BoundedOrderedSet::with_clamped_capacity(DEFAULT_MAX_TRACKED_FILES),
        }
    }
}

fn string_array(value: Option<&Value>, field: &'static str) -> Result<Vec<String>, PersistError> {
    let items = value
        .ok_or(PersistError::MissingField(field))?
        .as_array()
        .ok_or(PersistError::NotAnArray(field))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_owned)
                .ok_or(PersistError::NotAString { field, index })
        })
        .collect()
}
