use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use rand::random;
use thiserror::Error;

use crate::bounded_set::BoundedSetError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("Persisted content is empty")]
    Empty,

    #[error("Persisted content is malformed: {0}")]
    Malformed(String),

    #[error("Persisted content is not an object")]
    NotAnObject,

    #[error("Persisted content is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{0}' is not an array")]
    NotAnArray(&'static str),

    #[error("Element {index} of field '{field}' is not a string")]
    NotAString { field: &'static str, index: usize },

    #[error("Invalid tracking limit: {0}")]
    InvalidLimit(#[from] BoundedSetError),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    IO(String),
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::IO(e.to_string())
    }
}

/// Read a whole persisted text blob
pub fn read_text(path: &Path) -> Result<String, PersistError> {
    Ok(fs::read_to_string(path)?)
}

/// Write a text blob so that readers see either the old or the new content, never a partial file.
/// Every call writes through its own temp file, so concurrent writers to one path do not collide.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(format!(".{}.{}.tmp", std::process::id(), random::<u64>()));
    let tmp_path = Path::new(&tmp_name);

    let written = write_synced(tmp_path, content).and_then(|()| fs::rename(tmp_path, path));
    if let Err(e) = written {
        fs::remove_file(tmp_path).ok();
        return Err(e.into());
    }

    Ok(())
}

fn write_synced(path: &Path, content: &str) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(content.as_bytes())?;
    f.sync_all()
}
