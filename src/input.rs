//! Opens the measurements file as one contiguous, read-only byte buffer.

use std::fs::File;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

pub enum InputBuffer {
    Mapped(Mmap),
    /// Zero-length files are not mapped.
    Empty,
}

impl Deref for InputBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputBuffer::Mapped(mmap) => mmap,
            InputBuffer::Empty => &[],
        }
    }
}

/// Joins a relative path onto the working directory and removes `.` and `..`
/// components lexically.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| Error::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Resolves and maps `path`. Fails before any parsing if the file cannot be read.
pub fn open(path: &Path) -> Result<InputBuffer> {
    let path = resolve_path(path)?;
    let unavailable = |source| Error::InputUnavailable {
        path: path.clone(),
        source,
    };

    let file = File::open(&path).map_err(unavailable)?;
    let len = file.metadata().map_err(unavailable)?.len();
    if len == 0 {
        debug!(path = %path.display(), "input is empty");
        return Ok(InputBuffer::Empty);
    }

    // The file must not be truncated or rewritten while the run holds the map.
    let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;
    debug!(path = %path.display(), bytes = mmap.len(), "input mapped");
    Ok(InputBuffer::Mapped(mmap))
}
