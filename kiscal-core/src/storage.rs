//! File-backed calendar storage.
//!
//! Layout: `{root}/{owner}/{name}`. Calendar paths are joined through a
//! `VirtualRoot`, so no request (and no symlink inside the tree) can reach a
//! file outside the root. Every write replaces the whole file by writing a
//! sibling temp file and renaming it over the target, so readers see either
//! the old document or the new one.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use strict_path::{VirtualPath, VirtualRoot};
use tempfile::NamedTempFile;

use crate::error::{KiscalError, KiscalResult};
use crate::path::CalendarPath;

/// Marker for paths inside the calendar tree.
pub struct Calendars;

pub struct CalendarStore {
    root: PathBuf,
    vroot: VirtualRoot<Calendars>,
}

impl CalendarStore {
    /// Use `root` as the storage root, creating it if it doesn't exist yet.
    pub fn create(root: impl Into<PathBuf>) -> KiscalResult<Self> {
        let root = root.into();
        let vroot = VirtualRoot::try_new_create(&root).map_err(|e| KiscalError::StorageRoot {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { root, vroot })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `calendar` onto the root. Anything that would land outside it
    /// is an invalid path.
    pub fn locate(&self, calendar: &CalendarPath) -> KiscalResult<VirtualPath<Calendars>> {
        self.vroot
            .virtual_join(calendar.relative())
            .map_err(|e| KiscalError::InvalidPath(format!("{calendar}: {e}")))
    }

    /// Open a stored calendar for reading, returning the file and its length.
    pub fn open(&self, calendar: &CalendarPath) -> KiscalResult<(File, u64)> {
        let not_found = || KiscalError::NotFound(calendar.to_string());

        let path = self.locate(calendar).map_err(|_| not_found())?;

        let file = match File::open(Path::new(path.interop_path())) {
            Ok(file) => file,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Err(not_found());
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok((file, metadata.len()))
    }

    /// Create or fully replace `calendar` with `data`.
    pub fn write(&self, calendar: &CalendarPath, data: &[u8]) -> KiscalResult<PathBuf> {
        let path = self.locate(calendar)?;
        let target = Path::new(path.interop_path()).to_path_buf();
        let dir = target
            .parent()
            .ok_or_else(|| KiscalError::InvalidPath(calendar.to_string()))?;

        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        set_readable(tmp.path())?;
        tmp.persist(&target).map_err(|e| e.error)?;

        tracing::debug!(path = %path.virtualpath_display(), bytes = data.len(), "wrote calendar");

        Ok(target)
    }
}

// Temp files are created owner-only; stored calendars are world-readable.
#[cfg(unix)]
fn set_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
