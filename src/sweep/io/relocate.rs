use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::sweep::error::{Result, SweepError};

/// Where a folder ended up after [`move_folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFolder {
    pub target: PathBuf,
    /// Set when the plain name was taken and a ` (n)` suffix was used.
    pub renamed: bool,
}

/// Picks the first free path among `desired`, `desired (1)`, `desired (2)`…
///
/// `exists` decides whether a path is taken, which keeps the search
/// independent of the filesystem.
pub fn unique_target(desired: &Path, exists: impl Fn(&Path) -> bool) -> PathBuf {
    if !exists(desired) {
        return desired.to_path_buf();
    }

    let base = desired
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut counter = 1u64;
    loop {
        let candidate = desired.with_file_name(format!("{base} ({counter})"));
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Moves the `source` folder into `destination`, creating the destination
/// when needed and never overwriting an existing entry.
pub fn move_folder(source: &Path, destination: &Path) -> Result<MovedFolder> {
    let name = source
        .file_name()
        .ok_or_else(|| SweepError::SourceMissing(source.to_path_buf()))?;
    if !source.is_dir() {
        return Err(SweepError::SourceMissing(source.to_path_buf()));
    }

    if !destination.exists() {
        fs::create_dir_all(destination)?;
        debug!(destination = %destination.display(), "created destination folder");
    }

    let desired = destination.join(name);
    let target = unique_target(&desired, |path| path.symlink_metadata().is_ok());
    let renamed = target != desired;
    if renamed {
        debug!(
            existing = %desired.display(),
            target = %target.display(),
            "destination name taken, renaming"
        );
    }

    match fs::rename(source, &target) {
        Ok(()) => {}
        Err(error) if error.kind() == ErrorKind::CrossesDevices => {
            debug!(source = %source.display(), "rename crosses devices, copying");
            copy_then_remove(source, &target)?;
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(SweepError::SourceMissing(source.to_path_buf()));
        }
        Err(error) => return Err(error.into()),
    }

    Ok(MovedFolder { target, renamed })
}

/// Copies `source` to `target` and removes `source`. A failed copy leaves no
/// partial tree at `target`.
fn copy_then_remove(source: &Path, target: &Path) -> Result<()> {
    if let Err(error) = copy_tree(source, target) {
        if target.symlink_metadata().is_ok() {
            if let Err(cleanup) = fs::remove_dir_all(target) {
                warn!(target = %target.display(), error = %cleanup, "partial copy left behind");
            }
        }
        return Err(error);
    }

    fs::remove_dir_all(source).map_err(|error| SweepError::SourceNotRemoved {
        source_path: source.to_path_buf(),
        target: target.to_path_buf(),
        error,
    })
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| SweepError::SourceMissing(entry.path().to_path_buf()))?;
        let destination = target.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&destination)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, destination: &Path) -> Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, destination)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, destination: &Path) -> Result<()> {
    fs::copy(link, destination)?;
    Ok(())
}
