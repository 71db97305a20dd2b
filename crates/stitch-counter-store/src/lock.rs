//! Cross-process lock serializing writers of one library file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Exclusive lock held on `<library>.lock`; released on drop.
pub struct LibraryLock {
    file: File,
    path: PathBuf,
}

impl LibraryLock {
    /// Lock file guarding `library`.
    pub fn path_for(library: &Path) -> PathBuf {
        let mut name = library.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Block until the exclusive lock for `library` is held.
    pub fn acquire(library: &Path) -> io::Result<Self> {
        let path = Self::path_for(library);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        fs2::FileExt::lock_exclusive(&file)?;
        Ok(Self { file, path })
    }
}

impl Drop for LibraryLock {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %err, "Failed to release library lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_file_sits_next_to_the_library() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let library = dir.path().join("projects.json");
        let lock = LibraryLock::acquire(&library)?;
        assert_eq!(lock.path, dir.path().join("projects.json.lock"));
        assert!(lock.path.exists());
        Ok(())
    }

    #[test]
    fn second_holder_waits_for_release() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let library = dir.path().join("projects.json");
        let held = LibraryLock::acquire(&library)?;

        let other = File::open(LibraryLock::path_for(&library))?;
        assert!(fs2::FileExt::try_lock_exclusive(&other).is_err());

        drop(held);
        fs2::FileExt::try_lock_exclusive(&other)?;
        Ok(())
    }
}
