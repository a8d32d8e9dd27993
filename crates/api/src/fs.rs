//! Filesystem capability handed to the collector by the host.
//!
//! Every call yields exactly one of a value or an `io::Error`. Hosts with
//! virtual or cached filesystems implement [`AssetFileSystem`] directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Classification reported by a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    /// Devices, sockets, FIFOs and anything else
    Other,
}

/// Result of a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub kind: FileKind,
    /// Size in bytes as reported by the filesystem
    pub size: u64,
}

impl FileStatus {
    pub fn file(size: u64) -> Self {
        Self {
            kind: FileKind::File,
            size,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: FileKind::Directory,
            size: 0,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

#[async_trait]
pub trait AssetFileSystem: Send + Sync {
    /// Names of the immediate children of `dir`, without the directory prefix.
    ///
    /// Names are returned as the filesystem reports them, so entries whose
    /// names are not valid UTF-8 can still be joined back onto `dir`.
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<OsString>>;

    /// Full byte content of `path`.
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Status of `path`, following symbolic links.
    async fn stat(&self, path: &Path) -> io::Result<FileStatus>;

    /// Status of `path` itself; a symbolic link reports [`FileKind::Symlink`].
    async fn symlink_stat(&self, path: &Path) -> io::Result<FileStatus>;

    /// Absolute form of `path` with every symbolic link resolved.
    ///
    /// Two paths naming the same directory must canonicalize to the same
    /// value; the collector relies on this to stop at symlink cycles.
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(FileStatus::file(12).is_file());
        assert!(!FileStatus::file(12).is_dir());
        assert!(FileStatus::directory().is_dir());

        let link = FileStatus {
            kind: FileKind::Symlink,
            size: 0,
        };
        assert!(link.is_symlink());
        assert!(!link.is_file());
    }
}
