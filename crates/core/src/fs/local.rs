use async_trait::async_trait;
use satchel_api::{AssetFileSystem, FileKind, FileStatus};
use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// The real filesystem, through `tokio::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn status_of(metadata: &Metadata) -> FileStatus {
    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    };

    FileStatus {
        kind,
        size: metadata.len(),
    }
}

#[async_trait]
impl AssetFileSystem for TokioFileSystem {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStatus> {
        tokio::fs::metadata(path).await.map(|m| status_of(&m))
    }

    async fn symlink_stat(&self, path: &Path) -> io::Result<FileStatus> {
        tokio::fs::symlink_metadata(path).await.map(|m| status_of(&m))
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }
}
