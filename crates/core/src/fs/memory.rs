//! In-memory filesystem.
//!
//! Lets hosts stage virtual companion files and lets tests inject failures
//! for individual operations on individual paths.

use async_trait::async_trait;
use dashmap::DashMap;
use satchel_api::{AssetFileSystem, FileKind, FileStatus};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::path::lexical;

const MAX_LINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Node {
    File(Arc<[u8]>),
    Dir,
    Symlink(PathBuf),
    /// Device, socket or FIFO
    Special,
}

/// Operation selector for injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    ReadDir,
    ReadFile,
    Stat,
    Canonicalize,
}

#[derive(Default)]
pub struct MemoryFileSystem {
    nodes: DashMap<PathBuf, Node>,
    failures: DashMap<(FsOp, PathBuf), io::ErrorKind>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating missing parent directories
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) -> &Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes
            .insert(path, Node::File(Arc::from(content.as_ref())));
        self
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) -> &Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(path, Node::Dir);
        self
    }

    /// Add a symbolic link at `link` pointing to `target`. Relative targets
    /// resolve against the link's parent directory.
    pub fn add_symlink(&self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> &Self {
        let link = link.into();
        self.add_parents(&link);
        self.nodes.insert(link, Node::Symlink(target.into()));
        self
    }

    /// Add an entry that is neither a file, a directory nor a link
    pub fn add_special(&self, path: impl Into<PathBuf>) -> &Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(path, Node::Special);
        self
    }

    /// Make every future `op` on `path` fail with `kind`
    pub fn fail(&self, op: FsOp, path: impl Into<PathBuf>, kind: io::ErrorKind) -> &Self {
        self.failures.insert((op, path.into()), kind);
        self
    }

    /// Highest number of operations observed running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn add_parents(&self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
    }

    fn injected(&self, op: FsOp, path: &Path) -> io::Result<()> {
        match self.failures.get(&(op, path.to_path_buf())) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected {:?} failure for {}", op, path.display()),
            )),
            None => Ok(()),
        }
    }

    fn node(&self, path: &Path) -> io::Result<Node> {
        self.nodes
            .get(path)
            .map(|n| n.value().clone())
            .ok_or_else(|| not_found(path))
    }

    /// Follow symlinks in every component of `path` until a non-link node is
    /// reached
    fn resolve(&self, path: &Path) -> io::Result<(PathBuf, Node)> {
        let mut resolved = PathBuf::new();
        let mut hops = 0;
        for component in path.components() {
            resolved.push(component);
            while let Some(Node::Symlink(target)) =
                self.nodes.get(&resolved).map(|n| n.value().clone())
            {
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    return Err(io::Error::other(format!(
                        "too many levels of symbolic links: {}",
                        path.display()
                    )));
                }
                resolved = match resolved.parent() {
                    Some(parent) if target.is_relative() => lexical(&parent.join(&target)),
                    _ => target,
                };
            }
        }

        let node = self.node(&resolved).map_err(|_| not_found(path))?;
        Ok((resolved, node))
    }

    /// Track concurrency around a single operation and yield once so that
    /// concurrently polled operations overlap.
    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        InFlight(&self.in_flight)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn status_of(node: &Node) -> FileStatus {
    match node {
        Node::File(content) => FileStatus::file(content.len() as u64),
        Node::Dir => FileStatus::directory(),
        Node::Symlink(_) => FileStatus {
            kind: FileKind::Symlink,
            size: 0,
        },
        Node::Special => FileStatus {
            kind: FileKind::Other,
            size: 0,
        },
    }
}

#[async_trait]
impl AssetFileSystem for MemoryFileSystem {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let _guard = self.enter().await;
        self.injected(FsOp::ReadDir, dir)?;

        let (resolved, node) = self.resolve(dir)?;
        if !matches!(node, Node::Dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", dir.display()),
            ));
        }

        let mut names: Vec<OsString> = self
            .nodes
            .iter()
            .filter(|entry| entry.key().parent() == Some(resolved.as_path()))
            .filter_map(|entry| entry.key().file_name().map(|n| n.to_os_string()))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let _guard = self.enter().await;
        self.injected(FsOp::ReadFile, path)?;

        match self.resolve(path)?.1 {
            Node::File(content) => Ok(content.to_vec()),
            Node::Dir => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )),
        }
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStatus> {
        let _guard = self.enter().await;
        self.injected(FsOp::Stat, path)?;
        let (_, node) = self.resolve(path)?;
        Ok(status_of(&node))
    }

    async fn symlink_stat(&self, path: &Path) -> io::Result<FileStatus> {
        let _guard = self.enter().await;
        self.injected(FsOp::Stat, path)?;

        // Resolve links in the parent, but not in the final component
        let unresolved = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                self.resolve(parent)?.0.join(name)
            }
            _ => path.to_path_buf(),
        };
        let node = self.node(&unresolved).map_err(|_| not_found(path))?;
        Ok(status_of(&node))
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let _guard = self.enter().await;
        self.injected(FsOp::Canonicalize, path)?;
        Ok(self.resolve(path)?.0)
    }
}
