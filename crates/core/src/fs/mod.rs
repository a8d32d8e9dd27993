//! [`AssetFileSystem`](satchel_api::AssetFileSystem) implementations.

pub mod local;
pub mod memory;

pub use local::TokioFileSystem;
pub use memory::{FsOp, MemoryFileSystem};
