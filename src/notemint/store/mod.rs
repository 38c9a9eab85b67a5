//! # Storage Layer
//!
//! This module defines the storage abstraction for notemint. The [`NoteStore`] trait
//! is the contract the core needs from a filesystem: enumerate, read, write, hash,
//! rename, and report times. Nothing above this layer touches `std::fs` for note files.
//!
//! ## Design Rationale
//!
//! Storage is abstracted behind a trait to:
//! - Enable **testing** with `InMemoryStore` (no filesystem needed)
//! - Keep the merge/transaction logic **decoupled** from platform details
//!   like how creation times are (or aren't) reported
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production file-based storage
//!   - Recursive scans via `walkdir`
//!   - SHA-256 content checksums rendered as `sha256:<hex>`
//!   - Creation time where the platform has one, modification time otherwise
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Deterministic file times, set by the test fixtures
//!
//! ## Stat Records
//!
//! Enumeration returns [`FileStat`] records (directory, name, mtime, size, optional
//! checksum). Checksums are filled in lazily by the index layer; a fresh enumeration
//! never hashes anything on its own.

use crate::error::Result;
use crate::model::FileStat;
use chrono::{DateTime, FixedOffset};
use std::path::Path;

pub mod fs;
pub mod memory;

/// Abstract interface for note file storage.
pub trait NoteStore {
    /// Enumerate files under `root` whose file name passes `predicate`.
    fn list_files(&self, root: &Path, predicate: &dyn Fn(&str) -> bool) -> Result<Vec<FileStat>>;

    /// Read a file's full text content.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Write a file's full text content, replacing whatever was there.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Compute a strong checksum of the file's contents.
    fn checksum(&self, path: &Path) -> Result<String>;

    /// Move/rename a file.
    fn move_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// The file's creation time where the platform exposes one, otherwise its
    /// modification time. The flag reports which of the two was returned.
    fn file_time(&self, path: &Path) -> Result<(DateTime<FixedOffset>, bool)>;
}
