//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all notemint operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Carries the shared state** (the registry and the config/data paths)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! The API explicitly avoids:
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O formatting**: No stdout, stderr, or terminal concerns
//! - **Presentation**: Returns data structures, not rendered strings
//!
//! ## Generic Over NoteStore
//!
//! `MintApi<S: NoteStore>` is generic over the storage backend:
//! - Production: `MintApi<FileStore>`
//! - Testing: `MintApi<InMemoryStore>`
//!
//! This enables exercising the full command surface without touching the
//! filesystem a note lives on (the data directory is still real).

use crate::commands;
use crate::error::Result;
use crate::fix::Fixer;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::path::{Path, PathBuf};

/// The main API facade for notemint operations.
///
/// All UI clients (CLI today, anything else later) should interact
/// through this API.
pub struct MintApi<S: NoteStore> {
    registry: Registry<S>,
    paths: commands::MintPaths,
}

impl<S: NoteStore> MintApi<S> {
    pub fn new(registry: Registry<S>, paths: commands::MintPaths) -> Self {
        Self { registry, paths }
    }

    pub fn summary(&mut self, count: usize) -> Result<commands::CmdResult> {
        commands::summary::run(&mut self.registry, &self.paths.data, count)
    }

    pub fn index_overview(&mut self) -> Result<commands::CmdResult> {
        commands::overview::run(&mut self.registry, &self.paths.data)
    }

    pub fn create_index(
        &mut self,
        name: &str,
        cwd: &Path,
        skip_confirm: bool,
    ) -> Result<commands::CmdResult> {
        commands::create::run(&mut self.registry, &self.paths.data, name, cwd, skip_confirm)
    }

    pub fn delete_index(&mut self, name: &str, skip_confirm: bool) -> Result<commands::CmdResult> {
        commands::delete::run(&mut self.registry, &self.paths.data, name, skip_confirm)
    }

    pub fn reload_indices(&mut self) -> Result<commands::CmdResult> {
        commands::reload::run(&mut self.registry, &self.paths.data)
    }

    pub fn archive_indices(
        &mut self,
        names: &[String],
        output_dir: &Path,
    ) -> Result<commands::CmdResult> {
        commands::archive::run(&mut self.registry, &self.paths.data, names, output_dir)
    }

    pub fn fix_report(&mut self, count: usize) -> Result<commands::CmdResult> {
        commands::fix::report(&mut self.registry, &self.paths.data, count)
    }

    pub fn fix(
        &mut self,
        fixers: &[Fixer],
        files: &[PathBuf],
        cwd: &Path,
        count: Option<usize>,
        skip_confirm: bool,
    ) -> Result<commands::CmdResult> {
        commands::fix::run(
            &mut self.registry,
            &self.paths.data,
            fixers,
            files,
            cwd,
            count,
            skip_confirm,
        )
    }

    pub fn set_backlinks(
        &mut self,
        enabled: bool,
        files: &[PathBuf],
        cwd: &Path,
        skip_confirm: bool,
    ) -> Result<commands::CmdResult> {
        commands::backlinks::set(
            &mut self.registry,
            &self.paths.data,
            enabled,
            files,
            cwd,
            skip_confirm,
        )
    }

    pub fn generate_backlinks(&mut self, skip_confirm: bool) -> Result<commands::CmdResult> {
        commands::backlinks::generate(&mut self.registry, &self.paths.data, skip_confirm)
    }

    pub fn config(&self, author: Option<&str>) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths.config, author)
    }

    pub fn paths(&self) -> &commands::MintPaths {
        &self.paths
    }
}

pub use commands::{CmdMessage, CmdResult, IndexOverview, MessageLevel, MintPaths};
