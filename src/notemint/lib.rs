//! # Notemint Architecture
//!
//! Notemint is a **UI-agnostic note-curation library**. This is not a CLI application that
//! happens to have some library code—it's a library that happens to have a CLI client.
//!
//! This distinction drives the entire architecture and should guide all development.
//!
//! ## The Layered Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs, wired by main.rs)                      │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Owns the registry and the config/data paths              │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic for each operation                        │
//! │  - Operates on Rust types, returns Rust types               │
//! │  - Terminal I/O only for interactive confirmation           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (registry.rs, index.rs, transaction.rs, fix/)         │
//! │  - Merged corpus view, conflict detection                   │
//! │  - Staged, conflict-checked multi-file edits                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract NoteStore trait                                 │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Id System
//!
//! Every curated note carries a 14-digit id of the form `YYYYMMDDHHMMSS`, derived from its
//! creation timestamp truncated to the second. Ids must be unique across every directory the
//! registry knows about; the registry's merge step is the single authority on which ids are
//! valid and which are conflicted. See registry.rs for more information.
//!
//! ## Key Principle: Nothing Touches Disk Until Commit
//!
//! Edits are staged into a [`transaction::ChangeTransaction`] and cross-checked against the
//! transaction's own working state—not the filesystem—so several proposed changes to the same
//! corpus (renames, re-ids, re-dates) can see each other's effects before a single byte is
//! written. Committing a transaction is the only code path that writes note files.
//!
//! ## Testing Strategy
//!
//! 1. **Core** (`registry.rs`, `index.rs`, `transaction.rs`, `note.rs`): thorough unit tests
//!    of the merge, refresh, and staging logic against `InMemoryStore`.
//!    This is where the lion's share of testing lives.
//!
//! 2. **Fixers** (`fix/*.rs`): unit tests of each repair policy's applicability and proposal.
//!
//! 3. **CLI** (`args.rs` + thin `main.rs`): integration tests driving the real binary in a
//!    temporary home directory.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`registry`]: The merged, conflict-checked view across every indexed directory
//! - [`index`]: Incremental per-directory note index
//! - [`transaction`]: Staged multi-file change transactions
//! - [`fix`]: Repair policies for missing note attributes
//! - [`note`]: Front-matter parsing and note serialization
//! - [`model`]: Core data types (`NoteInfo`, `FileStat`, `ParseState`)
//! - [`store`]: Storage abstraction and implementations
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod fix;
pub mod index;
pub mod model;
pub mod note;
pub mod registry;
pub mod store;
pub mod transaction;
