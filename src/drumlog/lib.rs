//! # Drumlog Architecture
//!
//! Drumlog is a **practice tracker library for drummers** with a command-line client.
//! It keeps two collections, songs and skills. Each item has a mastery percentage,
//! a difficulty rating, and two checklists ("notes" and "struggles").
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Id resolution, filtering/sorting, checklist edits        │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - ItemStore trait: the item repository                     │
//! │  - LocalStore (JSON files / memory)                         │
//! │  - RemoteStore (Firestore / memory)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr and never exits.
//! Diagnostics go through `tracing`; the binary decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/`): both adapters against in-memory backends, the
//!    filesystem backend against a temp dir.
//! 2. **Commands** (`commands/*.rs`): business logic over `LocalStore<MemBackend>`.
//! 3. **API** (`api.rs`): dispatch only.
//! 4. **CLI** (`tests/`): the binary end to end, with `DRUMLOG_HOME` pointing at a temp dir.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`store`]: Item repository trait and both adapters
//! - [`model`]: Core data types (`Item`, `ItemDraft`, `ItemPatch`, `Collection`, `Scope`)
//! - [`checklist`]: Notes/struggles line handling
//! - [`id`]: Id generators
//! - [`catalog`]: Song lookup (iTunes Search API)
//! - [`config`]: Configuration management
//! - [`logging`]: Subscriber setup for the binary
//! - [`error`]: Error types

pub mod api;
pub mod catalog;
pub mod checklist;
pub mod commands;
pub mod config;
pub mod error;
pub mod id;
pub mod logging;
pub mod model;
pub mod store;
