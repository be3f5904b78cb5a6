//! # capture-sync
//!
//! Reconciles a local folder of PDF captures with a relational capture store.
//!
//! Every file in `<captures-root>/<site>/<date>/` is resolved to a catalog
//! document (through the site's `mapping.json`, or by asking), hashed, and
//! upserted as a capture row keyed by `(document_id, content_hash)`.
//! Re-running over the same folder updates rows instead of duplicating them.
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌────────┐   ┌──────────────┐
//! │ capture dir  │──▶│ Resolver │──▶│ Hasher │──▶│ capture store│
//! │ *.pdf        │   │ mapping  │   │ SHA-256│   │ upsert       │
//! └──────────────┘   └────┬─────┘   └────────┘   └──────────────┘
//!                         │
//!                    ┌────▼─────┐
//!                    │ catalog  │
//!                    │ documents│
//!                    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`hasher`] | Streaming SHA-256 content digests |
//! | [`mapping`] | Per-site stem → URL mapping file |
//! | [`catalog`] | Site matching and candidate ordering |
//! | [`resolver`] | Stem → document resolution and decision providers |
//! | [`store`] | Store trait, SQLite and in-memory backends |
//! | [`sync`] | Sync engine |
//! | [`progress`] | Progress reporting |
//! | [`stats`] | Per-site statistics |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod mapping;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod resolver;
pub mod stats;
pub mod store;
pub mod sync;
