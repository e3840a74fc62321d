//! # fluxo-db: Persistence Layer for Fluxo
//!
//! Stores the full desk state in SQLite and hands it back verbatim.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fluxo Data Flow                                  │
//! │                                                                         │
//! │  fluxo-desk command (mutates CashDesk)                                 │
//! │       │  desk.snapshot()                                                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fluxo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────────┐  ┌──────────────┐ │   │
//! │  │   │   Database    │    │   Repositories    │  │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                   │  │  (embedded)  │ │   │
//! │  │   │               │    │ ProductRepository │  │              │ │   │
//! │  │   │ load_snapshot │◄───│ TransactionRepo.  │  │ 001_initial  │ │   │
//! │  │   │ save_snapshot │    │ SessionRepository │  │              │ │   │
//! │  │   └───────────────┘    └───────────────────┘  └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/fluxo.db                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence is full-list: every save replaces all three lists inside one
//! SQL transaction, so a crash never leaves a half-written state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fluxo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("fluxo.db")).await?;
//! let snapshot = db.load_snapshot().await?;
//! let desk = fluxo_core::CashDesk::from_snapshot(snapshot)?;
//! // ... mutate ...
//! db.save_snapshot(&desk.snapshot()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::session::SessionRepository;
pub use repository::transaction::TransactionRepository;
