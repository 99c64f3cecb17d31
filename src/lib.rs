//! Core library surface for the Customer Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the SQLite-backed customer store, the domain types, the export
//! helpers, and the interactive front-end.
pub mod db;
pub mod export;
pub mod models;
pub mod ui;

/// The persistence layer: the store itself plus the typed filter/sort specs
/// it consumes and the error kinds it raises.
pub use db::{CustomerStore, FilterOp, Predicate, SortSpec, StoreError};

/// Tabular export of the customer set.
pub use export::{export_customers, ExportFormat};

/// The primary domain types that other layers manipulate.
pub use models::{Customer, CustomerField};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
