//! Persistence module split across logical submodules.

mod connection;
mod error;
mod query;
mod store;

pub use error::{Result, StoreError};
pub use query::{FilterOp, Predicate, SortSpec};
pub use store::CustomerStore;
