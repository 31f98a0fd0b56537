//! Metadata loader.
//!
//! Reads table names, column names and primary-key flags through the
//! [`Database`](crate::db::Database) metadata primitives and produces the flat
//! table descriptions the graph builder consumes.
//!
//! # Example
//!
//! ```ignore
//! use ancestry::metadata;
//!
//! let tables = metadata::load(&mut db)?;
//! for table in &tables {
//!     println!("{} pk={:?}", table.name, table.primary_key());
//! }
//! ```

mod loader;
mod types;

pub use loader::load;
pub use types::{ColumnInfo, TableMetadata};
