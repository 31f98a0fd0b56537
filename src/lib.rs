//! # Ancestry
//!
//! Infers the foreign-key graph of a relational schema from column names and
//! answers "does this record descend from that one" questions over it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Database connection                     │
//! │        (enumerate tables, columns, primary keys)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │                   TableMetadata                          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph builder]  ◄──► [cache]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SchemaGraph (linked_to / linked_from edges)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [join path search]
//! ┌─────────────────────────────────────────────────────────┐
//! │          SELECT COUNT(*) ... INNER JOIN ... WHERE        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A column that is not its own table's primary key but carries the name of
//! another table's primary key is taken to reference that table. Nothing
//! else (declared constraints, types, naming conventions) is consulted.

pub mod ancestry;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod session;
pub mod sql;

pub use ancestry::{is_descendant, AncestryQuery};
pub use db::{Database, SqliteDatabase, Value};
pub use error::{Error, Result};
pub use graph::{SchemaGraph, TableDescriptor};
pub use session::Session;
