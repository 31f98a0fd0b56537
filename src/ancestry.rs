//! Ancestry queries.
//!
//! A record is a descendant of another when the two rows are connected by a
//! chain of inner joins along the inferred join path. Consecutive tables on
//! the path are joined on the *referenced* table's primary-key column name:
//!
//! ```text
//! line_items -> orders -> customers
//!
//! SELECT COUNT(*) FROM "line_items" AS "t0"
//!   INNER JOIN "orders" AS "t1" ON "t1"."order_id" = "t0"."order_id"
//!   INNER JOIN "customers" AS "t2" ON "t2"."customer_id" = "t1"."customer_id"
//!   WHERE "t0"."item_id" = ? AND "t2"."customer_id" = ?
//! ```
//!
//! Each table is aliased by its position on the path, so a self edge joins
//! two distinct row sets. Identifiers come from schema metadata and are
//! quoted into the statement. Record ids are bound as parameters.

use crate::db::{Database, Value};
use crate::error::{Error, Result};
use crate::graph::{SchemaGraph, DEFAULT_MAX_DEPTH};
use crate::sql::Dialect;

/// A synthesized counting statement plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AncestryQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl AncestryQuery {
    /// Build the statement for an already resolved join path.
    ///
    /// `path` excludes the descendant table and ends with the ancestor table.
    pub fn build(
        graph: &SchemaGraph,
        dialect: Dialect,
        descendant_table: &str,
        descendant_id: Value,
        path: &[String],
        ancestor_id: Value,
    ) -> Result<Self> {
        let ancestor_table = path
            .last()
            .map(String::as_str)
            .unwrap_or(descendant_table);
        let descendant_pk = primary_key(graph, descendant_table)?;
        let ancestor_pk = primary_key(graph, ancestor_table)?;

        // Every hop gets its own alias so a table may appear twice.
        let alias = |i: usize| dialect.quote_identifier(&format!("t{}", i));
        let column = |i: usize, col: &str| dialect.qualified(&format!("t{}", i), col);

        let mut sql = format!(
            "SELECT COUNT(*) FROM {} AS {}",
            dialect.quote_identifier(descendant_table),
            alias(0)
        );

        for (i, table) in path.iter().enumerate() {
            let hop = i + 1;
            let pk = primary_key(graph, table)?;
            sql.push_str(&format!(
                " INNER JOIN {} AS {} ON {} = {}",
                dialect.quote_identifier(table),
                alias(hop),
                column(hop, pk),
                column(i, pk),
            ));
        }

        sql.push_str(&format!(
            " WHERE {} = {} AND {} = {}",
            column(0, descendant_pk),
            dialect.placeholder(),
            column(path.len(), ancestor_pk),
            dialect.placeholder(),
        ));

        Ok(Self {
            sql,
            params: vec![descendant_id, ancestor_id],
        })
    }
}

fn primary_key<'a>(graph: &'a SchemaGraph, table: &str) -> Result<&'a str> {
    graph
        .get(table)?
        .primary_key
        .as_deref()
        .ok_or_else(|| Error::NoPrimaryKey(table.to_string()))
}

/// Check whether a descendant record reaches an ancestor record through the
/// inferred join graph.
///
/// Unrelated tables answer `false` without touching the database.
pub fn is_descendant<D: Database + ?Sized>(
    db: &mut D,
    graph: &SchemaGraph,
    descendant_table: &str,
    descendant_id: impl Into<Value>,
    ancestor_table: &str,
    ancestor_id: impl Into<Value>,
) -> Result<bool> {
    is_descendant_with_depth(
        db,
        graph,
        DEFAULT_MAX_DEPTH,
        descendant_table,
        descendant_id.into(),
        ancestor_table,
        ancestor_id.into(),
    )
}

/// [`is_descendant`] with an explicit search depth bound.
pub fn is_descendant_with_depth<D: Database + ?Sized>(
    db: &mut D,
    graph: &SchemaGraph,
    max_depth: usize,
    descendant_table: &str,
    descendant_id: Value,
    ancestor_table: &str,
    ancestor_id: Value,
) -> Result<bool> {
    let path = match graph.find_joins_with_depth(descendant_table, ancestor_table, max_depth)? {
        Some(path) => path,
        None => {
            log::debug!(
                "{} is unrelated to {}, skipping query",
                descendant_table,
                ancestor_table
            );
            return Ok(false);
        }
    };

    let dialect = db.dialect();
    let query = AncestryQuery::build(
        graph,
        dialect,
        descendant_table,
        descendant_id,
        &path,
        ancestor_id,
    )?;
    log::debug!(
        "ancestry query ({}): {} {:?}",
        dialect.name(),
        query.sql,
        query.params
    );

    let count = db
        .value(&query.sql, &query.params)?
        .ok_or_else(|| Error::UnexpectedResult("COUNT(*) returned no row".to_string()))?;
    let count = count
        .as_i64()
        .ok_or_else(|| Error::UnexpectedResult(format!("non-integer count: {}", count)))?;

    Ok(count > 0)
}
