//! Graph builder: turns table metadata into the inferred edge graph.

use std::collections::HashMap;

use super::{SchemaGraph, TableDescriptor};
use crate::config::{CollisionPolicy, GraphSettings};
use crate::error::{Error, Result};
use crate::metadata::TableMetadata;

/// Options controlling edge inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub collision_policy: CollisionPolicy,
}

impl BuildOptions {
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

impl From<&GraphSettings> for BuildOptions {
    fn from(settings: &GraphSettings) -> Self {
        Self {
            collision_policy: settings.collision_policy,
        }
    }
}

/// Build the schema graph from loaded metadata.
///
/// For every table `T` and column `C`:
/// - if `C` is not `T`'s primary key but is some table's primary key, `T`
///   links to that table;
/// - if `C` is `T`'s primary key, every other table carrying a column named
///   `C` is recorded in `T.linked_from`.
///
/// Output depends only on the input and its order.
pub fn build(tables: &[TableMetadata], options: BuildOptions) -> Result<SchemaGraph> {
    let owners = primary_key_owners(tables, options.collision_policy)?;

    let descriptors = tables
        .iter()
        .map(|table| {
            let pk = table.primary_key();
            let mut linked_to = Vec::new();
            let mut linked_from = Vec::new();

            for column in table.column_names() {
                if Some(column) == pk {
                    for other in tables.iter().filter(|o| o.name != table.name) {
                        linked_from.extend(
                            other
                                .column_names()
                                .filter(|c| *c == column)
                                .map(|_| other.name.clone()),
                        );
                    }
                } else if let Some(&owner) = owners.get(column) {
                    // Self edges would only yield degenerate self-joins.
                    if owner != table.name {
                        linked_to.push(owner.to_string());
                    }
                }
            }

            TableDescriptor {
                name: table.name.clone(),
                columns: table.column_names().map(String::from).collect(),
                primary_key: pk.map(String::from),
                linked_to,
                linked_from,
            }
        })
        .collect::<Vec<_>>();

    let graph = SchemaGraph::from(descriptors);
    log::debug!(
        "built schema graph: {} tables, {} edges",
        graph.len(),
        graph.edges().len()
    );
    Ok(graph)
}

/// Map each primary-key column name to the table that owns it.
fn primary_key_owners(
    tables: &[TableMetadata],
    policy: CollisionPolicy,
) -> Result<HashMap<&str, &str>> {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for table in tables {
        let Some(pk) = table.primary_key() else {
            continue;
        };

        if let Some(previous) = owners.insert(pk, table.name.as_str()) {
            if previous == table.name {
                continue;
            }
            match policy {
                CollisionPolicy::LastWriteWins => {
                    log::warn!(
                        "primary key column '{}' shared by '{}' and '{}', using '{}'",
                        pk,
                        previous,
                        table.name,
                        table.name
                    );
                }
                CollisionPolicy::Reject => {
                    return Err(Error::PrimaryKeyCollision {
                        column: pk.to_string(),
                        first: previous.to_string(),
                        second: table.name.clone(),
                    });
                }
            }
        }
    }

    Ok(owners)
}
