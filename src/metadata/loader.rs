use std::time::Instant;

use super::TableMetadata;
use crate::db::Database;
use crate::error::Result;

/// Load every visible table with its columns.
///
/// Any failing metadata query aborts the whole load; no partial result is
/// returned.
pub fn load<D: Database + ?Sized>(db: &mut D) -> Result<Vec<TableMetadata>> {
    let started = Instant::now();
    let names = db.enumerate_tables()?;
    log::debug!(
        "loading metadata for {} tables from '{}'",
        names.len(),
        db.database_name()
    );

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = db.enumerate_columns(&name)?;
        if columns.iter().filter(|c| c.is_primary_key).count() > 1 {
            log::debug!("table '{}' has a composite primary key, ignoring it", name);
        }
        tables.push(TableMetadata { name, columns });
    }

    log::info!(
        "loaded {} tables in {:.1?}",
        tables.len(),
        started.elapsed()
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDatabase;

    #[test]
    fn test_load_reads_columns_in_order() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE orders (order_id INTEGER PRIMARY KEY, customer_id INTEGER, note TEXT);
             CREATE TABLE customers (customer_id INTEGER PRIMARY KEY);",
        )
        .unwrap();

        let tables = load(&mut db).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "customers");
        assert_eq!(tables[1].name, "orders");
        assert_eq!(
            tables[1].column_names().collect::<Vec<_>>(),
            vec!["order_id", "customer_id", "note"]
        );
        assert_eq!(tables[1].primary_key(), Some("order_id"));
    }

    #[test]
    fn test_load_empty_database() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        assert!(load(&mut db).unwrap().is_empty());
    }
}
