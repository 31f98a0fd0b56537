// tests/graph/path_test.rs
use ancestry::error::Error;
use ancestry::graph::{build, BuildOptions};
use ancestry::metadata::{ColumnInfo, TableMetadata};
use ancestry::SchemaGraph;

fn shop() -> SchemaGraph {
    build(
        &[
            TableMetadata::new(
                "orders",
                vec![
                    ColumnInfo::primary_key("order_id"),
                    ColumnInfo::new("customer_id"),
                ],
            ),
            TableMetadata::new("customers", vec![ColumnInfo::primary_key("customer_id")]),
            TableMetadata::new(
                "line_items",
                vec![
                    ColumnInfo::primary_key("item_id"),
                    ColumnInfo::new("order_id"),
                    ColumnInfo::new("product_id"),
                ],
            ),
            TableMetadata::new("products", vec![ColumnInfo::primary_key("product_id")]),
            TableMetadata::new("logs", vec![ColumnInfo::primary_key("log_id")]),
        ],
        BuildOptions::default(),
    )
    .unwrap()
}

fn names(path: &[&str]) -> Option<Vec<String>> {
    Some(path.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_direct_join() {
    assert_eq!(
        shop().find_joins("orders", "customers").unwrap(),
        names(&["customers"])
    );
}

#[test]
fn test_two_hop_join() {
    assert_eq!(
        shop().find_joins("line_items", "customers").unwrap(),
        names(&["orders", "customers"])
    );
}

#[test]
fn test_unknown_table() {
    let graph = shop();

    let err = graph.find_joins("customers", "nonexistent_table").unwrap_err();
    assert!(matches!(err, Error::UnknownTable(ref t) if t == "nonexistent_table"));
    assert!(err.is_unknown_table());

    let err = graph.find_joins("nonexistent_table", "customers").unwrap_err();
    assert!(matches!(err, Error::UnknownTable(ref t) if t == "nonexistent_table"));
}

#[test]
fn test_disconnected_tables() {
    let graph = shop();
    assert_eq!(graph.find_joins("logs", "customers").unwrap(), None);
    assert!(!graph.has_path("logs", "customers").unwrap());
}

#[test]
fn test_joins_follow_reference_direction() {
    let graph = shop();
    assert_eq!(graph.find_joins("customers", "orders").unwrap(), None);
    assert!(graph.has_path("line_items", "products").unwrap());
}

#[test]
fn test_table_does_not_join_itself() {
    assert_eq!(shop().find_joins("orders", "orders").unwrap(), None);
}

#[test]
fn test_every_step_is_an_edge() {
    let graph = shop();
    let tables: Vec<String> = graph.tables().map(|t| t.name.clone()).collect();

    for start in &tables {
        for end in &tables {
            let Some(path) = graph.find_joins(start, end).unwrap() else {
                continue;
            };
            assert_eq!(path.last(), Some(end));

            let mut previous = start.as_str();
            for table in &path {
                assert!(
                    graph.get(previous).unwrap().links_to(table),
                    "{} -> {} is not an edge",
                    previous,
                    table
                );
                previous = table.as_str();
            }
        }
    }
}

#[test]
fn test_depth_bound_counts_start_table() {
    let graph = shop();
    // line_items -> orders -> customers holds three tables.
    assert!(graph
        .find_joins_with_depth("line_items", "customers", 2)
        .unwrap()
        .is_some());

    let err = graph
        .find_joins_with_depth("line_items", "customers", 1)
        .unwrap_err();
    assert!(matches!(err, Error::RunawaySearch { depth: 2, .. }));
}
