// tests/graph/builder_test.rs
use ancestry::config::CollisionPolicy;
use ancestry::error::Error;
use ancestry::graph::{build, BuildOptions};
use ancestry::metadata::{ColumnInfo, TableMetadata};

fn orders_and_customers() -> Vec<TableMetadata> {
    vec![
        TableMetadata::new(
            "orders",
            vec![
                ColumnInfo::primary_key("order_id"),
                ColumnInfo::new("customer_id"),
            ],
        ),
        TableMetadata::new("customers", vec![ColumnInfo::primary_key("customer_id")]),
    ]
}

#[test]
fn test_column_named_after_primary_key_links_tables() {
    let graph = build(&orders_and_customers(), BuildOptions::default()).unwrap();

    let orders = graph.get("orders").unwrap();
    assert_eq!(orders.linked_to, vec!["customers".to_string()]);
    assert!(orders.linked_from.is_empty());

    let customers = graph.get("customers").unwrap();
    assert!(customers.linked_to.is_empty());
    assert_eq!(customers.linked_from, vec!["orders".to_string()]);

    assert_eq!(graph.edges(), vec![("orders", "customers")]);
}

#[test]
fn test_descriptor_keeps_columns_and_key() {
    let graph = build(&orders_and_customers(), BuildOptions::default()).unwrap();
    let orders = graph.get("orders").unwrap();

    assert_eq!(orders.columns, vec!["order_id", "customer_id"]);
    assert_eq!(orders.primary_key.as_deref(), Some("order_id"));
}

#[test]
fn test_linked_from_includes_keyless_tables() {
    let mut tables = orders_and_customers();
    tables.push(TableMetadata::new(
        "customer_notes",
        vec![ColumnInfo::new("customer_id"), ColumnInfo::new("body")],
    ));

    let graph = build(&tables, BuildOptions::default()).unwrap();

    assert_eq!(
        graph.get("customers").unwrap().linked_from,
        vec!["orders".to_string(), "customer_notes".to_string()]
    );
    assert_eq!(
        graph.get("customer_notes").unwrap().linked_to,
        vec!["customers".to_string()]
    );
    assert_eq!(graph.get("customer_notes").unwrap().primary_key, None);
}

#[test]
fn test_composite_key_tables_are_not_join_targets() {
    let tables = vec![
        TableMetadata::new(
            "order_tags",
            vec![
                ColumnInfo::primary_key("order_id"),
                ColumnInfo::primary_key("tag_id"),
            ],
        ),
        TableMetadata::new(
            "tag_usage",
            vec![ColumnInfo::primary_key("usage_id"), ColumnInfo::new("tag_id")],
        ),
    ];

    let graph = build(&tables, BuildOptions::default()).unwrap();

    assert!(graph.edges().is_empty());
    assert_eq!(graph.get("order_tags").unwrap().primary_key, None);
}

#[test]
fn test_unrelated_tables_have_no_edges() {
    let tables = vec![
        TableMetadata::new("logs", vec![ColumnInfo::primary_key("log_id")]),
        TableMetadata::new("customers", vec![ColumnInfo::primary_key("customer_id")]),
    ];

    let graph = build(&tables, BuildOptions::default()).unwrap();

    assert_eq!(graph.len(), 2);
    assert!(graph.edges().is_empty());
}

#[test]
fn test_no_self_edges() {
    // `parent_id` is nobody's key, and a table never links to its own key.
    let tables = vec![TableMetadata::new(
        "categories",
        vec![
            ColumnInfo::primary_key("category_id"),
            ColumnInfo::new("parent_id"),
        ],
    )];

    let graph = build(&tables, BuildOptions::default()).unwrap();
    assert!(graph.edges().is_empty());
}

fn shared_key() -> Vec<TableMetadata> {
    vec![
        TableMetadata::new("users", vec![ColumnInfo::primary_key("id")]),
        TableMetadata::new("accounts", vec![ColumnInfo::primary_key("id")]),
        TableMetadata::new(
            "sessions",
            vec![ColumnInfo::primary_key("session_id"), ColumnInfo::new("id")],
        ),
    ]
}

#[test]
fn test_shared_primary_key_last_write_wins() {
    let graph = build(&shared_key(), BuildOptions::default()).unwrap();

    assert_eq!(
        graph.get("sessions").unwrap().linked_to,
        vec!["accounts".to_string()]
    );
}

#[test]
fn test_shared_primary_key_rejected() {
    let options = BuildOptions::default().with_collision_policy(CollisionPolicy::Reject);
    let err = build(&shared_key(), options).unwrap_err();

    match err {
        Error::PrimaryKeyCollision {
            column,
            first,
            second,
        } => {
            assert_eq!(column, "id");
            assert_eq!(first, "users");
            assert_eq!(second, "accounts");
        }
        other => panic!("expected PrimaryKeyCollision, got {:?}", other),
    }
}

#[test]
fn test_rebuild_is_stable() {
    let tables = orders_and_customers();
    let first = build(&tables, BuildOptions::default()).unwrap();
    let second = build(&tables, BuildOptions::default()).unwrap();

    assert_eq!(first.edge_set(), second.edge_set());
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn test_graph_survives_json() {
    let graph = build(&orders_and_customers(), BuildOptions::default()).unwrap();
    let restored = ancestry::SchemaGraph::from_json(&graph.to_json().unwrap()).unwrap();

    assert_eq!(restored.edge_set(), graph.edge_set());
    assert!(restored.get("orders").unwrap().links_to("customers"));
}
