// tests/session_test.rs
use ancestry::cache::{GraphStore, MemoryCache, SqliteCache};
use ancestry::config::{ConnectionConfig, Settings};
use ancestry::graph::TableDescriptor;
use ancestry::{SchemaGraph, Session, SqliteDatabase};
use std::fs;
use std::path::Path;

const SHOP_SCHEMA: &str = "
    CREATE TABLE customers (customer_id INTEGER PRIMARY KEY);
    CREATE TABLE orders (order_id INTEGER PRIMARY KEY, customer_id INTEGER);
    CREATE TABLE line_items (item_id INTEGER PRIMARY KEY, order_id INTEGER);
    INSERT INTO customers VALUES (3);
    INSERT INTO orders VALUES (10, 3);
    INSERT INTO line_items VALUES (7, 10);
";

fn in_memory_shop(name: &str) -> SqliteDatabase {
    let mut db =
        SqliteDatabase::open(ConnectionConfig::sqlite_in_memory().with_name(name)).unwrap();
    db.execute_batch(SHOP_SCHEMA).unwrap();
    db
}

#[test]
fn test_session_answers_ancestry() {
    let mut session = Session::new(in_memory_shop("shop"));

    assert_eq!(
        session.find_joins("line_items", "customers").unwrap(),
        Some(vec!["orders".to_string(), "customers".to_string()])
    );
    assert!(session.is_descendant("line_items", 7, "customers", 3).unwrap());
    assert!(!session.is_descendant("line_items", 7, "customers", 4).unwrap());
}

#[test]
fn test_cached_graph_is_used_by_later_sessions() {
    let cache = MemoryCache::new();

    let mut first = Session::new(in_memory_shop("shop")).with_cache(cache.clone());
    first.graph().unwrap();
    assert_eq!(cache.len(), 1);

    // Same name, empty database: only the cache knows the schema.
    let empty = SqliteDatabase::open(ConnectionConfig::sqlite_in_memory().with_name("shop")).unwrap();
    let mut second = Session::new(empty).with_cache(cache.clone());
    assert_eq!(second.graph().unwrap().len(), 3);
    assert!(second.graph().unwrap().get("orders").unwrap().links_to("customers"));
}

#[test]
fn test_cache_is_scoped_by_database_name() {
    let cache = MemoryCache::new();

    let mut shop = Session::new(in_memory_shop("shop")).with_cache(cache.clone());
    shop.graph().unwrap();

    let empty = SqliteDatabase::open(ConnectionConfig::sqlite_in_memory().with_name("other")).unwrap();
    let mut other = Session::new(empty).with_cache(cache.clone());
    assert!(other.graph().unwrap().is_empty());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_clear_cache_forces_rebuild() {
    let cache = MemoryCache::new();
    let mut session = Session::new(in_memory_shop("shop")).with_cache(cache.clone());
    session.graph().unwrap();

    session
        .database()
        .execute_batch("CREATE TABLE products (product_id INTEGER PRIMARY KEY);")
        .unwrap();
    assert_eq!(session.graph().unwrap().len(), 3);

    assert!(session.clear_cache().unwrap());
    assert_eq!(session.graph().unwrap().len(), 4);
}

#[test]
fn test_sqlite_cache_persists_between_processes() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.db");

    let mut session = Session::new(in_memory_shop("shop"))
        .with_cache(SqliteCache::open_at(&cache_path).unwrap());
    let fingerprint = session.graph().unwrap().fingerprint().unwrap();
    drop(session);

    let reopened = SqliteCache::open_at(&cache_path).unwrap();
    assert!(reopened.get("schema_graph:shop").unwrap().is_some());

    let empty = SqliteDatabase::open(ConnectionConfig::sqlite_in_memory().with_name("shop")).unwrap();
    let mut session = Session::new(empty).with_cache(reopened);
    assert_eq!(session.graph().unwrap().fingerprint().unwrap(), fingerprint);
}

#[test]
fn test_connect_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.db");
    let cache_path = dir.path().join("cache").join("graphs.db");

    let mut db = SqliteDatabase::open(ConnectionConfig::sqlite(db_path.to_string_lossy())).unwrap();
    db.execute_batch(SHOP_SCHEMA).unwrap();
    db.close().unwrap();

    let config_path = dir.path().join("ancestry.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[connections.shop]
driver = "sqlite"
path = "{}"

[graph]
collision_policy = "reject"
max_depth = 10

[cache]
path = "{}"
"#,
            db_path.display(),
            cache_path.display()
        ),
    )
    .unwrap();

    let settings = Settings::from_file(&config_path).unwrap();
    let mut session = Session::connect(&settings, Some("shop")).unwrap();

    assert!(session.cache_key().starts_with("schema_graph:shop-"));
    assert!(session.is_descendant("line_items", 7, "customers", 3).unwrap());
    session.close().unwrap();

    assert!(cache_path.exists());
    let cache = SqliteCache::open_at(&cache_path).unwrap();
    assert_eq!(cache.entry_count().unwrap(), 1);
}

#[test]
fn test_connect_unknown_connection() {
    let settings = Settings::default();
    let err = Session::connect(&settings, Some("missing")).err().unwrap();
    assert!(err.to_string().contains("missing"));
}

fn file_database(path: &Path, schema: &str) -> SqliteDatabase {
    let mut db = SqliteDatabase::open(ConnectionConfig::sqlite(path.to_string_lossy())).unwrap();
    db.execute_batch(schema).unwrap();
    db
}

#[test]
fn test_same_file_name_in_different_directories() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let cache = MemoryCache::new();

    let mut first = Session::new(file_database(&first_dir.path().join("shop.db"), SHOP_SCHEMA))
        .with_cache(cache.clone());
    assert_eq!(first.graph().unwrap().len(), 3);

    let mut second = Session::new(file_database(
        &second_dir.path().join("shop.db"),
        "CREATE TABLE logs (log_id INTEGER PRIMARY KEY);",
    ))
    .with_cache(cache.clone());

    assert_ne!(first.cache_key(), second.cache_key());
    let names: Vec<String> = second
        .graph()
        .unwrap()
        .tables()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(names, vec!["logs"]);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_unnamed_memory_databases_do_not_share_cache() {
    let cache = MemoryCache::new();

    let mut shop_db = SqliteDatabase::open_in_memory().unwrap();
    shop_db.execute_batch(SHOP_SCHEMA).unwrap();
    let mut shop = Session::new(shop_db).with_cache(cache.clone());
    shop.graph().unwrap();

    let mut empty = Session::new(SqliteDatabase::open_in_memory().unwrap()).with_cache(cache.clone());
    assert!(empty.graph().unwrap().is_empty());
}

#[test]
fn test_self_referencing_graph_from_cache() {
    let cache = MemoryCache::new();
    let graph = SchemaGraph::from(vec![TableDescriptor {
        name: "categories".to_string(),
        columns: vec!["category_id".to_string()],
        primary_key: Some("category_id".to_string()),
        linked_to: vec!["categories".to_string()],
        linked_from: vec!["categories".to_string()],
    }]);
    cache
        .put("schema_graph:catalog", &graph.to_json().unwrap())
        .unwrap();

    let mut db =
        SqliteDatabase::open(ConnectionConfig::sqlite_in_memory().with_name("catalog")).unwrap();
    db.execute_batch(
        "CREATE TABLE categories (category_id INTEGER PRIMARY KEY);
         INSERT INTO categories VALUES (1), (2);",
    )
    .unwrap();
    let mut session = Session::new(db).with_cache(cache);

    assert_eq!(
        session.find_joins("categories", "categories").unwrap(),
        Some(vec!["categories".to_string()])
    );
    assert!(session.is_descendant("categories", 1, "categories", 1).unwrap());
    assert!(!session.is_descendant("categories", 1, "categories", 2).unwrap());
}
