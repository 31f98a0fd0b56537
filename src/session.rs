//! Connection session owning the lazily loaded schema graph.
//!
//! The graph is loaded on first use: from the cache when an entry exists for
//! this database, otherwise from live metadata (and then written back). It is
//! never refreshed automatically; call [`Session::clear_cache`] after a schema
//! change.

use std::time::Instant;

use crate::ancestry;
use crate::cache::{CacheKey, GraphStore, SqliteCache};
use crate::config::{ConnectionConfig, GraphSettings, Settings, SettingsError};
use crate::db::{Database, SqliteDatabase, Value};
use crate::error::Result;
use crate::graph::{self, BuildOptions, SchemaGraph};
use crate::metadata;

/// A database connection plus its schema graph.
pub struct Session<D: Database> {
    db: D,
    store: Option<Box<dyn GraphStore>>,
    settings: GraphSettings,
    graph: Option<SchemaGraph>,
}

impl<D: Database> Session<D> {
    /// Create a session without a graph cache.
    pub fn new(db: D) -> Self {
        Self {
            db,
            store: None,
            settings: GraphSettings::default(),
            graph: None,
        }
    }

    /// Persist the graph in `store` between sessions.
    pub fn with_cache(mut self, store: impl GraphStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Direct access to the connection for ad-hoc queries.
    pub fn database(&mut self) -> &mut D {
        &mut self.db
    }

    /// Cache key of this session's graph.
    pub fn cache_key(&self) -> String {
        CacheKey::schema_graph(&self.db.database_name())
    }

    /// Whether the graph has been loaded into this session yet.
    pub fn is_loaded(&self) -> bool {
        self.graph.is_some()
    }

    /// The schema graph, loading it on first access.
    pub fn graph(&mut self) -> Result<&SchemaGraph> {
        ensure_graph(
            &mut self.graph,
            &mut self.db,
            self.store.as_deref(),
            &self.settings,
        )
    }

    /// Find a join path between two tables. See [`SchemaGraph::find_joins`].
    pub fn find_joins(&mut self, start: &str, end: &str) -> Result<Option<Vec<String>>> {
        let max_depth = self.settings.max_depth;
        self.graph()?.find_joins_with_depth(start, end, max_depth)
    }

    /// Whether the descendant record reaches the ancestor record through the
    /// inferred join graph.
    pub fn is_descendant(
        &mut self,
        descendant_table: &str,
        descendant_id: impl Into<Value>,
        ancestor_table: &str,
        ancestor_id: impl Into<Value>,
    ) -> Result<bool> {
        let graph = ensure_graph(
            &mut self.graph,
            &mut self.db,
            self.store.as_deref(),
            &self.settings,
        )?;
        ancestry::is_descendant_with_depth(
            &mut self.db,
            graph,
            self.settings.max_depth,
            descendant_table,
            descendant_id.into(),
            ancestor_table,
            ancestor_id.into(),
        )
    }

    /// Drop the loaded graph and its cache entry.
    ///
    /// Returns true if a cache entry was removed.
    pub fn clear_cache(&mut self) -> Result<bool> {
        self.graph = None;
        let key = self.cache_key();
        match &self.store {
            Some(store) => Ok(store.remove(&key)?),
            None => Ok(false),
        }
    }

    /// Give back the underlying connection.
    pub fn into_inner(self) -> D {
        self.db
    }
}

impl Session<SqliteDatabase> {
    /// Open the named connection (or the default one) from settings, with the
    /// configured cache.
    pub fn connect(settings: &Settings, connection: Option<&str>) -> Result<Self> {
        let conn = match connection {
            Some(name) => settings.get_connection(name)?,
            None => settings
                .default_connection()
                .map(|(_, conn)| conn)
                .ok_or_else(|| SettingsError::ConnectionNotFound("default".to_string()))?,
        };

        Self::open(conn.to_connection_config()?, settings)
    }

    /// Open a connection with the graph and cache settings from `settings`.
    pub fn open(config: ConnectionConfig, settings: &Settings) -> Result<Self> {
        let db = SqliteDatabase::open(config)?;
        let mut session = Session::new(db).with_settings(settings.graph.clone());

        if settings.cache.enabled {
            let cache = match settings.cache.resolved_path()? {
                Some(path) => SqliteCache::open_at(path)?,
                None => SqliteCache::open()?,
            };
            session = session.with_cache(cache);
        }

        Ok(session)
    }

    /// Close the connection.
    pub fn close(self) -> Result<()> {
        self.db.close()
    }
}

fn ensure_graph<'a, D: Database>(
    slot: &'a mut Option<SchemaGraph>,
    db: &mut D,
    store: Option<&dyn GraphStore>,
    settings: &GraphSettings,
) -> Result<&'a SchemaGraph> {
    let graph = match slot.take() {
        Some(graph) => graph,
        None => load_graph(db, store, settings)?,
    };
    let graph: &'a SchemaGraph = slot.insert(graph);
    Ok(graph)
}

fn load_graph<D: Database>(
    db: &mut D,
    store: Option<&dyn GraphStore>,
    settings: &GraphSettings,
) -> Result<SchemaGraph> {
    let key = CacheKey::schema_graph(&db.database_name());

    if let Some(store) = store {
        if let Some(json) = store.get(&key)? {
            match SchemaGraph::from_json(&json) {
                Ok(graph) => {
                    log::debug!("schema graph cache hit for '{}'", key);
                    return Ok(graph);
                }
                Err(e) => log::warn!("discarding unreadable cache entry '{}': {}", key, e),
            }
        } else {
            log::debug!("schema graph cache miss for '{}'", key);
        }
    }

    let started = Instant::now();
    let tables = metadata::load(db)?;
    let graph = graph::build(&tables, BuildOptions::from(settings))?;
    log::info!(
        "built schema graph for '{}' ({} tables) in {:.1?}",
        db.database_name(),
        graph.len(),
        started.elapsed()
    );

    if let Some(store) = store {
        store.put(&key, &graph.to_json()?)?;
    }

    Ok(graph)
}
