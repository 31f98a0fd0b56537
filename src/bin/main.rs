//! Ancestry CLI - inspect the inferred join graph and check record ancestry
//!
//! Usage:
//!   ancestry [--config <file>] [--connection <name>] [--db <path>] <command>
//!
//! Examples:
//!   ancestry --db shop.db tables
//!   ancestry --db shop.db joins line_items customers
//!   ancestry --connection shop check line_items 7 customers 3
//!   ancestry --connection shop clear-cache

use ancestry::config::{ConnectionConfig, Settings};
use ancestry::db::{SqliteDatabase, Value};
use ancestry::Session;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ancestry")]
#[command(about = "Infer the join graph of a database and answer record ancestry queries")]
#[command(version)]
struct Cli {
    /// Path to a config file (overrides the default search locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the config file
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Open this SQLite file directly instead of a configured connection
    #[arg(long, global = true, conflicts_with = "connection")]
    db: Option<String>,

    /// Skip the persistent graph cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables with their primary keys and outgoing links
    Tables,

    /// Print the inferred edges and the graph fingerprint
    Graph,

    /// Find a join path between two tables
    Joins {
        /// Table to start from
        start: String,

        /// Table to reach
        end: String,
    },

    /// Check whether one record descends from another
    Check {
        descendant_table: String,
        descendant_id: String,
        ancestor_table: String,
        ancestor_id: String,
    },

    /// Remove the cached graph for this database
    ClearCache,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut session = match open_session(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Tables => cmd_tables(&mut session),
        Commands::Graph => cmd_graph(&mut session),
        Commands::Joins { start, end } => cmd_joins(&mut session, &start, &end),
        Commands::Check {
            descendant_table,
            descendant_id,
            ancestor_table,
            ancestor_id,
        } => cmd_check(
            &mut session,
            &descendant_table,
            &descendant_id,
            &ancestor_table,
            &ancestor_id,
        ),
        Commands::ClearCache => cmd_clear_cache(&mut session),
    };

    match result.and_then(|()| session.close()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_session(cli: &Cli) -> ancestry::Result<Session<SqliteDatabase>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if cli.no_cache {
        settings.cache.enabled = false;
    }

    if let Some(path) = &cli.db {
        return Session::open(ConnectionConfig::sqlite(path), &settings);
    }

    if cli.connection.is_none() && settings.connections.is_empty() {
        return Session::open(ConnectionConfig::from_env()?, &settings);
    }

    Session::connect(&settings, cli.connection.as_deref())
}

fn cmd_tables(session: &mut Session<SqliteDatabase>) -> ancestry::Result<()> {
    let graph = session.graph()?;

    for table in graph.tables() {
        let pk = table.primary_key.as_deref().unwrap_or("-");
        if table.linked_to.is_empty() {
            println!("{} (pk: {})", table.name, pk);
        } else {
            println!(
                "{} (pk: {}) -> {}",
                table.name,
                pk,
                table.linked_to.join(", ")
            );
        }
    }

    Ok(())
}

fn cmd_graph(session: &mut Session<SqliteDatabase>) -> ancestry::Result<()> {
    let graph = session.graph()?;

    for (from, to) in graph.edges() {
        println!("{} -> {}", from, to);
    }
    println!("-- {} tables, fingerprint {}", graph.len(), graph.fingerprint()?);

    Ok(())
}

fn cmd_joins(session: &mut Session<SqliteDatabase>, start: &str, end: &str) -> ancestry::Result<()> {
    match session.find_joins(start, end)? {
        Some(path) => println!("{} -> {}", start, path.join(" -> ")),
        None => println!("no join path from {} to {}", start, end),
    }
    Ok(())
}

fn cmd_check(
    session: &mut Session<SqliteDatabase>,
    descendant_table: &str,
    descendant_id: &str,
    ancestor_table: &str,
    ancestor_id: &str,
) -> ancestry::Result<()> {
    let related = session.is_descendant(
        descendant_table,
        Value::parse_literal(descendant_id),
        ancestor_table,
        Value::parse_literal(ancestor_id),
    )?;
    println!("{}", related);
    Ok(())
}

fn cmd_clear_cache(session: &mut Session<SqliteDatabase>) -> ancestry::Result<()> {
    let key = session.cache_key();
    if session.clear_cache()? {
        println!("Removed {}", key);
    } else {
        println!("Nothing cached for {}", key);
    }
    Ok(())
}
