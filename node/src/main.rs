use anyhow::{Context, Result};
use clap::Parser;
use kvweb_browser::{start_server_with_shutdown, AppState};
use kvweb_registry::StoreRegistry;
use kvweb_storage::SledStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod settings;

use settings::{AppConfig, Cli, StoreSpec};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli).context("failed to load configuration")?;

    init_logging(&config)?;
    info!(
        "Starting kvweb-node v{} (mount {}, {} store(s))",
        env!("CARGO_PKG_VERSION"),
        config.mount,
        config.stores.len()
    );

    let registry = Arc::new(StoreRegistry::new());
    let databases = open_stores(&config.stores, &registry)?;
    if databases.is_empty() {
        warn!("No stores configured; pass --store NAME=PATH or set KVWEB_STORES");
    }

    let state = AppState::new(registry, &config.mount);
    let served = start_server_with_shutdown(state, &config.address, shutdown_signal()).await;

    // The node owns the databases; the registry only held views into them.
    for (spec, db) in config.stores.iter().zip(&databases) {
        if let Err(err) = db.flush() {
            error!("Failed to flush store {}: {}", spec.name, err);
        }
    }

    served
}

/// Open each database and register a view of its default tree.
///
/// Returns one handle per spec, in order. Specs sharing a path share the
/// database, since sled locks its directory on open.
fn open_stores(specs: &[StoreSpec], registry: &StoreRegistry) -> Result<Vec<sled::Db>> {
    let mut opened: HashMap<&Path, sled::Db> = HashMap::new();
    let mut databases = Vec::with_capacity(specs.len());
    for spec in specs {
        if registry.contains(&spec.name) {
            warn!("Store {} configured twice; replacing the earlier entry", spec.name);
        }
        let db = match opened.get(spec.path.as_path()) {
            Some(db) => db.clone(),
            None => {
                let db = sled::open(&spec.path).with_context(|| {
                    format!("failed to open store {} at {}", spec.name, spec.path.display())
                })?;
                opened.insert(spec.path.as_path(), db.clone());
                db
            }
        };
        info!("Registered store {} from {}", spec.name, spec.path.display());
        registry.register_store(spec.name.clone(), SledStore::from_db(&db));
        databases.push(db);
    }
    Ok(databases)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_stores_registers_views() {
        let dir = TempDir::new().unwrap();
        let specs = vec![
            StoreSpec {
                name: "alpha".into(),
                path: dir.path().join("alpha"),
            },
            StoreSpec {
                name: "beta".into(),
                path: dir.path().join("beta"),
            },
        ];
        let registry = StoreRegistry::new();

        let databases = open_stores(&specs, &registry).unwrap();
        databases[0].insert("k", "v").unwrap();

        let mut names = registry.list_names();
        names.sort();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);

        let alpha = registry.lookup("alpha").unwrap();
        assert_eq!(alpha.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert!(!registry.lookup("beta").unwrap().contains_key(b"k").unwrap());
    }

    #[test]
    fn test_open_stores_shares_database_for_repeated_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared");
        let specs = vec![
            StoreSpec {
                name: "users".into(),
                path: path.clone(),
            },
            StoreSpec {
                name: "users".into(),
                path: path.clone(),
            },
            StoreSpec {
                name: "mirror".into(),
                path,
            },
        ];
        let registry = StoreRegistry::new();

        let databases = open_stores(&specs, &registry).unwrap();
        assert_eq!(databases.len(), 3);
        databases[0].insert("k", "v").unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup("users").unwrap().get(b"k").unwrap(),
            Some(b"v".to_vec())
        );
        assert!(registry.lookup("mirror").unwrap().contains_key(b"k").unwrap());
    }

    #[test]
    fn test_open_stores_reports_unopenable_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"plain file").unwrap();

        let specs = vec![StoreSpec {
            name: "bad".into(),
            path: file.join("db"),
        }];
        assert!(open_stores(&specs, &StoreRegistry::new()).is_err());
    }
}
