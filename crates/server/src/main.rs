//! Outpost
//!
//! Serves a document store's bulk-read protocol to offline clients, returning
//! only the documents each caller may read.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use outpost_persistence::authorization::{
    AuthorizationCacheConfig, AuthorizationProvider, CachedAuthorization, GrantsAuthorization,
};
use outpost_persistence::backends::memory::MemoryBackend;
use outpost_persistence::core::{DocumentStore, DocumentWriter};
use outpost_rest::{ServerConfig, StorageBackendMode, create_app_with_config, init_logging};
use serde_json::Value;
use tracing::{info, warn};

#[cfg(feature = "sqlite")]
use outpost_persistence::backends::sqlite::SqliteBackend;

/// Seed documents keyed by database name.
type SeedFile = BTreeMap<String, Vec<Value>>;

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let db_path = config.database_url.as_deref().unwrap_or("outpost.db");
    info!(database = %db_path, "Initializing SQLite backend");

    let backend = if db_path == ":memory:" {
        SqliteBackend::in_memory()?
    } else {
        SqliteBackend::open(db_path)?
    };
    backend.init_schema()?;

    Ok(backend)
}

/// Writes the databases and documents of a seed file into `store`.
async fn load_seed<W: DocumentWriter>(store: &W, path: &Path) -> anyhow::Result<usize> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&json)
        .with_context(|| format!("Seed file {} is not a database map", path.display()))?;

    let mut written = 0;
    for (db, docs) in seed {
        store.create_database(&db).await?;
        for doc in docs {
            store.put(&db, doc).await?;
            written += 1;
        }
        info!(db = %db, "Seeded database");
    }
    Ok(written)
}

/// Builds the authorization provider from the server configuration.
fn create_authorization(config: &ServerConfig) -> anyhow::Result<Arc<dyn AuthorizationProvider>> {
    let grants = match config.grants_file.as_deref() {
        Some(path) => GrantsAuthorization::from_file(path)?,
        None => {
            warn!("No grants file configured; only online users will see documents");
            GrantsAuthorization::default()
        }
    };

    if config.cache_authorization {
        let cache = AuthorizationCacheConfig::default()
            .with_max_capacity(config.auth_cache_capacity)
            .with_ttl(Duration::from_secs(config.auth_cache_ttl));
        Ok(Arc::new(CachedAuthorization::with_config(grants, cache)))
    } else {
        Ok(Arc::new(grants))
    }
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Seeds `store` if configured, then serves it.
async fn start<S>(store: S, config: ServerConfig) -> anyhow::Result<()>
where
    S: DocumentStore + DocumentWriter + 'static,
{
    if let Some(path) = config.seed_file.as_deref() {
        let written = load_seed(&store, Path::new(path)).await?;
        info!(documents = written, "Loaded seed file");
    }

    let authorization = create_authorization(&config)?;
    let app = create_app_with_config(store, authorization, config.clone());
    serve(app, &config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let backend_mode = config
        .storage_backend_mode()
        .map_err(|e| anyhow::anyhow!("Invalid storage backend configuration: {}", e))?;

    info!(
        port = config.port,
        host = %config.host,
        storage_backend = %backend_mode,
        online_roles = %config.online_roles,
        "Starting Outpost"
    );

    match backend_mode {
        StorageBackendMode::Memory => start(MemoryBackend::new(), config).await,
        StorageBackendMode::Sqlite => start_sqlite(config).await,
    }
}

/// Starts the server with the SQLite backend.
#[cfg(feature = "sqlite")]
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    start(backend, config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p outpost-server --features sqlite"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_persistence::types::FetchOptions;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"medic": [{{"_id": "a"}}, {{"_id": "b", "_deleted": true}}], "users": []}}"#
        )
        .unwrap();

        let store = MemoryBackend::new();
        let written = load_seed(&store, file.path()).await.unwrap();
        assert_eq!(written, 2);

        let result = store
            .fetch_by_ids("medic", &["a".to_string(), "b".to_string()], &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(result.ids(), vec!["a", "b"]);
        assert_eq!(store.document_count("users"), 0);
    }

    #[tokio::test]
    async fn test_load_seed_rejects_other_shapes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"_id": "a"}}]"#).unwrap();

        let store = MemoryBackend::new();
        assert!(load_seed(&store, file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_authorization_without_grants_file() {
        let config = ServerConfig::for_testing();
        let authorization = create_authorization(&config).unwrap();
        let caller = outpost_persistence::authorization::CallerIdentity::new("chw", Vec::new());
        assert!(authorization.get_authorization_context(&caller).await.is_err());
    }
}
