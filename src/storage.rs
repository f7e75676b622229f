use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{StorageError, StorageResult};

pub const DEFAULT_DB_PORT: u16 = 7799;
pub const DEFAULT_DB_HOME: &str = "data";
pub const DEFAULT_DB_FILE: &str = "cinema";
pub const DEFAULT_DB_USERNAME: &str = "sa";
pub const DEFAULT_DB_PASSWORD: &str = "sa@cinema";

const MAX_CONNECTIONS: u32 = 10;

#[derive(Clone)]
pub struct StorageConfig {
    pub port: u16,
    pub home: PathBuf,
    pub file: String,
    pub username: String,
    pub password: String,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.home.join(format!("{}.db", self.file))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_DB_PORT,
            home: PathBuf::from(DEFAULT_DB_HOME),
            file: DEFAULT_DB_FILE.to_string(),
            username: DEFAULT_DB_USERNAME.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("port", &self.port)
            .field("home", &self.home)
            .field("file", &self.file)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shared handle every store draws its connections from.
///
/// Cloning is cheap; all clones share one pool, so concurrent callers each
/// acquire an independent connection.
#[derive(Clone, Debug)]
pub struct DataSource {
    db: DatabaseConnection,
}

impl DataSource {
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

struct Running {
    guard: TcpListener,
    source: DataSource,
}

/// Owns the embedded database from `connect` until `disconnect`.
///
/// While running, the configured loopback port stays bound so a second
/// instance pointed at the same port cannot open the database too.
pub struct Storage {
    config: StorageConfig,
    running: Option<Running>,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config, running: None }
    }

    pub async fn connect(&mut self) -> StorageResult<()> {
        if self.running.is_some() {
            return Err(StorageError::Connection {
                message: "storage is already running".to_string(),
                source: None,
            });
        }

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.config.port));
        let guard = TcpListener::bind(addr)
            .await
            .map_err(|e| StorageError::connection(format!("cannot bind port {}", addr.port()), e))?;

        tokio::fs::create_dir_all(&self.config.home).await.map_err(|e| {
            StorageError::connection(format!("cannot create {}", self.config.home.display()), e)
        })?;

        let path = self.config.database_path();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::connection(format!("cannot open {}", path.display()), e))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

        self.running = Some(Running { guard, source: DataSource { db } });
        info!(
            port = self.bound_port(),
            path = %path.display(),
            username = %self.config.username,
            "database storage started"
        );
        Ok(())
    }

    pub async fn disconnect(&mut self) -> StorageResult<()> {
        let Some(running) = self.running.take() else {
            return Err(StorageError::shutdown("storage was never started"));
        };

        let Running { guard, source } = running;
        let closed = source.db.close().await;
        drop(guard);

        closed.map_err(|e| StorageError::Shutdown {
            message: "cannot close database pool".to_string(),
            source: Some(Box::new(e)),
        })?;

        info!("database storage stopped");
        Ok(())
    }

    pub fn data_source(&self) -> StorageResult<&DataSource> {
        self.running.as_ref().map(|r| &r.source).ok_or(StorageError::NotReady)
    }

    /// Port actually held by the running instance.
    pub fn bound_port(&self) -> Option<u16> {
        Some(self.running.as_ref()?.guard.local_addr().ok()?.port())
    }
}
