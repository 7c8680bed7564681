//! Connection pool setup

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a pool for `config` without TLS.
///
/// Connections are opened lazily, so this succeeds even when the server is down.
///
/// # Example
///
/// ```ignore
/// let pool = lightbnb_db::create_pool(&DbConfig::from_env()?)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DbConfig) -> DbResult<Pool> {
    create_pool_with_tls(config, NoTls)
}

/// Create a pool for `config` using a custom TLS connector.
pub fn create_pool_with_tls<T>(config: &DbConfig, tls: T) -> DbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, tls, manager_config);

    tracing::debug!(max_size = config.pool_max_size, "creating connection pool");
    Pool::builder(mgr)
        .max_size(config.pool_max_size)
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}
