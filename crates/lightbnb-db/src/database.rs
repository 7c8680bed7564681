//! Pool-backed entry point for the web layer.

use crate::attributes::AttributeMap;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::filter::FilterOptions;
use crate::models::{NewProperty, NewUser, Property, PropertyListing, Reservation, User};
use crate::observe::{ObservedClient, QueryObserver, TracingObserver};
use crate::pool::create_pool;
use crate::queries;
use deadpool_postgres::{Client, Pool};
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::Row;

/// Shared handle to the LightBnB store.
///
/// Cloning is cheap; all clones share one pool. Every method checks a
/// connection out for the duration of a single statement and reports that
/// statement to the configured observer.
///
/// ```ignore
/// let db = Database::from_config(&DbConfig::from_env()?)?;
/// let user = db.get_user_with_email("tristanjacobs@gmail.com").await?;
/// ```
#[derive(Clone)]
pub struct Database {
    pool: Pool,
    observer: Arc<dyn QueryObserver>,
    slow_query_threshold: Option<Duration>,
}

impl Database {
    /// Wrap an existing pool, logging through [`TracingObserver`].
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            observer: Arc::new(TracingObserver::default()),
            slow_query_threshold: None,
        }
    }

    /// Build the pool described by `config`.
    pub fn from_config(config: &DbConfig) -> DbResult<Self> {
        let pool = create_pool(config)?;
        Ok(Self::new(pool).with_slow_query_threshold(config.slow_query_threshold))
    }

    pub fn with_observer<O: QueryObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn with_observer_arc(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_query_threshold = threshold;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check out a connection for the statement tagged `tag`.
    ///
    /// Checkout failures never reach a statement, so they are reported here.
    async fn client(&self, tag: &str) -> DbResult<ObservedClient<Client>> {
        let client = match self.pool.get().await {
            Ok(client) => client,
            Err(e) => {
                let err = DbError::from(e);
                self.observer.on_connection_error(tag, &err.to_string());
                return Err(err);
            }
        };
        Ok(ObservedClient::new(client)
            .with_observer_arc(self.observer.clone())
            .with_slow_query_threshold(self.slow_query_threshold))
    }

    pub async fn get_user_with_email(&self, email: &str) -> DbResult<Option<User>> {
        queries::get_user_with_email(&self.client("users.by_email").await?, email).await
    }

    pub async fn get_user_with_id(&self, id: i32) -> DbResult<Option<User>> {
        queries::get_user_with_id(&self.client("users.by_id").await?, id).await
    }

    pub async fn add_user(&self, user: NewUser) -> DbResult<Option<User>> {
        queries::add_user(&self.client("users.insert").await?, user).await
    }

    pub async fn get_all_reservations(&self, guest_id: i32, limit: i64) -> DbResult<Vec<Reservation>> {
        let conn = self.client("reservations.by_guest").await?;
        queries::get_all_reservations(&conn, guest_id, limit).await
    }

    pub async fn get_all_properties(
        &self,
        options: &FilterOptions,
        limit: i64,
    ) -> DbResult<Vec<PropertyListing>> {
        let conn = self.client("properties.search").await?;
        queries::get_all_properties(&conn, options, limit).await
    }

    pub async fn add_property(&self, property: NewProperty) -> DbResult<Option<Property>> {
        queries::add_property(&self.client("properties.insert").await?, property).await
    }

    pub async fn insert_attributes(
        &self,
        attributes: &mut AttributeMap,
        table: &str,
    ) -> DbResult<Option<Row>> {
        let conn = self.client(&format!("{table}.insert")).await?;
        queries::insert_attributes(&conn, attributes, table).await
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool", &self.pool.status())
            .field("slow_query_threshold", &self.slow_query_threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingObserver;

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        let config = DbConfig::default().database_url("postgres://lightbnb@127.0.0.1:1/lightbnb");
        let observer = Arc::new(RecordingObserver::default());
        let db = Database::from_config(&config)
            .unwrap()
            .with_observer_arc(observer.clone());

        let err = db.get_user_with_id(1).await.unwrap_err();
        assert!(matches!(err, DbError::Pool(_)), "unexpected error: {err}");

        let errors = observer.connection_errors.lock().unwrap().clone();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "users.by_id");
        assert!(!errors[0].1.is_empty());
        assert!(observer.completed().is_empty());
    }
}
