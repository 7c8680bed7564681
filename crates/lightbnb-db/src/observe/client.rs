use super::observers::TracingObserver;
use super::types::{QueryContext, QueryObserver, QueryOutcome};
use crate::client::GenericClient;
use crate::error::DbResult;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A `GenericClient` wrapper that times each statement and reports it to an observer.
///
/// Errors are reported, then returned unchanged to the caller.
pub struct ObservedClient<C> {
    client: C,
    observer: Arc<dyn QueryObserver>,
    slow_query_threshold: Option<Duration>,
}

impl<C: GenericClient> ObservedClient<C> {
    /// Wrap `client`, reporting to a [`TracingObserver`].
    pub fn new(client: C) -> Self {
        Self {
            client,
            observer: Arc::new(TracingObserver::default()),
            slow_query_threshold: None,
        }
    }

    /// Set the observer.
    pub fn with_observer<O: QueryObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Set the observer from an Arc.
    pub fn with_observer_arc(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Statements taking longer than this also trigger `on_slow_query`.
    pub fn with_slow_query_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_query_threshold = threshold;
        self
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn context(sql: &str, params: &[&(dyn ToSql + Sync)], tag: Option<&str>) -> QueryContext {
        let ctx = QueryContext::new(sql, params.len());
        match tag {
            Some(tag) => ctx.with_tag(tag),
            None => ctx,
        }
    }

    fn report(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        self.observer.on_query_complete(ctx, duration, outcome);

        if let Some(threshold) = self.slow_query_threshold {
            if duration > threshold {
                self.observer.on_slow_query(ctx, duration);
            }
        }
    }

    async fn query_inner(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        tag: Option<&str>,
    ) -> DbResult<Vec<Row>> {
        let ctx = Self::context(sql, params, tag);

        let start = Instant::now();
        let result = self.client.query(sql, params).await;
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(rows) => QueryOutcome::Rows(rows.len()),
            Err(e) => QueryOutcome::error(e.to_string()),
        };

        self.report(&ctx, duration, &outcome);
        result
    }

    async fn query_opt_inner(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        tag: Option<&str>,
    ) -> DbResult<Option<Row>> {
        let ctx = Self::context(sql, params, tag);

        let start = Instant::now();
        let result = self.client.query_opt(sql, params).await;
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(row) => QueryOutcome::OptionalRow(row.is_some()),
            Err(e) => QueryOutcome::error(e.to_string()),
        };

        self.report(&ctx, duration, &outcome);
        result
    }
}

impl<C: GenericClient> GenericClient for ObservedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.query_inner(sql, params, None).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        self.query_inner(sql, params, Some(tag)).await
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Option<Row>> {
        self.query_opt_inner(sql, params, None).await
    }

    async fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Option<Row>> {
        self.query_opt_inner(sql, params, Some(tag)).await
    }
}
