//! Fakes shared by unit tests.

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::observe::{QueryContext, QueryObserver, QueryOutcome};
use std::sync::Mutex;
use std::time::Duration;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A client that never reaches a database: it returns no rows, or fails.
pub(crate) struct FakeClient {
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl FakeClient {
    pub fn empty() -> Self {
        Self {
            fail_with: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenericClient for FakeClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(DbError::Connection(message.clone())),
            None => Ok(vec![]),
        }
    }
}

/// Keeps every report it receives.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub completed: Mutex<Vec<(QueryContext, QueryOutcome)>>,
    pub slow: Mutex<Vec<String>>,
    pub connection_errors: Mutex<Vec<(String, String)>>,
}

impl RecordingObserver {
    pub fn completed(&self) -> Vec<(QueryContext, QueryOutcome)> {
        self.completed.lock().unwrap().clone()
    }
}

impl QueryObserver for RecordingObserver {
    fn on_query_complete(&self, ctx: &QueryContext, _duration: Duration, outcome: &QueryOutcome) {
        self.completed
            .lock()
            .unwrap()
            .push((ctx.clone(), outcome.clone()));
    }

    fn on_slow_query(&self, ctx: &QueryContext, _duration: Duration) {
        self.slow.lock().unwrap().push(ctx.sql.clone());
    }

    fn on_connection_error(&self, tag: &str, error: &str) {
        self.connection_errors
            .lock()
            .unwrap()
            .push((tag.to_string(), error.to_string()));
    }
}
