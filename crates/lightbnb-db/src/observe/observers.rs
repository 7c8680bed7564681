use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryObserver, QueryOutcome};
use std::time::Duration;

/// An observer that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl QueryObserver for NoopObserver {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}

/// Emits one `tracing` event per statement on the `lightbnb_db::sql` target.
///
/// Failures are logged at `WARN`, successes at `DEBUG`, slow statements at `WARN`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self {
            max_sql_length: Some(200),
        }
    }
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryObserver for TracingObserver {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        let tag = ctx.tag.as_deref().unwrap_or("-");
        let sql = self.truncate_sql(&ctx.sql);
        match outcome {
            QueryOutcome::Error(error) => tracing::warn!(
                target: "lightbnb_db::sql",
                kind = ?ctx.kind,
                tag,
                param_count = ctx.param_count,
                elapsed = ?duration,
                error = %error,
                sql = %sql,
                "query failed"
            ),
            _ => tracing::debug!(
                target: "lightbnb_db::sql",
                kind = ?ctx.kind,
                tag,
                param_count = ctx.param_count,
                elapsed = ?duration,
                outcome = %outcome,
                sql = %sql,
            ),
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        let tag = ctx.tag.as_deref().unwrap_or("-");
        tracing::warn!(
            target: "lightbnb_db::sql",
            kind = ?ctx.kind,
            tag,
            elapsed = ?duration,
            sql = %self.truncate_sql(&ctx.sql),
            "slow query"
        );
    }

    fn on_connection_error(&self, tag: &str, error: &str) {
        tracing::warn!(
            target: "lightbnb_db::sql",
            tag,
            error = %error,
            "connection checkout failed"
        );
    }
}
