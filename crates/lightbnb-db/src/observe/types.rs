use std::fmt;
use std::time::Duration;

/// The kind of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    /// Anything else (DDL, custom)
    Other,
}

impl QueryKind {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let first = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();

        if first.eq_ignore_ascii_case("SELECT") || first.eq_ignore_ascii_case("WITH") {
            QueryKind::Select
        } else if first.eq_ignore_ascii_case("INSERT") {
            QueryKind::Insert
        } else if first.eq_ignore_ascii_case("UPDATE") {
            QueryKind::Update
        } else if first.eq_ignore_ascii_case("DELETE") {
            QueryKind::Delete
        } else {
            QueryKind::Other
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL statement sent to Postgres.
    pub sql: String,
    /// Number of bound parameters.
    pub param_count: usize,
    /// Detected statement kind.
    pub kind: QueryKind,
    /// Optional statement name (e.g. `users.by_email`).
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            kind: QueryKind::from_sql(sql),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Maximum length for error messages in `QueryOutcome::Error`.
const MAX_ERROR_LEN: usize = 512;

/// What a statement produced, as reported to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Statement returned rows.
    Rows(usize),
    /// Statement was asked for a single optional row.
    OptionalRow(bool),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryOutcome {
    /// Create an error outcome, truncating the message.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Rows(n) => write!(f, "{n} rows"),
            QueryOutcome::OptionalRow(found) => {
                write!(f, "{}", if *found { "1 row" } else { "0 rows" })
            }
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Receives a report for every statement an [`ObservedClient`](super::ObservedClient) runs.
///
/// This is where store failures get logged: accessors return them as
/// `Err`, and the observer keeps the diagnostic trail.
pub trait QueryObserver: Send + Sync {
    /// Called after a statement completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome);

    /// Called when a statement exceeds the configured slow-query threshold.
    ///
    /// Default implementation does nothing.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}

    /// Called when no connection could be obtained for the statement tagged `tag`.
    ///
    /// Default implementation does nothing.
    fn on_connection_error(&self, _tag: &str, _error: &str) {}
}
