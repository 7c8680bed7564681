//! Statement observability.
//!
//! Every statement run through an [`ObservedClient`] is timed and reported
//! to a [`QueryObserver`]. The default [`TracingObserver`] turns reports into
//! `tracing` events, which is how store failures end up in the logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use lightbnb_db::observe::{ObservedClient, QueryContext, QueryObserver, QueryOutcome};
//! use std::time::Duration;
//!
//! struct PrintFailures;
//!
//! impl QueryObserver for PrintFailures {
//!     fn on_query_complete(&self, ctx: &QueryContext, _: Duration, outcome: &QueryOutcome) {
//!         if outcome.is_error() {
//!             eprintln!("{}: {}", ctx.tag.as_deref().unwrap_or("-"), outcome);
//!         }
//!     }
//! }
//!
//! let client = ObservedClient::new(pool.get().await?).with_observer(PrintFailures);
//! ```

mod client;
mod observers;
mod types;

#[cfg(test)]
mod tests;

pub use client::ObservedClient;
pub use observers::{NoopObserver, TracingObserver};
pub use types::{QueryContext, QueryKind, QueryObserver, QueryOutcome};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
