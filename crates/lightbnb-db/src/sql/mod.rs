//! Statement text plus bound parameters.
//!
//! - [`query()`] wraps a complete SQL string that already contains `$1, $2...`.
//! - [`Sql`] composes SQL incrementally and numbers placeholders itself, so
//!   callers appending optional clauses never track indices by hand.
//!
//! Both end up as a [`CompiledQuery`], which is what the accessors execute.
//!
//! # Example
//!
//! ```ignore
//! use lightbnb_db::sql;
//!
//! let mut q = sql("SELECT * FROM properties WHERE city LIKE ");
//! q.push_bind("%Vancouver%");
//! if let Some(owner_id) = owner_id {
//!     q.push(" AND owner_id = ").push_bind(owner_id);
//! }
//! let compiled = q.compile();
//! ```

mod builder;
mod compiled;


pub use builder::Sql;
pub use compiled::CompiledQuery;

/// Wrap a pre-numbered SQL string (`$1, $2, ...`); bind values with [`CompiledQuery::bind`].
pub fn query(sql: impl Into<String>) -> CompiledQuery {
    CompiledQuery::new(sql)
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
