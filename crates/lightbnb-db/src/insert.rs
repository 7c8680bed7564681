//! INSERT statements built from attribute maps.
//!
//! # Example
//!
//! ```ignore
//! use lightbnb_db::{AttributeMap, get_insert_query};
//!
//! let mut user = AttributeMap::new().with("name", "Bob").with("age", "0");
//! let q = get_insert_query(&mut user, "users")?;
//! assert_eq!(q.sql(), "INSERT INTO users (name,age) VALUES ($1,$2) RETURNING *;");
//! ```

use crate::attributes::AttributeMap;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::sql::{CompiledQuery, Sql};

/// Build `INSERT ... RETURNING *;` for one row.
///
/// `attributes` is normalized in place (see [`AttributeMap::normalize`]);
/// callers must not rely on it being unchanged afterwards.
pub fn get_insert_query(attributes: &mut AttributeMap, table: &str) -> DbResult<CompiledQuery> {
    get_insert_query_with(attributes, table, true)
}

/// Build a single-row INSERT, appending `RETURNING *` only when `returning` is set.
///
/// Fails with [`DbError::InvalidInput`] when no field survives
/// normalization or when `table` or a field name is not a plain SQL identifier.
pub fn get_insert_query_with(
    attributes: &mut AttributeMap,
    table: &str,
    returning: bool,
) -> DbResult<CompiledQuery> {
    attributes.normalize();
    if attributes.is_empty() {
        return Err(DbError::invalid_input(format!(
            "no non-empty fields to insert into {table}"
        )));
    }

    let columns = attributes
        .keys()
        .map(|k| Ident::parse_column(k).map(|ident| ident.to_string()))
        .collect::<DbResult<Vec<_>>>()?;

    let mut q = Sql::new("INSERT INTO ").tagged(format!("{table}.insert"));
    q.push_ident(table)?;
    q.push(" (").push(&columns.join(",")).push(") VALUES (");
    q.push_bind_list(attributes.values().cloned(), ",");
    q.push(")");
    if returning {
        q.push(" RETURNING *");
    }
    q.push(";");

    Ok(q.compile())
}
