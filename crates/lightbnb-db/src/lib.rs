//! # lightbnb-db
//!
//! PostgreSQL data access for the LightBnB property-rental app.
//!
//! ## Features
//!
//! - **INSERT from attribute maps**: form fields in, `INSERT ... RETURNING *` out,
//!   with numeric text coerced and empty fields dropped
//! - **Property search**: optional filters compiled to one parameterized `SELECT`
//! - **Typed accessors**: users, reservations and properties as plain structs
//! - **Transaction-friendly**: accessors take any `GenericClient`
//! - **Observed by default**: every statement is timed and failures are logged via `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use lightbnb_db::{Database, DbConfig, FilterOptions, DEFAULT_LIMIT};
//!
//! let db = Database::from_config(&DbConfig::from_env()?)?;
//!
//! let options = FilterOptions::new().city("Vancouver").minimum_rating(4.0);
//! for listing in db.get_all_properties(&options, DEFAULT_LIMIT).await? {
//!     println!("{} ({})", listing.property.title, listing.average_rating);
//! }
//! ```
//!
//! ## Without the pool
//!
//! The builders are pure and can be used on their own:
//!
//! ```ignore
//! use lightbnb_db::{AttributeMap, get_insert_query};
//!
//! let mut fields = AttributeMap::new().with("name", "Bob").with("age", "0");
//! let q = get_insert_query(&mut fields, "users")?;
//! let row = q.fetch_opt(&client).await?;
//! ```

pub mod attributes;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod ident;
pub mod insert;
pub mod models;
pub mod observe;
pub mod pool;
pub mod queries;
pub mod row;
pub mod sql;
pub mod value;

#[cfg(test)]
mod test_support;

pub use attributes::{AttributeMap, IntoAttributes};
pub use client::GenericClient;
pub use config::DbConfig;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use filter::{DEFAULT_LIMIT, FilterOptions, compile_property_search, to_minor_units};
pub use ident::Ident;
pub use insert::{get_insert_query, get_insert_query_with};
pub use models::{NewProperty, NewUser, Property, PropertyListing, Reservation, User};
pub use observe::{NoopObserver, ObservedClient, QueryObserver, TracingObserver};
pub use pool::{create_pool, create_pool_with_tls};
pub use row::{FromRow, RowExt};
pub use sql::{CompiledQuery, Sql, query, sql};
pub use value::Value;
