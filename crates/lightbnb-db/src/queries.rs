//! LightBnB accessors.
//!
//! Each function runs exactly one statement on the given client. `Ok(None)`
//! and empty vectors mean "no match"; store failures come back as `Err`.
//! Wrap the client in an [`ObservedClient`](crate::ObservedClient) to get
//! them logged.

use crate::attributes::{AttributeMap, IntoAttributes};
use crate::client::GenericClient;
use crate::error::DbResult;
use crate::filter::{FilterOptions, compile_property_search};
use crate::insert::get_insert_query;
use crate::models::{NewProperty, NewUser, Property, PropertyListing, Reservation, User};
use crate::sql::{self, CompiledQuery, Sql};
use tokio_postgres::Row;

pub(crate) fn user_with_email_query(email: &str) -> CompiledQuery {
    sql::query("SELECT * FROM users WHERE email = $1 LIMIT 1;")
        .bind(email)
        .tag("users.by_email")
}

pub(crate) fn user_with_id_query(id: i32) -> CompiledQuery {
    sql::query("SELECT * FROM users WHERE id = $1;")
        .bind(id)
        .tag("users.by_id")
}

pub(crate) fn reservations_query(guest_id: i32, limit: i64) -> CompiledQuery {
    let mut q = Sql::new(
        "SELECT reservations.id AS reservation_id, reservations.guest_id, \
         reservations.start_date, reservations.end_date, \
         properties.*, AVG(property_reviews.rating) AS average_rating \
         FROM reservations \
         JOIN properties ON reservations.property_id = properties.id \
         JOIN property_reviews ON property_reviews.property_id = reservations.property_id \
         WHERE reservations.guest_id = ",
    )
    .tagged("reservations.by_guest");
    q.push_bind(guest_id);
    q.push(" GROUP BY reservations.id, properties.id ORDER BY reservations.start_date");
    q.limit(limit);
    q.push(";");
    q.compile()
}

/// Look up a user by email.
pub async fn get_user_with_email(conn: &impl GenericClient, email: &str) -> DbResult<Option<User>> {
    user_with_email_query(email).fetch_opt_as(conn).await
}

/// Look up a user by id.
pub async fn get_user_with_id(conn: &impl GenericClient, id: i32) -> DbResult<Option<User>> {
    user_with_id_query(id).fetch_opt_as(conn).await
}

/// Insert a user and return the stored row.
pub async fn add_user(conn: &impl GenericClient, user: NewUser) -> DbResult<Option<User>> {
    let mut attributes = user.into_attributes();
    get_insert_query(&mut attributes, "users")?
        .fetch_opt_as(conn)
        .await
}

/// A guest's reservations, earliest first, at most `limit` of them.
pub async fn get_all_reservations(
    conn: &impl GenericClient,
    guest_id: i32,
    limit: i64,
) -> DbResult<Vec<Reservation>> {
    reservations_query(guest_id, limit).fetch_all_as(conn).await
}

/// Properties matching `options`, cheapest first.
pub async fn get_all_properties(
    conn: &impl GenericClient,
    options: &FilterOptions,
    limit: i64,
) -> DbResult<Vec<PropertyListing>> {
    compile_property_search(options, limit)
        .fetch_all_as(conn)
        .await
}

/// Insert a property and return the stored row.
pub async fn add_property(
    conn: &impl GenericClient,
    property: NewProperty,
) -> DbResult<Option<Property>> {
    let mut attributes = property.into_attributes();
    get_insert_query(&mut attributes, "properties")?
        .fetch_opt_as(conn)
        .await
}

/// Insert one row built from `attributes` into `table`, returning it.
///
/// `attributes` is normalized in place first.
pub async fn insert_attributes(
    conn: &impl GenericClient,
    attributes: &mut AttributeMap,
    table: &str,
) -> DbResult<Option<Row>> {
    get_insert_query(attributes, table)?.fetch_opt(conn).await
}
