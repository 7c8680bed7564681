//! Property search: options in, filtered `SELECT` out.

use crate::sql::{CompiledQuery, Sql};
use serde::Deserialize;

/// Row limit used when the caller doesn't pass one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Optional search criteria for the property listing.
///
/// Empty strings and zero amounts count as "not set".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Substring of the city name.
    pub city: Option<String>,
    pub owner_id: Option<i32>,
    /// Dollars; bound as cents.
    pub minimum_price_per_night: Option<f64>,
    /// Dollars; bound as cents.
    pub maximum_price_per_night: Option<f64>,
    pub minimum_rating: Option<f64>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn owner_id(mut self, owner_id: i32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn minimum_price_per_night(mut self, dollars: f64) -> Self {
        self.minimum_price_per_night = Some(dollars);
        self
    }

    pub fn maximum_price_per_night(mut self, dollars: f64) -> Self {
        self.maximum_price_per_night = Some(dollars);
        self
    }

    pub fn minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }
}

fn truthy(n: Option<f64>) -> Option<f64> {
    n.filter(|n| *n != 0.0 && !n.is_nan())
}

/// Dollars to integer cents.
pub fn to_minor_units(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Compile the property search for `options`, returning at most `limit` rows.
///
/// Clause order is fixed: city (always, `%%` when unset), owner, minimum
/// price, maximum price, `GROUP BY`, minimum rating as `HAVING`, then
/// ordering by price and the limit. Placeholders are numbered in that order.
pub fn compile_property_search(options: &FilterOptions, limit: i64) -> CompiledQuery {
    let mut q = Sql::new(
        "SELECT properties.*, AVG(property_reviews.rating) AS average_rating \
         FROM properties \
         JOIN property_reviews ON properties.id = property_reviews.property_id",
    )
    .tagged("properties.search");

    // Always present so every later predicate can start with AND.
    let city = options.city.as_deref().unwrap_or_default();
    q.push(" WHERE properties.city LIKE ")
        .push_bind(format!("%{city}%"));

    if let Some(owner_id) = options.owner_id.filter(|id| *id != 0) {
        q.push(" AND properties.owner_id = ").push_bind(owner_id);
    }
    if let Some(min) = truthy(options.minimum_price_per_night) {
        q.push(" AND properties.cost_per_night >= ")
            .push_bind(to_minor_units(min));
    }
    if let Some(max) = truthy(options.maximum_price_per_night) {
        q.push(" AND properties.cost_per_night <= ")
            .push_bind(to_minor_units(max));
    }

    q.push(" GROUP BY properties.id");

    if let Some(rating) = truthy(options.minimum_rating) {
        q.push(" HAVING AVG(property_reviews.rating) >= ")
            .push_bind(rating);
    }

    q.push(" ORDER BY properties.cost_per_night ASC");
    q.limit(limit);
    q.push(";");

    q.compile()
}
