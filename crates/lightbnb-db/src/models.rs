//! Row types for the LightBnB tables.
//!
//! Records derive `Serialize` so the web layer can send them as JSON.
//! The `New*` types are the insert-side counterparts; they become
//! [`AttributeMap`]s with a fixed column order.

use crate::attributes::{AttributeMap, IntoAttributes};
use crate::error::DbResult;
use crate::row::{FromRow, RowExt};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A row of `users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl FromRow for User {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            email: row.try_get_column("email")?,
            password: row.try_get_column("password")?,
        })
    }
}

/// A user about to be inserted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Stored as given; hashing happens before this layer.
    pub password: String,
}

impl IntoAttributes for NewUser {
    fn into_attributes(self) -> AttributeMap {
        AttributeMap::new()
            .with("name", self.name)
            .with("email", self.email)
            .with("password", self.password)
    }
}

/// A row of `properties`. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
}

impl FromRow for Property {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            owner_id: row.try_get_column("owner_id")?,
            title: row.try_get_column("title")?,
            description: row.try_get_column("description")?,
            thumbnail_photo_url: row.try_get_column("thumbnail_photo_url")?,
            cover_photo_url: row.try_get_column("cover_photo_url")?,
            cost_per_night: row.try_get_column("cost_per_night")?,
            parking_spaces: row.try_get_column("parking_spaces")?,
            number_of_bathrooms: row.try_get_column("number_of_bathrooms")?,
            number_of_bedrooms: row.try_get_column("number_of_bedrooms")?,
            country: row.try_get_column("country")?,
            street: row.try_get_column("street")?,
            city: row.try_get_column("city")?,
            province: row.try_get_column("province")?,
            post_code: row.try_get_column("post_code")?,
            active: row.try_get_column("active")?,
        })
    }
}

/// A property plus the average of its review ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyListing {
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: Decimal,
}

impl FromRow for PropertyListing {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            property: Property::from_row(row)?,
            average_rating: row.try_get_column("average_rating")?,
        })
    }
}

/// One of a guest's reservations, joined with the reserved property.
///
/// `id` inside `property` is the property's id; the reservation's own id
/// is `reservation_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub reservation_id: i32,
    pub guest_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: Decimal,
}

impl FromRow for Reservation {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            reservation_id: row.try_get_column("reservation_id")?,
            guest_id: row.try_get_column("guest_id")?,
            start_date: row.try_get_column("start_date")?,
            end_date: row.try_get_column("end_date")?,
            property: Property::from_row(row)?,
            average_rating: row.try_get_column("average_rating")?,
        })
    }
}

/// A property listing about to be inserted, as submitted by its owner.
///
/// Zero counts are left out of the insert so column defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewProperty {
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Cents.
    pub cost_per_night: i32,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
}

impl IntoAttributes for NewProperty {
    fn into_attributes(self) -> AttributeMap {
        AttributeMap::new()
            .with("owner_id", self.owner_id)
            .with("title", self.title)
            .with("description", self.description)
            .with("thumbnail_photo_url", self.thumbnail_photo_url)
            .with("cover_photo_url", self.cover_photo_url)
            .with("cost_per_night", self.cost_per_night)
            .with("street", self.street)
            .with("city", self.city)
            .with("province", self.province)
            .with("post_code", self.post_code)
            .with("country", self.country)
            .with("parking_spaces", self.parking_spaces)
            .with("number_of_bathrooms", self.number_of_bathrooms)
            .with("number_of_bedrooms", self.number_of_bedrooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insert::get_insert_query;
    use crate::value::Value;
    use std::str::FromStr;

    fn sample_property() -> Property {
        Property {
            id: 3,
            owner_id: 1,
            title: "Habit mix".into(),
            description: None,
            thumbnail_photo_url: "https://images.example/3.jpg".into(),
            cover_photo_url: "https://images.example/3-cover.jpg".into(),
            cost_per_night: 8_800,
            parking_spaces: 1,
            number_of_bathrooms: 1,
            number_of_bedrooms: 2,
            country: "Canada".into(),
            street: "1 Main St".into(),
            city: "Calgary".into(),
            province: "Alberta".into(),
            post_code: "T2P 1J9".into(),
            active: true,
        }
    }

    #[test]
    fn new_user_columns_in_form_order() {
        let user = NewUser {
            name: "Bob".into(),
            email: "bob@example.com".into(),
            password: "hash".into(),
        };
        let mut attrs = user.into_attributes();
        let q = get_insert_query(&mut attrs, "users").unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO users (name,email,password) VALUES ($1,$2,$3) RETURNING *;"
        );
    }

    #[test]
    fn new_property_skips_unset_fields() {
        let property = NewProperty {
            owner_id: 4,
            title: "Cabin".into(),
            cost_per_night: 12_000,
            city: "Banff".into(),
            number_of_bedrooms: 2,
            ..NewProperty::default()
        };
        let mut attrs = property.into_attributes();
        attrs.normalize();

        let keys: Vec<&str> = attrs.keys().collect();
        assert_eq!(
            keys,
            ["owner_id", "title", "cost_per_night", "city", "number_of_bedrooms"]
        );
        assert_eq!(attrs.get("cost_per_night"), Some(&Value::Int(12_000)));
    }

    #[test]
    fn digit_only_text_fields_still_bind_to_varchar() {
        use bytes::BytesMut;
        use tokio_postgres::types::{ToSql, Type};

        let user = NewUser {
            name: "007".into(),
            email: "bond@example.com".into(),
            password: "123456".into(),
        };
        let mut attrs = user.into_attributes();
        let q = get_insert_query(&mut attrs, "users").unwrap();
        for value in q.values() {
            let mut buf = BytesMut::new();
            value.to_sql_checked(&Type::VARCHAR, &mut buf).unwrap();
        }
        let mut buf = BytesMut::new();
        q.values()[2].to_sql_checked(&Type::VARCHAR, &mut buf).unwrap();
        assert_eq!(&buf[..], b"123456");

        let property = NewProperty {
            owner_id: 1,
            title: "Beach house".into(),
            post_code: "90210".into(),
            ..NewProperty::default()
        };
        let mut attrs = property.into_attributes();
        let q = get_insert_query(&mut attrs, "properties").unwrap();
        assert!(q.sql().starts_with("INSERT INTO properties (owner_id,title,post_code)"));
        let mut buf = BytesMut::new();
        q.values()[2].to_sql_checked(&Type::VARCHAR, &mut buf).unwrap();
        assert_eq!(&buf[..], b"90210");
    }

    #[test]
    fn new_property_from_form_json() {
        let property: NewProperty = serde_json::from_str(
            r#"{"owner_id": 2, "title": "Loft", "description": "Bright", "cost_per_night": 9300}"#,
        )
        .unwrap();
        assert_eq!(property.description.as_deref(), Some("Bright"));
        assert_eq!(property.parking_spaces, 0);
    }

    #[test]
    fn listing_serializes_flat() {
        let listing = PropertyListing {
            property: sample_property(),
            average_rating: Decimal::from_str("4.25").unwrap(),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["city"], "Calgary");
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["average_rating"], "4.25");
    }

    #[test]
    fn reservation_keeps_both_ids() {
        let reservation = Reservation {
            reservation_id: 11,
            guest_id: 1,
            start_date: NaiveDate::from_ymd_opt(2018, 9, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2018, 9, 26).unwrap(),
            property: sample_property(),
            average_rating: Decimal::from(4),
        };
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["reservation_id"], 11);
        assert_eq!(json["id"], 3);
        assert_eq!(json["start_date"], "2018-09-11");
    }
}
