//! Search LightBnB listings from the command line.
//!
//! Run with: cargo run --example search_properties -p lightbnb-db -- Vancouver 4
//!
//! Set DATABASE_URL in .env file or environment variable:
//! DATABASE_URL=postgres://vagrant@localhost/lightbnb

use lightbnb_db::{DEFAULT_LIMIT, Database, DbConfig, DbError, FilterOptions};

#[tokio::main]
async fn main() -> Result<(), DbError> {
    let config = DbConfig::from_env()?;
    let db = Database::from_config(&config)?;

    let mut args = std::env::args().skip(1);
    let mut options = FilterOptions::new();
    if let Some(city) = args.next() {
        options = options.city(city);
    }
    if let Some(rating) = args.next() {
        let rating = rating
            .parse()
            .map_err(|_| DbError::invalid_input(format!("not a rating: {rating}")))?;
        options = options.minimum_rating(rating);
    }

    let listings = db.get_all_properties(&options, DEFAULT_LIMIT).await?;
    if listings.is_empty() {
        println!("No properties found");
    }
    for listing in &listings {
        let property = &listing.property;
        println!(
            "{:>4}  {:<30} {:<20} ${:>8.2}/night  rating {}",
            property.id,
            property.title,
            property.city,
            f64::from(property.cost_per_night) / 100.0,
            listing.average_rating.round_dp(2),
        );
    }

    Ok(())
}
