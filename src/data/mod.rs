//! Input data preparation.

pub mod listings;

pub use listings::{aggregate_monthly, read_listings, read_listings_path, ListingRecord};
