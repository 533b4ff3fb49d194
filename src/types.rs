use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{format_number, format_percent};

/// Header names every input file must carry.
///
/// The basic path reads `id`, `host_id`, `neighbourhood`, `price` and
/// `accommodates`. The normalized path reads every other column plus `id`,
/// `host_id`, `price` and `accommodates`, and takes its neighbourhood from
/// `neighbourhood_group_cleansed`. Both paths load from the same file, so
/// both neighbourhood columns must be present in the header even though a
/// blank cell in either only drops the row from the path that reads it.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "host_id",
    "listing_url",
    "room_type",
    "neighbourhood",
    "neighbourhood_group_cleansed",
    "price",
    "cleaning_fee",
    "accommodates",
    "minimum_nights",
    "review_scores_rating",
    "name",
];

/// One row of the listings file as loaded, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawListing {
    #[serde(rename = "id")]
    pub id: Option<String>,
    #[serde(rename = "host_id")]
    pub host_id: Option<String>,
    #[serde(rename = "listing_url")]
    pub listing_url: Option<String>,
    #[serde(rename = "room_type")]
    pub room_type: Option<String>,
    #[serde(rename = "neighbourhood")]
    pub neighbourhood: Option<String>,
    #[serde(rename = "neighbourhood_group_cleansed")]
    pub neighbourhood_group_cleansed: Option<String>,
    #[serde(rename = "price")]
    pub price: Option<String>,
    #[serde(rename = "cleaning_fee")]
    pub cleaning_fee: Option<String>,
    #[serde(rename = "accommodates")]
    pub accommodates: Option<String>,
    #[serde(rename = "minimum_nights")]
    pub minimum_nights: Option<String>,
    #[serde(rename = "review_scores_rating")]
    pub review_scores_rating: Option<String>,
    #[serde(rename = "name")]
    pub name: Option<String>,
}

/// A fully validated listing from the normalized path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    pub accommodation_type: String,
    pub neighbourhood: String,
    pub price: f64,
    pub cleaning_fee: f64,
    pub capacity: i32,
    pub minimum_nights: i32,
    pub rating: f64,
    pub name: String,
}

impl Listing {
    /// Render back into raw form with plain numeric text, so the normalizer
    /// can consume its own output.
    pub fn to_raw(&self) -> RawListing {
        RawListing {
            id: Some(self.id.clone()),
            host_id: Some(self.owner_id.clone()),
            listing_url: Some(self.url.clone()),
            room_type: Some(self.accommodation_type.clone()),
            neighbourhood: Some(self.neighbourhood.clone()),
            neighbourhood_group_cleansed: Some(self.neighbourhood.clone()),
            price: Some(self.price.to_string()),
            cleaning_fee: Some(self.cleaning_fee.to_string()),
            accommodates: Some(self.capacity.to_string()),
            minimum_nights: Some(self.minimum_nights.to_string()),
            review_scores_rating: Some(self.rating.to_string()),
            name: Some(self.name.clone()),
        }
    }
}

/// The reduced record of the basic path: only what the simple counts and
/// rankings need, keyed on the fine-grained `neighbourhood` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicListing {
    pub id: String,
    pub owner_id: String,
    pub neighbourhood: String,
    pub price: f64,
    pub capacity: i32,
}

/// Fields shared by both record shapes; aggregations are written against it.
pub trait ListingView {
    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;
    fn neighbourhood(&self) -> &str;
    fn price(&self) -> f64;
    fn capacity(&self) -> i32;
}

impl ListingView for Listing {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
    fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }
    fn price(&self) -> f64 {
        self.price
    }
    fn capacity(&self) -> i32 {
        self.capacity
    }
}

impl ListingView for BasicListing {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
    fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }
    fn price(&self) -> f64 {
        self.price
    }
    fn capacity(&self) -> i32 {
        self.capacity
    }
}

/// Ordering for count-style results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

fn display_money(v: &f64) -> String {
    format_number(*v, 2)
}

fn display_pct(v: &f64) -> String {
    format_percent(*v)
}

fn display_avg(v: &f64) -> String {
    format_number(*v, 6)
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct NeighbourhoodCount {
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "Listings")]
    #[tabled(rename = "Listings")]
    pub listings: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct OwnerListingCount {
    #[serde(rename = "OwnerId")]
    #[tabled(rename = "OwnerId")]
    pub owner_id: String,
    #[serde(rename = "Listings")]
    #[tabled(rename = "Listings")]
    pub listings: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct OwnerConcentration {
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "AvgListingsPerOwner")]
    #[tabled(rename = "AvgListingsPerOwner", display_with = "display_avg")]
    pub avg_listings_per_owner: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TypeShare {
    #[serde(rename = "AccommodationType")]
    #[tabled(rename = "AccommodationType")]
    pub accommodation_type: String,
    #[serde(rename = "Listings")]
    #[tabled(rename = "Listings")]
    pub listings: usize,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage", display_with = "display_pct")]
    pub percentage: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct NeighbourhoodTypeShare {
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "AccommodationType")]
    #[tabled(rename = "AccommodationType")]
    pub accommodation_type: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage", display_with = "display_pct")]
    pub percentage: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct NeighbourhoodPrice {
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "AvgPricePerPerson")]
    #[tabled(rename = "AvgPricePerPerson", display_with = "display_money")]
    pub avg_price_per_person: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PriceRatingPoint {
    #[serde(rename = "Id")]
    #[tabled(rename = "Id")]
    pub id: String,
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "PricePerPerson")]
    #[tabled(rename = "PricePerPerson", display_with = "display_money")]
    pub price_per_person: f64,
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RankedListing {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Id")]
    #[tabled(rename = "Id")]
    pub id: String,
    #[serde(rename = "OwnerId")]
    #[tabled(rename = "OwnerId")]
    pub owner_id: String,
    #[serde(rename = "Neighbourhood")]
    #[tabled(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "Price")]
    #[tabled(rename = "Price", display_with = "display_money")]
    pub price: f64,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: i32,
}

impl RankedListing {
    /// Number a sequence of listings from 1 in the order given.
    pub fn rank<T: ListingView>(listings: &[&T]) -> Vec<RankedListing> {
        listings
            .iter()
            .enumerate()
            .map(|(idx, l)| RankedListing {
                rank: idx + 1,
                id: l.id().to_string(),
                owner_id: l.owner_id().to_string(),
                neighbourhood: l.neighbourhood().to_string(),
                price: l.price(),
                capacity: l.capacity(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct SummaryStats {
    pub total_rows: usize,
    pub normalized_rows: usize,
    pub dropped_rows: usize,
    pub degenerate_rows: usize,
    pub total_neighbourhoods: usize,
    pub total_owners: usize,
    pub multi_listing_owners: usize,
    pub multi_listing_share: f64,
    pub generated_at: DateTime<Utc>,
}
