use crate::error::{AnalysisError, Result};
use crate::types::Listing;
use crate::util::round_to;
use tracing::warn;

fn check_positive(listing: &Listing) -> Result<()> {
    for (field, value) in [
        ("accommodates", listing.capacity),
        ("minimum_nights", listing.minimum_nights),
    ] {
        if value <= 0 {
            return Err(AnalysisError::DegenerateInput {
                id: listing.id.clone(),
                field,
                value,
            });
        }
    }
    Ok(())
}

/// Minimum-stay cost per occupant per night, cleaning fee included, unrounded.
pub fn price_per_person_unrounded(listing: &Listing) -> Result<f64> {
    check_positive(listing)?;
    let nights = f64::from(listing.minimum_nights);
    let people = f64::from(listing.capacity);
    Ok((listing.price * nights + listing.cleaning_fee) / (nights + people))
}

/// [`price_per_person_unrounded`] rounded to cents.
pub fn price_per_person(listing: &Listing) -> Result<f64> {
    price_per_person_unrounded(listing).map(|v| round_to(v, 2))
}

#[derive(Debug, Clone)]
pub struct PricedListing<'a> {
    pub listing: &'a Listing,
    pub price_per_person: f64,
}

/// Listings paired with their rounded price per person. Degenerate listings
/// are left out and returned in `excluded`.
#[derive(Debug, Default)]
pub struct Priced<'a> {
    pub listings: Vec<PricedListing<'a>>,
    pub excluded: Vec<AnalysisError>,
}

pub fn price_listings(listings: &[Listing]) -> Priced<'_> {
    let mut priced = Priced::default();
    for listing in listings {
        match price_per_person(listing) {
            Ok(price_per_person) => priced.listings.push(PricedListing {
                listing,
                price_per_person,
            }),
            Err(e) => {
                warn!(error = %e, "excluding listing from price metrics");
                priced.excluded.push(e);
            }
        }
    }
    priced
}
