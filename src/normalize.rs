use crate::error::{AnalysisError, Result};
use crate::types::{Listing, RawListing};
use crate::util::{parse_currency, parse_f64_safe, parse_i32_safe, present};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Row accounting for a cleaning pass. Both the normalized and the basic
/// path produce one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    /// First missing column of every dropped row, counted per column.
    pub dropped_by_field: BTreeMap<&'static str, usize>,
}

impl NormalizeReport {
    pub(crate) fn tally(
        total_rows: usize,
        kept_rows: usize,
        dropped_by_field: BTreeMap<&'static str, usize>,
    ) -> Self {
        Self {
            total_rows,
            kept_rows,
            dropped_rows: total_rows - kept_rows,
            dropped_by_field,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub listings: Vec<Listing>,
    pub report: NormalizeReport,
}

/// Present cells of a row, in output column order.
struct Cells<'a> {
    id: &'a str,
    owner_id: &'a str,
    url: &'a str,
    accommodation_type: &'a str,
    neighbourhood: &'a str,
    price: &'a str,
    cleaning_fee: &'a str,
    capacity: &'a str,
    minimum_nights: &'a str,
    rating: &'a str,
    name: &'a str,
}

fn pick<'a>(v: &'a Option<String>, field: &'static str) -> std::result::Result<&'a str, &'static str> {
    present(v.as_deref()).ok_or(field)
}

/// Pick the selected columns, or name the first one that is empty.
fn select(raw: &RawListing) -> std::result::Result<Cells<'_>, &'static str> {
    Ok(Cells {
        id: pick(&raw.id, "id")?,
        owner_id: pick(&raw.host_id, "host_id")?,
        url: pick(&raw.listing_url, "listing_url")?,
        accommodation_type: pick(&raw.room_type, "room_type")?,
        neighbourhood: pick(&raw.neighbourhood_group_cleansed, "neighbourhood_group_cleansed")?,
        price: pick(&raw.price, "price")?,
        cleaning_fee: pick(&raw.cleaning_fee, "cleaning_fee")?,
        capacity: pick(&raw.accommodates, "accommodates")?,
        minimum_nights: pick(&raw.minimum_nights, "minimum_nights")?,
        rating: pick(&raw.review_scores_rating, "review_scores_rating")?,
        name: pick(&raw.name, "name")?,
    })
}

fn currency(id: &str, field: &'static str, value: &str) -> Result<f64> {
    parse_currency(value).ok_or_else(|| AnalysisError::MalformedCurrency {
        id: id.to_string(),
        field,
        value: value.to_string(),
    })
}

fn malformed(id: &str, field: &'static str, value: &str) -> AnalysisError {
    AnalysisError::MalformedNumeric {
        id: id.to_string(),
        field,
        value: value.to_string(),
    }
}

fn to_listing(cells: Cells<'_>) -> Result<Listing> {
    let id = cells.id;
    Ok(Listing {
        id: id.to_string(),
        owner_id: cells.owner_id.to_string(),
        url: cells.url.to_string(),
        accommodation_type: cells.accommodation_type.to_string(),
        neighbourhood: cells.neighbourhood.to_string(),
        price: currency(id, "price", cells.price)?,
        cleaning_fee: currency(id, "cleaning_fee", cells.cleaning_fee)?,
        capacity: parse_i32_safe(Some(cells.capacity))
            .ok_or_else(|| malformed(id, "accommodates", cells.capacity))?,
        minimum_nights: parse_i32_safe(Some(cells.minimum_nights))
            .ok_or_else(|| malformed(id, "minimum_nights", cells.minimum_nights))?,
        rating: parse_f64_safe(Some(cells.rating))
            .ok_or_else(|| malformed(id, "review_scores_rating", cells.rating))?,
        name: cells.name.to_string(),
    })
}

/// Clean raw rows into typed listings.
///
/// Rows with any selected column empty are dropped and counted. A present
/// value that does not parse aborts the run: it means the file is not what
/// we think it is.
pub fn normalize(raw: &[RawListing]) -> Result<Normalized> {
    let mut listings = Vec::with_capacity(raw.len());
    let mut dropped_by_field: BTreeMap<&'static str, usize> = BTreeMap::new();

    for row in raw {
        match select(row) {
            Ok(cells) => listings.push(to_listing(cells)?),
            Err(field) => *dropped_by_field.entry(field).or_default() += 1,
        }
    }

    let report = NormalizeReport::tally(raw.len(), listings.len(), dropped_by_field);
    if report.dropped_rows > 0 {
        warn!(
            dropped = report.dropped_rows,
            by_field = ?report.dropped_by_field,
            "dropped incomplete listings"
        );
    }
    info!(kept = report.kept_rows, total = report.total_rows, "normalized listings");
    Ok(Normalized { listings, report })
}
