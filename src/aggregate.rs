//! Read-only summaries over listings.
//!
//! Everything here takes the dataset by reference and returns fresh
//! collections; nothing is cached between calls. Functions that only need
//! the shared fields are generic over [`ListingView`] so the basic and the
//! normalized paths go through the same code.
use crate::metrics::{price_per_person_unrounded, Priced};
use crate::normalize::NormalizeReport;
use crate::types::{
    Listing, ListingView, NeighbourhoodCount, NeighbourhoodPrice, NeighbourhoodTypeShare,
    OwnerConcentration, OwnerListingCount, PriceRatingPoint, SortOrder, SummaryStats, TypeShare,
};
use crate::util::{average, round_to};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

fn in_set<S: AsRef<str>>(neighbourhoods: &[S], neighbourhood: &str) -> bool {
    neighbourhoods.iter().any(|n| n.as_ref() == neighbourhood)
}

/// Listings whose neighbourhood is one of `neighbourhoods`, order kept.
pub fn in_neighbourhoods<'a, T: ListingView, S: AsRef<str>>(
    listings: &'a [T],
    neighbourhoods: &[S],
) -> Vec<&'a T> {
    listings
        .iter()
        .filter(|l| in_set(neighbourhoods, l.neighbourhood()))
        .collect()
}

/// Number of listings per neighbourhood, keyed alphabetically.
pub fn count_by_neighbourhood<T: ListingView>(listings: &[T]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for l in listings {
        *counts.entry(l.neighbourhood().to_string()).or_default() += 1;
    }
    counts
}

/// Neighbourhood counts as table rows, busiest first.
pub fn neighbourhood_rows(counts: &BTreeMap<String, usize>) -> Vec<NeighbourhoodCount> {
    let mut rows: Vec<NeighbourhoodCount> = counts
        .iter()
        .map(|(neighbourhood, listings)| NeighbourhoodCount {
            neighbourhood: neighbourhood.clone(),
            listings: *listings,
        })
        .collect();
    // stable: equal counts stay alphabetical
    rows.sort_by(|a, b| b.listings.cmp(&a.listings));
    rows
}

/// Listings that sleep at least `occupants` people, order kept.
pub fn filter_by_capacity<T: ListingView>(listings: &[T], occupants: i32) -> Vec<&T> {
    listings
        .iter()
        .filter(|l| l.capacity() >= occupants)
        .collect()
}

/// The `k` cheapest listings of a neighbourhood by nightly price.
///
/// Equal prices keep their input order. Fewer than `k` listings (or none)
/// simply yields a shorter result.
pub fn cheapest_in_neighbourhood<'a, T: ListingView>(
    listings: &'a [T],
    neighbourhood: &str,
    k: usize,
) -> Vec<&'a T> {
    let mut matching = in_neighbourhoods(listings, &[neighbourhood]);
    matching.sort_by(|a, b| a.price().partial_cmp(&b.price()).unwrap_or(Ordering::Equal));
    matching.truncate(k);
    matching
}

fn owner_counts<'a, T, I>(listings: I, order: SortOrder) -> Vec<OwnerListingCount>
where
    T: ListingView + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut map: HashMap<&str, usize> = HashMap::new();
    for l in listings {
        *map.entry(l.owner_id()).or_default() += 1;
    }
    let mut rows: Vec<OwnerListingCount> = map
        .into_iter()
        .map(|(owner_id, listings)| OwnerListingCount {
            owner_id: owner_id.to_string(),
            listings,
        })
        .collect();
    rows.sort_by(|a, b| {
        let by_count = match order {
            SortOrder::Ascending => a.listings.cmp(&b.listings),
            SortOrder::Descending => b.listings.cmp(&a.listings),
        };
        by_count.then_with(|| a.owner_id.cmp(&b.owner_id))
    });
    rows
}

/// Listings held by each owner across the whole dataset.
pub fn owner_listing_counts<T: ListingView>(
    listings: &[T],
    order: SortOrder,
) -> Vec<OwnerListingCount> {
    owner_counts(listings, order)
}

/// Listings held by each owner, counting only the given neighbourhoods.
pub fn owner_listing_counts_in<T: ListingView, S: AsRef<str>>(
    listings: &[T],
    neighbourhoods: &[S],
    order: SortOrder,
) -> Vec<OwnerListingCount> {
    owner_counts(in_neighbourhoods(listings, neighbourhoods), order)
}

/// Mean number of listings per owner inside each neighbourhood, to 6 decimals.
///
/// Owners are counted per neighbourhood: a host with listings in two
/// neighbourhoods contributes one count to each.
pub fn average_listings_per_owner<T: ListingView>(listings: &[T]) -> BTreeMap<String, f64> {
    let mut grouped: BTreeMap<&str, HashMap<&str, usize>> = BTreeMap::new();
    for l in listings {
        *grouped
            .entry(l.neighbourhood())
            .or_default()
            .entry(l.owner_id())
            .or_default() += 1;
    }
    grouped
        .into_iter()
        .map(|(neighbourhood, owners)| {
            let counts: Vec<f64> = owners.values().map(|c| *c as f64).collect();
            (neighbourhood.to_string(), round_to(average(&counts), 6))
        })
        .collect()
}

/// Concentration as table rows, most professionalized neighbourhood first.
pub fn concentration_rows(averages: &BTreeMap<String, f64>) -> Vec<OwnerConcentration> {
    let mut rows: Vec<OwnerConcentration> = averages
        .iter()
        .map(|(neighbourhood, avg)| OwnerConcentration {
            neighbourhood: neighbourhood.clone(),
            avg_listings_per_owner: *avg,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_listings_per_owner
            .partial_cmp(&a.avg_listings_per_owner)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

fn type_shares<'a, I>(listings: I) -> Vec<TypeShare>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for l in listings {
        *counts.entry(l.accommodation_type.as_str()).or_default() += 1;
        total += 1;
    }
    let mut rows: Vec<TypeShare> = counts
        .into_iter()
        .map(|(accommodation_type, listings)| TypeShare {
            accommodation_type: accommodation_type.to_string(),
            listings,
            percentage: listings as f64 / total as f64 * 100.0,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.listings
            .cmp(&a.listings)
            .then_with(|| a.accommodation_type.cmp(&b.accommodation_type))
    });
    rows
}

/// Percentage of each accommodation type among listings in `neighbourhoods`.
pub fn accommodation_type_share<S: AsRef<str>>(
    listings: &[Listing],
    neighbourhoods: &[S],
) -> Vec<TypeShare> {
    type_shares(in_neighbourhoods(listings, neighbourhoods))
}

/// Accommodation type mix of every neighbourhood, neighbourhoods in
/// alphabetical order.
pub fn accommodation_type_share_by_neighbourhood(
    listings: &[Listing],
) -> Vec<NeighbourhoodTypeShare> {
    let mut grouped: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
    for l in listings {
        grouped.entry(l.neighbourhood.as_str()).or_default().push(l);
    }
    let mut rows = Vec::new();
    for (neighbourhood, members) in grouped {
        for share in type_shares(members) {
            rows.push(NeighbourhoodTypeShare {
                neighbourhood: neighbourhood.to_string(),
                accommodation_type: share.accommodation_type,
                percentage: share.percentage,
            });
        }
    }
    rows
}

/// Mean rounded price per person of each neighbourhood, alphabetical.
pub fn mean_price_per_person_by_neighbourhood(priced: &Priced<'_>) -> Vec<NeighbourhoodPrice> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for p in &priced.listings {
        grouped
            .entry(p.listing.neighbourhood.as_str())
            .or_default()
            .push(p.price_per_person);
    }
    grouped
        .into_iter()
        .map(|(neighbourhood, values)| NeighbourhoodPrice {
            neighbourhood: neighbourhood.to_string(),
            avg_price_per_person: average(&values),
        })
        .collect()
}

/// Unrounded price per person against rating for listings in
/// `neighbourhoods`. Degenerate listings have no point.
pub fn price_rating_points<S: AsRef<str>>(
    listings: &[Listing],
    neighbourhoods: &[S],
) -> Vec<PriceRatingPoint> {
    in_neighbourhoods(listings, neighbourhoods)
        .into_iter()
        .filter_map(|l| {
            let price_per_person = price_per_person_unrounded(l).ok()?;
            Some(PriceRatingPoint {
                id: l.id.clone(),
                neighbourhood: l.neighbourhood.clone(),
                price_per_person,
                rating: l.rating,
            })
        })
        .collect()
}

/// Headline figures for the whole run.
pub fn summarize(
    report: &NormalizeReport,
    listings: &[Listing],
    priced: &Priced<'_>,
) -> SummaryStats {
    let owners = owner_listing_counts(listings, SortOrder::Descending);
    let multi: Vec<&OwnerListingCount> = owners.iter().filter(|o| o.listings > 1).collect();
    let multi_listings: usize = multi.iter().map(|o| o.listings).sum();
    let multi_listing_share = if listings.is_empty() {
        0.0
    } else {
        round_to(multi_listings as f64 / listings.len() as f64 * 100.0, 2)
    };
    SummaryStats {
        total_rows: report.total_rows,
        normalized_rows: listings.len(),
        dropped_rows: report.dropped_rows,
        degenerate_rows: priced.excluded.len(),
        total_neighbourhoods: count_by_neighbourhood(listings).len(),
        total_owners: owners.len(),
        multi_listing_owners: multi.len(),
        multi_listing_share,
        generated_at: Utc::now(),
    }
}
