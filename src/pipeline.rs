//! Explicit end-to-end run: load, normalize, price, aggregate.
use crate::aggregate;
use crate::error::Result;
use crate::loader;
use crate::metrics::price_listings;
use crate::normalize::{normalize, NormalizeReport};
use crate::types::{
    BasicListing, Listing, NeighbourhoodCount, NeighbourhoodPrice, NeighbourhoodTypeShare,
    OwnerConcentration, OwnerListingCount, PriceRatingPoint, RankedListing, SortOrder,
    SummaryStats, TypeShare,
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_INPUT: &str = "madrid-airbnb-listings-small.csv";
pub const DEFAULT_NEIGHBOURHOODS: [&str; 3] = ["Centro", "Villaverde", "Vicálvaro"];

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    /// Neighbourhoods the restricted views (types, owners, scatter) look at.
    pub neighbourhoods: Vec<String>,
    pub cheapest_neighbourhood: String,
    pub cheapest_count: usize,
    pub occupants: i32,
    pub owner_order: SortOrder,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            neighbourhoods: DEFAULT_NEIGHBOURHOODS.iter().map(|s| s.to_string()).collect(),
            cheapest_neighbourhood: "Centro".to_string(),
            cheapest_count: 10,
            occupants: 4,
            owner_order: SortOrder::Descending,
        }
    }
}

/// Both views of one loaded file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub basic: Vec<BasicListing>,
    pub basic_report: NormalizeReport,
    pub listings: Vec<Listing>,
    pub normalize_report: NormalizeReport,
}

impl Dataset {
    /// Each path drops its own incomplete rows; a blank cell in a column
    /// only one path reads never empties the other.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let raw = loader::load_records(path)?;
        let normalized = normalize(&raw)?;
        let (basic, basic_report) = loader::to_basic_all(&raw)?;
        Ok(Self {
            basic,
            basic_report,
            listings: normalized.listings,
            normalize_report: normalized.report,
        })
    }
}

/// Every table a report needs, computed from one dataset.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub neighbourhood_counts: Vec<NeighbourhoodCount>,
    /// Listings per `neighbourhood_group_cleansed` district, normalized path.
    pub district_counts: Vec<NeighbourhoodCount>,
    pub roomy_listings: Vec<RankedListing>,
    pub cheapest: Vec<RankedListing>,
    pub owner_counts: Vec<OwnerListingCount>,
    pub owner_counts_in_focus: Vec<OwnerListingCount>,
    pub concentration: Vec<OwnerConcentration>,
    pub type_share_in_focus: Vec<TypeShare>,
    pub type_mix: Vec<NeighbourhoodTypeShare>,
    pub price_per_person: Vec<NeighbourhoodPrice>,
    pub price_vs_rating: Vec<PriceRatingPoint>,
    pub summary: SummaryStats,
}

/// Run every aggregation over an already loaded dataset.
///
/// Simple counts and rankings read the basic path; anything that needs
/// accommodation type, fees or ratings reads the normalized listings.
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> AnalysisReport {
    let basic = &dataset.basic;
    let listings = &dataset.listings;
    let focus = &config.neighbourhoods;
    let priced = price_listings(listings);

    let report = AnalysisReport {
        neighbourhood_counts: aggregate::neighbourhood_rows(&aggregate::count_by_neighbourhood(
            basic,
        )),
        district_counts: aggregate::neighbourhood_rows(&aggregate::count_by_neighbourhood(
            listings,
        )),
        roomy_listings: RankedListing::rank(&aggregate::filter_by_capacity(
            basic,
            config.occupants,
        )),
        cheapest: RankedListing::rank(&aggregate::cheapest_in_neighbourhood(
            basic,
            &config.cheapest_neighbourhood,
            config.cheapest_count,
        )),
        owner_counts: aggregate::owner_listing_counts(basic, config.owner_order),
        owner_counts_in_focus: aggregate::owner_listing_counts_in(
            listings,
            focus,
            config.owner_order,
        ),
        concentration: aggregate::concentration_rows(&aggregate::average_listings_per_owner(
            listings,
        )),
        type_share_in_focus: aggregate::accommodation_type_share(listings, focus),
        type_mix: aggregate::accommodation_type_share_by_neighbourhood(listings),
        price_per_person: aggregate::mean_price_per_person_by_neighbourhood(&priced),
        price_vs_rating: aggregate::price_rating_points(listings, focus),
        summary: aggregate::summarize(&dataset.normalize_report, listings, &priced),
    };
    info!(
        neighbourhoods = report.summary.total_neighbourhoods,
        owners = report.summary.total_owners,
        multi_listing_owners = report.summary.multi_listing_owners,
        "analysis complete"
    );
    report
}

pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let dataset = Dataset::load(&config.input)?;
    Ok(analyze(&dataset, config))
}
