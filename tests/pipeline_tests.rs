use listings_report::aggregate;
use listings_report::output::write_report;
use listings_report::pipeline::{analyze, run, AnalysisConfig, Dataset};
use listings_report::types::{ListingView, SortOrder};
use listings_report::AnalysisError;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/listings-small.tsv")
}

fn load() -> Dataset {
    Dataset::load(&fixture()).expect("Failed to load fixture")
}

/// Copy the fixture into a temp file, replacing the cell at `column` of the
/// row whose id is `id`.
fn fixture_with_cell(name: &str, id: &str, column: usize, value: &str) -> PathBuf {
    let text = std::fs::read_to_string(fixture()).expect("Failed to read fixture");
    let edited: Vec<String> = text
        .lines()
        .map(|line| {
            let mut cells: Vec<&str> = line.split('\t').collect();
            if cells[0] == id {
                cells[column] = value;
            }
            cells.join("\t")
        })
        .collect();
    let path = std::env::temp_dir().join(format!(
        "listings_report_{}_{}.tsv",
        name,
        std::process::id()
    ));
    std::fs::write(&path, edited.join("\n") + "\n").expect("Failed to write fixture copy");
    path
}

#[test]
fn loads_both_paths() {
    let dataset = load();
    assert_eq!(dataset.basic.len(), 8);
    assert_eq!(dataset.listings.len(), 6);
    assert_eq!(dataset.normalize_report.dropped_rows, 2);
    assert_eq!(dataset.basic_report.dropped_rows, 0);
    let kept: Vec<&str> = dataset.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(kept, vec!["1", "2", "3", "4", "7", "8"]);
    assert_eq!(dataset.listings[2].price, 1200.0);
}

#[test]
fn counts_sum_to_dataset_size() {
    let dataset = load();
    let basic = aggregate::count_by_neighbourhood(&dataset.basic);
    assert_eq!(basic.values().sum::<usize>(), dataset.basic.len());
    assert_eq!(basic["Sol"], 2);
    assert_eq!(basic["Goya"], 2);

    let normalized = aggregate::count_by_neighbourhood(&dataset.listings);
    assert_eq!(normalized.values().sum::<usize>(), dataset.listings.len());
    assert_eq!(normalized["Centro"], 3);
    assert!(!normalized.contains_key("Vicálvaro"));
}

#[test]
fn cheapest_is_a_sorted_subsequence() {
    let dataset = load();
    let in_centro = aggregate::in_neighbourhoods(&dataset.listings, &["Centro"]);
    for k in 0..5 {
        let cheapest = aggregate::cheapest_in_neighbourhood(&dataset.listings, "Centro", k);
        assert_eq!(cheapest.len(), k.min(in_centro.len()));
        assert!(cheapest.windows(2).all(|w| w[0].price() <= w[1].price()));
        assert!(cheapest
            .iter()
            .all(|c| in_centro.iter().any(|l| l.id() == c.id())));
    }
    let first = aggregate::cheapest_in_neighbourhood(&dataset.basic, "Sol", 1);
    assert_eq!(first[0].id, "1");
    assert!(aggregate::cheapest_in_neighbourhood(&dataset.basic, "Nowhere", 5).is_empty());
}

#[test]
fn owner_counts_match_row_counts() {
    let dataset = load();
    let all = aggregate::owner_listing_counts(&dataset.basic, SortOrder::Descending);
    assert_eq!(all[0].owner_id, "100");
    assert_eq!(all[0].listings, 4);
    assert_eq!(all.iter().map(|o| o.listings).sum::<usize>(), 8);

    let centro = aggregate::owner_listing_counts_in(&dataset.listings, &["Centro"], SortOrder::Descending);
    assert_eq!(centro.len(), 1);
    assert_eq!(centro[0].listings, 3);
}

#[test]
fn concentration_highlights_single_big_host() {
    let dataset = load();
    let avg = aggregate::average_listings_per_owner(&dataset.listings);
    assert_eq!(avg["Centro"], 3.0);
    assert_eq!(avg["Villaverde"], 1.0);
    assert_eq!(avg["Salamanca"], 1.0);
}

#[test]
fn full_analysis_and_export() {
    let dataset = load();
    let config = AnalysisConfig {
        input: fixture(),
        ..AnalysisConfig::default()
    };
    let report = analyze(&dataset, &config);

    assert_eq!(report.summary.total_rows, 8);
    assert_eq!(report.summary.normalized_rows, 6);
    assert_eq!(report.summary.total_owners, 3);
    assert_eq!(report.summary.multi_listing_owners, 1);
    assert_eq!(report.summary.multi_listing_share, 66.67);

    let shares: f64 = report.type_share_in_focus.iter().map(|s| s.percentage).sum();
    assert!((shares - 100.0).abs() < 1e-9);
    assert_eq!(report.type_share_in_focus[0].accommodation_type, "Entire home/apt");

    let centro = report
        .price_per_person
        .iter()
        .find(|p| p.neighbourhood == "Centro")
        .expect("Centro priced");
    // (38.33 + 23.33 + 405.56) / 3
    assert!((centro.avg_price_per_person - 155.74).abs() < 1e-9);
    assert_eq!(report.price_vs_rating.len(), 4);

    let districts: Vec<(&str, usize)> = report
        .district_counts
        .iter()
        .map(|d| (d.neighbourhood.as_str(), d.listings))
        .collect();
    assert_eq!(districts, vec![("Centro", 3), ("Salamanca", 2), ("Villaverde", 1)]);

    let dir = std::env::temp_dir().join(format!("listings_report_test_{}", std::process::id()));
    let written = write_report(&dir, &report).expect("Failed to write report");
    assert_eq!(written.len(), 12);
    let districts = std::fs::read_to_string(dir.join("district_counts.csv")).unwrap();
    assert!(districts.starts_with("Neighbourhood,Listings\nCentro,3\n"));
    assert!(written.iter().all(|p| p.exists()));
    let summary = std::fs::read_to_string(dir.join("summary.json")).unwrap();
    assert!(summary.contains("\"multi_listing_owners\": 1"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_input_aborts_cleanly() {
    let config = AnalysisConfig {
        input: PathBuf::from("no/such/listings.tsv"),
        ..AnalysisConfig::default()
    };
    match run(&config) {
        Err(AnalysisError::FileNotFound(path)) => {
            assert_eq!(path, PathBuf::from("no/such/listings.tsv"))
        }
        other => panic!("expected FileNotFound, got {:?}", other.map(|r| r.summary)),
    }
}

#[test]
fn blank_neighbourhood_only_drops_from_basic_path() {
    // column 5 is `neighbourhood`, read by the basic path only
    let path = fixture_with_cell("blank_neighbourhood", "7", 5, "");
    let dataset = Dataset::load(&path).expect("load should survive a blank neighbourhood");
    std::fs::remove_file(&path).ok();

    assert_eq!(dataset.listings.len(), 6);
    assert_eq!(dataset.basic.len(), 7);
    assert_eq!(dataset.basic_report.dropped_rows, 1);
    assert_eq!(dataset.basic_report.dropped_by_field["neighbourhood"], 1);
    assert!(dataset.basic.iter().all(|l| l.id != "7"));

    let report = analyze(&dataset, &AnalysisConfig::default());
    assert_eq!(report.summary.normalized_rows, 6);
    assert_eq!(report.district_counts[0].listings, 3);
}

#[test]
fn blank_unused_column_changes_nothing() {
    // column 7 is `latitude`, which neither path reads
    let path = fixture_with_cell("blank_latitude", "1", 7, "");
    let dataset = Dataset::load(&path).expect("load should ignore unused columns");
    std::fs::remove_file(&path).ok();

    assert_eq!(dataset.basic.len(), 8);
    assert_eq!(dataset.listings.len(), 6);
    assert_eq!(dataset.basic_report.dropped_rows, 0);
    assert_eq!(dataset.normalize_report.dropped_rows, 2);
}

#[test]
fn malformed_fee_aborts_run_with_listing_id() {
    // column 12 is `cleaning_fee`
    let path = fixture_with_cell("malformed_fee", "2", 12, "$n/a");
    let config = AnalysisConfig {
        input: path.clone(),
        ..AnalysisConfig::default()
    };
    let result = run(&config);
    std::fs::remove_file(&path).ok();

    match result {
        Err(AnalysisError::MalformedCurrency { id, field, value }) => {
            assert_eq!(id, "2");
            assert_eq!(field, "cleaning_fee");
            assert_eq!(value, "$n/a");
        }
        other => panic!("expected MalformedCurrency, got {:?}", other.map(|r| r.summary)),
    }
}
