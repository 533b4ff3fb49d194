// Entry point and high-level CLI flow.
//
// Every subcommand loads the listings file once, runs the aggregations it
// needs and prints markdown previews. `report` additionally exports every
// table to CSV plus a JSON summary.
use anyhow::Result;
use clap::{Parser, Subcommand};
use listings_report::aggregate;
use listings_report::output::{preview_table, write_report};
use listings_report::pipeline::{
    analyze, AnalysisConfig, Dataset, DEFAULT_INPUT, DEFAULT_NEIGHBOURHOODS,
};
use listings_report::types::{RankedListing, SortOrder};
use listings_report::util::{format_int, format_number};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "listings_report")]
#[command(about = "Spot multi-listing hosts in short-term rental listings", long_about = None)]
struct Cli {
    /// Tab-delimited listings file
    #[arg(short, long, global = true, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Number of listings per neighbourhood
    Neighbourhoods,
    /// Number of complete listings per district
    Districts,
    /// Listings that sleep at least N people
    Capacity {
        #[arg(short, long, default_value_t = 4)]
        occupants: i32,

        /// Rows to preview
        #[arg(long, default_value_t = 20)]
        rows: usize,
    },
    /// Cheapest listings of one neighbourhood
    Cheapest {
        #[arg(short, long, default_value = "Centro")]
        neighbourhood: String,

        #[arg(short, default_value_t = 10)]
        k: usize,
    },
    /// Listings per owner, optionally restricted to some neighbourhoods
    Owners {
        #[arg(short, long = "neighbourhood")]
        neighbourhoods: Vec<String>,

        /// Least listings first instead of most
        #[arg(long, default_value_t = false)]
        ascending: bool,

        /// Rows to preview
        #[arg(long, default_value_t = 20)]
        rows: usize,
    },
    /// Average listings per owner in each neighbourhood
    Concentration,
    /// Accommodation type percentages within some neighbourhoods
    Types {
        #[arg(short, long = "neighbourhood")]
        neighbourhoods: Vec<String>,
    },
    /// Run everything and export the tables
    Report {
        #[arg(short, long, default_value = "report")]
        output_dir: PathBuf,

        #[arg(short, long = "neighbourhood")]
        neighbourhoods: Vec<String>,
    },
}

fn focus_or_default(neighbourhoods: Vec<String>) -> Vec<String> {
    if neighbourhoods.is_empty() {
        DEFAULT_NEIGHBOURHOODS.iter().map(|s| s.to_string()).collect()
    } else {
        neighbourhoods
    }
}

fn init_logging() {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn print_load_summary(dataset: &Dataset) {
    let r = &dataset.normalize_report;
    println!(
        "Processing dataset... ({} rows loaded, {} complete)",
        format_int(r.total_rows),
        format_int(r.kept_rows)
    );
    if r.dropped_rows > 0 {
        println!(
            "Note: {} rows skipped due to missing values.",
            format_int(r.dropped_rows)
        );
    }
    if dataset.basic_report.dropped_rows > 0 {
        println!(
            "Note: {} rows left out of neighbourhood counts and rankings.",
            format_int(dataset.basic_report.dropped_rows)
        );
    }
    println!();
}

fn run(cli: Cli) -> Result<()> {
    let dataset = Dataset::load(&cli.input)?;
    print_load_summary(&dataset);

    match cli.command {
        Commands::Neighbourhoods => {
            let counts = aggregate::count_by_neighbourhood(&dataset.basic);
            let rows = aggregate::neighbourhood_rows(&counts);
            preview_table("Listings per Neighbourhood", None, &rows, rows.len());
        }
        Commands::Districts => {
            let counts = aggregate::count_by_neighbourhood(&dataset.listings);
            let rows = aggregate::neighbourhood_rows(&counts);
            preview_table("Listings per District", None, &rows, rows.len());
        }
        Commands::Capacity { occupants, rows } => {
            let roomy = aggregate::filter_by_capacity(&dataset.basic, occupants);
            let note = format!("{} listings for {}+ guests", format_int(roomy.len()), occupants);
            preview_table(
                "Listings by Capacity",
                Some(&note),
                &RankedListing::rank(&roomy),
                rows,
            );
        }
        Commands::Cheapest { neighbourhood, k } => {
            let cheapest = aggregate::cheapest_in_neighbourhood(&dataset.basic, &neighbourhood, k);
            let title = format!("Cheapest Listings in {}", neighbourhood);
            let rows = RankedListing::rank(&cheapest);
            preview_table(&title, None, &rows, rows.len());
        }
        Commands::Owners {
            neighbourhoods,
            ascending,
            rows,
        } => {
            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            let counts = if neighbourhoods.is_empty() {
                aggregate::owner_listing_counts(&dataset.basic, order)
            } else {
                aggregate::owner_listing_counts_in(&dataset.listings, &neighbourhoods, order)
            };
            let note = if neighbourhoods.is_empty() {
                "All neighbourhoods".to_string()
            } else {
                neighbourhoods.join(", ")
            };
            preview_table("Listings per Owner", Some(&note), &counts, rows);
        }
        Commands::Concentration => {
            let averages = aggregate::average_listings_per_owner(&dataset.listings);
            let rows = aggregate::concentration_rows(&averages);
            preview_table(
                "Average Listings per Owner",
                Some("Higher means more professional hosting"),
                &rows,
                rows.len(),
            );
        }
        Commands::Types { neighbourhoods } => {
            let focus = focus_or_default(neighbourhoods);
            let rows = aggregate::accommodation_type_share(&dataset.listings, &focus);
            preview_table(
                "Accommodation Types",
                Some(&focus.join(", ")),
                &rows,
                rows.len(),
            );
        }
        Commands::Report {
            output_dir,
            neighbourhoods,
        } => {
            let config = AnalysisConfig {
                input: cli.input.clone(),
                neighbourhoods: focus_or_default(neighbourhoods),
                ..AnalysisConfig::default()
            };
            debug!(?config, "running full analysis");
            let report = analyze(&dataset, &config);
            let written = write_report(&output_dir, &report)?;

            preview_table("Listings per Neighbourhood", None, &report.neighbourhood_counts, 5);
            preview_table("Listings per District", None, &report.district_counts, 5);
            preview_table("Listings per Owner", None, &report.owner_counts, 5);
            preview_table("Average Listings per Owner", None, &report.concentration, 5);
            preview_table(
                "Accommodation Types",
                Some(&config.neighbourhoods.join(", ")),
                &report.type_share_in_focus,
                5,
            );
            preview_table("Price per Person", None, &report.price_per_person, 5);
            println!(
                "Summary: {} owners, {} with several listings ({}% of listings)",
                format_int(report.summary.total_owners),
                format_int(report.summary.multi_listing_owners),
                format_number(report.summary.multi_listing_share, 2)
            );
            println!(
                "(Full tables exported to {}, {} files)",
                output_dir.display(),
                written.len()
            );
        }
    }
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
