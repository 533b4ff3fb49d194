use crate::error::{AnalysisError, Result};
use crate::normalize::NormalizeReport;
use crate::types::{BasicListing, RawListing, REQUIRED_COLUMNS};
use crate::util::{parse_currency, parse_i32_safe, present};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load every row of a tab-delimited listings file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawListing>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalysisError::FileNotFound(path.to_path_buf()),
        _ => AnalysisError::Io(e),
    })?;
    let records = read_records(file)?;
    info!(path = %path.display(), rows = records.len(), "loaded listings file");
    Ok(records)
}

/// Read listings from any tab-delimited source whose first row is the header.
///
/// A row the reader cannot decode aborts the whole load.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawListing>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(AnalysisError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<RawListing>() {
        records.push(result?);
    }
    debug!(rows = records.len(), "decoded raw rows");
    Ok(records)
}

/// Build the basic record from a raw row. Every field is required here.
pub fn to_basic(raw: &RawListing) -> Result<BasicListing> {
    let id = present(raw.id.as_deref()).unwrap_or("<unknown>").to_string();
    let require = |value: Option<&str>, field: &'static str| -> Result<String> {
        present(value)
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::MissingField {
                id: id.clone(),
                field,
            })
    };

    let listing_id = require(raw.id.as_deref(), "id")?;
    let owner_id = require(raw.host_id.as_deref(), "host_id")?;
    let neighbourhood = require(raw.neighbourhood.as_deref(), "neighbourhood")?;
    let price_text = require(raw.price.as_deref(), "price")?;
    let capacity_text = require(raw.accommodates.as_deref(), "accommodates")?;

    let price = parse_currency(&price_text).ok_or_else(|| AnalysisError::MalformedCurrency {
        id: id.clone(),
        field: "price",
        value: price_text.clone(),
    })?;
    let capacity =
        parse_i32_safe(Some(&capacity_text)).ok_or_else(|| AnalysisError::MalformedNumeric {
            id: id.clone(),
            field: "accommodates",
            value: capacity_text.clone(),
        })?;

    Ok(BasicListing {
        id: listing_id,
        owner_id,
        neighbourhood,
        price,
        capacity,
    })
}

/// The basic path over every raw row.
///
/// Rows missing one of the basic columns are dropped and counted, so a blank
/// `neighbourhood` cell never takes the rest of the file down with it. A
/// present value that does not parse still aborts.
pub fn to_basic_all(raw: &[RawListing]) -> Result<(Vec<BasicListing>, NormalizeReport)> {
    let mut basic = Vec::with_capacity(raw.len());
    let mut dropped_by_field: BTreeMap<&'static str, usize> = BTreeMap::new();
    for row in raw {
        match to_basic(row) {
            Ok(listing) => basic.push(listing),
            Err(AnalysisError::MissingField { field, .. }) => {
                *dropped_by_field.entry(field).or_default() += 1
            }
            Err(e) => return Err(e),
        }
    }

    let report = NormalizeReport::tally(raw.len(), basic.len(), dropped_by_field);
    if report.dropped_rows > 0 {
        warn!(
            dropped = report.dropped_rows,
            by_field = ?report.dropped_by_field,
            "dropped incomplete basic listings"
        );
    }
    Ok((basic, report))
}

pub fn load_basic<P: AsRef<Path>>(path: P) -> Result<(Vec<BasicListing>, NormalizeReport)> {
    let raw = load_records(path)?;
    to_basic_all(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id\thost_id\tlisting_url\troom_type\tneighbourhood\tneighbourhood_group_cleansed\tprice\tcleaning_fee\taccommodates\tminimum_nights\treview_scores_rating\tname\tlatitude";

    fn tsv(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s.push('\n');
        s
    }

    #[test]
    fn reads_rows_by_header_name() {
        let data = tsv(&[
            "1\t10\thttp://x/1\tEntire home/apt\tSol\tCentro\t$1,100.00\t$20.00\t4\t2\t95\tFlat\t40.4",
        ]);
        let rows = read_records(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_deref(), Some("1"));
        assert_eq!(rows[0].neighbourhood.as_deref(), Some("Sol"));
        assert_eq!(rows[0].neighbourhood_group_cleansed.as_deref(), Some("Centro"));
        assert_eq!(rows[0].price.as_deref(), Some("$1,100.00"));
    }

    #[test]
    fn empty_cells_load_as_none() {
        let data = tsv(&["2\t11\thttp://x/2\tPrivate room\tSol\tCentro\t$40.00\t\t2\t1\t\tRoom\t40.4"]);
        let rows = read_records(data.as_bytes()).unwrap();
        assert_eq!(rows[0].cleaning_fee, None);
        assert_eq!(rows[0].review_scores_rating, None);
    }

    #[test]
    fn missing_header_column_is_reported() {
        let data = "id\thost_id\tprice\n1\t2\t$3\n";
        match read_records(data.as_bytes()) {
            Err(AnalysisError::MissingColumn(c)) => assert_eq!(c, "listing_url"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_records("definitely/not/here.tsv").unwrap_err();
        assert!(matches!(err, AnalysisError::FileNotFound(_)));
    }

    #[test]
    fn basic_record_parses_price_and_capacity() {
        let raw = RawListing {
            id: Some("7".into()),
            host_id: Some("70".into()),
            neighbourhood: Some("Sol".into()),
            price: Some("$1,200.50".into()),
            accommodates: Some("3".into()),
            ..Default::default()
        };
        let basic = to_basic(&raw).unwrap();
        assert_eq!(basic.price, 1200.5);
        assert_eq!(basic.capacity, 3);
        assert_eq!(basic.owner_id, "70");
    }

    #[test]
    fn basic_record_rejects_bad_price() {
        let raw = RawListing {
            id: Some("7".into()),
            host_id: Some("70".into()),
            neighbourhood: Some("Sol".into()),
            price: Some("$free".into()),
            accommodates: Some("3".into()),
            ..Default::default()
        };
        assert!(matches!(
            to_basic(&raw),
            Err(AnalysisError::MalformedCurrency { field: "price", .. })
        ));
    }

    #[test]
    fn basic_record_requires_every_field() {
        let raw = RawListing {
            id: Some("7".into()),
            host_id: None,
            neighbourhood: Some("Sol".into()),
            price: Some("$10".into()),
            accommodates: Some("3".into()),
            ..Default::default()
        };
        match to_basic(&raw) {
            Err(AnalysisError::MissingField { id, field }) => {
                assert_eq!(id, "7");
                assert_eq!(field, "host_id");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn basic_path_drops_rows_with_blank_cells() {
        let full = RawListing {
            id: Some("1".into()),
            host_id: Some("10".into()),
            neighbourhood: Some("Sol".into()),
            price: Some("$10".into()),
            accommodates: Some("2".into()),
            ..Default::default()
        };
        let blank = RawListing {
            id: Some("2".into()),
            neighbourhood: Some("".into()),
            ..full.clone()
        };
        let (basic, report) = to_basic_all(&[full, blank]).unwrap();
        assert_eq!(basic.len(), 1);
        assert_eq!(basic[0].id, "1");
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.dropped_by_field.get("neighbourhood"), Some(&1));
    }

    #[test]
    fn basic_path_still_aborts_on_malformed_values() {
        let bad = RawListing {
            id: Some("3".into()),
            host_id: Some("10".into()),
            neighbourhood: Some("Sol".into()),
            price: Some("$10".into()),
            accommodates: Some("two".into()),
            ..Default::default()
        };
        assert!(matches!(
            to_basic_all(&[bad]),
            Err(AnalysisError::MalformedNumeric { field: "accommodates", .. })
        ));
    }
}
