//! Monthly market aggregates from raw listing records.

use crate::core::{month_label, parse_month, Frame};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every listing file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["property_id", "list_date", "sale_date", "sale_price"];

/// One property listing; dates are `YYYY-MM-DD`, blank when unknown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingRecord {
    pub property_id: String,
    pub list_date: Option<String>,
    pub sale_date: Option<String>,
    pub sale_price: Option<f64>,
}

/// Read listing records from CSV text with a header row.
pub fn read_listings<R: Read>(reader: R) -> Result<Vec<ListingRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ForecastError::MissingColumn(column.to_string()));
        }
    }
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ListingRecord>, csv::Error>>()?;
    info!(records = records.len(), "read listing records");
    Ok(records)
}

/// Read listing records from a CSV file.
pub fn read_listings_path<P: AsRef<Path>>(path: P) -> Result<Vec<ListingRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        ForecastError::DataFormat(format!("cannot open {}: {}", path.display(), e))
    })?;
    read_listings(file)
}

fn month_of(date: Option<&str>) -> Result<Option<String>> {
    match date.map(str::trim) {
        None | Some("") => Ok(None),
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|date| Some(month_label(date)))
            .map_err(|e| ForecastError::TimestampError(format!("invalid date '{}': {}", d, e))),
    }
}

#[derive(Default)]
struct SaleMonth {
    count: usize,
    price_sum: f64,
    priced: usize,
}

/// Aggregate records into a monthly frame for `[start_month, end_month]`.
///
/// Sales are grouped by sale month (`count_sale`, mean `sale_price`) and
/// listings by list month (`count_list`); only months present in both are
/// kept.
pub fn aggregate_monthly(
    records: &[ListingRecord],
    start_month: &str,
    end_month: &str,
) -> Result<Frame> {
    let start = parse_month(start_month)?;
    let end = parse_month(end_month)?;
    if start > end {
        return Err(ForecastError::InvalidParameter(format!(
            "start month {} is after end month {}",
            start_month, end_month
        )));
    }

    let mut sales: BTreeMap<String, SaleMonth> = BTreeMap::new();
    let mut lists: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(month) = month_of(record.sale_date.as_deref())? {
            let entry = sales.entry(month).or_default();
            entry.count += 1;
            if let Some(price) = record.sale_price.filter(|p| p.is_finite()) {
                entry.price_sum += price;
                entry.priced += 1;
            }
        }
        if let Some(month) = month_of(record.list_date.as_deref())? {
            *lists.entry(month).or_default() += 1;
        }
    }

    let mut months = Vec::new();
    let mut count_sale = Vec::new();
    let mut count_list = Vec::new();
    let mut sale_price = Vec::new();
    for (month, sale) in &sales {
        let date = parse_month(month)?;
        if date < start || date > end {
            continue;
        }
        let Some(&listed) = lists.get(month) else {
            continue;
        };
        months.push(month.clone());
        count_sale.push(sale.count as f64);
        count_list.push(listed as f64);
        sale_price.push(if sale.priced > 0 {
            sale.price_sum / sale.priced as f64
        } else {
            f64::NAN
        });
    }

    if months.is_empty() {
        warn!(start_month, end_month, "no months with both sales and listings");
    }
    debug!(months = months.len(), "aggregated monthly listings");

    Frame::new(months)?
        .with_column("count_sale", count_sale)?
        .with_column("count_list", count_list)?
        .with_column("sale_price", sale_price)
}
