use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::models::Listing;

/// Columns the dataset must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "listing_url",
    "name",
    "price",
    "review_scores_rating",
    "longitude",
    "latitude",
];

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset is missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("malformed row at line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    listing_url: String,
    name: String,
    #[serde(default)]
    price: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    review_scores_rating: Option<f64>,
    longitude: f64,
    latitude: f64,
}

/// Numeric value of a price cell after stripping `$` and `,`.
/// Returns `NaN` for anything that is not a number.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return f64::NAN;
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

/// `ln(price)`; `NaN` propagates, a zero price gives `-inf`.
pub fn price_log(raw: &str) -> f64 {
    parse_price(raw).ln()
}

/// Parse the listings CSV and derive `price_log` for every row.
pub fn load_listings(csv_text: &str) -> Result<Vec<Listing>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn(column));
        }
    }

    let mut listings = Vec::new();
    for result in reader.deserialize::<ListingRow>() {
        let row = result.map_err(|e| DataError::Row {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        listings.push(Listing {
            price_log: price_log(&row.price),
            listing_url: row.listing_url,
            name: row.name,
            price: row.price,
            rating: row.review_scores_rating,
            longitude: row.longitude,
            latitude: row.latitude,
        });
    }

    let duplicates = duplicate_urls(&listings);
    if duplicates > 0 {
        tracing::warn!(duplicates, "Dataset contains repeated listing URLs");
    }
    tracing::debug!(rows = listings.len(), "Parsed listings dataset");

    Ok(listings)
}

/// Number of rows whose `listing_url` already appeared earlier in the slice.
pub fn duplicate_urls(listings: &[Listing]) -> usize {
    let mut seen = HashSet::with_capacity(listings.len());
    listings
        .iter()
        .filter(|l| !seen.insert(l.listing_url.as_str()))
        .count()
}

/// Min/max over the dataset, skipping absent and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatasetStats {
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_price_log: Option<f64>,
    pub max_price_log: Option<f64>,
}

impl DatasetStats {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let (min_rating, max_rating) = finite_extent(listings.iter().filter_map(|l| l.rating));
        let (min_price_log, max_price_log) = finite_extent(listings.iter().map(|l| l.price_log));
        DatasetStats {
            min_rating,
            max_rating,
            min_price_log,
            max_price_log,
        }
    }

    pub fn rating_domain(&self) -> (f64, f64) {
        (self.min_rating.unwrap_or(0.0), self.max_rating.unwrap_or(0.0))
    }

    pub fn price_log_domain(&self) -> (f64, f64) {
        (
            self.min_price_log.unwrap_or(0.0),
            self.max_price_log.unwrap_or(0.0),
        )
    }
}

fn finite_extent(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    values
        .filter(|v| v.is_finite())
        .fold((None, None), |(lo, hi), v| {
            (
                Some(lo.map_or(v, |lo: f64| lo.min(v))),
                Some(hi.map_or(v, |hi: f64| hi.max(v))),
            )
        })
}
