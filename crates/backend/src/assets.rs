use listing_map_shared::data::{self, DatasetStats};
use listing_map_shared::features::build_feature_collection;

use crate::config::Config;

/// Everything the server hands to the browser, read once at startup.
pub struct Assets {
    pub access_token: String,
    pub dataset_csv: String,
    /// The listings as a GeoJSON feature collection.
    pub geojson: String,
    pub listing_count: usize,
}

impl Assets {
    pub fn load(config: &Config) -> Result<Self, String> {
        let token_path = &config.access_token_file;
        let access_token = std::fs::read_to_string(token_path)
            .map_err(|e| format!("Failed to read {}: {}", token_path.display(), e))?
            .trim()
            .to_string();
        if access_token.is_empty() {
            return Err(format!("Access token file {} is empty", token_path.display()));
        }

        let dataset_path = config.dataset_path();
        let dataset_csv = std::fs::read_to_string(&dataset_path)
            .map_err(|e| format!("Failed to read {}: {}", dataset_path.display(), e))?;

        // Parse once so a broken dataset fails here rather than in every browser.
        let listings = data::load_listings(&dataset_csv)
            .map_err(|e| format!("Failed to parse {}: {}", dataset_path.display(), e))?;
        let stats = DatasetStats::from_listings(&listings);
        let unpriced = listings.iter().filter(|l| !l.price_log.is_finite()).count();

        tracing::info!(
            listings = listings.len(),
            unpriced,
            duplicate_urls = data::duplicate_urls(&listings),
            min_rating = ?stats.min_rating,
            max_rating = ?stats.max_rating,
            "Loaded listings dataset"
        );

        let geojson = build_feature_collection(&listings).to_geojson();
        let geojson = serde_json::to_string(&geojson)
            .map_err(|e| format!("Failed to serialize features: {}", e))?;

        Ok(Assets {
            access_token,
            dataset_csv,
            geojson,
            listing_count: listings.len(),
        })
    }
}
