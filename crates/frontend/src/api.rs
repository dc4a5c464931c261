use std::rc::Rc;

use listing_map_shared::data::{self, DatasetStats};
use listing_map_shared::features::build_feature_collection;
use listing_map_shared::models::FeatureCollection;
use listing_map_shared::projection::TilePlacement;

/// Base map style used for raster tiles.
pub const MAP_STYLE: &str = "mapbox/light-v10";

const TILE_API: &str = "https://api.mapbox.com/styles/v1";

/// Everything the map needs before it can be mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub access_token: String,
    pub features: Rc<FeatureCollection>,
    pub stats: DatasetStats,
}

fn origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("No window available")?;
    window
        .location()
        .origin()
        .map_err(|_| "Could not read page origin".to_string())
}

async fn get_text(path: &str) -> Result<String, String> {
    let url = format!("{}{}", origin()?, path);
    let resp = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("{} returned {}", path, resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

/// Trim the token file contents. An empty token can never authorize tiles.
pub fn normalize_token(raw: &str) -> Result<String, String> {
    let token = raw.trim();
    if token.is_empty() {
        return Err("Access token is empty".to_string());
    }
    Ok(token.to_string())
}

pub async fn fetch_access_token() -> Result<String, String> {
    normalize_token(&get_text("/access-token").await?)
}

pub async fn fetch_dataset() -> Result<String, String> {
    get_text("/data/listings.csv").await
}

/// Parse the dataset text into features and the stats the styles need.
pub fn prepare_dataset(csv_text: &str) -> Result<(FeatureCollection, DatasetStats), String> {
    let listings = data::load_listings(csv_text).map_err(|e| e.to_string())?;
    let stats = DatasetStats::from_listings(&listings);
    Ok((build_feature_collection(&listings), stats))
}

/// Token first, then the dataset. The dataset request is never issued
/// when the token fetch fails.
pub async fn load_map_data() -> Result<MapData, String> {
    let access_token = fetch_access_token().await?;
    let csv_text = fetch_dataset().await?;
    let (features, stats) = prepare_dataset(&csv_text)?;
    tracing::info!(features = features.len(), "Listings loaded");
    Ok(MapData {
        access_token,
        features: Rc::new(features),
        stats,
    })
}

/// Raster tile URL for the base map style.
pub fn tile_url(tile: &TilePlacement, access_token: &str) -> String {
    format!(
        "{}/{}/tiles/512/{}/{}/{}?access_token={}",
        TILE_API, MAP_STYLE, tile.z, tile.x, tile.y, access_token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_trims() {
        assert_eq!(normalize_token("  pk.abc\n").unwrap(), "pk.abc");
    }

    #[test]
    fn test_normalize_token_rejects_empty() {
        assert!(normalize_token("").is_err());
        assert!(normalize_token(" \n\t").is_err());
    }

    #[test]
    fn test_prepare_dataset() {
        let csv = "listing_url,name,price,review_scores_rating,longitude,latitude\n\
                   a,A,$100,90,-71.10,42.36\n\
                   b,B,\"$1,250.00\",,-71.11,42.37";
        let (features, stats) = prepare_dataset(csv).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.features[1].properties.rating, None);
        assert_eq!(stats.min_rating, Some(90.0));
        assert_eq!(stats.max_rating, Some(90.0));
        assert!((stats.max_price_log.unwrap() - 1250f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_prepare_dataset_missing_column() {
        let csv = "listing_url,name,price\na,A,$1";
        let err = prepare_dataset(csv).unwrap_err();
        assert_eq!(
            err,
            "dataset is missing required column \"review_scores_rating\""
        );
    }

    #[test]
    fn test_tile_url() {
        let tile = TilePlacement {
            z: 12,
            x: 1238,
            y: 1515,
            left: 0.0,
            top: 0.0,
            size: 512.0,
        };
        assert_eq!(
            tile_url(&tile, "pk.test"),
            "https://api.mapbox.com/styles/v1/mapbox/light-v10/tiles/512/12/1238/1515?access_token=pk.test"
        );
    }
}
