use crate::models::{Feature, FeatureCollection, FeatureProperties, Listing};

/// Project listings into point features, one per row, order preserved.
/// No filtering and no deduplication on `listing_url`.
pub fn build_feature_collection(listings: &[Listing]) -> FeatureCollection {
    FeatureCollection {
        features: listings.iter().map(feature_from_listing).collect(),
    }
}

fn feature_from_listing(listing: &Listing) -> Feature {
    Feature {
        coordinates: listing.lng_lat(),
        properties: FeatureProperties {
            listing_url: listing.listing_url.clone(),
            name: listing.name.clone(),
            price: listing.price.clone(),
            price_log_num: listing.price_log,
            rating: listing.rating,
        },
    }
}
