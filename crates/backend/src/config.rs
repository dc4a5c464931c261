use std::path::PathBuf;

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub dataset_file: String,
    pub access_token_file: PathBuf,
    pub dist_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let port = match lookup("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT {p:?}: {e}"))?,
            None => 3000,
        };
        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let dataset_file =
            lookup("DATASET_FILE").unwrap_or_else(|| "boston-airbnb-listings.csv".to_string());
        let access_token_file = lookup("ACCESS_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("access-token"));
        let dist_dir = PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string()));

        Ok(Config {
            port,
            data_dir,
            dataset_file,
            access_token_file,
            dist_dir,
        })
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_file)
    }
}
