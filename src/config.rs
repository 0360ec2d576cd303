use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Admiralty UK Tidal API subscription key. Optional: without it tide
    /// lookups degrade to the unknown sentinel instead of failing requests.
    pub admiralty_api_key: Option<String>,
    pub admiralty_base_url: String,
    pub marine_base_url: String,
    pub forecast_base_url: String,
    pub welsh_water_spills_url: String,
    pub discharge_feed_base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let admiralty_api_key = env::var("ADMIRALTY_API_KEY").ok().filter(|k| !k.is_empty());
        if admiralty_api_key.is_none() {
            tracing::warn!("ADMIRALTY_API_KEY not set - tide data will be unavailable");
        }

        Ok(Config {
            admiralty_api_key,
            admiralty_base_url: env::var("ADMIRALTY_BASE_URL")
                .unwrap_or_else(|_| "https://admiraltyapi.azure-api.net".to_string()),
            marine_base_url: env::var("MARINE_BASE_URL")
                .unwrap_or_else(|_| "https://marine-api.open-meteo.com".to_string()),
            forecast_base_url: env::var("FORECAST_BASE_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com".to_string()),
            welsh_water_spills_url: env::var("WELSH_WATER_SPILLS_URL").unwrap_or_else(|_| {
                "https://services3.arcgis.com/KLNF7YxtENPLYVey/arcgis/rest/services/Spill_Prod__view/FeatureServer/0/query".to_string()
            }),
            discharge_feed_base_url: env::var("DISCHARGE_FEED_BASE_URL")
                .unwrap_or_else(|_| "https://api.streamwaterdata.co.uk/v1/discharges".to_string()),
            port: env::var("PORT")
                .ok()
                .map(|p| p.parse())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a number"))?
                .unwrap_or(3000),
        })
    }
}
