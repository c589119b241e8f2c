//! Current weather bucket for the configured home address, via the Google
//! Weather API. The geocoded coordinate pair keys a freshness cache so
//! display refreshes do not hammer the upstream: conditions change slowly.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::cache::FreshnessCache;
use crate::conditions::ConditionBucket;
use crate::config::WeatherConfig;
use crate::fetch::{ApiClient, FetchError};
use crate::geocode::{Coordinates, Geocoder};
use crate::sources::Source;
use crate::summary::Summary;

pub const WEATHER_API_URL: &str = "https://weather.googleapis.com/v1";

#[derive(Debug, Default, Deserialize)]
struct ConditionsResponse {
    #[serde(rename = "currentConditions", default)]
    current_conditions: CurrentConditions,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentConditions {
    #[serde(rename = "weatherCondition", default)]
    weather_condition: WeatherCondition,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherCondition {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

pub struct WeatherSource {
    client: ApiClient,
    geocoder: Arc<dyn Geocoder>,
    api_key: String,
    home_address: String,
    cache: FreshnessCache<(i64, i64), String>,
}

impl WeatherSource {
    pub fn new(
        config: &WeatherConfig,
        api_key: &str,
        geocoder: Arc<dyn Geocoder>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            client: ApiClient::new("weather", WEATHER_API_URL, None, http),
            geocoder,
            api_key: api_key.to_string(),
            home_address: config.home_address.clone(),
            cache: FreshnessCache::with_defaults(),
        }
    }

    /// The current condition code at `location`, cached for the TTL.
    async fn condition(&self, location: Coordinates) -> Result<String, FetchError> {
        self.cache
            .get_or_compute(location.cache_key(), || self.request_condition(location))
            .await
    }

    async fn request_condition(&self, location: Coordinates) -> Result<String, FetchError> {
        let resp: ConditionsResponse = self
            .client
            .post_json(
                "/currentConditions:lookup",
                &[("key", self.api_key.clone())],
                &json!({
                    "location": {
                        "latitude": location.latitude,
                        "longitude": location.longitude,
                    }
                }),
            )
            .await?;

        let code = resp
            .current_conditions
            .weather_condition
            .kind
            .unwrap_or_else(|| "UNKNOWN".to_string());
        info!(condition = %code, "weather condition");
        Ok(code)
    }
}

#[async_trait]
impl Source for WeatherSource {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn empty_summary(&self) -> Summary {
        Summary::new("Weather", ConditionBucket::Unknown.label())
    }

    async fn refresh(&self) -> Result<Summary, FetchError> {
        let location = self.geocoder.locate(&self.home_address).await?;
        let code = self.condition(location).await?;
        let bucket = ConditionBucket::classify(&code);
        Ok(Summary::new("Weather", bucket.label()).with_detail(vec![code]))
    }
}
