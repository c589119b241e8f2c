//! Transit line status and arrival predictions via the MBTA v3 API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::{ApiKeys, TransitConfig};
use crate::fetch::{ApiClient, AuthHeader, FetchError};
use crate::select::{is_active_at, rank_arrivals, ActivePeriod, MAX_ARRIVALS};
use crate::sources::Source;
use crate::summary::Summary;

pub const TRANSIT_API_URL: &str = "https://api-v3.mbta.com";

/// Alert headers longer than this are cut for the display.
const ALERT_MAX_CHARS: usize = 50;

/// Predictions requested per refresh; more than we show, so discarding
/// already-passed arrivals still leaves a full list.
const PREDICTION_PAGE_LIMIT: u32 = 6;

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    data: Vec<AlertRecord>,
}

#[derive(Debug, Deserialize)]
pub struct AlertRecord {
    #[serde(default)]
    attributes: AlertAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct AlertAttributes {
    #[serde(default)]
    header: Option<String>,
    #[serde(default, rename = "active_period")]
    active_period: Vec<PeriodDto>,
}

#[derive(Debug, Default, Deserialize)]
struct PeriodDto {
    #[serde(default)]
    start: Option<DateTime<Utc>>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
}

impl AlertRecord {
    fn periods(&self) -> Vec<ActivePeriod> {
        self.attributes
            .active_period
            .iter()
            .map(|p| ActivePeriod {
                start: p.start,
                end: p.end,
            })
            .collect()
    }

    fn header(&self) -> String {
        self.attributes
            .header
            .clone()
            .unwrap_or_else(|| "Alert".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    data: Vec<PredictionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    attributes: PredictionAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct PredictionAttributes {
    #[serde(default)]
    arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    direction_id: u8,
}

/// One upcoming arrival, ready for phrasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub minutes: i64,
    pub direction: &'static str,
}

impl Arrival {
    fn phrase(&self) -> String {
        let time = match self.minutes {
            0 => "Now".to_string(),
            1 => "1 min".to_string(),
            n => format!("{n} min"),
        };
        format!("{}: {}", self.direction, time)
    }
}

fn route_display_name(route_id: &str) -> String {
    match route_id {
        "Red" => "Red Line",
        "Orange" => "Orange Line",
        "Blue" => "Blue Line",
        "Green-B" => "Green Line B",
        "Green-C" => "Green Line C",
        "Green-D" => "Green Line D",
        "Green-E" => "Green Line E",
        other => other,
    }
    .to_string()
}

fn direction_name(direction_id: u8) -> &'static str {
    if direction_id == 1 {
        "Alewife"
    } else {
        "Ashmont/Braintree"
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub struct TransitSource {
    client: ApiClient,
    route_id: String,
    stop_id: String,
}

impl TransitSource {
    pub fn new(config: &TransitConfig, keys: &ApiKeys, http: reqwest::Client) -> Self {
        let auth = AuthHeader::when_configured("x-api-key", &keys.transit);
        Self {
            client: ApiClient::new("transit", TRANSIT_API_URL, auth, http),
            route_id: config.route_id.clone(),
            stop_id: config.stop_id.clone(),
        }
    }

    /// Headers of alerts whose validity window admits `now`.
    async fn fetch_active_alerts(&self, now: DateTime<Utc>) -> Result<Vec<String>, FetchError> {
        let resp: AlertsResponse = self
            .client
            .get_json(
                "/alerts",
                &[
                    ("filter[route]", self.route_id.clone()),
                    ("filter[activity]", "BOARD,EXIT,RIDE".to_string()),
                ],
            )
            .await?;

        Ok(resp
            .data
            .iter()
            .filter(|alert| is_active_at(&alert.periods(), now))
            .map(|alert| alert.header())
            .collect())
    }

    /// Upcoming arrivals, soonest first, at most [`MAX_ARRIVALS`].
    async fn fetch_arrivals(&self, now: DateTime<Utc>) -> Result<Vec<Arrival>, FetchError> {
        let resp: PredictionsResponse = self
            .client
            .get_json(
                "/predictions",
                &[
                    ("filter[route]", self.route_id.clone()),
                    ("filter[stop]", self.stop_id.clone()),
                    ("sort", "arrival_time".to_string()),
                    ("page[limit]", PREDICTION_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        let arrivals: Vec<Arrival> = resp
            .data
            .iter()
            .filter_map(|pred| {
                let attrs = &pred.attributes;
                let when = attrs.arrival_time.or(attrs.departure_time)?;
                Some(Arrival {
                    minutes: (when - now).num_seconds() / 60,
                    direction: direction_name(attrs.direction_id),
                })
            })
            .collect();

        Ok(rank_arrivals(arrivals, |a| a.minutes, MAX_ARRIVALS))
    }

    fn build_summary(&self, alerts: Vec<String>, arrivals: Vec<Arrival>) -> Summary {
        let status = alerts
            .first()
            .map(|header| truncate_chars(header, ALERT_MAX_CHARS))
            .unwrap_or_else(|| "Normal Service".to_string());

        let detail = if arrivals.is_empty() {
            vec!["No predictions available".to_string()]
        } else {
            arrivals.iter().map(Arrival::phrase).collect()
        };

        Summary::new(route_display_name(&self.route_id), status).with_detail(detail)
    }
}

#[async_trait]
impl Source for TransitSource {
    fn name(&self) -> &'static str {
        "transit"
    }

    fn empty_summary(&self) -> Summary {
        Summary::new(route_display_name(&self.route_id), "Normal Service")
            .with_detail(vec!["No predictions available".to_string()])
    }

    async fn refresh(&self) -> Result<Summary, FetchError> {
        let now = Utc::now();
        let alerts = self.fetch_active_alerts(now).await?;
        let arrivals = self.fetch_arrivals(now).await?;
        Ok(self.build_summary(alerts, arrivals))
    }
}
