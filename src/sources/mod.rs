//! Source façades: one polymorphic contract over the three data domains.
//!
//! A source fetches raw upstream records, applies selection or
//! classification, and produces a display-ready [`Summary`]. Any failure
//! along the way degrades to the source's empty/default summary — a logged
//! warning, not an error, is all the renderer ever observes.

pub mod football;
pub mod transit;
pub mod weather;

use async_trait::async_trait;
use metrics::counter;
use tracing::warn;

use crate::fetch::FetchError;
use crate::summary::Summary;

pub use football::FootballSource;
pub use transit::TransitSource;
pub use weather::WeatherSource;

#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;

    /// The valid summary shown when there is nothing to report.
    fn empty_summary(&self) -> Summary;

    /// Fetch and summarize. Fetch errors may propagate out of here; they
    /// never propagate past [`Source::summary`].
    async fn refresh(&self) -> Result<Summary, FetchError>;

    /// The degradation boundary: upstream unavailability becomes the empty
    /// summary marked unavailable. A stale or blank tile beats a broken
    /// display refresh.
    async fn summary(&self) -> Summary {
        counter!("summary_requests_total", "source" => self.name()).increment(1);
        match self.refresh().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    source = self.name(),
                    service = e.service,
                    error = %e,
                    "degrading to default summary"
                );
                counter!("summary_degraded_total", "source" => self.name()).increment(1);
                self.empty_summary().unavailable()
            }
        }
    }
}
