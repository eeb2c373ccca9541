use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::FeedError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, fetch_text};
use crate::parser::parse_arrivals;
use crate::services::ArrivalFeed;
use crate::types::{ArrivalRecord, Direction};

pub const DEFAULT_BASE_URL: &str = "http://lapi.transitchicago.com/api/1.0/ttarrivals.aspx";

/// Upper bound on arrivals requested per station. Enforced by the provider.
pub const MAX_ARRIVALS: u32 = 8;

/// Train Tracker arrivals client.
///
/// Holds one HTTP client for the life of the process; the API key rides
/// along on every request as the `key` query parameter.
pub struct CtaArrivalsClient<C = UrlParam<BasicClient>> {
    base_url: reqwest::Url,
    http: C,
}

impl CtaArrivalsClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = UrlParam::new(BasicClient::with_timeout(timeout)?, "key", api_key);
        Self::with_client(base_url, http)
    }
}

impl<C: HttpClient> CtaArrivalsClient<C> {
    pub fn with_client(base_url: &str, http: C) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.parse()?,
            http,
        })
    }

    fn arrivals_url(&self, station_id: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("mapid", station_id)
            .append_pair("max", &MAX_ARRIVALS.to_string());
        url
    }
}

#[async_trait]
impl<C: HttpClient> ArrivalFeed for CtaArrivalsClient<C> {
    #[tracing::instrument(skip(self, direction), fields(direction = %direction))]
    async fn fetch_arrivals(
        &self,
        station_id: &str,
        direction: Direction,
    ) -> Result<Vec<ArrivalRecord>, FeedError> {
        let body = fetch_text(&self.http, &self.arrivals_url(station_id)).await?;
        debug!(bytes = body.len(), "Arrivals received, parsing");

        let arrivals = parse_arrivals(&body, direction)?;
        debug!(count = arrivals.len(), "Arrivals parsed");
        Ok(arrivals)
    }
}
