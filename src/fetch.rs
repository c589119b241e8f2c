//! Transport client for the upstream JSON APIs.
//!
//! One HTTP round trip per call, no retries: the next display refresh is the
//! retry mechanism. Every transport problem (connect error, non-2xx status,
//! body that fails to decode) collapses into a single [`FetchError`] so
//! callers never have to tell a network failure from a decode failure.

use std::time::Duration;

use metrics::counter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Upper bound on one upstream round trip so a slow API cannot stall a
/// request worker. Timeouts surface as an ordinary [`FetchError`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed attempt to produce decoded data from an upstream service.
#[derive(Debug, Error)]
#[error("{service} API error: {cause}")]
pub struct FetchError {
    pub service: &'static str,
    pub cause: String,
}

impl FetchError {
    pub fn new(service: &'static str, cause: impl ToString) -> Self {
        Self {
            service,
            cause: cause.to_string(),
        }
    }
}

/// Authentication header sent with every request when the service has a key
/// configured. An unset key means the header is omitted entirely.
#[derive(Debug, Clone)]
pub struct AuthHeader {
    pub name: &'static str,
    pub value: String,
}

impl AuthHeader {
    /// Builds the header only for a non-empty key.
    pub fn when_configured(name: &'static str, key: &str) -> Option<Self> {
        if key.is_empty() {
            None
        } else {
            Some(Self {
                name,
                value: key.to_string(),
            })
        }
    }
}

/// Thin client bound to one upstream API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    service: &'static str,
    base_url: String,
    auth: Option<AuthHeader>,
    http: Client,
}

impl ApiClient {
    pub fn new(
        service: &'static str,
        base_url: impl Into<String>,
        auth: Option<AuthHeader>,
        http: Client,
    ) -> Self {
        Self {
            service,
            base_url: base_url.into(),
            auth,
            http,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// GET `base_url + endpoint` and decode the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut req = self.http.get(self.url(endpoint));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(auth) = &self.auth {
            req = req.header(auth.name, &auth.value);
        }
        self.execute(req).await
    }

    /// POST a JSON body to `base_url + endpoint` and decode the response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> Result<T, FetchError> {
        let mut req = self.http.post(self.url(endpoint)).json(body);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(auth) = &self.auth {
            req = req.header(auth.name, &auth.value);
        }
        self.execute(req).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let resp = req
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.fail(e))?;
        resp.json::<T>().await.map_err(|e| self.fail(e))
    }

    fn fail(&self, err: reqwest::Error) -> FetchError {
        counter!("fetch_errors_total", "service" => self.service).increment(1);
        FetchError::new(self.service, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_names_the_service() {
        let e = FetchError::new("transit", "connection refused");
        assert_eq!(e.service, "transit");
        assert_eq!(e.to_string(), "transit API error: connection refused");
    }

    #[test]
    fn auth_header_omitted_for_empty_key() {
        assert!(AuthHeader::when_configured("x-api-key", "").is_none());
        let h = AuthHeader::when_configured("x-api-key", "secret").expect("configured");
        assert_eq!(h.name, "x-api-key");
        assert_eq!(h.value, "secret");
    }
}
