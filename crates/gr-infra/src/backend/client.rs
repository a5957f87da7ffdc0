use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use gr_core::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept header that makes PostgREST return a single object instead of
/// an array, and 406 when no row matches.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Minimal PostgREST client: table reads/writes and RPC invocations.
///
/// A non-200 "no rows" condition (HTTP 406) is a valid empty result,
/// distinct from a true error; everything else is translated into an
/// [`AppError`] variant at this boundary.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::Unknown(format!("http client construction failed: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: RwLock::new(None),
        })
    }

    /// Install or clear the authenticated session's access token.
    /// Requests fall back to the public API key when none is set.
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .expect("access token lock poisoned") = token;
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .expect("access token lock poisoned")
            .clone()
            .unwrap_or_else(|| self.api_key.clone());
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        self.authorize(builder)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))
    }

    /// Reachability probe. Any HTTP response counts as reachable; only
    /// transport failures surface.
    pub async fn health(&self) -> AppResult<()> {
        let response = self.send(self.http.get(self.table_url(""))).await?;
        debug!(status = %response.status(), "backend reachable");
        Ok(())
    }

    /// Fetch at most one row. `Ok(None)` when no row matches.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Option<T>> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(query)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        let response = self.send(request).await?;
        match response.status() {
            StatusCode::NOT_ACCEPTABLE => Ok(None),
            status if status.is_success() => Ok(Some(decode(response).await?)),
            status => Err(status_error(status, response).await),
        }
    }

    /// Partial update returning the echoed, updated row. `Ok(None)` when
    /// no row matched the filter.
    pub async fn update_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &impl Serialize,
    ) -> AppResult<Option<T>> {
        let request = self
            .http
            .patch(self.table_url(table))
            .query(query)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("Prefer", "return=representation")
            .json(body);

        let response = self.send(request).await?;
        match response.status() {
            StatusCode::NOT_ACCEPTABLE => Ok(None),
            status if status.is_success() => Ok(Some(decode(response).await?)),
            status => Err(status_error(status, response).await),
        }
    }

    /// Invoke an RPC and decode its JSON result.
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &impl Serialize,
    ) -> AppResult<T> {
        let request = self.http.post(self.rpc_url(function)).json(args);
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        decode(response).await
    }

    /// Invoke an RPC whose result is irrelevant.
    pub async fn rpc_void(&self, function: &str, args: &impl Serialize) -> AppResult<()> {
        let request = self.http.post(self.rpc_url(function)).json(args);
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        Ok(())
    }

    /// Exact row count for a filter, via `Prefer: count=exact` and the
    /// `content-range` response header.
    pub async fn count(&self, table: &str, query: &[(&str, String)]) -> AppResult<u64> {
        let request = self
            .http
            .head(self.table_url(table))
            .query(query)
            .header("Prefer", "count=exact");

        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::validation_message("count response missing content-range header")
            })?;

        parse_content_range_total(range)
    }
}

/// `content-range` is `<from>-<to>/<total>` or `*/<total>`.
fn parse_content_range_total(range: &str) -> AppResult<u64> {
    range
        .rsplit('/')
        .next()
        .and_then(|total| total.parse::<u64>().ok())
        .ok_or_else(|| {
            AppError::validation_message(format!("unparseable content-range: {range:?}"))
        })
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| AppError::validation_message(format!("unexpected response shape: {err}")))
}

async fn status_error(status: StatusCode, response: Response) -> AppError {
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound,
        _ => AppError::Network(format!("backend returned {status}: {snippet}")),
    }
}
