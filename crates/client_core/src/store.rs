//! Remote value store seam and its REST binding.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::NamedValue,
    error::ApiError,
    protocol::{
        CounterRow, CounterRpcArgs, ValueRow, COUNTERS_TABLE, GET_COUNTER_RPC,
        INCREMENT_COUNTER_RPC, UPSERT_CONFLICT_TARGET, UPSERT_PREFER,
    },
};
use tracing::debug;
use url::Url;

use crate::{config::StoreSettings, error::StoreError};

/// Operations the client needs from the backing store. Implementations must
/// make `increment_counter` an atomic server-side read-modify-write.
#[async_trait]
pub trait RemoteValueStore: Send + Sync {
    /// Succeeds when the store can be reached at all.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get_counter(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError>;

    async fn increment_counter(&self, namespace: &str, key: &str)
        -> Result<Option<i64>, StoreError>;

    /// `Ok(None)` when no row exists for `(namespace, key)`.
    async fn read_value(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError>;

    async fn upsert_value(&self, value: &NamedValue) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct RestValueStore {
    http: Client,
    rest_url: String,
    api_key: String,
}

impl RestValueStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Self::with_client(http, &settings.store_url, &settings.store_key)
    }

    pub fn with_client(http: Client, store_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let parsed = Url::parse(store_url.trim())?;
        let rest_url = format!("{}/rest/v1", parsed.as_str().trim_end_matches('/'));
        Ok(Self {
            http,
            rest_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn call_counter_rpc(
        &self,
        function: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<i64>, StoreError> {
        let response = self
            .authorized(self.http.post(format!("{}/rpc/{function}", self.rest_url)))
            .json(&CounterRpcArgs::new(namespace, key))
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        let value = parse_optional_integer(&body)?;
        debug!(namespace, key, function, ?value, "store: rpc settled");
        Ok(value)
    }
}

#[async_trait]
impl RemoteValueStore for RestValueStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.authorized(self.http.head(format!("{}/", self.rest_url)))
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        Ok(())
    }

    async fn get_counter(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError> {
        self.call_counter_rpc(GET_COUNTER_RPC, namespace, key).await
    }

    async fn increment_counter(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<i64>, StoreError> {
        self.call_counter_rpc(INCREMENT_COUNTER_RPC, namespace, key)
            .await
    }

    async fn read_value(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError> {
        let response = self
            .authorized(self.http.get(format!("{}/{COUNTERS_TABLE}", self.rest_url)))
            .query(&[
                ("select", "value".to_string()),
                ("namespace", format!("eq.{namespace}")),
                ("key", format!("eq.{key}")),
            ])
            .send()
            .await?;
        let rows: Vec<ValueRow> = ensure_success(response).await?.json().await?;
        Ok(rows.first().and_then(|row| row.value))
    }

    async fn upsert_value(&self, value: &NamedValue) -> Result<(), StoreError> {
        let row = CounterRow {
            namespace: value.namespace.clone(),
            key: value.key.clone(),
            value: value.value,
        };
        let response = self
            .authorized(self.http.post(format!("{}/{COUNTERS_TABLE}", self.rest_url)))
            .query(&[("on_conflict", UPSERT_CONFLICT_TARGET)])
            .header("Prefer", UPSERT_PREFER)
            .json(&[row])
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api(
        ApiError::from_response(status.as_u16(), &body).into(),
    ))
}

fn parse_optional_integer(body: &str) -> Result<Option<i64>, StoreError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<i64>>(body)
        .map_err(|err| StoreError::InvalidResponse(format!("expected integer, got {body}: {err}")))
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
