//! HTTP access to the QnA Maker management and inference endpoints.

use std::time::Duration;

use qna_core::QnaMakerSettings;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::debug;

use crate::errors::{StoreError, StoreResult};

const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// Request function the adapter talks through.
///
/// Both calls return the parsed JSON body, `Value::Null` when the service
/// answers with an empty body. Non-2xx statuses surface as
/// [`StoreError::Api`].
#[async_trait::async_trait]
pub trait QnaTransport: Send + Sync {
    /// Call the management API; `path` is relative to its base URL and the
    /// subscription key is attached.
    async fn management(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> StoreResult<Value>;

    /// POST to a knowledge base's own inference host, authenticated with its
    /// endpoint key instead of the subscription key.
    async fn inference(
        &self,
        host: &str,
        endpoint_key: &str,
        path: &str,
        body: &Value,
    ) -> StoreResult<Value>;
}

/// `reqwest` implementation of [`QnaTransport`].
#[derive(Clone)]
pub struct HttpTransport {
    management: reqwest::Client,
    inference: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the management API at `base_url`.
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::InvalidHeader(SUBSCRIPTION_KEY_HEADER))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(SUBSCRIPTION_KEY_HEADER, key);

        let management = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        // Inference calls must not carry the subscription key.
        let inference = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            management,
            inference,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(api_key: &str, settings: &QnaMakerSettings) -> StoreResult<Self> {
        Self::new(api_key, settings.base_url.clone(), settings.timeout())
    }
}

#[async_trait::async_trait]
impl QnaTransport for HttpTransport {
    async fn management(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> StoreResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, %url, "QnA Maker management request");

        let mut request = self.management.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        read_json(request.send().await?).await
    }

    async fn inference(
        &self,
        host: &str,
        endpoint_key: &str,
        path: &str,
        body: &Value,
    ) -> StoreResult<Value> {
        let url = format!("{}{}", host.trim_end_matches('/'), path);
        debug!(%url, "QnA Maker inference request");

        let mut authorization = HeaderValue::from_str(&format!("EndpointKey {}", endpoint_key))
            .map_err(|_| StoreError::InvalidHeader("authorization"))?;
        authorization.set_sensitive(true);

        let response = self
            .inference
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json(response: Response) -> StoreResult<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(StoreError::Api {
            status: status.as_u16(),
            message: text,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&text)?)
}
