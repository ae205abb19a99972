use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Thin wrapper around `reqwest::Client` bound to one API base url.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Send `body` as JSON and decode a JSON reply, turning non-2xx into errors.
    pub async fn call<B, T>(&self, method: Method, path: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base, path);
        tracing::debug!(%method, %url, "calling api");
        let resp = self.http.request(method, &url).json(body).send().await?;
        let resp = handle_error(resp).await?;
        Ok(resp.json().await?)
    }
}

/// Normalize non-2xx responses into errors while returning the response on success.
pub async fn handle_error(resp: Response) -> anyhow::Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(text);
    Err(anyhow::anyhow!("request failed {}: {}", status, message))
}
