use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::AtomicU64;

use crate::{provider::ProviderError, rpc::common::*};

/// The default local node endpoint
pub const LOCALHOST: &str = "http://127.0.0.1:9650";

#[derive(Debug)]
/// An HTTP Transport for JSON-RPC. Requests are posted to `<url>/ext/bc/<chain>` or
/// `<url>/ext/info`, depending on the method's namespace.
pub struct HttpTransport {
    id: AtomicU64,
    url: String,
    chain: String,
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(LOCALHOST, "P")
    }
}

impl HttpTransport {
    /// Instantiate a transport for chain `chain` of the node at `url`
    pub fn new(url: &str, chain: &str) -> Self {
        Self {
            id: 0.into(),
            url: url.trim_end_matches('/').to_owned(),
            chain: chain.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Instantiate a transport with a preconfigured client
    pub fn with_client(url: &str, chain: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            ..Self::new(url, chain)
        }
    }

    /// The endpoint `method` is posted to
    pub fn endpoint(&self, method: &str) -> String {
        if method.starts_with("info.") {
            format!("{}/ext/info", self.url)
        } else {
            format!("{}/ext/bc/{}", self.url, self.chain)
        }
    }
}

#[async_trait]
impl JsonRpcTransport for HttpTransport {
    fn id(&self) -> &AtomicU64 {
        &self.id
    }

    /// Sends a POST request with the provided method and the params serialized as JSON
    /// over HTTP
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let next_id = self.next_id();
        let payload = Request::new(next_id, method, params);
        let endpoint = self.endpoint(method);
        tracing::debug!(id = next_id, method, endpoint = %endpoint, "sending request");

        let res = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await?;
        let body = res.text().await?;
        tracing::trace!(id = next_id, body = %body, "received response");

        let res: Response<R> = serde_json::from_str(&body)?;
        Ok(res.data.into_result()?)
    }
}
