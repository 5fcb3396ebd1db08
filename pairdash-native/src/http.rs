use async_trait::async_trait;
use pairdash_core::{
    Bar, ConfidenceValue, DashConfig, DashError, DashTransport, Envelope, Pair, RawConfidence,
    RawPrediction,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

const NAME: &str = "pairdash-http";

/// REST transport backed by `reqwest`.
///
/// Paths are joined onto the base URL, so `http://host/api` serves
/// `http://host/api/dumps`. When an access token is set it is sent as a
/// bearer token on every request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `api_url` with a default client.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `api_url` is not an absolute http(s) URL.
    pub fn new(api_url: &str) -> Result<Self, DashError> {
        let mut base = Url::parse(api_url)
            .map_err(|e| DashError::invalid_arg(format!("api_url {api_url:?}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(DashError::invalid_arg(format!(
                "api_url {api_url:?}: expected http or https"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
            token: None,
        })
    }

    /// Create a transport from `api_url` and `access_token` of `cfg`.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn from_config(cfg: &DashConfig) -> Result<Self, DashError> {
        let me = Self::new(&cfg.api_url)?;
        Ok(match &cfg.access_token {
            Some(token) => me.with_access_token(token.clone()),
            None => me,
        })
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Attach `token` as `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, DashError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| DashError::invalid_arg(format!("path {path:?}: {e}")))?;
        let req = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    async fn send(&self, method: Method, path: &str) -> Result<reqwest::Response, DashError> {
        let resp = self
            .request(method, path)?
            .send()
            .await
            .map_err(|e| DashError::transport(NAME, e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::debug!(path, status = status.as_u16(), "non-success response");
            return Err(DashError::status(status.as_u16(), path));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashError> {
        let body = self
            .send(Method::GET, path)
            .await?
            .bytes()
            .await
            .map_err(|e| DashError::transport(NAME, e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| DashError::decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl DashTransport for HttpTransport {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn dumps(&self) -> Result<Vec<Option<String>>, DashError> {
        self.get_json("dumps").await
    }

    async fn confidence(&self, pair: &Pair) -> Result<ConfidenceValue, DashError> {
        self.get_json(&format!("confidence/{pair}")).await
    }

    async fn confidences(&self, pair: &Pair) -> Result<Vec<RawConfidence>, DashError> {
        self.get_json(&format!("confidences/{pair}")).await
    }

    async fn bars(&self, pair: &Pair, limit: u32) -> Result<Envelope<Bar>, DashError> {
        self.get_json(&format!("bars/{pair}/{limit}")).await
    }

    async fn prediction(&self, pair: &Pair) -> Result<Envelope<RawPrediction>, DashError> {
        self.get_json(&format!("prediction/{pair}")).await
    }

    async fn trigger_inference(&self, pair: &Pair) -> Result<(), DashError> {
        // The body is not part of the contract; only the status gates the caller.
        self.send(Method::POST, &format!("inference/{pair}"))
            .await
            .map(drop)
    }
}
