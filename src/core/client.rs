use crate::domain::model::{FailureKind, RequestConfig, TransportFailure};
use crate::domain::ports::UpdateClient;
use crate::utils::error::Result;
use reqwest::Client;
use std::io::Write;
use url::Url;

const USER_AGENT: &str = concat!("race-backfill/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client with a connect timeout and a whole-request timeout.
pub struct HttpUpdateClient {
    client: Client,
}

impl HttpUpdateClient {
    pub fn new(config: &RequestConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connect
    } else if err.is_body() || err.is_decode() {
        FailureKind::Body
    } else {
        FailureKind::Other
    }
}

fn to_failure(err: reqwest::Error) -> TransportFailure {
    let kind = classify(&err);
    // reqwest 的 Display 只有最外層訊息，連同 source 一起帶出
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportFailure::new(kind, message)
}

#[async_trait::async_trait]
impl UpdateClient for HttpUpdateClient {
    async fn post_update(
        &self,
        url: &Url,
        body: &mut (dyn Write + Send),
    ) -> std::result::Result<u16, TransportFailure> {
        tracing::debug!("POST {}", url);
        let mut response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(to_failure)?;

        let status = response.status().as_u16();
        tracing::debug!("Response status: {}", status);

        while let Some(chunk) = response.chunk().await.map_err(to_failure)? {
            body.write_all(&chunk).map_err(|e| {
                TransportFailure::new(
                    FailureKind::Body,
                    format!("could not buffer response body: {}", e),
                )
            })?;
        }

        Ok(status)
    }
}
