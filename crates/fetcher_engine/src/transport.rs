use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;

use crate::{FailureKind, FetchError, FetchSettings, ResponseMetadata};

/// Response body, delivered chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchError>>;

pub struct TransportResponse {
    pub metadata: ResponseMetadata,
    pub body: BodyStream,
}

/// HTTP(S) GET capability consumed by the fetch pipeline.
///
/// Implementations follow redirects themselves and enforce their own
/// connection and read timeouts. Errors are reported as `FetchError` with a
/// `Network` (or `InvalidUrl`) kind.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let metadata = ResponseMetadata {
            status_code: response.status().as_u16(),
            content_type,
            declared_length: response.content_length(),
            final_url: response.url().to_string(),
        };

        let body = response.bytes_stream().map_err(map_reqwest_error).boxed();
        Ok(TransportResponse { metadata, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_redirect() {
        format!("redirect limit exceeded: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    FetchError::new(FailureKind::Network, message)
}
