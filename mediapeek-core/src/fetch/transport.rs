use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::Client;
use reqwest::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap,
};
use reqwest::redirect::Policy;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

const MAX_REDIRECTS: usize = 10;

/// Status and headers of a `HEAD` request after redirects.
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Final URL once redirects were followed.
    pub url: Url,
}

impl HeadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, CONTENT_TYPE.as_str())
    }

    pub fn content_length(&self) -> Option<u64> {
        header_str(&self.headers, CONTENT_LENGTH.as_str())
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn content_disposition(&self) -> Option<&str> {
        header_str(&self.headers, CONTENT_DISPOSITION.as_str())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Incrementally readable, cancellable response body.
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the body, `None` once the stream is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError>;

    /// Abort the transfer; later reads yield `None`.
    async fn cancel(&mut self);
}

pub struct GetResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn ResponseBody>,
}

impl GetResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for GetResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The two requests the fetcher issues. Redirects are followed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn head(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<HeadResponse, FetchError>;

    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<GetResponse, FetchError>;
}

/// Production transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn head(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<HeadResponse, FetchError> {
        let response =
            self.client.head(url.clone()).headers(headers).send().await?;
        Ok(HeadResponse {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        })
    }

    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<GetResponse, FetchError> {
        let response =
            self.client.get(url.clone()).headers(headers).send().await?;
        Ok(GetResponse {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            body: Box::new(ReqwestBody {
                stream: Some(response.bytes_stream().boxed()),
            }),
        })
    }
}

struct ReqwestBody {
    stream: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        stream
            .next()
            .await
            .transpose()
            .map_err(|err| FetchError::Body(err.to_string()))
    }

    async fn cancel(&mut self) {
        // Dropping the stream closes the connection.
        self.stream = None;
    }
}
