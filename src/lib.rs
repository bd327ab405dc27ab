//! Sequential batch fetch of YouTube Data API v3 metadata, flattened into
//! tabular records.
//!
//! Three operations compose into the usual pipeline: look up channel stats
//! (which includes the uploads playlist id), collect every video id from that
//! playlist, then flatten per-video details:
//!
//! ```no_run
//! use yt_harvest::{initialize_client, GoogleAPIRequest, YouTubeDataClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = initialize_client()?;
//! let mut yt = YouTubeDataClient::new("https://youtube.googleapis.com".to_string(), client);
//!
//! let channels = yt
//!     .channel_stats(vec!["UCtYLUTtgS3k1Fg4y5tAhLbw".to_string()])
//!     .with_key("API_KEY")
//!     .send()
//!     .await?;
//! let uploads = channels[0].uploads_playlist_id.clone().unwrap();
//!
//! let video_ids = yt.playlist_video_ids(uploads).with_key("API_KEY").send().await?;
//! let videos = yt.video_details(video_ids).with_key("API_KEY").send().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Each `send()` issues its requests strictly one at a time; nothing is
//! cached, retried or shared between calls.

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use log::warn;
use native_tls::TlsConnector;
use serde::Deserialize;
use std::error::Error;
use thiserror::Error;


pub mod models;
pub use models::{ChannelRecord, VideoRecord};
pub mod channels;
pub use channels::ChannelStatsRequest;
pub mod playlist_items;
pub use playlist_items::PlaylistVideoIdsRequest;
pub mod videos;
pub use videos::VideoDetailsRequest;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] std::io::Error),
    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),
}

/// Build the pooled HTTPS client the [`YouTubeDataClient`] runs on.
///
/// Plain-HTTP URIs stay allowed so a test can point the client at a local
/// mock server.
pub fn initialize_client() -> Result<Client<HttpsConnector<HttpConnector>, Empty<Bytes>>, ClientError> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let tls = TlsConnector::builder().build()?;
    let https = HttpsConnector::from((http, tls.into()));

    let client = Client::builder(TokioExecutor::new()).build::<_, Empty<Bytes>>(https);

    Ok(client)
}

pub struct GoogleAPIRequestFields<'a> {
    pub bearer_token: Option<&'a str>,
    pub key: Option<&'a str>,
    pub referrer: Option<&'a str>,
}

pub trait GoogleAPIRequest<'a> {
    fn bearer_token(&mut self) -> &mut Option<&'a str>;

    fn key(&mut self) -> &mut Option<&'a str>;

    fn referrer(&mut self) -> &mut Option<&'a str>;

    fn with_bearer_token(mut self, bearer_token: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.bearer_token() = Some(bearer_token);
        self
    }

    fn with_key(mut self, key: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.key() = Some(key);
        self
    }

    fn with_referrer(mut self, referrer: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.referrer() = Some(referrer);
        self
    }
}

impl<'a, T> GoogleAPIRequest<'a> for T
where
    T: AsMut<GoogleAPIRequestFields<'a>>,
{
    fn bearer_token(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().bearer_token
    }

    fn key(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().key
    }

    fn referrer(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().referrer
    }
}

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("Not found")]
    NotFound,
    #[error("Ratelimited")]
    Ratelimited,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Internal server error")]
    InternalServerError,
    #[error("Unknown Status Code")]
    UnknownStatusCode(StatusCode),
    #[error("Pagination did not terminate after {0} pages")]
    TooManyPages(usize),
    #[error("HTTP error: {0}")]
    HttpError(#[from] hyper::Error),
    #[error("Legacy HTTP error: {0}")]
    LegacyHttpError(#[from] hyper_util::client::legacy::Error),
    #[error("Parse error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Other error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Build a GET request for `url` carrying whatever credentials were set.
pub(crate) fn build_get(
    url: &str,
    fields: &GoogleAPIRequestFields<'_>,
) -> Result<Request<Empty<Bytes>>, YouTubeError> {
    let mut request_builder = Request::builder().method(Method::GET).uri(url);

    if let Some(key) = fields.key {
        request_builder = request_builder.header("X-Goog-Api-Key", key);
    }

    if let Some(bearer_token) = fields.bearer_token {
        request_builder = request_builder.header("Authorization", format!("Bearer {}", bearer_token));
    }

    if let Some(referrer) = fields.referrer {
        request_builder = request_builder.header("Referer", referrer);
    }

    request_builder
        .body(Empty::new())
        .map_err(|e| YouTubeError::Other(Box::new(e)))
}

/// Issue `req` and return the response body on 200, mapping every other
/// status to the matching [`YouTubeError`]. Quota exhaustion arrives as a 403
/// whose body message starts with a known prefix; that one is promoted to
/// [`YouTubeError::Ratelimited`].
pub(crate) async fn dispatch(
    client: &mut Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    req: Request<Empty<Bytes>>,
) -> Result<Bytes, YouTubeError> {
    let resp = client.request(req).await?;

    match resp.status() {
        StatusCode::OK => {}
        StatusCode::TOO_MANY_REQUESTS => return Err(YouTubeError::Ratelimited),
        StatusCode::FORBIDDEN => {
            let body_bytes = resp.into_body().collect().await?.to_bytes();
            if let Ok(error_response) = serde_json::from_slice::<ErrorResponse>(&body_bytes) {
                if error_response
                    .error
                    .message
                    .starts_with("The request cannot be completed because you have exceeded your")
                {
                    return Err(YouTubeError::Ratelimited);
                }
                warn!("forbidden: {}", error_response.error.message);
            }
            return Err(YouTubeError::Forbidden);
        }
        StatusCode::NOT_FOUND => return Err(YouTubeError::NotFound),
        StatusCode::UNAUTHORIZED => return Err(YouTubeError::Unauthorized),
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
            return Err(YouTubeError::InternalServerError)
        }
        status => {
            let body_bytes = resp.into_body().collect().await?.to_bytes();
            warn!(
                "unknown status code {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body_bytes)
            );
            return Err(YouTubeError::UnknownStatusCode(status));
        }
    };

    Ok(resp.into_body().collect().await?.to_bytes())
}

/// Facade over the three list endpoints this crate reads.
///
/// `base_url` is the scheme-plus-authority requests are issued against —
/// `https://youtube.googleapis.com` in production, a mock server's URI in
/// tests.
pub struct YouTubeDataClient {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(base_url: String, client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>) -> Self {
        YouTubeDataClient { client, base_url }
    }

    /// One batched `channels.list` lookup; ids are comma-joined into a single
    /// request, never chunked here.
    pub fn channel_stats<'a>(&'a mut self, channel_ids: Vec<String>) -> ChannelStatsRequest<'a> {
        ChannelStatsRequest {
            client: &mut self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields {
                bearer_token: None,
                key: None,
                referrer: None,
            },
            channel_ids,
        }
    }

    /// Exhaustively page through `playlistItems.list`, collecting every
    /// item's video id in service order.
    pub fn playlist_video_ids<'a>(&'a mut self, playlist_id: String) -> PlaylistVideoIdsRequest<'a> {
        PlaylistVideoIdsRequest {
            client: &mut self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields {
                bearer_token: None,
                key: None,
                referrer: None,
            },
            playlist_id,
            page_size: playlist_items::DEFAULT_PAGE_SIZE,
            max_pages: playlist_items::DEFAULT_MAX_PAGES,
        }
    }

    /// Batched `videos.list` lookups flattened into one [`VideoRecord`] per
    /// returned item.
    pub fn video_details<'a>(&'a mut self, video_ids: Vec<String>) -> VideoDetailsRequest<'a> {
        VideoDetailsRequest {
            client: &mut self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields {
                bearer_token: None,
                key: None,
                referrer: None,
            },
            video_ids,
            batch_size: videos::DEFAULT_BATCH_SIZE,
        }
    }
}
