use crate::{GoogleAPIRequestFields, YouTubeError};
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use log::debug;
use serde::Deserialize;

/// The API caps `maxResults` at 50.
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 50;

/// Guard against a service that never stops handing out continuation tokens.
pub(crate) const DEFAULT_MAX_PAGES: usize = 10_000;

/// Exhaustive `playlistItems.list` pagination: collects every item's
/// `contentDetails.videoId`, page by page, until the service returns no
/// `nextPageToken`.
///
/// Ordering is exactly the service's item ordering across pages; duplicates,
/// should the service produce any, are kept.
pub struct PlaylistVideoIdsRequest<'a> {
    pub client: &'a mut Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub playlist_id: String,
    pub page_size: u32,
    pub max_pages: usize,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for PlaylistVideoIdsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    video_id: String,
}

impl<'a> PlaylistVideoIdsRequest<'a> {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub async fn send(mut self) -> Result<Vec<String>, YouTubeError> {
        let mut video_ids = Vec::new();
        let mut cursor: Option<String> = None;

        // Two states: fetching (a page is owed, with or without a cursor) and
        // done (the last response carried no continuation token). The cursor
        // is the only state carried between iterations.
        for page in 0..self.max_pages {
            let response = self.fetch_page(cursor.as_deref()).await?;

            for item in response.items {
                video_ids.push(item.content_details.video_id);
            }

            match response.next_page_token {
                Some(token) => cursor = Some(token),
                None => {
                    debug!(
                        "playlist {}: {} video ids over {} pages",
                        self.playlist_id,
                        video_ids.len(),
                        page + 1
                    );
                    return Ok(video_ids);
                }
            }
        }

        Err(YouTubeError::TooManyPages(self.max_pages))
    }

    async fn fetch_page(&mut self, page_token: Option<&str>) -> Result<ApiResponse, YouTubeError> {
        let mut url = format!(
            "{}/youtube/v3/playlistItems?part=snippet,contentDetails&playlistId={}&maxResults={}",
            self.base_url,
            urlencoding::encode(&self.playlist_id),
            self.page_size
        );

        if let Some(page_token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }

        let req = crate::build_get(&url, &self.fields)?;
        let body_bytes = crate::dispatch(self.client, req).await?;
        Ok(serde_json::from_slice(&body_bytes)?)
    }
}
