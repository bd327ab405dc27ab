use crate::models::VideoRecord;
use crate::{GoogleAPIRequestFields, YouTubeError};
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// The API caps `videos.list` at 50 ids per call.
pub(crate) const DEFAULT_BATCH_SIZE: usize = 50;

/// Batched `videos.list` lookups, flattened into one [`VideoRecord`] per item
/// the service returns.
///
/// Input ids are split into consecutive windows of at most `batch_size`, one
/// request per window, windows in input order. Ids the service does not echo
/// back simply produce no record.
pub struct VideoDetailsRequest<'a> {
    pub client: &'a mut Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub video_ids: Vec<String>,
    pub batch_size: usize,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for VideoDetailsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    items: Vec<ApiVideo>,
}

/// The projected groups stay as raw JSON so a missing group, a missing field,
/// or a group that is not an object all degrade to `None` per field instead
/// of failing the item.
#[derive(Debug, Deserialize)]
struct ApiVideo {
    id: String,
    #[serde(default)]
    snippet: Value,
    #[serde(default)]
    statistics: Value,
    #[serde(rename = "contentDetails", default)]
    content_details: Value,
}

/// Safe lookup of one flattened field: `Some` only when `group` is an object
/// containing `field` as a string.
fn pick(group: &Value, field: &str) -> Option<String> {
    group
        .as_object()?
        .get(field)
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn pick_string_list(group: &Value, field: &str) -> Option<Vec<String>> {
    let values = group.as_object()?.get(field)?.as_array()?;
    Some(
        values
            .iter()
            .filter_map(|v| v.as_str())
            .map(String::from)
            .collect(),
    )
}

fn flatten(video: ApiVideo) -> VideoRecord {
    VideoRecord {
        video_id: video.id,
        channel_title: pick(&video.snippet, "channelTitle"),
        title: pick(&video.snippet, "title"),
        description: pick(&video.snippet, "description"),
        tags: pick_string_list(&video.snippet, "tags"),
        published_at: pick(&video.snippet, "publishedAt"),
        view_count: pick(&video.statistics, "viewCount"),
        like_count: pick(&video.statistics, "likeCount"),
        // Spelled as requested from the API; resolves to None if the service
        // uses a different spelling.
        favourite_count: pick(&video.statistics, "favouriteCount"),
        comment_count: pick(&video.statistics, "commentCount"),
        duration: pick(&video.content_details, "duration"),
        definition: pick(&video.content_details, "definition"),
        caption: pick(&video.content_details, "caption"),
    }
}

impl<'a> VideoDetailsRequest<'a> {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        // chunks() rejects zero.
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn send(self) -> Result<Vec<VideoRecord>, YouTubeError> {
        let mut records = Vec::with_capacity(self.video_ids.len());

        for batch in self.video_ids.chunks(self.batch_size) {
            let url = format!(
                "{}/youtube/v3/videos?part=snippet,contentDetails,statistics&id={}",
                self.base_url,
                batch.join(",")
            );

            let req = crate::build_get(&url, &self.fields)?;
            let body_bytes = crate::dispatch(self.client, req).await?;
            let api_response: ApiResponse = serde_json::from_slice(&body_bytes)?;

            debug!(
                "videos batch: requested {}, got {}",
                batch.len(),
                api_response.items.len()
            );

            records.extend(api_response.items.into_iter().map(flatten));
        }

        Ok(records)
    }
}
