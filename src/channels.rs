use crate::models::ChannelRecord;
use crate::{GoogleAPIRequestFields, YouTubeError};
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde::Deserialize;

/// One batched `channels.list` lookup projecting each returned channel into a
/// flat [`ChannelRecord`].
///
/// All ids go out comma-joined in a single request; callers with more ids
/// than the API accepts per call are expected to chunk before constructing
/// this request.
pub struct ChannelStatsRequest<'a> {
    pub client: &'a mut Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub channel_ids: Vec<String>,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ChannelStatsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    items: Option<Vec<ApiChannel>>,
}

#[derive(Debug, Deserialize)]
struct ApiChannel {
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    subscriber_count: Option<String>,
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "videoCount")]
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

impl<'a> ChannelStatsRequest<'a> {
    pub async fn send(self) -> Result<Vec<ChannelRecord>, YouTubeError> {
        let url = format!(
            "{}/youtube/v3/channels?part=snippet,contentDetails,statistics&id={}",
            self.base_url,
            self.channel_ids.join(",")
        );

        let req = crate::build_get(&url, &self.fields)?;
        let body_bytes = crate::dispatch(self.client, req).await?;
        let api_response: ApiResponse = serde_json::from_slice(&body_bytes)?;

        // Counts stay as the API's decimal strings; any missing path becomes
        // None rather than failing the whole fetch.
        let records = api_response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|channel| ChannelRecord {
                name: channel.snippet.and_then(|s| s.title),
                subscriber_count: channel
                    .statistics
                    .as_ref()
                    .and_then(|s| s.subscriber_count.clone()),
                view_count: channel.statistics.as_ref().and_then(|s| s.view_count.clone()),
                video_count: channel.statistics.as_ref().and_then(|s| s.video_count.clone()),
                uploads_playlist_id: channel
                    .content_details
                    .and_then(|c| c.related_playlists)
                    .and_then(|r| r.uploads),
            })
            .collect();

        Ok(records)
    }
}
