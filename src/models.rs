//! Flat output records. These are the crate's component boundary: callers
//! hand them to whatever tabular/export layer they use.

/// One row per looked-up channel.
///
/// Counts are kept exactly as the API returns them (decimal strings, possibly
/// larger than any fixed-width integer a consumer might assume) — no numeric
/// coercion. Every field soft-fails to `None` when the response item lacks it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChannelRecord {
    pub name: Option<String>,
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "videoCount")]
    pub video_count: Option<String>,
    /// Id of the channel's auto-generated uploads playlist, the usual input
    /// to [`crate::PlaylistVideoIdsRequest`].
    #[serde(rename = "uploadsPlaylistId")]
    pub uploads_playlist_id: Option<String>,
}

/// One row per video item returned by the API.
///
/// `video_id` comes from the item itself, not the requested id. The thirteen
/// remaining fields are independently nullable: `Some` iff the item carried
/// the field, `None` otherwise. Note `favourite_count` keeps the non-US
/// spelling used on the wire; if the API spells it differently the field
/// resolves to `None`, which is preserved deliberately for compatibility.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VideoRecord {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "favouriteCount")]
    pub favourite_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
    pub duration: Option<String>,
    pub definition: Option<String>,
    pub caption: Option<String>,
}
