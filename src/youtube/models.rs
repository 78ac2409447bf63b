use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistInsert<'a> {
    pub snippet: PlaylistSnippet<'a>,
    pub status: PlaylistStatus<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistSnippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistStatus<'a> {
    pub privacy_status: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPlaylist {
    pub id: String,
    pub snippet: ApiPlaylistSnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPlaylistSnippet {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistItemInsert<'a> {
    pub snippet: PlaylistItemSnippet<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemSnippet<'a> {
    pub playlist_id: &'a str,
    pub resource_id: ResourceId<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId<'a> {
    pub kind: &'a str,
    pub video_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_skips_non_video_ids() {
        let json = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC123"}}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].id.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(response.items[1].id.video_id.is_none());
    }

    #[test]
    fn test_playlist_item_insert_shape() {
        let body = PlaylistItemInsert {
            snippet: PlaylistItemSnippet {
                playlist_id: "PL1",
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id: "v1",
                },
            },
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["snippet"]["playlistId"], "PL1");
        assert_eq!(value["snippet"]["resourceId"]["kind"], "youtube#video");
        assert_eq!(value["snippet"]["resourceId"]["videoId"], "v1");
    }
}
