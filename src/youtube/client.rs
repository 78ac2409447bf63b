use reqwest::{Client, Response};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::youtube::auth;
use crate::youtube::destination::{DestinationPlaylist, MediaKind, PlaylistDestination, SearchHit};
use crate::youtube::models::{
    ApiPlaylist, PlaylistInsert, PlaylistItemInsert, PlaylistItemSnippet, PlaylistSnippet,
    PlaylistStatus, ResourceId, SearchResponse,
};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

pub struct YouTubeClient {
    http_client: Client,
    access_token: String,
}

impl YouTubeClient {
    pub async fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;

        let access_token = auth::authorize(
            &http_client,
            &config.youtube_client_secret_file,
            &config.youtube_token_file,
        )
        .await?;

        info!("Successfully authenticated with YouTube");

        Ok(Self {
            http_client,
            access_token,
        })
    }
}

async fn check(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(AppError::YouTubeApi(format!(
        "{} failed ({}): {}",
        action, status, error_text
    )))
}

#[async_trait::async_trait]
impl PlaylistDestination for YouTubeClient {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<DestinationPlaylist> {
        let request = PlaylistInsert {
            snippet: PlaylistSnippet { title, description },
            status: PlaylistStatus {
                privacy_status: "private",
            },
        };

        let response = self
            .http_client
            .post(format!("{}/playlists", YOUTUBE_API_BASE))
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet,status")])
            .json(&request)
            .send()
            .await?;

        let playlist: ApiPlaylist = check(response, "Create playlist").await?.json().await?;

        Ok(DestinationPlaylist {
            id: playlist.id,
            title: playlist.snippet.title,
        })
    }

    async fn search(&self, query: &str, kind: MediaKind, max_results: u32) -> Result<Vec<SearchHit>> {
        let max_results = max_results.to_string();

        let response = self
            .http_client
            .get(format!("{}/search", YOUTUBE_API_BASE))
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", kind.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        let results: SearchResponse = check(response, "Search").await?.json().await?;

        let hits: Vec<SearchHit> = results
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .map(|id| SearchHit { id })
            .collect();

        debug!("Search '{}' returned {} results", query, hits.len());
        Ok(hits)
    }

    async fn add_item(&self, playlist_id: &str, item_id: &str) -> Result<()> {
        let request = PlaylistItemInsert {
            snippet: PlaylistItemSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id: item_id,
                },
            },
        };

        let response = self
            .http_client
            .post(format!("{}/playlistItems", YOUTUBE_API_BASE))
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet")])
            .json(&request)
            .send()
            .await?;

        check(response, "Add playlist item").await?;
        Ok(())
    }
}
