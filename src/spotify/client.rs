use std::time::Duration;

use rspotify::{
    AuthCodeSpotify, Credentials, OAuth,
    model::{PlayableItem, PlaylistId, SimplifiedArtist},
    prelude::*,
    scopes,
};
use tracing::info;

use crate::catalog::{Album, Artist, Track};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::callback::RedirectListener;
use crate::spotify::source::{Page, PlaylistItem, PlaylistSource, PlaylistSummary};

const PLAYLISTS_PAGE_SIZE: u32 = 50;
const ITEMS_PAGE_SIZE: u32 = 100;
const LOGIN_DEADLINE: Duration = Duration::from_secs(300);

pub struct SpotifyClient {
    client: AuthCodeSpotify,
}

impl SpotifyClient {
    /// Authorize against Spotify. The user logs in through the browser and
    /// the local redirect listener picks up the authorization code.
    pub async fn new(config: &Config) -> Result<Self> {
        let creds = Credentials::new(&config.spotify_client_id, &config.spotify_client_secret);

        let oauth = OAuth {
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: scopes!("playlist-read-private", "playlist-read-collaborative"),
            ..Default::default()
        };

        let client = AuthCodeSpotify::new(creds, oauth);

        let listener = RedirectListener::bind(&config.spotify_redirect_uri).await?;

        let auth_url = client.get_authorize_url(false)?;
        println!("\nPlease log in to Spotify by visiting the following page in your browser:");
        println!("{}\n", auth_url);

        let redirect_url = listener.wait(LOGIN_DEADLINE).await?;

        let code = client
            .parse_response_code(redirect_url.as_str())
            .ok_or_else(|| AppError::Auth("Failed to parse authorization code".into()))?;

        client.request_token(&code).await?;

        let user = client.current_user().await?;
        let user_id = user.id.to_string();
        let display_name = user.display_name.unwrap_or(user_id);

        info!("Successfully authenticated as Spotify user: {}", display_name);

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PlaylistSource for SpotifyClient {
    async fn playlists_page(&self, offset: u32) -> Result<Page<PlaylistSummary>> {
        let page = self
            .client
            .current_user_playlists_manual(Some(PLAYLISTS_PAGE_SIZE), Some(offset))
            .await?;

        let items = page
            .items
            .iter()
            .map(|playlist| PlaylistSummary {
                id: playlist.id.id().to_string(),
                name: playlist.name.clone(),
            })
            .collect();

        Ok(Page {
            items,
            next_offset: page.next.map(|_| offset + PLAYLISTS_PAGE_SIZE),
        })
    }

    async fn items_page(&self, playlist_id: &str, offset: u32) -> Result<Page<PlaylistItem>> {
        let id = PlaylistId::from_id(playlist_id)
            .map_err(|e| AppError::Collection(format!("Invalid playlist ID {}: {}", playlist_id, e)))?;

        let page = self
            .client
            .playlist_items_manual(id, None, None, Some(ITEMS_PAGE_SIZE), Some(offset))
            .await?;

        let items = page
            .items
            .iter()
            .map(|item| PlaylistItem {
                track: match &item.track {
                    Some(PlayableItem::Track(track)) => Some(Track {
                        name: track.name.clone(),
                        artists: to_artists(&track.artists),
                        album: Album {
                            name: track.album.name.clone(),
                            artists: to_artists(&track.album.artists),
                        },
                    }),
                    _ => None,
                },
            })
            .collect();

        Ok(Page {
            items,
            next_offset: page.next.map(|_| offset + ITEMS_PAGE_SIZE),
        })
    }
}

fn to_artists(artists: &[SimplifiedArtist]) -> Vec<Artist> {
    artists.iter().map(|a| Artist::new(a.name.clone())).collect()
}
