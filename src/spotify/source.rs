use crate::catalog::Track;
use crate::error::Result;

/// One page of a paginated listing. `next_offset` is `None` once the source
/// reports there is nothing further to fetch.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_offset: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

/// A playlist entry. Entries that do not resolve to a playable track
/// (removed tracks, podcast episodes) carry no track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// Page-level access to a source account's playlists.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn playlists_page(&self, offset: u32) -> Result<Page<PlaylistSummary>>;
    async fn items_page(&self, playlist_id: &str, offset: u32) -> Result<Page<PlaylistItem>>;
}
