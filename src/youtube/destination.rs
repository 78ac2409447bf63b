use crate::error::Result;

/// A playlist created on the destination service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPlaylist {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
}

/// Kind of media a destination search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistDestination: Send + Sync {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<DestinationPlaylist>;

    /// Ranked search. An empty result is a valid answer, not an error.
    async fn search(&self, query: &str, kind: MediaKind, max_results: u32) -> Result<Vec<SearchHit>>;

    async fn add_item(&self, playlist_id: &str, item_id: &str) -> Result<()>;
}
