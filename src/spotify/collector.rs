use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::call::bounded;
use crate::catalog::{Playlist, Track};
use crate::error::{AppError, Result};
use crate::spotify::source::{PlaylistSource, PlaylistSummary};

/// Reads every playlist of the source account, with all of its tracks.
pub struct PlaylistCollector<S> {
    source: S,
    cancel: CancellationToken,
    call_timeout: Duration,
}

impl<S: PlaylistSource> PlaylistCollector<S> {
    pub fn new(source: S, cancel: CancellationToken, call_timeout: Duration) -> Self {
        Self {
            source,
            cancel,
            call_timeout,
        }
    }

    /// Collect all playlists in source order. Failing to list playlists is
    /// fatal; failing to list one playlist's items skips that playlist.
    pub async fn collect(&self) -> Result<Vec<Playlist>> {
        let summaries = self.list_playlists().await?;
        info!("Found {} playlists", summaries.len());

        let mut playlists = Vec::with_capacity(summaries.len());

        for summary in summaries {
            match self.collect_tracks(&summary.id).await {
                Ok(tracks) => {
                    info!(
                        "Collected playlist: {} ({} tracks)",
                        summary.name,
                        tracks.len()
                    );
                    playlists.push(Playlist {
                        name: summary.name,
                        tracks,
                    });
                }
                Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                Err(e) => {
                    warn!(
                        "Could not get items for playlist {}: {}. Skipping playlist.",
                        summary.name, e
                    );
                }
            }
        }

        Ok(playlists)
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let mut summaries = Vec::new();
        let mut offset = 0;

        loop {
            let page = bounded(
                &self.cancel,
                self.call_timeout,
                self.source.playlists_page(offset),
            )
            .await
            .map_err(|e| match e {
                AppError::Cancelled => AppError::Cancelled,
                other => AppError::Collection(other.to_string()),
            })?;

            summaries.extend(page.items);

            match page.next_offset {
                Some(next) => offset = next,
                None => break,
            }
        }

        Ok(summaries)
    }

    async fn collect_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let mut offset = 0;

        loop {
            let page = bounded(
                &self.cancel,
                self.call_timeout,
                self.source.items_page(playlist_id, offset),
            )
            .await?;

            for item in page.items {
                match item.track {
                    Some(track) => tracks.push(track),
                    None => debug!("Dropping unplayable item in playlist {}", playlist_id),
                }
            }

            match page.next_offset {
                Some(next) => offset = next,
                None => break,
            }
        }

        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::source::{MockPlaylistSource, Page, PlaylistItem};

    fn summary(id: &str, name: &str) -> PlaylistSummary {
        PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn item(track: Option<Track>) -> PlaylistItem {
        PlaylistItem { track }
    }

    fn collector(source: MockPlaylistSource) -> PlaylistCollector<MockPlaylistSource> {
        PlaylistCollector::new(source, CancellationToken::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_collects_road_trip_in_order() {
        let mut source = MockPlaylistSource::new();
        source
            .expect_playlists_page()
            .returning(|_| Ok(Page::last(vec![summary("p1", "Road Trip")])));
        source.expect_items_page().returning(|_, _| {
            Ok(Page::last(vec![
                item(Some(Track::mock("Don't Stop Believin'", &["Journey"]))),
                item(Some(Track::mock("Africa", &["Toto"]))),
            ]))
        });

        let playlists = collector(source).collect().await.unwrap();

        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Road Trip");
        let names: Vec<&str> = playlists[0].tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Don't Stop Believin'", "Africa"]);
    }

    #[tokio::test]
    async fn test_follows_pages_until_no_next() {
        let mut source = MockPlaylistSource::new();
        source.expect_playlists_page().times(2).returning(|offset| match offset {
            0 => Ok(Page {
                items: vec![summary("p1", "First")],
                next_offset: Some(50),
            }),
            _ => Ok(Page::last(vec![summary("p2", "Second")])),
        });
        source
            .expect_items_page()
            .returning(|id, offset| match (id, offset) {
                ("p1", 0) => Ok(Page {
                    items: vec![item(Some(Track::mock("A", &["X"])))],
                    next_offset: Some(100),
                }),
                ("p1", 100) => Ok(Page {
                    // An empty page with a next link must not stop the loop.
                    items: Vec::new(),
                    next_offset: Some(200),
                }),
                ("p1", _) => Ok(Page::last(vec![item(Some(Track::mock("B", &["Y"])))])),
                _ => Ok(Page::last(vec![item(Some(Track::mock("C", &["Z"])))])),
            });

        let playlists = collector(source).collect().await.unwrap();

        assert_eq!(playlists.len(), 2);
        let first: Vec<&str> = playlists[0].tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(first, vec!["A", "B"]);
        assert_eq!(playlists[1].name, "Second");
    }

    #[tokio::test]
    async fn test_drops_items_without_track() {
        let mut source = MockPlaylistSource::new();
        source
            .expect_playlists_page()
            .returning(|_| Ok(Page::last(vec![summary("p1", "Mixed")])));
        source.expect_items_page().returning(|_, _| {
            Ok(Page::last(vec![
                item(None),
                item(Some(Track::mock("Kept", &["Band"]))),
                item(None),
            ]))
        });

        let playlists = collector(source).collect().await.unwrap();
        assert_eq!(playlists[0].tracks, vec![Track::mock("Kept", &["Band"])]);
    }

    #[tokio::test]
    async fn test_skips_playlist_when_items_fail() {
        let mut source = MockPlaylistSource::new();
        source.expect_playlists_page().returning(|_| {
            Ok(Page::last(vec![summary("bad", "Broken"), summary("good", "Fine")]))
        });
        source.expect_items_page().returning(|id, _| {
            if id == "bad" {
                Err(AppError::Collection("boom".into()))
            } else {
                Ok(Page::last(vec![item(Some(Track::mock("Song", &["Artist"])))]))
            }
        });

        let playlists = collector(source).collect().await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Fine");
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut source = MockPlaylistSource::new();
        source
            .expect_playlists_page()
            .returning(|_| Err(AppError::Auth("token expired".into())));
        source.expect_items_page().times(0);

        let result = collector(source).collect().await;
        assert!(matches!(result, Err(AppError::Collection(_))));
    }

    #[tokio::test]
    async fn test_cancelled_collection_makes_no_calls() {
        let mut source = MockPlaylistSource::new();
        source.expect_playlists_page().times(0);
        source.expect_items_page().times(0);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let collector = PlaylistCollector::new(source, cancel, Duration::from_secs(5));

        assert!(matches!(collector.collect().await, Err(AppError::Cancelled)));
    }
}
