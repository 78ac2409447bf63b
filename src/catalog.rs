use serde::{Deserialize, Deserializer, Serialize};

/// A credited artist. Two artists are the same artist when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artists: Vec<Artist>,
    pub album: Album,
}

/// A source playlist as persisted in a snapshot unit. Track order is the
/// source order and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracks: Vec<Track>,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Track {
    /// Free-text destination query: the track name followed by every artist
    /// name, space separated, in credit order.
    pub fn search_query(&self) -> String {
        let artists: Vec<&str> = self.artists.iter().map(|a| a.name.as_str()).collect();
        format!("{} {}", self.name, artists.join(" "))
    }
}

// Snapshots written by older runs may carry `null` where an array is expected.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
impl Track {
    pub fn mock(name: &str, artists: &[&str]) -> Self {
        let artists: Vec<Artist> = artists.iter().map(|a| Artist::new(*a)).collect();
        Self {
            name: name.to_string(),
            album: Album {
                name: "Mock Album".to_string(),
                artists: artists.clone(),
            },
            artists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_joins_artists_in_order() {
        let track = Track::mock("Under Pressure", &["Queen", "David Bowie"]);
        assert_eq!(track.search_query(), "Under Pressure Queen David Bowie");
    }

    #[test]
    fn test_search_query_keeps_apostrophes() {
        let track = Track::mock("Don't Stop Believin'", &["Journey"]);
        assert_eq!(track.search_query(), "Don't Stop Believin' Journey");
    }

    #[test]
    fn test_search_query_without_artists() {
        let track = Track::mock("Untitled", &[]);
        assert_eq!(track.search_query(), "Untitled ");
    }

    #[test]
    fn test_artist_equality_is_by_name() {
        assert_eq!(Artist::new("Toto"), Artist::new("Toto"));
        assert_ne!(Artist::new("Toto"), Artist::new("toto"));
    }

    #[test]
    fn test_decodes_snapshot_shape() {
        let json = r#"{
            "name": "Road Trip",
            "tracks": [
                {
                    "name": "Africa",
                    "artists": [{"name": "Toto"}],
                    "album": {"name": "Toto IV", "artists": [{"name": "Toto"}]}
                }
            ]
        }"#;

        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.tracks[0].album.name, "Toto IV");
        assert_eq!(playlist.tracks[0].artists, vec![Artist::new("Toto")]);
    }

    #[test]
    fn test_null_arrays_decode_as_empty() {
        let json = r#"{
            "name": "Sparse",
            "tracks": [
                {"name": "Intro", "artists": null, "album": {"name": "", "artists": null}}
            ]
        }"#;
        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert!(playlist.tracks[0].artists.is_empty());
        assert!(playlist.tracks[0].album.artists.is_empty());

        let empty: Playlist = serde_json::from_str(r#"{"name": "Empty", "tracks": null}"#).unwrap();
        assert!(empty.tracks.is_empty());
    }

    #[test]
    fn test_serializes_expected_field_names() {
        let track = Track::mock("Africa", &["Toto"]);
        let value = serde_json::to_value(&track).unwrap();

        assert_eq!(value["name"], "Africa");
        assert_eq!(value["artists"][0]["name"], "Toto");
        assert_eq!(value["album"]["name"], "Mock Album");
        assert_eq!(value["album"]["artists"][0]["name"], "Toto");
    }
}
