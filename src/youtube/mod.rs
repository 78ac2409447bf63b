pub mod auth;
pub mod client;
pub mod destination;
mod models;

pub use client::YouTubeClient;
pub use destination::{DestinationPlaylist, MediaKind, PlaylistDestination, SearchHit};
