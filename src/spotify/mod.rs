pub mod callback;
pub mod client;
pub mod collector;
pub mod source;

pub use client::SpotifyClient;
pub use collector::PlaylistCollector;
pub use source::{Page, PlaylistItem, PlaylistSource, PlaylistSummary};
