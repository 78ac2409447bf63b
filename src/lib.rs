pub mod call;
pub mod catalog;
pub mod config;
pub mod error;
pub mod migrator;
pub mod snapshot;
pub mod spotify;
pub mod youtube;

pub use catalog::{Album, Artist, Playlist, Track};
pub use config::Config;
pub use error::{AppError, Result};
pub use migrator::{FailureLedger, MigrationReport, PlaylistMigrator};
pub use snapshot::{SnapshotStore, SnapshotUnit};
pub use spotify::{PlaylistCollector, SpotifyClient};
pub use youtube::YouTubeClient;
