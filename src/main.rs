use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spotify2ytmusic::{
    Config, FailureLedger, PlaylistCollector, PlaylistMigrator, SnapshotStore, SpotifyClient,
    YouTubeClient,
};

#[derive(Parser)]
#[command(name = "spotify2ytmusic")]
#[command(about = "Migrate Spotify playlists to YouTube Music")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all your Spotify playlists and save them locally
    Prepare {
        /// Directory the playlist snapshots are written to
        #[arg(long, default_value = "playlists")]
        dir: PathBuf,
    },

    /// Recreate the saved playlists on YouTube Music
    Migrate {
        /// Directory holding the playlist snapshots
        #[arg(long, default_value = "playlists")]
        dir: PathBuf,

        /// Google OAuth client secret file (or set YOUTUBE_CLIENT_SECRET_FILE env var)
        #[arg(short = 'c', long, env = "YOUTUBE_CLIENT_SECRET_FILE")]
        client_secret: Option<PathBuf>,

        /// Where tracks that could not be migrated are written
        #[arg(long, default_value = "failed_tracks.json")]
        failed_tracks: PathBuf,
    },

    /// List the playlist snapshots saved by `prepare`
    ListSnapshots {
        #[arg(long, default_value = "playlists")]
        dir: PathBuf,
    },

    /// Show the tracks a previous migration could not add
    Failures {
        #[arg(long, default_value = "failed_tracks.json")]
        file: PathBuf,
    },

    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing up");
            trigger.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Prepare { dir } => {
            prepare(&dir).await?;
        }
        Commands::Migrate {
            dir,
            client_secret,
            failed_tracks,
        } => {
            migrate(&dir, client_secret, &failed_tracks).await?;
        }
        Commands::ListSnapshots { dir } => {
            list_snapshots(&dir)?;
        }
        Commands::Failures { file } => {
            show_failures(&file)?;
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

async fn prepare(dir: &Path) -> Result<()> {
    println!("{}", "Spotify Playlist Snapshot".cyan().bold());
    println!("{}", "=".repeat(50));

    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Copy .env.example to .env and fill in your credentials (see `spotify2ytmusic setup`)."
                .yellow()
        );
        std::process::exit(1);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create playlists directory {}", dir.display()))?;

    let spotify_client = SpotifyClient::new(&config)
        .await
        .context("Failed to connect to Spotify")?;

    let cancel = cancel_on_ctrl_c();
    let collector = PlaylistCollector::new(spotify_client, cancel, config.request_timeout);

    let playlists = collector
        .collect()
        .await
        .context("Failed to fetch playlists")?;

    let mut store = SnapshotStore::new(dir);
    let mut saved = 0;
    for playlist in &playlists {
        match store.write(playlist) {
            Ok(unit) => {
                saved += 1;
                info!("Saved {} to {}", playlist.name, unit.path().display());
            }
            Err(e) => warn!("Could not save playlist {}: {}", playlist.name, e),
        }
    }

    if saved == 0 && !playlists.is_empty() {
        anyhow::bail!("Could not write any snapshot to {}", dir.display());
    }

    println!(
        "\n{}",
        format!("Saved {} of {} playlists to {}", saved, playlists.len(), dir.display()).green()
    );

    Ok(())
}

async fn migrate(dir: &Path, client_secret: Option<PathBuf>, failed_tracks: &Path) -> Result<()> {
    println!("{}", "Spotify to YouTube Music Playlist Migrator".cyan().bold());
    println!("{}", "=".repeat(50));

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = client_secret {
        config.youtube_client_secret_file = path;
    }

    let store = SnapshotStore::new(dir);
    let units = store
        .list_units()
        .with_context(|| format!("Could not read playlists directory {}", dir.display()))?;

    let youtube_client = YouTubeClient::new(&config)
        .await
        .context("Failed to connect to YouTube")?;

    let cancel = cancel_on_ctrl_c();
    let migrator = PlaylistMigrator::new(youtube_client, cancel, config.request_timeout);

    let report = migrator.migrate(&store, &units).await;

    report
        .ledger
        .persist(failed_tracks)
        .with_context(|| format!("Could not save {}", failed_tracks.display()))?;

    report.print_summary();

    if report.cancelled {
        println!("\n{}", "Migration interrupted".yellow());
    } else {
        println!("\n{}", "Migration completed!".green());
    }

    Ok(())
}

fn list_snapshots(dir: &Path) -> Result<()> {
    println!("{}", "Saved Playlist Snapshots".cyan().bold());
    println!("{}", "=".repeat(50));

    let store = SnapshotStore::new(dir);
    let units = store
        .list_units()
        .with_context(|| format!("Could not read playlists directory {}", dir.display()))?;

    if units.is_empty() {
        println!("{}", "No snapshots found".yellow());
        return Ok(());
    }

    for (i, unit) in units.iter().enumerate() {
        match store.read(unit) {
            Ok(playlist) => println!(
                "{:2}. {} ({} tracks)",
                i + 1,
                playlist.name.green(),
                playlist.tracks.len()
            ),
            Err(e) => println!("{:2}. {} {}", i + 1, unit.file_name(), e.to_string().red()),
        }
    }

    println!("\n{}", format!("Total: {} snapshots", units.len()).cyan());

    Ok(())
}

fn show_failures(file: &Path) -> Result<()> {
    if !file.exists() {
        println!("{}", "No failed tracks recorded".green());
        return Ok(());
    }

    let ledger = FailureLedger::load(file)
        .with_context(|| format!("Could not read {}", file.display()))?;

    for playlist_id in ledger.playlist_ids() {
        println!("{}", format!("Playlist {}", playlist_id).cyan().bold());
        for track in ledger.failures_for(playlist_id).unwrap_or_default() {
            let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
            println!("   - {} ({})", track.name, artists.join(", "));
        }
    }

    println!("\n{}", format!("Total: {} failed tracks", ledger.len()).yellow());

    Ok(())
}

fn show_setup_guide() {
    println!("{}", "Spotify to YouTube Music Migrator Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");
    println!("   - Add 'http://127.0.0.1:8080/callback' as a redirect URI");

    println!("\n{}", "2. YouTube Data API Setup".yellow());
    println!("   - Go to https://console.cloud.google.com/");
    println!("   - Enable the YouTube Data API v3");
    println!("   - Create an OAuth client ID of type 'Desktop app'");
    println!("   - Download it as client_secret.json");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     SPOTIFY_REDIRECT_URI=http://127.0.0.1:8080/callback");
    println!("     YOUTUBE_CLIENT_SECRET_FILE=client_secret.json");

    println!("\n{}", "4. Usage".yellow());
    println!("   - spotify2ytmusic prepare          (save your Spotify playlists)");
    println!("   - spotify2ytmusic list-snapshots   (see what was saved)");
    println!("   - spotify2ytmusic migrate          (create them on YouTube Music)");
    println!("   - spotify2ytmusic failures         (see tracks that were not found)");

    println!("\n{}", "Ready to start migrating!".green());
}
