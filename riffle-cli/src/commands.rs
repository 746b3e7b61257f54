//! CLI command implementations

use std::path::PathBuf;

use clap::Subcommand;
use riffle_core::config::{RiffleConfig, SourceConfig};
use riffle_core::RuntimeMode;
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// Directory to serve audio files from
        #[arg(long, conflicts_with = "audio_upstream")]
        audio_dir: Option<PathBuf>,
        /// Remote base URL to proxy audio from (e.g. https://cdn.example.com/songs/)
        #[arg(long)]
        audio_upstream: Option<String>,
        /// Directory to serve video files from
        #[arg(long, conflicts_with = "video_upstream")]
        video_dir: Option<PathBuf>,
        /// Remote base URL to proxy video from
        #[arg(long)]
        video_upstream: Option<String>,
        /// Origins allowed by CORS; repeatable. All origins when omitted
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
        /// Runtime mode (production, development)
        #[arg(long, default_value = "development")]
        mode: RuntimeMode,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error if the server fails to start or exits abnormally
pub async fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve {
            host,
            port,
            audio_dir,
            audio_upstream,
            video_dir,
            video_upstream,
            cors_origins,
            mode,
        } => {
            let mut config = RiffleConfig::default();
            config.server.host = host;
            config.server.port = port;
            config.server.cors_allowed_origins = cors_origins;
            config.runtime_mode = mode;

            if let Some(base_url) = audio_upstream {
                config.media.audio = SourceConfig::Remote { base_url };
            } else if let Some(root) = audio_dir {
                config.media.audio = SourceConfig::Local { root };
            }
            if let Some(base_url) = video_upstream {
                config.media.video = SourceConfig::Remote { base_url };
            } else if let Some(root) = video_dir {
                config.media.video = SourceConfig::Local { root };
            }

            info!(
                audio = ?config.media.audio,
                video = ?config.media.video,
                "starting riffle server"
            );
            riffle_web::run_server(config).await
        }
    }
}
