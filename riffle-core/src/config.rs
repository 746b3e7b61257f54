//! Centralized configuration for Riffle.
//!
//! All tunable parameters are defined here and passed explicitly into the
//! components that consume them. Nothing in the serving path reads ambient
//! global state, which keeps the range resolver and stream service testable
//! without environment setup.

use std::path::PathBuf;
use std::sync::Arc;

use crate::mode::RuntimeMode;
use crate::streaming::{LocalMediaSource, MediaSource, RemoteMediaSource};
use crate::{Result, RiffleError};

/// Central configuration for all Riffle components.
///
/// Groups related configuration settings into logical sections. Built once
/// at startup (normally by the CLI) and never reloaded.
#[derive(Debug, Clone, Default)]
pub struct RiffleConfig {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub runtime_mode: RuntimeMode,
}

/// HTTP server binding and cross-origin configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind the listener to
    pub host: String,
    /// TCP port to bind the listener to
    pub port: u16,
    /// Origins allowed by CORS; empty means allow any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Media serving configuration, one source per resource class.
///
/// Content types are fixed per class and never sniffed from file contents.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Where audio resources are served from
    pub audio: SourceConfig,
    /// Where video resources are served from
    pub video: SourceConfig,
    /// Content-Type sent on every audio response
    pub audio_content_type: &'static str,
    /// Content-Type sent on every video response
    pub video_content_type: &'static str,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio: SourceConfig::Local {
                root: PathBuf::from("media/audio"),
            },
            video: SourceConfig::Local {
                root: PathBuf::from("media/videos"),
            },
            audio_content_type: "audio/mpeg",
            video_content_type: "video/mp4",
        }
    }
}

/// Backing store for one resource class.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// Serve files from a directory on the local filesystem
    Local { root: PathBuf },
    /// Proxy byte ranges from a remote HTTP upstream
    Remote { base_url: String },
}

impl SourceConfig {
    /// Builds the media source this configuration describes.
    ///
    /// # Errors
    ///
    /// - `RiffleError::Configuration` - Remote base URL is not a valid URL
    pub fn build_source(&self) -> Result<Arc<dyn MediaSource>> {
        match self {
            SourceConfig::Local { root } => Ok(Arc::new(LocalMediaSource::new(root.clone()))),
            SourceConfig::Remote { base_url } => {
                let base = base_url
                    .parse()
                    .map_err(|e| RiffleError::Configuration {
                        reason: format!("invalid upstream base URL '{base_url}': {e}"),
                    })?;
                Ok(Arc::new(RemoteMediaSource::new(base)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serves_local_directories() {
        let config = RiffleConfig::default();
        assert!(matches!(config.media.audio, SourceConfig::Local { .. }));
        assert!(matches!(config.media.video, SourceConfig::Local { .. }));
        assert_eq!(config.media.audio_content_type, "audio/mpeg");
        assert_eq!(config.media.video_content_type, "video/mp4");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn remote_source_rejects_invalid_base_url() {
        let source = SourceConfig::Remote {
            base_url: "not a url".to_string(),
        };
        assert!(matches!(
            source.build_source(),
            Err(RiffleError::Configuration { .. })
        ));
    }
}
