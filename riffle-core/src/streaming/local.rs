//! Local filesystem media source.

use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::warn;

use super::range::ByteWindow;
use super::source::{MediaSource, MediaStream};
use super::StreamError;

/// Serves byte ranges of files under a fixed root directory.
///
/// Resource identifiers are resolved lexically against the root before any
/// filesystem access: `..` components that would climb out of the root are
/// rejected up front, so a traversal attempt never touches the disk and is
/// indistinguishable from a lookup that was never made.
#[derive(Debug, Clone)]
pub struct LocalMediaSource {
    root: PathBuf,
}

impl LocalMediaSource {
    /// Creates a source rooted at `root`. The root is fixed for the lifetime
    /// of the source and never mutated.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `resource` to a path inside the root, purely lexically.
    ///
    /// # Errors
    ///
    /// - `StreamError::PathTraversal` - absolute identifiers, or `..`
    ///   components that climb above the root
    fn resolve_path(&self, resource: &str) -> Result<PathBuf, StreamError> {
        let traversal = || {
            warn!(resource, "rejected path traversal attempt");
            StreamError::PathTraversal {
                resource: resource.to_string(),
            }
        };

        let mut resolved = self.root.clone();
        let mut depth: usize = 0;
        for component in Path::new(resource).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(traversal());
                    }
                    resolved.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => return Err(traversal()),
            }
        }

        Ok(resolved)
    }
}

#[async_trait::async_trait]
impl MediaSource for LocalMediaSource {
    async fn size(&self, resource: &str) -> Result<u64, StreamError> {
        let path = self.resolve_path(resource)?;

        // Opening the file doubles as the readability probe; missing and
        // unreadable both fold into NotFound.
        let file = File::open(&path).await.map_err(|_| StreamError::NotFound)?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StreamError::NotFound);
        }

        Ok(metadata.len())
    }

    async fn open_range(
        &self,
        resource: &str,
        window: &ByteWindow,
    ) -> Result<MediaStream, StreamError> {
        let path = self.resolve_path(resource)?;

        let mut file = File::open(&path).await.map_err(|_| StreamError::NotFound)?;
        file.seek(SeekFrom::Start(window.start)).await?;

        // take() bounds the cursor so buffered reads cannot overshoot the window.
        let reader = file.take(window.chunk_size());
        Ok(Box::pin(ReaderStream::new(reader)))
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use tempfile::TempDir;

    use super::*;
    use crate::streaming::resolve_range;

    fn source_with_file(contents: &[u8]) -> (TempDir, LocalMediaSource) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), contents).unwrap();
        let source = LocalMediaSource::new(dir.path());
        (dir, source)
    }

    async fn collect(stream: MediaStream) -> Vec<u8> {
        stream
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap()
    }

    #[test]
    fn resolve_path_stays_inside_root() {
        let source = LocalMediaSource::new("/srv/media");
        let path = source.resolve_path("clip.mp4").unwrap();
        assert_eq!(path, PathBuf::from("/srv/media/clip.mp4"));

        // Interior .. is fine as long as it never climbs above the root.
        let path = source.resolve_path("sub/../clip.mp4").unwrap();
        assert_eq!(path, PathBuf::from("/srv/media/clip.mp4"));
    }

    #[test]
    fn resolve_path_rejects_escapes() {
        let source = LocalMediaSource::new("/srv/media");
        for resource in ["../secret.mp4", "a/../../secret.mp4", "/etc/passwd"] {
            assert!(
                matches!(
                    source.resolve_path(resource),
                    Err(StreamError::PathTraversal { .. })
                ),
                "expected traversal rejection for {resource:?}"
            );
        }
    }

    #[tokio::test]
    async fn traversal_is_checked_before_existence() {
        let (_dir, source) = source_with_file(b"data");
        // Even for a file that does not exist anywhere, the traversal check
        // fires first.
        assert!(matches!(
            source.size("../no-such-file.mp4").await,
            Err(StreamError::PathTraversal { .. })
        ));
    }

    #[tokio::test]
    async fn size_reports_file_length() {
        let (_dir, source) = source_with_file(&[0u8; 1000]);
        assert_eq!(source.size("clip.mp4").await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, source) = source_with_file(b"data");
        assert!(matches!(
            source.size("other.mp4").await,
            Err(StreamError::NotFound)
        ));
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("album")).unwrap();
        let source = LocalMediaSource::new(dir.path());
        assert!(matches!(
            source.size("album").await,
            Err(StreamError::NotFound)
        ));
    }

    #[tokio::test]
    async fn open_range_yields_exact_window() {
        let contents: Vec<u8> = (0..=255).cycle().take(1000).map(|b| b as u8).collect();
        let (_dir, source) = source_with_file(&contents);

        let window = resolve_range("bytes=100-199", 1000).unwrap();
        let body = collect(source.open_range("clip.mp4", &window).await.unwrap()).await;
        assert_eq!(body, &contents[100..200]);
    }

    #[tokio::test]
    async fn open_range_to_end_of_file() {
        let contents: Vec<u8> = (0..1000u32).map(|b| (b % 251) as u8).collect();
        let (_dir, source) = source_with_file(&contents);

        let window = resolve_range("bytes=900-", 1000).unwrap();
        let body = collect(source.open_range("clip.mp4", &window).await.unwrap()).await;
        assert_eq!(body.len(), 100);
        assert_eq!(body, &contents[900..]);
    }
}
