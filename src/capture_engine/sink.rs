//! The persisted-write seam
//!
//! The dispatcher treats the write collaborator as opaque: hand over
//! bytes and a destination, get back success or failure. Writes must be
//! idempotent overwrites - the protocol tolerates the same page being
//! dispatched twice across adjacent cycles while its first write is still
//! in flight, and the second write simply lands on the same path.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

/// Destination for captured page images
pub trait TileSink: Send + Sync + 'static {
    /// Persist one page image under `folder/file_name`
    fn write(
        &self,
        folder: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Filesystem sink rooted at the run's output directory
#[derive(Debug, Clone)]
pub struct FsTileSink {
    root: PathBuf,
}

impl FsTileSink {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl TileSink for FsTileSink {
    async fn write(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create output folder {}", dir.display()))?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_bytes_under_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FsTileSink::new(dir.path().to_path_buf());

        sink.write("My Doc", "1_My Doc.png", b"png-bytes")
            .await
            .expect("write succeeds");

        let written = std::fs::read(dir.path().join("My Doc").join("1_My Doc.png"))
            .expect("file exists");
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn overwrite_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FsTileSink::new(dir.path().to_path_buf());

        sink.write("d", "1_d.png", b"first").await.expect("first write");
        sink.write("d", "1_d.png", b"second").await.expect("second write");

        let written = std::fs::read(dir.path().join("d").join("1_d.png")).expect("file exists");
        assert_eq!(written, b"second");
    }
}
