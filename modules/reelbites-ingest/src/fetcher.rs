//! Transient media download.
//!
//! The downloaded video exists only for the duration of one invocation.
//! `TransientMedia` owns the file through a `NamedTempFile`, so the file is
//! deleted when the handle drops — on success, fatal abort, and deadline
//! alike.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use reelbites_common::IngestError;

use crate::traits::MediaFetcher;

/// Exclusive owner of one submission's downloaded media file.
pub struct TransientMedia {
    file: NamedTempFile,
}

impl TransientMedia {
    /// Create an empty transient file keyed by the submission id.
    pub fn create(submission_id: Uuid) -> Result<Self, IngestError> {
        let file = tempfile::Builder::new()
            .prefix(&format!("video_{submission_id}_"))
            .suffix(".mp4")
            .tempfile()
            .map_err(|e| IngestError::FatalFetch(format!("temp file create failed: {e}")))?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the full media bytes for the multimodal prompt.
    pub fn read(&self) -> Result<Vec<u8>, IngestError> {
        std::fs::read(self.path())
            .map_err(|e| IngestError::FatalFetch(format!("media read failed: {e}")))
    }

    pub(crate) fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        self.file
            .as_file_mut()
            .write_all(chunk)
            .map_err(|e| IngestError::FatalFetch(format!("media write failed: {e}")))
    }

    /// Path as an owned buffer, for observing cleanup in tests.
    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

/// Streams the resolved media URL to local transient storage.
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(
        &self,
        media_url: &str,
        submission_id: Uuid,
    ) -> Result<TransientMedia, IngestError> {
        let mut media = TransientMedia::create(submission_id)?;

        let response = self
            .client
            .get(media_url)
            .send()
            .await
            .map_err(|e| IngestError::FatalFetch(format!("media download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::FatalFetch(format!(
                "media download failed with status {status}"
            )));
        }

        let mut stream = response.bytes_stream();
        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| IngestError::FatalFetch(format!("media stream failed: {e}")))?;
            total += chunk.len();
            media.write_chunk(&chunk)?;
        }

        debug!(path = %media.path().display(), "Transient media file written");
        info!(bytes = total, "Media download complete");
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_media_is_deleted_on_drop() {
        let id = Uuid::new_v4();
        let mut media = TransientMedia::create(id).unwrap();
        media.write_chunk(b"fake video bytes").unwrap();
        let path = media.path_buf();
        assert!(path.exists());
        assert_eq!(media.read().unwrap(), b"fake video bytes");

        drop(media);
        assert!(!path.exists(), "transient file must not outlive its owner");
    }

    #[test]
    fn transient_media_path_carries_submission_id() {
        let id = Uuid::new_v4();
        let media = TransientMedia::create(id).unwrap();
        let name = media.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(&format!("video_{id}")));
        assert!(name.ends_with(".mp4"));
    }
}
