//! Photo upload fan-out with rollback

use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{BookingError, BookingResult, StoreError},
    store::BlobStore,
};

/// A photo as submitted by a client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A stored object and the URL it is served from
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedBlob {
    pub path: String,
    pub url: String,
}

/// Per-submission upload limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_reservation_photos: usize,
    pub max_portfolio_photos: usize,
    pub max_photo_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_reservation_photos: 5,
            max_portfolio_photos: 20,
            max_photo_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Uploads photo batches to a [`BlobStore`]
#[derive(Clone)]
pub struct PhotoUploader {
    blobs: Arc<dyn BlobStore>,
    limits: UploadLimits,
}

impl PhotoUploader {
    pub fn new(blobs: Arc<dyn BlobStore>, limits: UploadLimits) -> Self {
        Self { blobs, limits }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Reject a batch before anything is sent to the blob store
    pub fn validate(&self, photos: &[PhotoUpload], max_files: usize) -> BookingResult<()> {
        if photos.len() > max_files {
            return Err(BookingError::Validation(format!(
                "사진은 최대 {}장까지 업로드할 수 있습니다.",
                max_files
            )));
        }

        for photo in photos {
            if photo.data.is_empty() {
                return Err(BookingError::Validation(format!(
                    "빈 파일은 업로드할 수 없습니다: {}",
                    photo.file_name
                )));
            }
            if !photo.content_type.starts_with("image/") {
                return Err(BookingError::Validation(format!(
                    "이미지 파일만 업로드할 수 있습니다: {}",
                    photo.file_name
                )));
            }
            if photo.data.len() > self.limits.max_photo_bytes {
                return Err(BookingError::Validation(format!(
                    "파일이 너무 큽니다: {}",
                    photo.file_name
                )));
            }
        }

        Ok(())
    }

    /// Upload every photo under `prefix` concurrently
    ///
    /// Results keep submission order. If any upload fails, the ones that
    /// succeeded are deleted and the first failure is returned.
    pub async fn upload_all(
        &self,
        prefix: &str,
        photos: Vec<PhotoUpload>,
    ) -> BookingResult<Vec<UploadedBlob>> {
        if photos.is_empty() {
            return Ok(Vec::new());
        }

        info!("Uploading {} photos under {}", photos.len(), prefix);

        let millis = Utc::now().timestamp_millis();
        let uploads = photos.into_iter().enumerate().map(|(index, photo)| {
            let path = format!(
                "{}/{}_{}_{}",
                prefix,
                millis,
                index,
                sanitize_file_name(&photo.file_name)
            );
            let blobs = Arc::clone(&self.blobs);
            async move {
                blobs
                    .put(&path, photo.data, &photo.content_type)
                    .await
                    .map(|url| UploadedBlob { path, url })
            }
        });

        let results = join_all(uploads).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failure: Option<StoreError> = None;
        for result in results {
            match result {
                Ok(blob) => stored.push(blob),
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        match failure {
            None => Ok(stored),
            Some(e) => {
                warn!(
                    "Photo upload under {} failed, removing {} uploaded objects: {}",
                    prefix,
                    stored.len(),
                    e
                );
                self.discard(&stored).await;
                Err(BookingError::Transient(e))
            }
        }
    }

    /// Upload a single object at an exact path
    pub async fn upload_one(&self, path: String, photo: PhotoUpload) -> BookingResult<UploadedBlob> {
        self.validate(std::slice::from_ref(&photo), 1)?;
        let url = self
            .blobs
            .put(&path, photo.data, &photo.content_type)
            .await?;
        Ok(UploadedBlob { path, url })
    }

    /// Best-effort removal; failures are logged and swallowed
    pub async fn discard(&self, blobs: &[UploadedBlob]) {
        let deletions = blobs.iter().map(|blob| self.blobs.delete(&blob.path));
        for (blob, result) in blobs.iter().zip(join_all(deletions).await) {
            if let Err(e) = result {
                warn!("Failed to remove orphaned blob {}: {}", blob.path, e);
            }
        }
    }
}

/// Keep letters, digits, dot, dash and underscore; everything else becomes `_`
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}
