//! Company logo upload through the auth service's storage endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Images above 1 MiB are rejected before any upload is attempted.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const IMAGE_FIELD: &str = "imgfile";
const IMAGE_MIME: &str = "application/png";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage endpoint returned status {0}")]
    Status(u16),

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

pub fn check_size(size: usize) -> Result<(), StorageError> {
    if size > MAX_IMAGE_BYTES {
        return Err(StorageError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// `{company_id}_{six digits}`
pub fn image_id(company_id: &str) -> String {
    let suffix = 100_000 + (Uuid::new_v4().as_u128() % 900_000);
    format!("{company_id}_{suffix}")
}

/// Stores an image under `image_id` and returns its public URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, image_id: &str, bytes: Bytes) -> Result<String, StorageError>;
}

/// Multipart `POST {AUTH_URL}/storage/store-image`; the file then lives at
/// `{IMAGE_BUCKET_URL}/{image_id}.png`.
pub struct HttpImageStore {
    client: Client,
    auth_url: String,
    bucket_url: String,
}

impl HttpImageStore {
    pub fn new(client: Client, auth_url: String, bucket_url: String) -> Self {
        Self {
            client,
            auth_url,
            bucket_url,
        }
    }

    pub fn public_url(&self, image_id: &str) -> String {
        format!("{}/{image_id}.png", self.bucket_url)
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn store(&self, image_id: &str, bytes: Bytes) -> Result<String, StorageError> {
        check_size(bytes.len())?;

        let part = Part::bytes(bytes.to_vec())
            .file_name(format!("{image_id}.png"))
            .mime_str(IMAGE_MIME)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(format!("{}/storage/store-image", self.auth_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("store-image for {image_id} returned {status}");
            return Err(StorageError::Status(status.as_u16()));
        }

        debug!("stored image {image_id}");
        Ok(self.public_url(image_id))
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records uploads and answers with a bucket URL, or fails every call.
    #[derive(Default)]
    pub struct RecordingImageStore {
        stored: Mutex<Vec<(String, usize)>>,
        fail: bool,
    }

    impl RecordingImageStore {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn stored(&self) -> Vec<(String, usize)> {
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageStore for RecordingImageStore {
        async fn store(&self, image_id: &str, bytes: Bytes) -> Result<String, StorageError> {
            check_size(bytes.len())?;
            if self.fail {
                return Err(StorageError::Status(500));
            }
            self.stored
                .lock()
                .unwrap()
                .push((image_id.to_string(), bytes.len()));
            Ok(format!("https://bucket.test/{image_id}.png"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_has_six_digit_suffix() {
        for _ in 0..50 {
            let id = image_id("c1");
            let (company, suffix) = id.split_once('_').unwrap();
            assert_eq!(company, "c1");
            assert_eq!(suffix.len(), 6);
            let n: u32 = suffix.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn test_size_limit_is_one_mebibyte() {
        assert!(check_size(MAX_IMAGE_BYTES).is_ok());
        assert!(matches!(
            check_size(MAX_IMAGE_BYTES + 1),
            Err(StorageError::TooLarge { limit: MAX_IMAGE_BYTES, .. })
        ));
    }

    #[test]
    fn test_public_url_uses_bucket() {
        let store = HttpImageStore::new(
            Client::new(),
            "http://auth.test".to_string(),
            "https://storage.googleapis.com/eden_companies_images".to_string(),
        );
        assert_eq!(
            store.public_url("c1_123456"),
            "https://storage.googleapis.com/eden_companies_images/c1_123456.png"
        );
    }
}
