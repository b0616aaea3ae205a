//! Cloudinary upload client.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

const ALLOWED_FORMATS: &[&str] = &["image/jpeg", "image/png"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded.")]
    MissingFile,
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("image host is not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload rejected: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
}

impl CloudinaryClient {
    pub fn from_config(config: &CloudinaryConfig) -> Result<Self, UploadError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(UploadError::NotConfigured);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Only jpg and png make it to the host.
    pub fn is_allowed_format(content_type: &str) -> bool {
        ALLOWED_FORMATS.contains(&content_type)
    }

    pub async fn upload(
        &self,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, UploadError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(timestamp);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );
        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Cloudinary signatures hash the sorted upload params concatenated with
    /// the API secret; only `timestamp` is signed here.
    fn sign(&self, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("timestamp={}{}", timestamp, self.api_secret));
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudinaryConfig;

    fn test_config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        }
    }

    #[test]
    fn missing_credentials_are_rejected_at_construction() {
        let config = CloudinaryConfig {
            api_secret: String::new(),
            ..test_config()
        };
        assert!(matches!(
            CloudinaryClient::from_config(&config),
            Err(UploadError::NotConfigured)
        ));
    }

    #[test]
    fn format_allow_list_matches_the_upload_policy() {
        assert!(CloudinaryClient::is_allowed_format("image/jpeg"));
        assert!(CloudinaryClient::is_allowed_format("image/png"));
        assert!(!CloudinaryClient::is_allowed_format("image/gif"));
        assert!(!CloudinaryClient::is_allowed_format("application/pdf"));
    }

    #[test]
    fn signature_is_hex_encoded_sha256() {
        let client = CloudinaryClient::from_config(&test_config()).unwrap();
        let signature = client.sign(1_700_000_000);

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        // Stable for a fixed timestamp and secret.
        assert_eq!(signature, client.sign(1_700_000_000));
    }
}
