use axum::body::Bytes;
use image::ImageFormat;
use reqwest::{Client, Url};

/// Check that the bytes look like an image we can forward to providers.
pub fn sniff_format(data: &[u8]) -> Result<ImageFormat, FetchError> {
    image::guess_format(data).map_err(|_| FetchError::UnsupportedFormat)
}

/// Download an image over HTTP(S), refusing bodies above `max_bytes`.
///
/// The returned buffer is owned by the caller; nothing is written to disk.
pub async fn fetch_image(http: &Client, url: &str, max_bytes: usize) -> Result<Bytes, FetchError> {
    let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }

    let mut response = http.get(url).send().await?.error_for_status()?;

    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(FetchError::TooLarge { max_bytes });
        }
    }

    // Content-Length can be absent or wrong; enforce the cap while reading.
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Err(FetchError::TooLarge { max_bytes });
        }
        body.extend_from_slice(&chunk);
    }

    tracing::debug!(bytes = body.len(), "Fetched image");

    let body = Bytes::from(body);
    sniff_format(&body)?;
    Ok(body)
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("failed to fetch image: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,
}
