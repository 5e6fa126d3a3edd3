use crate::model::DownloadError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::Path;
use tracing::debug;

/// Saves an image URL to a local file, replacing whatever was there.
#[async_trait::async_trait]
pub trait ImageDownloader: Send + Sync {
    /// Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// Downloads with no timeout; a failed request leaves `dest` untouched.
/// `data:` URLs are decoded locally instead of being requested.
pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let http_err = |source: reqwest::Error| DownloadError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(bytes.to_vec())
    }
}

/// Payload of a `data:[<mediatype>][;base64],<data>` URL, or `None` for any other scheme.
pub fn decode_data_url(url: &str) -> Option<Result<Vec<u8>, DownloadError>> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])?;
    let Some((meta, payload)) = rest.split_once(',') else {
        return Some(Err(DownloadError::InvalidDataUrl));
    };
    let raw: Vec<u8> = percent_decode_str(payload).collect();
    if meta.to_ascii_lowercase().ends_with(";base64") {
        let cleaned: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
        Some(STANDARD.decode(cleaned).map_err(|_| DownloadError::InvalidDataUrl))
    } else {
        Some(Ok(raw))
    }
}

#[async_trait::async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let bytes = match decode_data_url(url) {
            Some(decoded) => decoded?,
            None => self.fetch_bytes(url).await?,
        };

        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: dest.display().to_string(),
                source,
            })?;
        debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use crate::test_support::spawn_server;

    fn png_bytes(_path: &str, _head: &str) -> Vec<u8> {
        b"\x89PNG\r\n\x1a\nfake".to_vec()
    }

    #[tokio::test]
    async fn writes_image_and_overwrites_existing() {
        let base = spawn_server(png_bytes).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cover.png");
        std::fs::write(&dest, b"old contents that are longer").unwrap();

        let downloader = HttpImageDownloader::new(DEFAULT_USER_AGENT).unwrap();
        let written = downloader
            .download(&format!("{}/img/cover.png", base), &dest)
            .await
            .unwrap();

        assert_eq!(written, 12);
        assert_eq!(std::fs::read(&dest).unwrap(), png_bytes("", ""));
    }

    #[tokio::test]
    async fn http_error_is_reported_and_nothing_written() {
        let base = spawn_server(png_bytes).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gone.png");

        let downloader = HttpImageDownloader::new(DEFAULT_USER_AGENT).unwrap();
        let err = downloader
            .download(&format!("{}/missing.png", base), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Http { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn base64_data_url_is_decoded_locally() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("inline.jpg");

        let downloader = HttpImageDownloader::new(DEFAULT_USER_AGENT).unwrap();
        let written = downloader
            .download("data:image/png;base64,iVBORw0K\nGgo=", &dest)
            .await
            .unwrap();

        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&dest).unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn percent_encoded_data_url() {
        let bytes = decode_data_url("DATA:image/svg+xml,%3Csvg%2F%3E").unwrap().unwrap();
        assert_eq!(bytes, b"<svg/>");
        assert!(decode_data_url("https://cdn.example/a.png").is_none());
    }

    #[tokio::test]
    async fn malformed_data_url_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bad.jpg");
        let downloader = HttpImageDownloader::new(DEFAULT_USER_AGENT).unwrap();

        for url in ["data:image/png;base64,***", "data:no-comma"] {
            let err = downloader.download(url, &dest).await.unwrap_err();
            assert!(matches!(err, DownloadError::InvalidDataUrl), "{}", url);
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_is_io_error() {
        let base = spawn_server(png_bytes).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no-such-dir").join("a.png");

        let downloader = HttpImageDownloader::new(DEFAULT_USER_AGENT).unwrap();
        let err = downloader
            .download(&format!("{}/a.png", base), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Io { .. }));
    }
}
