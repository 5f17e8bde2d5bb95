use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Multipart field '{0}' is required")]
    MissingFile(&'static str),

    #[error("Invalid multipart payload: {0}")]
    Multipart(String),

    #[error("Upload exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Writes uploaded files under generated names and builds their public URLs.
pub struct UploadService {
    dir: PathBuf,
    public_base_url: Option<Url>,
    max_upload_bytes: usize,
}

impl UploadService {
    pub fn new(config: &AppConfig) -> Result<Self, UploadError> {
        let public_base_url = config
            .server
            .public_base_url
            .as_deref()
            .map(|base| Url::parse(base).map_err(|e| UploadError::InvalidBaseUrl(format!("{}: {}", base, e))))
            .transpose()?;

        Ok(Self {
            dir: config.uploads.dir.clone(),
            public_base_url,
            max_upload_bytes: config.uploads.max_upload_bytes,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store `bytes` under a fresh name and return that name. Never overwrites.
    pub async fn store(&self, original_filename: Option<&str>, bytes: &[u8]) -> Result<String, UploadError> {
        self.ensure_dir().await?;

        loop {
            let stored = generate_filename(original_filename);
            let path = self.dir.join(&stored);
            let mut file = match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;

            info!("Stored upload {} ({} bytes)", stored, bytes.len());
            return Ok(stored);
        }
    }

    /// Remove files stored earlier in a request that then failed.
    pub async fn discard(&self, stored: &[String]) {
        for name in stored {
            match tokio::fs::remove_file(self.dir.join(name)).await {
                Ok(()) => info!("Discarded upload {}", name),
                Err(e) => warn!("Could not discard upload {}: {}", name, e),
            }
        }
    }

    /// `<base>/uploads/<stored>`; base falls back to `http://<host>`.
    pub fn public_url(&self, stored: &str, host: Option<&str>) -> Result<String, UploadError> {
        let mut url = match &self.public_base_url {
            Some(base) => base.clone(),
            None => {
                let host = host.unwrap_or("localhost");
                Url::parse(&format!("http://{}", host))
                    .map_err(|e| UploadError::InvalidBaseUrl(format!("{}: {}", host, e)))?
            }
        };

        if url.cannot_be_a_base() {
            return Err(UploadError::InvalidBaseUrl(url.to_string()));
        }
        url.path_segments_mut()
            .map_err(|_| UploadError::InvalidBaseUrl(stored.to_string()))?
            .pop_if_empty()
            .push("uploads")
            .push(stored);
        Ok(url.to_string())
    }
}

/// Random UUIDv4 name keeping the original extension when it is ASCII alphanumeric.
pub fn generate_filename(original_filename: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match original_filename.and_then(extension) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn extension(filename: &str) -> Option<&str> {
    let base = filename.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(filename);
    let (_, ext) = base.rsplit_once('.')?;
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &Path, base: Option<&str>) -> UploadService {
        let mut config = AppConfig::development();
        config.uploads.dir = dir.to_path_buf();
        config.server.public_base_url = base.map(str::to_string);
        UploadService::new(&config).unwrap()
    }

    #[test]
    fn keeps_only_safe_extensions() {
        assert!(generate_filename(Some("report.final.pdf")).ends_with(".pdf"));
        assert!(generate_filename(Some("dir/notes.MD")).ends_with(".MD"));
        assert!(!generate_filename(Some("evil.p/h")).contains('.'));
        assert!(!generate_filename(Some("archive.tar-gz")).contains('.'));
        assert!(!generate_filename(Some("README")).contains('.'));
        assert!(!generate_filename(Some("trailing.")).contains('.'));
        assert!(!generate_filename(None).contains('.'));
        assert_eq!(generate_filename(None).len(), 36);
    }

    #[test]
    fn builds_urls_from_host_or_configured_base() {
        let tmp = tempfile::tempdir().unwrap();
        let from_host = service(tmp.path(), None);
        assert_eq!(
            from_host.public_url("a.pdf", Some("example.com:8080")).unwrap(),
            "http://example.com:8080/uploads/a.pdf"
        );

        let from_config = service(tmp.path(), Some("https://cdn.example.com/journal"));
        assert_eq!(
            from_config.public_url("a.pdf", Some("ignored")).unwrap(),
            "https://cdn.example.com/journal/uploads/a.pdf"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let mut config = AppConfig::development();
        config.server.public_base_url = Some("not a url".to_string());
        assert!(matches!(UploadService::new(&config), Err(UploadError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn same_original_name_gets_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = service(&tmp.path().join("nested"), None);

        let first = uploads.store(Some("photo.png"), b"one").await.unwrap();
        let second = uploads.store(Some("photo.png"), b"two").await.unwrap();
        assert_ne!(first, second);

        let dir = tmp.path().join("nested");
        assert_eq!(tokio::fs::read(dir.join(&first)).await.unwrap(), b"one");
        assert_eq!(tokio::fs::read(dir.join(&second)).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn discard_removes_stored_files() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = service(tmp.path(), None);
        let kept = uploads.store(Some("keep.txt"), b"keep").await.unwrap();
        let dropped = uploads.store(Some("drop.txt"), b"drop").await.unwrap();

        uploads.discard(&[dropped.clone(), "never-stored.txt".to_string()]).await;
        assert!(tmp.path().join(&kept).exists());
        assert!(!tmp.path().join(&dropped).exists());
    }

    #[tokio::test]
    async fn empty_payload_is_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = service(tmp.path(), None);
        let stored = uploads.store(Some("empty.txt"), b"").await.unwrap();
        assert!(tokio::fs::read(tmp.path().join(stored)).await.unwrap().is_empty());
    }
}
