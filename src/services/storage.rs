use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::misc::get_file_extension;
use crate::utils::time::current_timestamp_millis;

// svg stays out: objects are served same-origin
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];
const DEFAULT_EXTENSION: &str = "jpg";

/// Public bucket on the local filesystem. Objects are served read-only under
/// `/storage/<bucket>/...`.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl ObjectStorage {
    pub fn new(
        root: impl Into<PathBuf>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        ObjectStorage {
            root: root.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        ObjectStorage::new(
            &config.storage_dir,
            &config.storage_bucket,
            &config.public_base_url,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    pub async fn ensure_bucket(&self) -> AppResult<()> {
        fs::create_dir_all(self.bucket_dir().join("images")).await?;
        info!("Storage bucket ready at {}", self.bucket_dir().display());
        Ok(())
    }

    /// `images/<section>-<field>-<millis>.<ext>`. Uploads without an
    /// extension are stored as jpg; anything but a known image type is refused.
    pub fn image_path(
        section: &str,
        field: &str,
        filename: Option<&str>,
        millis: i64,
    ) -> AppResult<String> {
        let ext = filename
            .and_then(get_file_extension)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported image type: .{}",
                ext
            )));
        }

        Ok(format!("images/{}-{}-{}.{}", section, field, millis, ext))
    }

    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.public_base_url, self.bucket, object_path
        )
    }

    /// Store an image for a content field and return its object path.
    pub async fn upload_image(
        &self,
        section: &str,
        field: &str,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<String> {
        let object_path = Self::image_path(section, field, filename, current_timestamp_millis())?;
        self.upload(&object_path, bytes).await?;
        Ok(object_path)
    }

    /// Write a new object. An existing object at the same path is replaced
    /// once; a second collision is reported as an error.
    pub async fn upload(&self, object_path: &str, bytes: &[u8]) -> AppResult<()> {
        let target = self.object_file(object_path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(map_io)?;
        }

        match write_new(&target, bytes).await {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Object {} already exists, replacing", object_path);
                fs::remove_file(&target).await.map_err(map_io)?;
                write_new(&target, bytes).await.map_err(map_io)?;
            }
            other => other.map_err(map_io)?,
        }

        info!("Stored object {} ({} bytes)", object_path, bytes.len());
        Ok(())
    }

    pub async fn remove(&self, object_path: &str) -> AppResult<()> {
        let target = self.object_file(object_path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(format!(
                "Object {} not found",
                object_path
            ))),
            Err(e) => Err(map_io(e)),
        }
    }

    fn object_file(&self, object_path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(object_path);
        let safe = !object_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));
        if !safe {
            return Err(AppError::BadRequest(format!(
                "Invalid object path: {}",
                object_path
            )));
        }
        Ok(self.bucket_dir().join(relative))
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}

fn map_io(err: std::io::Error) -> AppError {
    if err.kind() == ErrorKind::PermissionDenied {
        AppError::policy_denied("storage")
    } else {
        AppError::Io(err)
    }
}
