//! Storage of uploaded car photos on the local filesystem

use std::{
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::fs;
use uuid::Uuid;

/// Extensions accepted for photos, with the MIME types that may accompany them
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("jpg", &["image/jpeg", "image/jpg", "image/pjpeg"]),
    ("jpeg", &["image/jpeg", "image/jpg", "image/pjpeg"]),
    ("png", &["image/png"]),
    ("webp", &["image/webp"]),
    ("gif", &["image/gif"]),
];

/// Public path prefix of stored files
pub const UPLOADS_PATH: &str = "/uploads";

/// Directory of uploaded photos plus the base URL they are served from
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_url: Option<String>,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: Option<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.map(|url| url.trim_end_matches('/').to_string()),
            max_bytes,
        }
    }

    /// Create the upload directory if needed
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write a photo under a fresh unique name and return that name
    pub async fn save(&self, extension: &str, data: &[u8]) -> io::Result<String> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let file_name = format!("photo-{}-{}.{}", millis, Uuid::new_v4().simple(), extension);

        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&file_name), data).await?;
        Ok(file_name)
    }

    /// Absolute URL of a stored photo
    ///
    /// Uses the configured public URL, else `http://<host>` from the request.
    pub fn url_for(&self, file_name: &str, host: Option<&str>) -> String {
        let base = match (&self.public_url, host) {
            (Some(url), _) => url.clone(),
            (None, Some(host)) => format!("http://{}", host),
            (None, None) => String::new(),
        };
        format!("{}{}/{}", base, UPLOADS_PATH, file_name)
    }
}

/// Normalized extension of an acceptable image upload
///
/// Both the file name extension and the declared MIME type must name the
/// same image format.
pub fn image_extension(file_name: &str, content_type: Option<&str>) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    let content_type = content_type?.trim().to_ascii_lowercase();

    IMAGE_TYPES
        .iter()
        .find(|(ext, mimes)| *ext == extension && mimes.contains(&content_type.as_str()))
        .map(|(ext, _)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_accepts_images() {
        assert_eq!(image_extension("car.JPG", Some("image/jpeg")), Some("jpg"));
        assert_eq!(image_extension("car.jpeg", Some("image/jpeg")), Some("jpeg"));
        assert_eq!(image_extension("front.png", Some("image/png")), Some("png"));
        assert_eq!(image_extension("side.webp", Some("image/webp")), Some("webp"));
        assert_eq!(image_extension("spin.gif", Some("image/gif")), Some("gif"));
    }

    #[test]
    fn test_image_extension_rejects_mismatch() {
        assert_eq!(image_extension("notes.txt", Some("text/plain")), None);
        assert_eq!(image_extension("car.png", Some("text/plain")), None);
        assert_eq!(image_extension("script.sh", Some("image/png")), None);
        assert_eq!(image_extension("car.png", Some("image/jpeg")), None);
        assert_eq!(image_extension("car", Some("image/png")), None);
        assert_eq!(image_extension("car.png", None), None);
    }

    #[tokio::test]
    async fn test_save_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), None, 1024);

        let first = store.save("png", b"first").await.unwrap();
        let second = store.save("png", b"second").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("photo-"));
        assert!(first.ends_with(".png"));
        assert_eq!(
            std::fs::read(store.dir().join(&first)).unwrap(),
            b"first".to_vec()
        );
    }

    #[test]
    fn test_url_for() {
        let store = UploadStore::new("uploads", Some("https://cars.example.com/".to_string()), 1);
        assert_eq!(
            store.url_for("photo-1.png", Some("localhost:3001")),
            "https://cars.example.com/uploads/photo-1.png"
        );

        let store = UploadStore::new("uploads", None, 1);
        assert_eq!(
            store.url_for("photo-1.png", Some("localhost:3001")),
            "http://localhost:3001/uploads/photo-1.png"
        );
        assert_eq!(store.url_for("photo-1.png", None), "/uploads/photo-1.png");
    }
}
