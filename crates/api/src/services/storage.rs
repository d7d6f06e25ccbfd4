//! Media file storage.
//!
//! Uploaded files land under the configured media directory as
//! `<category>/<uuid>_<sanitized-name>`. The stored relative path is
//! what gets persisted and later served from the public media URL.

use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduces a client-supplied file name to a safe component: the base
/// name only, with anything outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_'].as_ref()).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Writes file data under `<media_dir>/<category>/` and returns the
/// stored path relative to the media directory.
pub async fn save_file(
    media_dir: &str,
    category: &str,
    original_name: &str,
    data: &[u8],
) -> Result<String, StorageError> {
    let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(original_name));
    let relative = format!("{}/{}", category, file_name);

    let dir = Path::new(media_dir).join(category);
    tokio::fs::create_dir_all(&dir).await?;

    let mut file = tokio::fs::File::create(dir.join(&file_name)).await?;
    file.write_all(data).await?;
    file.flush().await?;

    Ok(relative)
}

/// Public URL for a stored relative path.
pub fn public_url(base_url: &str, stored_path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), stored_path)
}

/// Resolves a requested media path against the media directory.
///
/// Returns None when the path would escape the media directory.
pub fn resolve_media_path(media_dir: &str, requested: &str) -> Option<PathBuf> {
    let requested = Path::new(requested);
    for component in requested.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }
    Some(Path::new(media_dir).join(requested))
}

/// Content type for a stored file, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("/tmp/photo.jpg"), "photo.jpg");
    }

    #[test]
    fn test_sanitize_file_name_replaces_odd_characters() {
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
    }

    #[test]
    fn test_sanitize_file_name_never_empty() {
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn test_public_url_joins_cleanly() {
        assert_eq!(
            public_url("/media", "passports/abc_photo.jpg"),
            "/media/passports/abc_photo.jpg"
        );
        assert_eq!(
            public_url("/media/", "passports/abc_photo.jpg"),
            "/media/passports/abc_photo.jpg"
        );
    }

    #[test]
    fn test_resolve_media_path_allows_nested() {
        let path = resolve_media_path("media", "passports/abc.jpg").unwrap();
        assert_eq!(path, PathBuf::from("media/passports/abc.jpg"));
    }

    #[test]
    fn test_resolve_media_path_rejects_traversal() {
        assert!(resolve_media_path("media", "../secret").is_none());
        assert!(resolve_media_path("media", "a/../../secret").is_none());
        assert!(resolve_media_path("media", "/etc/passwd").is_none());
    }

    #[test]
    fn test_content_type_for_common_extensions() {
        assert_eq!(content_type_for("a/b.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a/b.PNG"), "image/png");
        assert_eq!(content_type_for("a/b.pdf"), "application/pdf");
        assert_eq!(content_type_for("a/b.unknown"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_save_file_writes_under_category() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let media_dir = dir.to_str().unwrap();

        let stored = save_file(media_dir, "passports", "photo.jpg", b"data")
            .await
            .unwrap();
        assert!(stored.starts_with("passports/"));
        assert!(stored.ends_with("_photo.jpg"));

        let on_disk = tokio::fs::read(dir.join(&stored)).await.unwrap();
        assert_eq!(on_disk, b"data");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
