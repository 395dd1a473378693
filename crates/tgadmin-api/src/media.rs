//! Media endpoints.

use crate::client::{Ack, ApiClient};
use crate::error::{ApiError, ApiResult};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tgadmin_core::{MediaAttachment, MediaKind};
use tracing::info;

/// Response of `POST /media/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    #[serde(default)]
    pub media_type: Option<String>,
    pub mime_type: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl UploadedMedia {
    /// Attachment record for a successfully uploaded file of `size` bytes.
    pub fn into_attachment(self, fallback_name: &str, size: u64) -> MediaAttachment {
        let kind = MediaKind::from_mime(&self.mime_type)
            .or_else(|| self.media_type.as_deref().and_then(kind_from_label))
            .unwrap_or(MediaKind::Document);
        MediaAttachment {
            url: self.url,
            name: self.filename.unwrap_or_else(|| fallback_name.to_string()),
            kind,
            mime_type: self.mime_type,
            size,
        }
    }
}

fn kind_from_label(label: &str) -> Option<MediaKind> {
    match label {
        "image" | "photo" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        "document" => Some(MediaKind::Document),
        _ => None,
    }
}

/// MIME type for a local file, guessed from its extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    url: &'a str,
}

impl ApiClient {
    /// `POST /media/upload` with the file in multipart field `file`.
    pub async fn upload_media(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<UploadedMedia> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ApiError::InvalidInput(format!("Invalid MIME type {mime_type}: {e}")))?;
        let form = Form::new().part("file", part);

        let uploaded: UploadedMedia = self.post_multipart("media/upload", form).await?;
        info!(file_name, size, url = %uploaded.url, "Media uploaded");
        Ok(uploaded)
    }

    /// `DELETE /media` with `{url}`.
    pub async fn delete_media(&self, url: &str) -> ApiResult<Ack> {
        let ack = self.delete_with_body("media", &DeleteBody { url }).await?;
        info!(url, "Media deleted");
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_attachment() {
        let uploaded = UploadedMedia {
            url: "/media/images/a.png".into(),
            media_type: Some("image".into()),
            mime_type: "image/png".into(),
            filename: Some("a.png".into()),
        };
        let attachment = uploaded.into_attachment("ignored", 2048);
        assert_eq!(attachment.size, 2048);
        assert_eq!(attachment.kind, MediaKind::Image);
        assert_eq!(attachment.name, "a.png");
    }

    #[test]
    fn test_into_attachment_falls_back_to_label() {
        let uploaded = UploadedMedia {
            url: "/media/x".into(),
            media_type: Some("video".into()),
            mime_type: "application/octet-stream".into(),
            filename: None,
        };
        let attachment = uploaded.into_attachment("clip.bin", 0);
        assert_eq!(attachment.kind, MediaKind::Video);
        assert_eq!(attachment.name, "clip.bin");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }
}
