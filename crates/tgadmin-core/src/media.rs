//! Media attachment types.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME types accepted as documents.
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Coarse media class of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Classify a MIME type. Returns `None` for types outside the allowed classes.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        let essence = mime.split(';').next().unwrap_or_default().trim();

        if essence.starts_with("image/") {
            Some(Self::Image)
        } else if essence.starts_with("video/") {
            Some(Self::Video)
        } else if essence.starts_with("audio/") {
            Some(Self::Audio)
        } else if DOCUMENT_MIME_TYPES.contains(&essence) {
            Some(Self::Document)
        } else {
            None
        }
    }

    /// Like `from_mime`, but reports the rejected type.
    pub fn classify(mime: &str) -> Result<Self> {
        Self::from_mime(mime).ok_or_else(|| CoreError::UnsupportedMedia(mime.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Document => "Document",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Media file uploaded to the API and attached to an advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    pub name: String,
    pub kind: MediaKind,
    pub mime_type: String,
    /// Size of the local file in bytes, counted against the total-size cap.
    #[serde(default)]
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wildcard_classes() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("audio/mpeg"), Some(MediaKind::Audio));
    }

    #[test]
    fn test_classify_documents() {
        assert_eq!(
            MediaKind::from_mime("application/pdf"),
            Some(MediaKind::Document)
        );
        assert_eq!(
            MediaKind::from_mime("text/plain; charset=utf-8"),
            Some(MediaKind::Document)
        );
    }

    #[test]
    fn test_classify_rejects_other_types() {
        assert_eq!(MediaKind::from_mime("application/zip"), None);
        assert!(MediaKind::classify("application/x-msdownload").is_err());
    }
}
