//! Media attachments for the advertisement form.
//!
//! A batch is checked as a whole before anything is sent: count, per-file
//! size, total size of attached plus incoming files, and MIME class. Files then upload one at a time. Entries
//! uploaded before a failure are kept, and the failure is reported once.

use crate::config::{format_size, MediaLimits};
use crate::context::ViewContext;
use crate::error::{DashboardError, DashboardResult, MediaError};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tgadmin_api::guess_mime;
use tgadmin_core::{MediaAttachment, MediaKind};
use tracing::{debug, info, warn};

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, guess_mime(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Default)]
struct UploadState {
    files: Vec<MediaAttachment>,
    uploading: bool,
}

#[derive(Debug, Clone)]
pub struct MediaUpload {
    ctx: ViewContext,
    limits: MediaLimits,
    state: Arc<RwLock<UploadState>>,
}

impl MediaUpload {
    pub fn new(ctx: ViewContext, limits: MediaLimits) -> Self {
        Self {
            ctx,
            limits,
            state: Arc::new(RwLock::new(UploadState::default())),
        }
    }

    pub fn limits(&self) -> &MediaLimits {
        &self.limits
    }

    pub fn files(&self) -> Vec<MediaAttachment> {
        self.state.read().files.clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.state.read().uploading
    }

    pub fn remaining_slots(&self) -> usize {
        self.limits
            .max_files
            .saturating_sub(self.state.read().files.len())
    }

    /// Accepting more files is disabled while uploading or when full.
    pub fn accepts_files(&self) -> bool {
        !self.is_uploading() && self.remaining_slots() > 0
    }

    /// Forget local entries without touching the server.
    pub fn clear(&self) {
        self.state.write().files.clear();
    }

    /// Check a batch against the limits. Nothing is sent.
    pub fn check(&self, batch: &[MediaFile]) -> Result<(), MediaError> {
        if batch.is_empty() {
            return Err(MediaError::NoFiles);
        }
        let (existing, attached_size) = {
            let state = self.state.read();
            (
                state.files.len(),
                state.files.iter().map(|f| f.size).sum::<u64>(),
            )
        };
        if existing + batch.len() > self.limits.max_files {
            return Err(MediaError::TooManyFiles {
                max: self.limits.max_files,
            });
        }
        for file in batch {
            if file.size() > self.limits.max_file_size {
                return Err(MediaError::FileTooLarge {
                    name: file.name.clone(),
                    limit: format_size(self.limits.max_file_size),
                });
            }
            if MediaKind::from_mime(&file.mime_type).is_none() {
                return Err(MediaError::UnsupportedType {
                    name: file.name.clone(),
                    mime: file.mime_type.clone(),
                });
            }
        }
        if let Some(max_total) = self.limits.max_total_size {
            let total = attached_size + batch.iter().map(MediaFile::size).sum::<u64>();
            if total > max_total {
                return Err(MediaError::TotalTooLarge {
                    limit: format_size(max_total),
                });
            }
        }
        Ok(())
    }

    /// Upload a batch and append the resulting attachments.
    pub async fn upload(&self, batch: Vec<MediaFile>) -> DashboardResult<Vec<MediaAttachment>> {
        self.check(&batch)?;
        {
            let mut state = self.state.write();
            if state.uploading {
                return Err(DashboardError::Busy("An upload is already in progress".into()));
            }
            state.uploading = true;
        }

        let mut uploaded = Vec::with_capacity(batch.len());
        let mut failure = None;
        for file in batch {
            let size = file.size();
            let MediaFile {
                name,
                mime_type,
                bytes,
            } = file;
            match self.ctx.api().upload_media(&name, &mime_type, bytes).await {
                Ok(media) => {
                    let attachment = media.into_attachment(&name, size);
                    debug!(name = %attachment.name, url = %attachment.url, "File uploaded");
                    self.state.write().files.push(attachment.clone());
                    uploaded.push(attachment);
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "Upload failed");
                    failure = Some(e);
                    break;
                }
            }
        }
        self.state.write().uploading = false;

        match failure {
            None => {
                info!(count = uploaded.len(), "Media batch uploaded");
                self.ctx.notifications().success("Files uploaded successfully");
                Ok(uploaded)
            }
            Some(e) if e.is_unauthorized() => Err(self.ctx.action_failed(e, "Failed to upload files")),
            Some(_) => {
                let message = "Failed to upload files";
                self.ctx.notifications().error(message);
                Err(DashboardError::Request(message.to_string()))
            }
        }
    }

    /// Delete the remote file, then the local entry. On failure the list
    /// is left as it was.
    pub async fn delete(&self, index: usize) -> DashboardResult<MediaAttachment> {
        let target = self
            .state
            .read()
            .files
            .get(index)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(format!("attachment {index}")))?;

        if let Err(e) = self.ctx.api().delete_media(&target.url).await {
            return Err(self.ctx.action_failed(e, "Failed to delete file"));
        }

        // Remove by URL; the list may have shifted while the request ran.
        self.state.write().files.retain(|f| f.url != target.url);
        self.ctx.notifications().success("File deleted successfully");
        Ok(target)
    }
}
