//! ads list|create|broadcast|status and media upload|delete.

use super::loaded;
use crate::app::Application;
use crate::cli::{AdsCommand, MediaCommand};
use crate::error::{AppError, AppResult};
use crate::output::{paint, table, timestamp};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tgadmin_core::{AdvertisementId, BotId};
use tgadmin_dashboard::views::{AdvertisementForm, AdvertisingView, MediaFile, MediaUpload};
use tracing::debug;

pub async fn run(app: &Application, command: AdsCommand) -> AppResult<()> {
    let view = AdvertisingView::new(app.ctx().clone());
    match command {
        AdsCommand::List => {
            let ads = loaded(view.load().await)?;
            if ads.is_empty() {
                println!("No advertisements yet");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = ads
                .iter()
                .map(|ad| {
                    vec![
                        ad.id.to_string(),
                        ad.display_title().to_string(),
                        ad.price.display_usd(),
                        ad.status.to_string(),
                        ad.target_bots.len().to_string(),
                        timestamp(ad.scheduled_for),
                    ]
                })
                .collect();
            println!(
                "{}",
                table(
                    &["ID", "TITLE", "PRICE", "STATUS", "BOTS", "SCHEDULED"],
                    &rows
                )
            );
            Ok(())
        }
        AdsCommand::Create {
            title,
            content,
            price,
            bots,
            schedule,
            media,
        } => {
            let scheduled_for = schedule.as_deref().map(parse_schedule).transpose()?;
            let upload = MediaUpload::new(app.ctx().clone(), app.config().media.clone());
            if !media.is_empty() {
                upload.upload(read_files(media).await?).await?;
            }

            let mut form = AdvertisementForm::new(upload);
            form.input.title = title;
            form.input.content = content;
            form.input.price = price;
            form.input.target_bots = bots.into_iter().map(BotId).collect();
            form.input.scheduled_for = scheduled_for;

            let ad = form.submit(&view).await?;
            println!(
                "Created advertisement {} ({}) for {} bot(s)",
                ad.id,
                ad.price.display_usd(),
                ad.target_bots.len()
            );
            Ok(())
        }
        AdsCommand::Broadcast { id } => {
            loaded(view.load().await)?;
            view.broadcast(AdvertisementId(id)).await?;
            Ok(())
        }
        AdsCommand::Status { id } => {
            let status = view.refresh_status(AdvertisementId(id)).await?;
            println!("Advertisement {id} is {}", paint(status.as_str(), status.color()));
            Ok(())
        }
    }
}

pub async fn media(app: &Application, command: MediaCommand) -> AppResult<()> {
    match command {
        MediaCommand::Upload { files } => {
            let upload = MediaUpload::new(app.ctx().clone(), app.config().media.clone());
            let result = upload.upload(read_files(files).await?).await;
            // Entries uploaded before a failure are kept and listed.
            for attachment in upload.files() {
                println!("{}\t{}\t{}", attachment.kind, attachment.name, attachment.url);
            }
            result?;
            Ok(())
        }
        MediaCommand::Delete { url } => {
            let ctx = app.ctx();
            ctx.api()
                .delete_media(&url)
                .await
                .map_err(|e| ctx.navigator().handle_api_error(e, "Failed to delete file"))?;
            ctx.notifications().success("File deleted successfully");
            Ok(())
        }
    }
}

async fn read_files(paths: Vec<PathBuf>) -> AppResult<Vec<MediaFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = MediaFile::from_path(&path).await.map_err(|e| {
            AppError::Invalid(format!("Cannot read {}: {e}", path.display()))
        })?;
        debug!(name = %file.name, mime = %file.mime_type, size = file.size(), "Read media file");
        files.push(file);
    }
    Ok(files)
}

fn parse_schedule(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::Invalid(format!("Invalid schedule time {value:?}: {e}")))
}
