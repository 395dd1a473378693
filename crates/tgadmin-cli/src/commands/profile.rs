//! profile show|keys|create-key|delete-key|password|activity.

use super::{loaded, Prompter};
use crate::app::Application;
use crate::cli::ProfileCommand;
use crate::error::{AppError, AppResult};
use crate::output::{table, timestamp};
use tgadmin_dashboard::views::{PasswordChange, ProfileView};

pub async fn run(app: &Application, command: ProfileCommand) -> AppResult<()> {
    let view = ProfileView::new(app.ctx().clone());
    match command {
        ProfileCommand::Show => {
            let user = loaded(view.load_user().await)?;
            println!("username: {}", user.username);
            if let Some(email) = &user.email {
                println!("email:    {email}");
            }
            if let Some(role) = &user.role {
                println!("role:     {role}");
            }
            println!("joined:   {}", timestamp(user.created_at));
            println!("last:     {}", timestamp(user.last_login));

            let settings = loaded(view.load_settings().await)?;
            println!();
            println!("theme:    {}", settings.theme);
            println!("timezone: {}", settings.timezone);
            println!("language: {}", settings.language);
            Ok(())
        }
        ProfileCommand::Keys => {
            let keys = loaded(view.load_api_keys().await)?;
            if keys.is_empty() {
                println!("No API keys");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = keys
                .iter()
                .map(|k| {
                    vec![
                        k.id.to_string(),
                        k.name.clone(),
                        timestamp(k.created_at),
                        timestamp(k.last_used_at),
                        timestamp(k.expires_at),
                    ]
                })
                .collect();
            println!(
                "{}",
                table(&["ID", "NAME", "CREATED", "LAST USED", "EXPIRES"], &rows)
            );
            Ok(())
        }
        ProfileCommand::CreateKey { name } => {
            let created = view.create_api_key(&name).await?;
            println!("{}", created.key);
            eprintln!("Key {} ({}) is shown only once.", created.key_id, created.name);
            Ok(())
        }
        ProfileCommand::DeleteKey { id } => {
            view.delete_api_key(id).await?;
            Ok(())
        }
        ProfileCommand::Password => {
            let mut prompter = Prompter::new();
            let form = PasswordChange {
                current: prompter.ask("Current password").await?,
                new: prompter.ask("New password").await?,
                confirm: prompter.ask("Confirm new password").await?,
            };
            view.change_password(&form).await?;
            Ok(())
        }
        ProfileCommand::Settings {
            theme,
            timezone,
            language,
        } => {
            let mut settings = loaded(view.load_settings().await)?;
            if theme.is_none() && timezone.is_none() && language.is_none() {
                return Err(AppError::Invalid(
                    "Nothing to update: pass --theme, --timezone or --language".into(),
                ));
            }
            if let Some(theme) = theme {
                settings.theme = theme;
            }
            if let Some(timezone) = timezone {
                settings.timezone = timezone;
            }
            if let Some(language) = language {
                settings.language = language;
            }
            let stored = view.update_settings(&settings).await?;
            println!(
                "theme={} timezone={} language={}",
                stored.theme, stored.timezone, stored.language
            );
            Ok(())
        }
        ProfileCommand::Activity { page } => {
            let activity = loaded(view.load_activity(page.max(1)).await)?;
            let rows: Vec<Vec<String>> = activity
                .activities
                .iter()
                .map(|a| {
                    vec![
                        timestamp(a.timestamp),
                        a.action.clone(),
                        a.ip_address.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect();
            if rows.is_empty() {
                println!("No activity");
            } else {
                println!("{}", table(&["TIME", "ACTION", "IP"], &rows));
            }
            println!(
                "Page {} of {} ({} entries)",
                activity.current_page, activity.pages, activity.total
            );
            Ok(())
        }
    }
}
