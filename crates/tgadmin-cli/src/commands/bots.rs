//! bots list|add|start|stop|restart.

use super::loaded;
use crate::app::Application;
use crate::cli::BotsCommand;
use crate::error::{AppError, AppResult};
use crate::output::{paint, table, timestamp};
use tgadmin_core::{BotId, BotStatus};
use tgadmin_dashboard::views::{BotAction, BotManagementView};

pub async fn run(app: &Application, command: BotsCommand) -> AppResult<()> {
    let view = BotManagementView::new(app.ctx().clone());
    match command {
        BotsCommand::List { search, status } => {
            let status = status
                .as_deref()
                .map(parse_status)
                .transpose()?;
            loaded(view.load().await)?;
            let bots = view.filtered(search.as_deref().unwrap_or_default(), status);
            if bots.is_empty() {
                println!("No bots found");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = bots
                .iter()
                .map(|bot| {
                    vec![
                        bot.id.to_string(),
                        bot.bot_name.clone(),
                        bot.status.to_string(),
                        timestamp(bot.last_active),
                    ]
                })
                .collect();
            println!("{}", table(&["ID", "NAME", "STATUS", "LAST ACTIVE"], &rows));
            Ok(())
        }
        BotsCommand::Add { name, token } => {
            let bot = view.add_bot(&name, &token).await?;
            println!(
                "Added bot {} ({}) status {}",
                bot.id,
                bot.bot_name,
                paint(bot.status.as_str(), bot.status.color())
            );
            Ok(())
        }
        BotsCommand::Start { id } => act(&view, BotId(id), BotAction::Start).await,
        BotsCommand::Stop { id } => act(&view, BotId(id), BotAction::Stop).await,
        BotsCommand::Restart { id } => act(&view, BotId(id), BotAction::Restart).await,
    }
}

async fn act(view: &BotManagementView, id: BotId, action: BotAction) -> AppResult<()> {
    loaded(view.load().await)?;
    let Some(bot) = view.bot(id) else {
        return Err(AppError::Invalid(format!("Bot {id} not found")));
    };
    if !view.is_action_enabled(id, action) {
        return Err(AppError::Invalid(format!(
            "Cannot {action} bot {id} while it is {}",
            bot.status
        )));
    }

    view.perform(id, action).await?;
    match view.bot(id) {
        Some(bot) if !view.is_pending(id) => println!(
            "Bot {id} is {}",
            paint(bot.status.as_str(), bot.status.color())
        ),
        _ => println!("Bot {id}: {action} requested, waiting for the status to change"),
    }
    Ok(())
}

fn parse_status(value: &str) -> AppResult<BotStatus> {
    match BotStatus::from_wire(value) {
        BotStatus::Unknown => Err(AppError::Invalid(format!("Unknown bot status {value:?}"))),
        status => Ok(status),
    }
}
