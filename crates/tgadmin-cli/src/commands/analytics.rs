//! analytics overview|bot|export.

use super::loaded;
use crate::app::Application;
use crate::cli::AnalyticsCommand;
use crate::error::AppResult;
use crate::output::{table, timestamp};
use tgadmin_core::BotId;
use tgadmin_dashboard::views::AnalyticsView;
use tracing::info;

pub async fn run(app: &Application, command: AnalyticsCommand) -> AppResult<()> {
    let view = AnalyticsView::new(app.ctx().clone());
    match command {
        AnalyticsCommand::Overview => {
            let metrics = loaded(view.load().await)?;
            println!(
                "{} users, {} messages, {}/{} bots active",
                metrics.total_users, metrics.total_messages, metrics.active_bots, metrics.total_bots
            );
            let rows: Vec<Vec<String>> = view
                .performance()
                .into_iter()
                .map(|p| {
                    vec![
                        p.bot,
                        p.users.to_string(),
                        p.messages.to_string(),
                        p.samples.to_string(),
                    ]
                })
                .collect();
            if !rows.is_empty() {
                println!();
                println!("{}", table(&["BOT", "USERS", "MESSAGES", "SAMPLES"], &rows));
            }
            Ok(())
        }
        AnalyticsCommand::Bot { id, days } => {
            let analytics = loaded(view.load_bot(BotId(id), days).await)?;
            println!(
                "Bot {} over the last {} day(s): {} sample(s)",
                analytics.bot_id,
                analytics.days,
                analytics.records.len()
            );
            let rows: Vec<Vec<String>> = analytics
                .records
                .iter()
                .map(|r| vec![timestamp(r.timestamp), r.metric_type.clone(), r.count().to_string()])
                .collect();
            if !rows.is_empty() {
                println!("{}", table(&["TIME", "METRIC", "COUNT"], &rows));
            }
            Ok(())
        }
        AnalyticsCommand::Export { days, output } => {
            let json = view.export_json(days).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json.as_bytes()).await?;
                    info!(path = %path.display(), "Analytics exported");
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}
