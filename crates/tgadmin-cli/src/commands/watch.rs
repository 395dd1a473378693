//! watch: stream real-time notifications until Ctrl-C.

use crate::app::Application;
use crate::error::{AppError, AppResult};
use crate::output;
use std::time::Duration;
use tgadmin_core::BotId;
use tgadmin_dashboard::{attach_realtime, NotificationEvent};
use tgadmin_realtime::{Event, RealtimeClient, Topic};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(app: &Application, bots: Vec<u64>) -> AppResult<()> {
    let ctx = app.ctx();
    let token = ctx.session().token()?.ok_or(AppError::NotAuthenticated)?;
    let notifications = ctx.notifications().clone();
    let client = RealtimeClient::new(app.config().realtime.clone());

    let shutdown = CancellationToken::new();
    let sweeper = notifications.spawn_sweeper(SWEEP_INTERVAL, shutdown.child_token());
    let mut events = notifications.events();
    let bridge = attach_realtime(&client, notifications.clone());

    // The client gives up on its own (rejected token, retries exhausted).
    let stop_on_disconnect = {
        let shutdown = shutdown.clone();
        client.subscribe(Topic::ConnectionStatus, move |event: &Event| {
            if event.str_field("status") == Some("disconnected") {
                shutdown.cancel();
            }
        })
    };

    client.connect(&token).await?;
    for id in bots {
        client.subscribe_bot(BotId(id))?;
    }
    info!(url = %app.config().realtime.url, "Watching real-time events, Ctrl-C to stop");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            () = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Ok(NotificationEvent::Shown(notification)) => {
                    output::print_notification(&notification);
                    notifications.dismiss(notification.id);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    stop_on_disconnect.unsubscribe();
    bridge.detach();
    client.disconnect().await;
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "Notification sweeper ended abnormally");
    }
    Ok(())
}
