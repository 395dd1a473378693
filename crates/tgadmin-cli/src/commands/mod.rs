//! Command handlers.

mod ads;
mod analytics;
mod auth;
mod bots;
mod profile;
mod watch;

use crate::app::Application;
use crate::cli::Command;
use crate::error::{AppError, AppResult};
use tgadmin_dashboard::views::DashboardView;
use tgadmin_dashboard::LoadState;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

pub async fn dispatch(app: &Application, command: Command) -> AppResult<()> {
    match command {
        Command::Login(args) => auth::login(app, args).await,
        Command::Register(args) => auth::register(app, args).await,
        Command::Logout => auth::logout(app),
        Command::Whoami => auth::whoami(app),
        Command::Dashboard => dashboard(app).await,
        Command::Bots(cmd) => bots::run(app, cmd).await,
        Command::Ads(cmd) => ads::run(app, cmd).await,
        Command::Media(cmd) => ads::media(app, cmd).await,
        Command::Analytics(cmd) => analytics::run(app, cmd).await,
        Command::Profile(cmd) => profile::run(app, cmd).await,
        Command::Watch { bots } => watch::run(app, bots).await,
        Command::Config => {
            print!("{}", app.config().to_toml()?);
            Ok(())
        }
    }
}

async fn dashboard(app: &Application) -> AppResult<()> {
    let view = DashboardView::new(app.ctx().clone());
    let summary = loaded(view.load().await)?;
    println!("Total bots:      {}", summary.total_bots);
    println!("Active bots:     {}", summary.active_bots);
    println!("Total users:     {}", summary.total_users);
    println!("Total messages:  {}", summary.total_messages);
    println!("Active ads:      {}", summary.active_ads);
    Ok(())
}

/// Value of a finished load, or its inline error.
pub(crate) fn loaded<T>(state: LoadState<T>) -> AppResult<T> {
    match state {
        LoadState::Loaded(value) => Ok(value),
        LoadState::Failed(message) => Err(AppError::Load(message)),
        LoadState::Idle | LoadState::Loading => Err(AppError::Load("No data loaded".into())),
    }
}

/// Line reader over stdin. One instance per command so piped input is not
/// lost between prompts.
pub(crate) struct Prompter {
    reader: BufReader<Stdin>,
}

impl Prompter {
    pub(crate) fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }

    /// Print `prompt` to stderr and read one line.
    pub(crate) async fn ask(&mut self, prompt: &str) -> AppResult<String> {
        eprint!("{prompt}: ");
        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
