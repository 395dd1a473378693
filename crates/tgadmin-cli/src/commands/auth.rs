//! login, register, logout, whoami.

use super::Prompter;
use crate::app::Application;
use crate::cli::CredentialArgs;
use crate::error::{AppError, AppResult};
use tgadmin_api::Credentials;
use tgadmin_dashboard::Route;

async fn credentials(args: CredentialArgs) -> AppResult<Credentials> {
    let password = match args.password {
        Some(password) => password,
        None => Prompter::new().ask("Password").await?,
    };
    Ok(Credentials::new(args.username, password))
}

pub async fn login(app: &Application, args: CredentialArgs) -> AppResult<()> {
    let credentials = credentials(args).await?;
    let user = app
        .ctx()
        .session()
        .login(&credentials)
        .await
        .map_err(|e| AppError::Invalid(e.user_message("Login failed")))?;
    app.ctx().navigator().navigate(Route::Dashboard);
    println!("Logged in as {}", user.username);
    Ok(())
}

pub async fn register(app: &Application, args: CredentialArgs) -> AppResult<()> {
    let credentials = credentials(args).await?;
    let user = app
        .ctx()
        .session()
        .register(&credentials)
        .await
        .map_err(|e| AppError::Invalid(e.user_message("Registration failed")))?;
    app.ctx().navigator().navigate(Route::Dashboard);
    println!("Registered and logged in as {}", user.username);
    Ok(())
}

pub fn logout(app: &Application) -> AppResult<()> {
    app.ctx().session().logout()?;
    app.ctx().navigator().navigate(Route::Login);
    println!("Logged out");
    Ok(())
}

pub fn whoami(app: &Application) -> AppResult<()> {
    let user = app
        .ctx()
        .session()
        .current_user()
        .ok_or(AppError::NotAuthenticated)?;
    println!("{}", user.username);
    if let Some(email) = &user.email {
        println!("email: {email}");
    }
    if let Some(role) = &user.role {
        println!("role:  {role}");
    }
    Ok(())
}
