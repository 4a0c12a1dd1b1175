//! Command handlers. Each one checks its access level before touching
//! the network.

mod account;
mod cameras;
mod history;
mod live;
mod notifications;
mod report;
mod users;

use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::context::AppContext;

/// Output options shared by all handlers.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON when `--json` is set; otherwise run
    /// the text renderer.
    pub fn emit<T, F>(&self, value: &T, text: F) -> anyhow::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T),
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}

pub async fn run(ctx: &AppContext, cli: Cli) -> anyhow::Result<()> {
    let out = Output { json: cli.json };

    match cli.command {
        Command::Login { email, password } => account::login(ctx, &email, &password).await,
        Command::Logout => account::logout(ctx),
        Command::Register(args) => account::register(ctx, args).await,
        Command::ChangePassword { email, current, new } => {
            account::change_password(ctx, email, current, new).await
        }
        Command::ResetToken { token } => account::reset_token(ctx, &token).await,
        Command::Cameras(cmd) => cameras::run(ctx, out, cmd).await,
        Command::Offices => cameras::offices(ctx, out).await,
        Command::Watch(args) => live::watch(ctx, args).await,
        Command::Ingest(args) => live::ingest(ctx, args).await,
        Command::Events {
            connection,
            limit,
            offset,
        } => history::events(ctx, out, connection, limit, offset).await,
        Command::Clips(cmd) => history::clips(ctx, out, cmd).await,
        Command::Notifications(cmd) => notifications::run(ctx, out, cmd).await,
        Command::Report(args) => report::run(ctx, out, args).await,
        Command::Users(cmd) => users::run(ctx, out, cmd).await,
        Command::Alert { message, phone } => notifications::alert(ctx, &message, &phone).await,
    }
}
