//! Subcommand handlers. Each handler talks to the API through the shared
//! `ApiClient` and prints plain lines on stdout.

mod account;
mod output;
mod roles;
mod users;

use anyhow::{bail, Result};
use tracing::debug;

use admin_console_core::{ApiClient, Config, GuardDecision, NavigationGuard, RouteAccess};

use crate::cli::Command;

pub struct CommandContext {
    pub client: ApiClient,
    pub config: Config,
}

pub async fn run(command: Command, ctx: &mut CommandContext) -> Result<()> {
    match command {
        Command::Login(args) => account::handle_login(args, ctx).await,
        Command::Logout => account::handle_logout(ctx).await,
        Command::Whoami => account::handle_whoami(ctx).await,
        Command::Register(args) => account::handle_register(args, ctx).await,
        Command::Profile(args) => account::handle_profile(args, ctx).await,
        Command::Users(args) => {
            let client = require_admin(ctx, users::ROUTE).await?;
            users::handle_users(args, &client).await
        }
        Command::Roles(args) => {
            let client = require_admin(ctx, roles::ROUTE).await?;
            roles::handle_roles(args, &client).await
        }
    }
}

/// Run the navigation guard for an admin area and hand back a client that
/// returns there after a forced login
async fn require_admin(ctx: &CommandContext, route: &str) -> Result<ApiClient> {
    let guard = NavigationGuard::new(ctx.client.clone());
    match guard.check(route, RouteAccess::Admin).await {
        GuardDecision::Allow => Ok(ctx.client.with_return_path(route)),
        GuardDecision::Login { location } => {
            debug!(%location, "Guard requires login");
            bail!("Not logged in. Run `admin-console login` first.")
        }
        GuardDecision::Forbidden => bail!("This command requires the ADMIN role"),
        GuardDecision::Redirect(to) => bail!("Cannot open {} (redirected to {})", route, to),
    }
}
