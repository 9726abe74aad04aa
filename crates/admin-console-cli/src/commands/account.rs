use anyhow::{bail, Result};
use tracing::{info, warn};

use admin_console_core::models::{format_roles, RegisterRequest, UpdateProfileRequest};

use super::output::{print_message, print_user};
use super::CommandContext;
use crate::cli::{LoginArgs, ProfileArgs, ProfileCommand, RegisterArgs};
use crate::terminal::{prompt_line, prompt_new_password, prompt_password};

const USERNAME_ENV: &str = "ADMIN_CONSOLE_USERNAME";
const PASSWORD_ENV: &str = "ADMIN_CONSOLE_PASSWORD";

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub async fn handle_login(args: LoginArgs, ctx: &mut CommandContext) -> Result<()> {
    let username = match args.username.or_else(|| env_value(USERNAME_ENV)) {
        Some(username) => username,
        None => {
            let last = ctx.config.last_username.clone();
            let prompt = match last {
                Some(ref last) => format!("Username [{}]: ", last),
                None => "Username: ".to_string(),
            };
            let entered = prompt_line(&prompt)?;
            match (entered.is_empty(), last) {
                (false, _) => entered,
                (true, Some(last)) => last,
                (true, None) => bail!("Username is required"),
            }
        }
    };
    let password = match env_value(PASSWORD_ENV) {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    if password.is_empty() {
        bail!("Password is required");
    }

    let user = ctx.client.login(&username, &password).await?;

    ctx.config.last_username = Some(user.username.clone());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    info!(username = %user.username, "Login complete");
    println!("Logged in as {} ({})", user.username, format_roles(&user.roles));
    Ok(())
}

pub async fn handle_logout(ctx: &mut CommandContext) -> Result<()> {
    let was_logged_in = ctx.client.auth().is_authenticated();
    ctx.client.logout().await?;
    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn handle_whoami(ctx: &mut CommandContext) -> Result<()> {
    if !ctx.client.auth().is_authenticated() {
        bail!("Not logged in. Run `admin-console login` first.");
    }
    let user = ctx.client.current_user().await?;
    print_user(&user);
    if user.is_admin() {
        println!("Administrator");
    }
    Ok(())
}

pub async fn handle_register(args: RegisterArgs, ctx: &mut CommandContext) -> Result<()> {
    if !ctx.client.check_username(&args.username).await? {
        bail!("Username '{}' is already taken", args.username);
    }
    if !ctx.client.check_email(&args.email).await? {
        bail!("Email '{}' is already registered", args.email);
    }
    let password = prompt_new_password("Password: ")?;

    let user = ctx
        .client
        .register(&RegisterRequest {
            username: args.username,
            email: args.email,
            password,
        })
        .await?;
    println!(
        "Registered {} (id {}). Run `admin-console login` to sign in.",
        user.username, user.id
    );
    Ok(())
}

pub async fn handle_profile(args: ProfileArgs, ctx: &mut CommandContext) -> Result<()> {
    if !ctx.client.auth().is_authenticated() {
        bail!("Not logged in. Run `admin-console login` first.");
    }
    match args.command {
        ProfileCommand::Update(update) => {
            if update.username.is_none() && update.email.is_none() {
                bail!("Nothing to update; pass --username and/or --email");
            }
            let user = ctx
                .client
                .update_profile(&UpdateProfileRequest {
                    username: update.username,
                    email: update.email,
                })
                .await?;
            println!("Profile updated");
            print_user(&user);
        }
        ProfileCommand::Password => {
            let current = prompt_password("Current password: ")?;
            let new = prompt_new_password("New password: ")?;
            let message = ctx.client.change_password(&current, &new).await?;
            print_message(message, "Password changed");
        }
    }
    Ok(())
}
