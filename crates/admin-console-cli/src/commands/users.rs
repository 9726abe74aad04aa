use anyhow::Result;

use admin_console_core::models::{CreateUserRequest, UserQuery, UserStatus};
use admin_console_core::ApiClient;

use super::output::{print_message, print_statistics, print_user, print_user_page};
use crate::cli::{UserArgs, UserCommand};
use crate::terminal::{confirm, prompt_new_password};

/// Admin area the user commands belong to
pub const ROUTE: &str = "/users";

pub async fn handle_users(args: UserArgs, client: &ApiClient) -> Result<()> {
    match args.command {
        UserCommand::List(args) => {
            let query = UserQuery {
                page: args.page,
                size: args.size,
                search: args.search,
                status: args.status.map(UserStatus::from),
                role_id: args.role_id,
            };
            let page = client.fetch_users(&query).await?;
            print_user_page(&page);
        }
        UserCommand::Show(args) => {
            let user = client.fetch_user(args.id).await?;
            print_user(&user);
        }
        UserCommand::Create(args) => {
            let password = prompt_new_password("Password for the new user: ")?;
            let status = if args.disabled {
                UserStatus::Disabled
            } else {
                UserStatus::Enabled
            };
            let user = client
                .create_user(&CreateUserRequest {
                    username: args.username,
                    email: args.email,
                    password,
                    status,
                    roles: args.roles,
                })
                .await?;
            println!("Created user {} (id {})", user.username, user.id);
        }
        UserCommand::Enable(args) => {
            let message = client.update_user_status(args.id, UserStatus::Enabled).await?;
            print_message(message, "User enabled");
        }
        UserCommand::Disable(args) => {
            let message = client.update_user_status(args.id, UserStatus::Disabled).await?;
            print_message(message, "User disabled");
        }
        UserCommand::Delete(args) => {
            if !args.yes && !confirm(&format!("Delete user {}?", args.id))? {
                println!("Cancelled");
                return Ok(());
            }
            let message = client.delete_user(args.id).await?;
            print_message(message, "User deleted");
        }
        UserCommand::ResetPassword(args) => {
            let password = prompt_new_password("New password: ")?;
            let message = client.reset_user_password(args.id, &password).await?;
            print_message(message, "Password reset");
        }
        UserCommand::Stats => {
            let stats = client.fetch_user_statistics().await?;
            print_statistics(&stats);
        }
        UserCommand::BatchStatus(args) => {
            let status = UserStatus::from(args.status);
            let message = client.batch_update_user_status(&args.ids, status).await?;
            print_message(
                message,
                &format!("Set {} users to {}", args.ids.len(), status.label()),
            );
        }
    }
    Ok(())
}
