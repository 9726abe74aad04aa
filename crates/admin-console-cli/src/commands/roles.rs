use anyhow::{bail, Result};

use admin_console_core::models::NewRole;
use admin_console_core::ApiClient;

use super::output::{print_message, print_role_table};
use crate::cli::{RoleArgs, RoleCommand};
use crate::terminal::confirm;

/// Admin area the role commands belong to
pub const ROUTE: &str = "/roles";

pub async fn handle_roles(args: RoleArgs, client: &ApiClient) -> Result<()> {
    match args.command {
        RoleCommand::List => {
            let roles = client.fetch_roles().await?;
            print_role_table(&roles);
        }
        RoleCommand::Show(args) => {
            let role = client.fetch_role(args.id).await?;
            let usage = client.fetch_role_usage(args.id).await?;
            print_role_table(std::slice::from_ref(&role));
            println!("Held by {} users", usage);
        }
        RoleCommand::Create(args) => {
            let role = client
                .create_role(&NewRole {
                    name: args.name,
                    description: args.description,
                })
                .await?;
            println!("Created role {}", role.name);
        }
        RoleCommand::Update(args) => {
            if args.name.is_none() && args.description.is_none() {
                bail!("Nothing to update; pass --name and/or --description");
            }
            let current = client.fetch_role(args.id).await?;
            let role = client
                .update_role(
                    args.id,
                    &NewRole {
                        name: args.name.unwrap_or(current.name),
                        description: args.description.or(current.description),
                    },
                )
                .await?;
            println!("Updated role {}", role.name);
        }
        RoleCommand::Delete(args) => {
            if let [id] = args.ids[..] {
                if !client.can_delete_role(id).await? {
                    bail!("Role {} is still assigned to users", id);
                }
            }
            let question = format!("Delete {} role(s)?", args.ids.len());
            if !args.yes && !confirm(&question)? {
                println!("Cancelled");
                return Ok(());
            }
            let message = match args.ids[..] {
                [id] => client.delete_role(id).await?,
                _ => client.batch_delete_roles(&args.ids).await?,
            };
            print_message(message, "Deleted");
        }
        RoleCommand::Assign(args) => {
            let message = client.assign_roles(args.user_id, &args.role_ids).await?;
            print_message(message, "Roles assigned");
        }
        RoleCommand::Add(args) => {
            let message = client.add_role_to_user(args.user_id, args.role_id).await?;
            print_message(message, "Role added");
        }
        RoleCommand::Remove(args) => {
            let message = client
                .remove_role_from_user(args.user_id, args.role_id)
                .await?;
            print_message(message, "Role removed");
        }
        RoleCommand::OfUser(args) => {
            let roles = client.fetch_user_roles(args.id).await?;
            print_role_table(&roles);
        }
        RoleCommand::Usage(args) => {
            let usage = client.fetch_role_usage(args.id).await?;
            let holders = client.fetch_role_user_ids(args.id).await?;
            println!("Held by {} users", usage);
            if !holders.is_empty() {
                let ids: Vec<String> = holders.iter().map(|id| id.to_string()).collect();
                println!("User ids: {}", ids.join(", "));
            }
        }
    }
    Ok(())
}
