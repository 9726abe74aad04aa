use clap::{Args, Parser, Subcommand, ValueEnum};

use admin_console_core::models::UserStatus;

#[derive(Parser)]
#[command(name = "admin-console")]
#[command(version, about = "Manage users and roles of the admin service")]
pub struct Cli {
    /// Base URL of the management API, overriding config and ADMIN_CONSOLE_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and keep the session for later commands
    Login(LoginArgs),
    /// End the session and forget stored tokens
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create a new account
    Register(RegisterArgs),
    /// Manage your own profile
    Profile(ProfileArgs),
    /// Administer user accounts (admin only)
    Users(UserArgs),
    /// Administer roles and role assignments (admin only)
    Roles(RoleArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Change your username or email
    Update(ProfileUpdateArgs),
    /// Change your password
    Password,
}

#[derive(Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Enabled,
    Disabled,
}

impl From<StatusArg> for UserStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Enabled => UserStatus::Enabled,
            StatusArg::Disabled => UserStatus::Disabled,
        }
    }
}

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand)]
pub enum UserCommand {
    List(UserListArgs),
    Show(UserIdArgs),
    Create(UserCreateArgs),
    Enable(UserIdArgs),
    Disable(UserIdArgs),
    Delete(UserDeleteArgs),
    ResetPassword(UserIdArgs),
    /// Account totals by status
    Stats,
    /// Set the status of several users at once
    BatchStatus(UserBatchStatusArgs),
}

#[derive(Args)]
pub struct UserListArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    #[arg(long, default_value_t = 10)]
    pub size: u32,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    #[arg(long)]
    pub role_id: Option<i64>,
}

#[derive(Args)]
pub struct UserIdArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct UserCreateArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Role id to grant; repeat for several
    #[arg(long = "role")]
    pub roles: Vec<i64>,
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args)]
pub struct UserDeleteArgs {
    pub id: i64,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct UserBatchStatusArgs {
    #[arg(long, value_enum)]
    pub status: StatusArg,
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,
}

#[derive(Args)]
pub struct RoleArgs {
    #[command(subcommand)]
    pub command: RoleCommand,
}

#[derive(Subcommand)]
pub enum RoleCommand {
    List,
    Show(RoleIdArgs),
    Create(RoleCreateArgs),
    Update(RoleUpdateArgs),
    /// Delete one role, or several in one batch
    Delete(RoleDeleteArgs),
    /// Replace a user's roles
    Assign(RoleAssignArgs),
    /// Grant one role to a user
    Add(UserRoleArgs),
    /// Revoke one role from a user
    Remove(UserRoleArgs),
    /// Roles held by a user
    OfUser(UserIdArgs),
    /// How many users hold a role
    Usage(RoleIdArgs),
}

#[derive(Args)]
pub struct RoleIdArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct RoleCreateArgs {
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RoleUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RoleDeleteArgs {
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RoleAssignArgs {
    pub user_id: i64,
    /// Complete role set; pass none to remove every role
    pub role_ids: Vec<i64>,
}

#[derive(Args)]
pub struct UserRoleArgs {
    pub user_id: i64,
    pub role_id: i64,
}
