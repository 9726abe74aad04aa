use admin_console_core::models::{format_roles, Page, Role, User, UserStatistics};
use admin_console_core::utils::{format_date, format_optional, truncate_string};

/// Print the server's message, or `fallback` when it sent none
pub fn print_message(message: Option<String>, fallback: &str) {
    match message {
        Some(m) if !m.trim().is_empty() => println!("{}", m),
        _ => println!("{}", fallback),
    }
}

fn date_or_dash(date: &Option<String>) -> String {
    date.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
}

pub fn print_user(user: &User) {
    println!("ID:          {}", user.id);
    println!("Username:    {}", user.username);
    println!("Email:       {}", format_optional(&user.email, "-"));
    println!("Status:      {}", user.status_text());
    println!("Roles:       {}", format_roles(&user.roles));
    println!("Created:     {}", date_or_dash(&user.created_at));
    println!("Updated:     {}", date_or_dash(&user.updated_at));
    println!("Last login:  {}", date_or_dash(&user.last_login_at));
}

pub fn print_user_table(users: &[User]) {
    println!(
        "{:<6} {:<20} {:<28} {:<9} {:<24} {}",
        "ID", "USERNAME", "EMAIL", "STATUS", "ROLES", "LAST LOGIN"
    );
    for user in users {
        println!(
            "{:<6} {:<20} {:<28} {:<9} {:<24} {}",
            user.id,
            truncate_string(&user.username, 20),
            truncate_string(&format_optional(&user.email, "-"), 28),
            user.status_text(),
            truncate_string(&format_roles(&user.roles), 24),
            date_or_dash(&user.last_login_at),
        );
    }
}

pub fn print_user_page(page: &Page<User>) {
    if page.content.is_empty() {
        println!("No users found");
    } else {
        print_user_table(&page.content);
    }
    println!(
        "Page {} of {} ({} users)",
        page.current_page + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

pub fn print_role_table(roles: &[Role]) {
    if roles.is_empty() {
        println!("No roles");
        return;
    }
    println!("{:<6} {:<20} {:<40} {}", "ID", "NAME", "DESCRIPTION", "CREATED");
    for role in roles {
        println!(
            "{:<6} {:<20} {:<40} {}",
            role.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            truncate_string(&role.name, 20),
            truncate_string(&format_optional(&role.description, ""), 40),
            date_or_dash(&role.created_at),
        );
    }
}

pub fn print_statistics(stats: &UserStatistics) {
    println!("Total users:     {}", stats.total_users);
    println!("Enabled:         {}", stats.enabled_users);
    println!("Disabled:        {}", stats.disabled_users);
    println!("Enabled share:   {:.1}%", stats.enabled_percentage);
}
