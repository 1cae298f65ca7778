//! User management commands.

use clap::Subcommand;
use daybook_core::storage::Database;
use daybook_core::User;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a new user
    Add {
        /// Display name
        name: String,
        /// Contact address for reminder digests
        #[arg(long)]
        email: Option<String>,
    },
    /// List users
    List,
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        UserAction::Add { name, email } => {
            let user = User::new(name, email);
            db.create_user(&user)?;
            println!("User created: {}", user.id);
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::List => {
            let users = db.list_users()?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }
    Ok(())
}
