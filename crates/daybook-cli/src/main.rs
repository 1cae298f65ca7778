use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "daybook-cli", version, about = "Daybook CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Todo management
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Calendar event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Achievement log
    Achievement {
        #[command(subcommand)]
        action: commands::achievement::AchievementAction,
    },
    /// Achievement statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Reminder engine control
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Achievement { action } => commands::achievement::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
