//! User Service - command-line user management.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_lib::cli::UserCommand;

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User management service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu
    Shell,
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: i32,
    },
    /// Show a user by ID
    Get { id: i64 },
    /// List all users
    List,
    /// Replace a user's name, email and age
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: i32,
    },
    /// Delete a user by ID
    Delete { id: i64 },
}

impl From<Commands> for UserCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Shell => UserCommand::Shell,
            Commands::Create { name, email, age } => UserCommand::Create { name, email, age },
            Commands::Get { id } => UserCommand::Get { id },
            Commands::List => UserCommand::List,
            Commands::Update {
                id,
                name,
                email,
                age,
            } => UserCommand::Update {
                id,
                name,
                email,
                age,
            },
            Commands::Delete { id } => UserCommand::Delete { id },
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = user_service_lib::run_cli(cli.command.into()).await {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
