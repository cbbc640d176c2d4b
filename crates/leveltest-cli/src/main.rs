//! leveltest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "leveltest", version, about = "English level test session runner")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session token
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Account role: student or teacher
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current identity
    Whoami,

    /// Run a test session
    Run {
        /// Question source: placement, practice, or classroom
        #[arg(long, default_value = "placement")]
        variant: String,

        /// Classroom test id (required with --variant classroom)
        #[arg(long)]
        test_id: Option<i64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("leveltest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(config, username, password).await
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => commands::account::register(config, username, email, password, role).await,
        Commands::Logout => commands::account::logout(config),
        Commands::Whoami => commands::account::whoami(config),
        Commands::Run { variant, test_id } => {
            commands::run::execute(config, &variant, test_id).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
