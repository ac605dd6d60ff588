//! sociaux - query and manage social-media accounts from the shell
//!
//! Thin front end over libsociaux: every subcommand is one facade call.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use libsociaux::config::Config;
use libsociaux::logging::LoggingConfig;
use libsociaux::microblogs::{self, MicroBlog};
use libsociaux::{Dm, SociauxError, User};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sociaux")]
#[command(version, about = "Query and manage social-media accounts through one interface", long_about = None)]
#[command(after_help = r#"EXAMPLES:
    sociaux whoami
    sociaux user --username rustlang
    sociaux followers --format json | jq -r '.[].username'
    sociaux mute noisy_account
    sociaux dms --with ferris

EXIT CODES:
    0 - Success
    1 - General error (configuration, network, service)
    2 - Invalid credentials
    3 - Invalid request
    4 - Not found
    5 - Quota exceeded (rate limited)"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "SOCIAUX_CONFIG")]
    config: Option<PathBuf>,

    /// Provider to talk to
    #[arg(short, long, global = true, default_value = "twitter")]
    provider: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One record per line
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the authenticated user
    Whoami,

    /// Look up a user by username or id
    User {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },

    /// List followers (of the authenticated user by default)
    Followers { user: Option<String> },

    /// List followed accounts (of the authenticated user by default)
    Following { user: Option<String> },

    /// List blocked accounts
    Blocked,

    /// List muted accounts
    Muted,

    Follow { user: String },

    Unfollow { user: String },

    Block { user: String },

    Unblock { user: String },

    Mute { user: String },

    Unmute { user: String },

    /// Show one direct message
    Dm { id: String },

    /// List direct messages
    Dms {
        /// Only messages exchanged with this user
        #[arg(long = "with")]
        with: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SociauxError>()
        .map(SociauxError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from(cli.config.as_deref())?;

    debug!(provider = %cli.provider, "Connecting");
    let service = microblogs::connect_with_cache(
        &cli.provider,
        config.provider(&cli.provider)?,
        config.cache.to_cache_config(),
    )?;

    execute(service.as_ref(), cli.command, cli.format).await
}

async fn execute(service: &dyn MicroBlog, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Whoami => print_user(&service.users()?.current_user().await?, format),
        Commands::User { username, id } => {
            let user = service
                .users()?
                .get_user(username.as_deref(), id.as_deref())
                .await?;
            print_user(&user, format)
        }
        Commands::Followers { user } => {
            print_users(&service.users()?.list_followers(user.as_deref()).await?, format)
        }
        Commands::Following { user } => {
            print_users(&service.users()?.list_following(user.as_deref()).await?, format)
        }
        Commands::Blocked => print_users(&service.users()?.list_blocked().await?, format),
        Commands::Muted => print_users(&service.users()?.list_muted().await?, format),
        Commands::Follow { user } => print_user(&service.users()?.follow(&user).await?, format),
        Commands::Unfollow { user } => print_user(&service.users()?.unfollow(&user).await?, format),
        Commands::Block { user } => print_user(&service.users()?.block(&user).await?, format),
        Commands::Unblock { user } => print_user(&service.users()?.unblock(&user).await?, format),
        Commands::Mute { user } => print_user(&service.users()?.mute(&user).await?, format),
        Commands::Unmute { user } => print_user(&service.users()?.unmute(&user).await?, format),
        Commands::Dm { id } => print_dms(&[service.dms()?.get(&id).await?], format, true),
        Commands::Dms { with } => {
            print_dms(&service.dms()?.list_threads(with.as_deref()).await?, format, false)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn user_line(user: &User) -> String {
    format!("{}\t{}", user.id, user)
}

fn print_user(user: &User, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Text => {
            println!("{}", user_line(user));
            Ok(())
        }
    }
}

fn print_users(users: &[User], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(users),
        OutputFormat::Text => {
            for user in users {
                println!("{}", user_line(user));
            }
            Ok(())
        }
    }
}

/// A single message prints as a JSON object, a listing as an array
fn print_dms(dms: &[Dm], format: OutputFormat, single: bool) -> Result<()> {
    match (format, dms) {
        (OutputFormat::Json, [dm]) if single => print_json(dm),
        (OutputFormat::Json, _) => print_json(dms),
        (OutputFormat::Text, _) => {
            for dm in dms {
                println!(
                    "{}\t{}\t{}\t{}",
                    dm.id,
                    dm.created_at.format("%Y-%m-%d %H:%M:%S"),
                    dm,
                    dm.text.replace('\n', " ")
                );
            }
            Ok(())
        }
    }
}
